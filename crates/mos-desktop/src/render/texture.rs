//! Pool-backed textures
//!
//! Texture pixels live in chained blocks of a [`MemoryPool`]: a texture of
//! `w * h` pixels holds `ceil(w * h * 4 / block_size)` blocks, filled in
//! order. Destroying a texture returns its blocks to the pool.

use mos_alloc::{AllocError, BlockHandle, FixedMap, MemoryPool, PoolUsage};

use super::{PixelBuffer, RenderError};
use crate::math::Color;

/// Texture identifier
pub type TextureId = u32;

/// Texture descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    /// Chained storage blocks, in pixel order
    blocks: Vec<BlockHandle>,
}

impl Texture {
    /// Bytes of pixel data
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * std::mem::size_of::<Color>()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Texture table plus the pool backing it
pub struct TextureStore {
    pool: MemoryPool,
    textures: FixedMap<Texture>,
    next_id: TextureId,
}

impl TextureStore {
    /// Create a store of `block_count` blocks of `block_size` bytes
    pub fn new(
        block_size: usize,
        block_count: usize,
        max_textures: usize,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            pool: MemoryPool::new(block_size, block_count)?,
            textures: FixedMap::with_capacity(max_textures),
            next_id: 1,
        })
    }

    /// Allocate a transparent texture (`texture_create`)
    pub fn create(&mut self, width: u32, height: u32) -> Result<TextureId, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidTexture("texture must be non-empty"));
        }
        if self.textures.is_full() {
            return Err(AllocError::CapacityExceeded {
                capacity: self.textures.capacity(),
            }
            .into());
        }

        let bytes = width as usize * height as usize * std::mem::size_of::<Color>();
        let blocks = self
            .pool
            .allocate_many(bytes.div_ceil(self.pool.block_size()))?;

        let id = self.next_id;
        let texture = Texture {
            id,
            width,
            height,
            blocks,
        };
        if let Err(e) = self.textures.put(id as u64, texture.clone()) {
            for block in texture.blocks {
                let _ = self.pool.free(block);
            }
            return Err(e.into());
        }
        self.next_id += 1;
        Ok(id)
    }

    /// Free a texture and its blocks (`texture_destroy`). Unknown ids return `false`.
    pub fn destroy(&mut self, id: TextureId) -> bool {
        let Some(texture) = self.textures.remove(id as u64) else {
            return false;
        };
        for block in texture.blocks {
            let _ = self.pool.free(block);
        }
        true
    }

    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id as u64)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Texture pool block accounting
    pub fn usage(&self) -> PoolUsage {
        self.pool.usage()
    }

    /// Replace every pixel of a texture
    pub fn write(&mut self, id: TextureId, pixels: &[Color]) -> Result<(), RenderError> {
        let texture = self
            .textures
            .get(id as u64)
            .ok_or(RenderError::UnknownTexture(id))?;
        if pixels.len() != texture.width as usize * texture.height as usize {
            return Err(RenderError::InvalidTexture("pixel count does not match size"));
        }

        let bytes: &[u8] = bytemuck::cast_slice(pixels);
        let block_size = self.pool.block_size();
        for (chunk, &block) in bytes.chunks(block_size).zip(&texture.blocks) {
            self.pool.block_mut(block)?[..chunk.len()].copy_from_slice(chunk);
        }
        Ok(())
    }

    /// Read a texture back into a pixel buffer
    pub fn read(&self, id: TextureId) -> Result<PixelBuffer, RenderError> {
        let texture = self
            .textures
            .get(id as u64)
            .ok_or(RenderError::UnknownTexture(id))?;

        let mut bytes = Vec::with_capacity(texture.byte_len());
        for &block in &texture.blocks {
            let data = self.pool.block(block)?;
            let take = (texture.byte_len() - bytes.len()).min(data.len());
            bytes.extend_from_slice(&data[..take]);
        }

        let pixels: &[Color] = bytemuck::try_cast_slice(&bytes)
            .map_err(|_| RenderError::InvalidTexture("corrupt texture storage"))?;
        let mut buffer = PixelBuffer::new(texture.width, texture.height);
        buffer.pixels_mut().copy_from_slice(pixels);
        Ok(buffer)
    }

    /// Composite a texture onto `target` with its top-left at (`x`, `y`)
    pub fn draw_texture(
        &self,
        id: TextureId,
        target: &mut PixelBuffer,
        x: i32,
        y: i32,
    ) -> Result<(), RenderError> {
        let pixels = self.read(id)?;
        target.blit(&pixels, x, y, 1.0);
        Ok(())
    }
}
