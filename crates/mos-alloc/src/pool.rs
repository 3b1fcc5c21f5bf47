//! Fixed-block memory pool
//!
//! One bit per block: a block index is allocated iff its bit is set.
//! Allocation always returns the lowest free index, so handle sequences are
//! reproducible. A search hint keeps the bitmap scan amortized O(1).
//!
//! Backing storage grows on demand up to the highest block ever handed out,
//! so a large pool costs only its bitmap until it is actually used.

use alloc::vec;
use alloc::vec::Vec;

use crate::AllocError;

const WORD_BITS: usize = 64;

/// Handle to one allocated pool block
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockHandle(u32);

impl BlockHandle {
    /// Block index inside its pool
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Rebuild a handle from a raw index (no validation until used)
    #[inline]
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }
}

/// Block accounting for one pool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolUsage {
    /// Bytes per block
    pub block_size: usize,
    /// Blocks in the pool
    pub total_blocks: usize,
    /// Blocks currently allocated
    pub used_blocks: usize,
}

impl PoolUsage {
    pub fn total_bytes(&self) -> u64 {
        (self.block_size as u64) * (self.total_blocks as u64)
    }

    pub fn used_bytes(&self) -> u64 {
        (self.block_size as u64) * (self.used_blocks as u64)
    }

    pub fn free_bytes(&self) -> u64 {
        self.total_bytes() - self.used_bytes()
    }

    pub fn free_blocks(&self) -> usize {
        self.total_blocks - self.used_blocks
    }
}

/// Fixed-block memory pool
pub struct MemoryPool {
    block_size: usize,
    block_count: usize,
    bitmap: Vec<u64>,
    used: usize,
    /// Lowest bitmap word that may contain a clear bit
    search_hint: usize,
    storage: Vec<u8>,
}

impl MemoryPool {
    /// Create a pool of `block_count` blocks of `block_size` bytes each.
    ///
    /// # Returns
    /// * `Err(AllocError::InvalidLayout)` - zero block size, or the pool
    ///   would not be addressable
    pub fn new(block_size: usize, block_count: usize) -> Result<Self, AllocError> {
        if block_size == 0 {
            return Err(AllocError::InvalidLayout("block size must be non-zero"));
        }
        if block_count > u32::MAX as usize {
            return Err(AllocError::InvalidLayout("too many blocks"));
        }
        if block_size.checked_mul(block_count).is_none() {
            return Err(AllocError::InvalidLayout("pool size overflows"));
        }

        let words = block_count.div_ceil(WORD_BITS);
        Ok(Self {
            block_size,
            block_count,
            bitmap: vec![0; words],
            used: 0,
            search_hint: 0,
            storage: Vec::new(),
        })
    }

    /// Bytes per block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks in the pool
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Number of blocks currently allocated
    pub fn used_blocks(&self) -> usize {
        self.used
    }

    /// Allocate the lowest free block
    pub fn allocate(&mut self) -> Result<BlockHandle, AllocError> {
        if self.used == self.block_count {
            return Err(AllocError::OutOfBlocks);
        }

        for word_index in self.search_hint..self.bitmap.len() {
            let word = self.bitmap[word_index];
            if word == u64::MAX {
                continue;
            }

            let bit = (!word).trailing_zeros() as usize;
            let index = word_index * WORD_BITS + bit;
            if index >= self.block_count {
                break;
            }

            self.bitmap[word_index] |= 1 << bit;
            self.used += 1;
            self.search_hint = word_index;
            self.ensure_storage(index);
            return Ok(BlockHandle(index as u32));
        }

        Err(AllocError::OutOfBlocks)
    }

    /// Allocate `count` blocks, all or nothing
    pub fn allocate_many(&mut self, count: usize) -> Result<Vec<BlockHandle>, AllocError> {
        if self.block_count - self.used < count {
            return Err(AllocError::OutOfBlocks);
        }

        let mut handles = Vec::with_capacity(count);
        for _ in 0..count {
            handles.push(self.allocate()?);
        }
        Ok(handles)
    }

    /// Return a block to the pool. Its bytes are zeroed.
    pub fn free(&mut self, handle: BlockHandle) -> Result<(), AllocError> {
        let (word_index, mask) = self.locate(handle)?;
        if self.bitmap[word_index] & mask == 0 {
            return Err(AllocError::DoubleFreeOrInvalidHandle(handle));
        }

        self.bitmap[word_index] &= !mask;
        self.used -= 1;
        self.search_hint = self.search_hint.min(word_index);

        let start = handle.index() * self.block_size;
        if let Some(bytes) = self.storage.get_mut(start..start + self.block_size) {
            bytes.fill(0);
        }
        Ok(())
    }

    /// Whether the handle refers to an allocated block
    pub fn is_allocated(&self, handle: BlockHandle) -> bool {
        match self.locate(handle) {
            Ok((word_index, mask)) => self.bitmap[word_index] & mask != 0,
            Err(_) => false,
        }
    }

    /// Read access to an allocated block
    pub fn block(&self, handle: BlockHandle) -> Result<&[u8], AllocError> {
        if !self.is_allocated(handle) {
            return Err(AllocError::DoubleFreeOrInvalidHandle(handle));
        }
        let start = handle.index() * self.block_size;
        Ok(&self.storage[start..start + self.block_size])
    }

    /// Write access to an allocated block
    pub fn block_mut(&mut self, handle: BlockHandle) -> Result<&mut [u8], AllocError> {
        if !self.is_allocated(handle) {
            return Err(AllocError::DoubleFreeOrInvalidHandle(handle));
        }
        let start = handle.index() * self.block_size;
        Ok(&mut self.storage[start..start + self.block_size])
    }

    /// Iterate over allocated handles in index order
    pub fn allocated(&self) -> impl Iterator<Item = BlockHandle> + '_ {
        self.bitmap
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                (0..WORD_BITS)
                    .filter(move |bit| word & (1 << bit) != 0)
                    .map(move |bit| BlockHandle((word_index * WORD_BITS + bit) as u32))
            })
    }

    /// Current block accounting
    pub fn usage(&self) -> PoolUsage {
        PoolUsage {
            block_size: self.block_size,
            total_blocks: self.block_count,
            used_blocks: self.used,
        }
    }

    fn locate(&self, handle: BlockHandle) -> Result<(usize, u64), AllocError> {
        let index = handle.index();
        if index >= self.block_count {
            return Err(AllocError::DoubleFreeOrInvalidHandle(handle));
        }
        Ok((index / WORD_BITS, 1 << (index % WORD_BITS)))
    }

    fn ensure_storage(&mut self, index: usize) {
        let required = (index + 1) * self.block_size;
        if self.storage.len() < required {
            self.storage.resize(required, 0);
        }
    }
}
