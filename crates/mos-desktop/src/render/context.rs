//! Presentation target

use super::PixelBuffer;
use crate::math::Color;

/// The shared framebuffer every frame is composed into
#[derive(Debug)]
pub struct GraphicsContext {
    width: u32,
    height: u32,
    bits_per_pixel: u32,
    framebuffer: PixelBuffer,
    frames_presented: u64,
}

impl GraphicsContext {
    /// `graphics_init`: allocate a framebuffer cleared to the desktop color
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits_per_pixel: 32,
            framebuffer: PixelBuffer::filled(width, height, Color::DESKTOP),
            frames_presented: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    pub fn framebuffer(&self) -> &PixelBuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.framebuffer
    }

    /// `graphics_present`: publish the framebuffer, returning the frame number
    pub fn present(&mut self) -> u64 {
        self.frames_presented += 1;
        self.frames_presented
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_init_and_present() {
        let mut ctx = GraphicsContext::new(64, 48);
        assert_eq!(ctx.framebuffer().width(), 64);
        assert_eq!(ctx.bits_per_pixel(), 32);
        assert_eq!(ctx.framebuffer().get(10, 10), Some(Color::DESKTOP));
        assert_eq!(ctx.framebuffer().as_bytes().len(), 64 * 48 * 4);

        assert_eq!(ctx.present(), 1);
        assert_eq!(ctx.present(), 2);
        assert_eq!(ctx.frames_presented(), 2);
    }
}
