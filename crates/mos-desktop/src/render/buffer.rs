//! CPU pixel buffer and drawing primitives
//!
//! Every primitive clips to the buffer and composites with source-over, so
//! callers never need to pre-clip coordinates.

use crate::math::{Color, Point, Rect};

/// Row-major ARGB pixel buffer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Create a transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Raw framebuffer bytes (A, R, G, B per pixel)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }

    /// Pixel at a position, `None` outside the buffer
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrite a pixel (no blending)
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Composite a pixel with source-over
    #[inline]
    pub fn blend(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.over(self.pixels[i]);
        }
    }

    /// Fill the whole buffer, replacing every pixel
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Replace the pixels of one region
    pub fn clear_rect(&mut self, rect: Rect, color: Color) {
        let Some(clip) = rect.intersection(&self.bounds()) else {
            return;
        };
        for y in clip.y..clip.bottom() {
            let start = y as usize * self.width as usize + clip.x as usize;
            self.pixels[start..start + clip.width as usize].fill(color);
        }
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        if color.a == 255 {
            self.clear_rect(rect, color);
            return;
        }
        let Some(clip) = rect.intersection(&self.bounds()) else {
            return;
        };
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                self.blend(x, y, color);
            }
        }
    }

    /// Filled rectangle with circular corners of `radius`
    pub fn draw_rounded_rect(&mut self, rect: Rect, radius: u32, color: Color) {
        let radius = radius.min(rect.width / 2).min(rect.height / 2) as i32;
        if radius == 0 {
            self.draw_rect(rect, color);
            return;
        }
        let Some(clip) = rect.intersection(&self.bounds()) else {
            return;
        };

        let r2 = radius * radius;
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                // Distance from the nearest corner center, if in a corner square
                let cx = if x < rect.x + radius {
                    rect.x + radius - x
                } else if x >= rect.right() - radius {
                    x - (rect.right() - radius - 1)
                } else {
                    0
                };
                let cy = if y < rect.y + radius {
                    rect.y + radius - y
                } else if y >= rect.bottom() - radius {
                    y - (rect.bottom() - radius - 1)
                } else {
                    0
                };
                if cx > 0 && cy > 0 && (cx - 1) * (cx - 1) + (cy - 1) * (cy - 1) > r2 {
                    continue;
                }
                self.blend(x, y, color);
            }
        }
    }

    /// Rectangle border of `thickness` pixels drawn inside `rect`
    pub fn draw_rect_outline(&mut self, rect: Rect, thickness: u32, color: Color) {
        if thickness == 0 || rect.is_empty() {
            return;
        }
        let t = thickness.min(rect.width / 2 + 1).min(rect.height / 2 + 1);
        let inner_height = rect.height.saturating_sub(2 * t);
        self.draw_rect(Rect::new(rect.x, rect.y, rect.width, t), color);
        self.draw_rect(
            Rect::new(rect.x, rect.bottom() - t as i32, rect.width, t),
            color,
        );
        self.draw_rect(Rect::new(rect.x, rect.y + t as i32, t, inner_height), color);
        self.draw_rect(
            Rect::new(rect.right() - t as i32, rect.y + t as i32, t, inner_height),
            color,
        );
    }

    /// Filled circle centered at (`cx`, `cy`)
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: u32, color: Color) {
        let (cx, cy, r) = (cx as i64, cy as i64, radius as i64);
        let r2 = (r as i128).pow(2);
        // Only rows and columns inside the buffer are visited
        let (w, h) = (self.width as i64, self.height as i64);
        let (x0, x1) = ((cx - r).max(0), (cx + r).min(w - 1));
        let (y0, y1) = ((cy - r).max(0), (cy + r).min(h - 1));
        for y in y0..=y1 {
            let dy = (y - cy) as i128;
            for x in x0..=x1 {
                let dx = (x - cx) as i128;
                if dx * dx + dy * dy <= r2 {
                    self.blend(x as i32, y as i32, color);
                }
            }
        }
    }

    /// One-pixel line (Bresenham), both endpoints inclusive
    pub fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        let (mut x, mut y) = (from.x, from.y);
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.blend(x, y, color);
            if x == to.x && y == to.y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Composite `src` with its top-left at (`x`, `y`), scaling alpha by `opacity`
    pub fn blit(&mut self, src: &PixelBuffer, x: i32, y: i32, opacity: f32) {
        self.blit_scaled(src, Rect::new(x, y, src.width, src.height), opacity);
    }

    /// Composite `src` stretched into `dest` (nearest neighbor)
    pub fn blit_scaled(&mut self, src: &PixelBuffer, dest: Rect, opacity: f32) {
        if dest.is_empty() || src.width == 0 || src.height == 0 || opacity <= 0.0 {
            return;
        }
        let Some(clip) = dest.intersection(&self.bounds()) else {
            return;
        };

        let full = opacity >= 1.0;
        for y in clip.y..clip.bottom() {
            let sy = ((y as i64 - dest.y as i64) as u64 * src.height as u64 / dest.height as u64) as i32;
            for x in clip.x..clip.right() {
                let sx = ((x as i64 - dest.x as i64) as u64 * src.width as u64 / dest.width as u64) as i32;
                if let Some(pixel) = src.get(sx, sy) {
                    let pixel = if full { pixel } else { pixel.scale_alpha(opacity) };
                    self.blend(x, y, pixel);
                }
            }
        }
    }
}
