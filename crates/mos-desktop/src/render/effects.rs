//! Effect passes over pixel buffers
//!
//! Each pass works on a region and leaves pixels outside it untouched.

use super::PixelBuffer;
use crate::math::{Color, Rect};

/// Tint mixed into glass surfaces
const GLASS_TINT: f32 = 0.2;

impl PixelBuffer {
    /// Separable box blur of `radius` pixels inside `rect`
    pub fn apply_blur(&mut self, rect: Rect, radius: f32) {
        let r = radius.round() as i64;
        if r <= 0 {
            return;
        }
        let Some(clip) = rect.intersection(&self.bounds()) else {
            return;
        };
        let width = self.width() as usize;
        let (x0, y0) = (clip.x as usize, clip.y as usize);
        let (w, h) = (clip.width as usize, clip.height as usize);
        let r = (r as usize).min(w.max(h));

        let mut line = Vec::with_capacity(w.max(h));
        let mut out = Vec::with_capacity(w.max(h));

        // Horizontal pass
        for y in y0..y0 + h {
            let start = y * width + x0;
            line.clear();
            line.extend_from_slice(&self.pixels()[start..start + w]);
            blur_line(&line, &mut out, r);
            self.pixels_mut()[start..start + w].copy_from_slice(&out);
        }

        // Vertical pass
        for x in x0..x0 + w {
            line.clear();
            line.extend((y0..y0 + h).map(|y| self.pixels()[y * width + x]));
            blur_line(&line, &mut out, r);
            for (i, &pixel) in out.iter().enumerate() {
                self.pixels_mut()[(y0 + i) * width + x] = pixel;
            }
        }
    }

    /// Soft shadow cast by `rect`, fading out over `blur_radius` pixels
    pub fn apply_shadow(&mut self, rect: Rect, color: Color, blur_radius: f32) {
        let blur = blur_radius.max(0.0);
        let reach = rect.expand(blur.ceil() as i32);
        let Some(clip) = reach.intersection(&self.bounds()) else {
            return;
        };

        for y in clip.y..clip.bottom() {
            let dy = edge_distance(y, rect.y, rect.bottom());

            for x in clip.x..clip.right() {
                let dx = edge_distance(x, rect.x, rect.right());

                let distance = (dx * dx + dy * dy).sqrt();
                let falloff = if distance == 0.0 {
                    1.0
                } else if blur == 0.0 {
                    0.0
                } else {
                    (1.0 - distance / blur).clamp(0.0, 1.0)
                };
                if falloff > 0.0 {
                    self.blend(x, y, color.scale_alpha(falloff * falloff));
                }
            }
        }
    }

    /// Linear gradient from `start` to `end` across `rect`
    pub fn apply_gradient(&mut self, rect: Rect, start: Color, end: Color, horizontal: bool) {
        let Some(clip) = rect.intersection(&self.bounds()) else {
            return;
        };
        let span = if horizontal { rect.width } else { rect.height };
        let steps = span.saturating_sub(1).max(1) as f32;

        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                let along = if horizontal { x - rect.x } else { y - rect.y };
                let color = start.lerp(end, along as f32 / steps);
                self.blend(x, y, color);
            }
        }
    }

    /// Frosted glass: lighten toward white, then keep `transparency` of the alpha
    pub fn apply_glass(&mut self, rect: Rect, transparency: f32) {
        let Some(clip) = rect.intersection(&self.bounds()) else {
            return;
        };
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                if let Some(pixel) = self.get(x, y) {
                    let tinted = pixel.lerp(Color::WHITE.with_alpha(pixel.a), GLASS_TINT);
                    self.set(x, y, tinted.scale_alpha(transparency));
                }
            }
        }
    }

    /// Darken toward the edges of `rect`; the center is unchanged
    pub fn apply_vignette(&mut self, rect: Rect, intensity: f32) {
        let Some(clip) = rect.intersection(&self.bounds()) else {
            return;
        };
        let intensity = intensity.clamp(0.0, 1.0);
        let half_w = (rect.width as f32 / 2.0).max(1.0);
        let half_h = (rect.height as f32 / 2.0).max(1.0);
        let cx = rect.x as f32 + half_w;
        let cy = rect.y as f32 + half_h;

        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                let nx = (x as f32 + 0.5 - cx) / half_w;
                let ny = (y as f32 + 0.5 - cy) / half_h;
                let d2 = ((nx * nx + ny * ny) / 2.0).min(1.0);
                let factor = 1.0 - intensity * d2;
                if let Some(pixel) = self.get(x, y) {
                    let darken = |c: u8| (c as f32 * factor).round() as u8;
                    self.set(
                        x,
                        y,
                        Color::argb(pixel.a, darken(pixel.r), darken(pixel.g), darken(pixel.b)),
                    );
                }
            }
        }
    }
}

/// Pixels between `v` and the span `[start, end)`, zero inside it
#[inline]
fn edge_distance(v: i32, start: i32, end: i32) -> f32 {
    if v < start {
        (start as i64 - v as i64) as f32
    } else if v >= end {
        (v as i64 - end as i64 + 1) as f32
    } else {
        0.0
    }
}

/// Sliding-window box filter along one line, clamping at the ends
fn blur_line(line: &[Color], out: &mut Vec<Color>, r: usize) {
    out.clear();
    let n = line.len();
    if n == 0 {
        return;
    }
    let at = |i: isize| line[i.clamp(0, n as isize - 1) as usize];
    let window = (2 * r + 1) as u32;

    let mut sum = [0u32; 4];
    let add = |sum: &mut [u32; 4], c: Color, sign: i64| {
        for (s, v) in sum.iter_mut().zip([c.a, c.r, c.g, c.b]) {
            *s = (*s as i64 + sign * v as i64) as u32;
        }
    };

    for k in -(r as isize)..=(r as isize) {
        add(&mut sum, at(k), 1);
    }
    for i in 0..n as isize {
        out.push(Color::argb(
            (sum[0] / window) as u8,
            (sum[1] / window) as u8,
            (sum[2] / window) as u8,
            (sum[3] / window) as u8,
        ));
        add(&mut sum, at(i - r as isize), -1);
        add(&mut sum, at(i + r as isize + 1), 1);
    }
}
