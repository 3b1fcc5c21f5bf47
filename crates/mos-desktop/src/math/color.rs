//! ARGB color

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 32-bit ARGB pixel, laid out as it sits in the framebuffer
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::argb(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Window background default (light gray)
    pub const WINDOW: Color = Color::rgb(236, 236, 236);
    /// Title bar of the focused window
    pub const TITLE_ACTIVE: Color = Color::rgb(214, 214, 214);
    /// Title bar of unfocused windows
    pub const TITLE_INACTIVE: Color = Color::rgb(232, 232, 232);
    pub const CLOSE: Color = Color::rgb(255, 95, 86);
    pub const MINIMIZE: Color = Color::rgb(255, 189, 46);
    pub const MAXIMIZE: Color = Color::rgb(39, 201, 63);
    /// Desktop wallpaper fallback
    pub const DESKTOP: Color = Color::rgb(30, 60, 114);

    #[inline]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Multiply alpha by `factor` in [0, 1]
    #[inline]
    pub fn scale_alpha(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(a)
    }

    /// Channel-wise linear interpolation
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::argb(
            mix(self.a, other.a),
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    /// Source-over compositing of `self` onto `dst`
    pub fn over(self, dst: Color) -> Color {
        match self.a {
            255 => self,
            0 => dst,
            _ => {
                let sa = self.a as u32;
                let da = dst.a as u32;
                // out_a = sa + da * (1 - sa), all in 0..=255 fixed point
                let out_a = sa + da * (255 - sa) / 255;
                if out_a == 0 {
                    return Color::TRANSPARENT;
                }
                let channel = |s: u8, d: u8| {
                    let s = s as u32 * sa;
                    let d = d as u32 * da * (255 - sa) / 255;
                    ((s + d) / out_a) as u8
                };
                Color::argb(
                    out_a as u8,
                    channel(self.r, dst.r),
                    channel(self.g, dst.g),
                    channel(self.b, dst.b),
                )
            }
        }
    }

    /// Packed `0xAARRGGBB`
    #[inline]
    pub const fn to_u32(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Self::argb(
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_layout() {
        let pixels = [Color::argb(1, 2, 3, 4), Color::argb(5, 6, 7, 8)];
        let bytes: &[u8] = bytemuck::cast_slice(&pixels);
        assert_eq!(bytes, &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_over_opaque_and_transparent() {
        let dst = Color::rgb(10, 20, 30);
        assert_eq!(Color::WHITE.over(dst), Color::WHITE);
        assert_eq!(Color::TRANSPARENT.over(dst), dst);
    }

    #[test]
    fn test_over_half_alpha() {
        let src = Color::argb(128, 255, 255, 255);
        let out = src.over(Color::BLACK);
        assert_eq!(out.a, 255);
        assert!((out.r as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::rgb(100, 50, 25));
    }

    #[test]
    fn test_packed_round_trip() {
        let c = Color::argb(0xAA, 0xBB, 0xCC, 0xDD);
        assert_eq!(c.to_u32(), 0xAABBCCDD);
        assert_eq!(Color::from_u32(0xAABBCCDD), c);
    }
}
