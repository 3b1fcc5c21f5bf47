//! Axis-aligned rectangle type

use serde::{Deserialize, Serialize};

/// Integer point in screen space
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle (signed position, unsigned size)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Zero rectangle at origin
    pub const ZERO: Rect = Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Create a new rectangle
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Get position (top-left corner)
    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the right edge (exclusive)
    #[inline]
    pub fn right(&self) -> i32 {
        clamp_i32(self.x as i64 + self.width as i64)
    }

    /// Get the bottom edge (exclusive)
    #[inline]
    pub fn bottom(&self) -> i32 {
        clamp_i32(self.y as i64 + self.height as i64)
    }

    /// Get the center point
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add((self.width / 2) as i32),
            self.y.saturating_add((self.height / 2) as i32),
        )
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if a point is inside the rectangle
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Check if two rectangles intersect
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Get intersection of two rectangles (if any)
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Some(Rect::new(x, y, (right - x) as u32, (bottom - y) as u32))
    }

    /// Expand rectangle by amount on all sides (negative shrinks, clamped at zero size)
    pub fn expand(&self, amount: i32) -> Rect {
        let width = (self.width as i64 + 2 * amount as i64).max(0) as u32;
        let height = (self.height as i64 + 2 * amount as i64).max(0) as u32;
        Rect::new(
            self.x.saturating_sub(amount),
            self.y.saturating_sub(amount),
            width,
            height,
        )
    }

    /// Translate rectangle by offset, saturating at the coordinate range
    #[inline]
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Same origin, new size
    #[inline]
    pub fn with_size(&self, width: u32, height: u32) -> Rect {
        Rect::new(self.x, self.y, width, height)
    }

    /// Scale about the center
    pub fn scale_about_center(&self, factor: f32) -> Rect {
        let factor = factor.max(0.0);
        let width = (self.width as f32 * factor).round() as u32;
        let height = (self.height as f32 * factor).round() as u32;
        let cx = self.x as f32 + self.width as f32 / 2.0;
        let cy = self.y as f32 + self.height as f32 / 2.0;
        Rect::new(
            (cx - width as f32 / 2.0).round() as i32,
            (cy - height as f32 / 2.0).round() as i32,
            width,
            height,
        )
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
