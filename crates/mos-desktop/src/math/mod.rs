//! Core geometry and color types
//!
//! Positions are signed, sizes unsigned. Pixels are ARGB [`Color`] values.

mod color;
mod rect;

pub use color::Color;
pub use rect::{Point, Rect};
