//! Window configuration for creation

use std::sync::Arc;

use super::{WindowDelegate, WindowEffects, WindowFlags, WindowState};
use crate::math::{Color, Rect};

/// Configuration for creating a window
#[derive(Clone)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial screen bounds
    pub bounds: Rect,
    pub flags: WindowFlags,
    /// Initial state (`Hidden` windows are registered but not drawn)
    pub state: WindowState,
    pub background: Color,
    /// Associated process ID
    pub owner: Option<u64>,
    pub effects: WindowEffects,
    /// Content provider; released when the window is destroyed
    pub delegate: Option<Arc<dyn WindowDelegate>>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            bounds: Rect::new(100, 100, 800, 600),
            flags: WindowFlags::default(),
            state: WindowState::Normal,
            background: Color::WINDOW,
            owner: None,
            effects: WindowEffects::default(),
            delegate: None,
        }
    }
}
