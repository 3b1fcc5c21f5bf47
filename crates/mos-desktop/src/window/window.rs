//! Window struct and state

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{WindowDelegate, WindowId};
use crate::config::TITLE_BAR_HEIGHT;
use crate::math::{Color, Rect};

/// Window state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    /// Registered but never drawn
    Hidden,
    Minimized,
    #[default]
    Normal,
    Maximized,
    Fullscreen,
}

bitflags! {
    /// Window capability flags
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        const RESIZABLE = 1 << 0;
        const CLOSABLE = 1 << 1;
        const MINIMIZABLE = 1 << 2;
        const MAXIMIZABLE = 1 << 3;
        const TITLED = 1 << 4;
        const SHADOW = 1 << 5;

        /// Every decoration a regular document window has
        const STANDARD = Self::RESIZABLE.bits()
            | Self::CLOSABLE.bits()
            | Self::MINIMIZABLE.bits()
            | Self::MAXIMIZABLE.bits()
            | Self::TITLED.bits()
            | Self::SHADOW.bits();
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        WindowFlags::STANDARD
    }
}

/// Drop shadow parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowEffect {
    /// Light direction as a pixel offset of the shadow
    pub offset: (i32, i32),
    pub blur_radius: f32,
    /// Peak shadow opacity in [0, 1]
    pub intensity: f32,
}

impl ShadowEffect {
    pub fn with_blur(blur_radius: f32) -> Self {
        Self {
            offset: (0, 4),
            blur_radius,
            intensity: 0.35,
        }
    }
}

/// Frosted-glass parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlassEffect {
    /// Remaining opacity of the window content in [0, 1]
    pub transparency: f32,
    pub blur_radius: f32,
}

/// Per-window effect passes, applied in declaration order
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowEffects {
    /// Blur radius in pixels
    pub blur: Option<f32>,
    /// Overrides the default shadow of `SHADOW` windows
    pub shadow: Option<ShadowEffect>,
    pub glass: Option<GlassEffect>,
    /// Edge darkening strength in [0, 1]
    pub vignette: Option<f32>,
}

/// A window in the desktop environment
#[derive(Clone)]
pub struct Window {
    /// Unique identifier
    pub id: WindowId,
    pub title: String,
    /// Screen-space bounds including the title bar
    pub bounds: Rect,
    pub state: WindowState,
    pub flags: WindowFlags,
    pub focused: bool,
    pub background: Color,
    /// Owning process (if any)
    pub owner: Option<u64>,
    pub effects: WindowEffects,
    /// Bounds to return to when leaving Maximized or Fullscreen
    pub(crate) restore_bounds: Option<Rect>,
    /// Content provider, dropped with the window
    pub(crate) delegate: Option<Arc<dyn WindowDelegate>>,
}

impl Window {
    /// Whether the compositor draws this window
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.state != WindowState::Hidden
    }

    /// Whether the window is on screen and can be hit
    #[inline]
    pub fn is_interactive(&self) -> bool {
        !matches!(self.state, WindowState::Hidden | WindowState::Minimized)
    }

    /// Get the title bar rectangle (local coordinates)
    pub fn title_bar_rect(&self) -> Option<Rect> {
        if !self.flags.contains(WindowFlags::TITLED) {
            return None;
        }
        Some(Rect::from_size(
            self.bounds.width,
            TITLE_BAR_HEIGHT.min(self.bounds.height),
        ))
    }

    /// Get the content area rectangle (local coordinates, excludes title bar)
    pub fn content_rect(&self) -> Rect {
        let top = self.title_bar_rect().map_or(0, |r| r.height);
        Rect::new(
            0,
            top as i32,
            self.bounds.width,
            self.bounds.height.saturating_sub(top),
        )
    }

    /// Content provider, if one was attached at creation
    pub fn delegate(&self) -> Option<&Arc<dyn WindowDelegate>> {
        self.delegate.as_ref()
    }

    pub fn restore_bounds(&self) -> Option<Rect> {
        self.restore_bounds
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("bounds", &self.bounds)
            .field("state", &self.state)
            .field("flags", &self.flags)
            .field("focused", &self.focused)
            .field("owner", &self.owner)
            .field("delegate", &self.delegate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_window(flags: WindowFlags) -> Window {
        Window {
            id: 1,
            title: "Test".to_string(),
            bounds: Rect::new(100, 100, 800, 600),
            state: WindowState::Normal,
            flags,
            focused: false,
            background: Color::WINDOW,
            owner: None,
            effects: WindowEffects::default(),
            restore_bounds: None,
            delegate: None,
        }
    }

    #[test]
    fn test_window_content_rect() {
        let w = create_test_window(WindowFlags::STANDARD);
        assert_eq!(
            w.title_bar_rect(),
            Some(Rect::new(0, 0, 800, TITLE_BAR_HEIGHT))
        );
        assert_eq!(
            w.content_rect(),
            Rect::new(0, TITLE_BAR_HEIGHT as i32, 800, 600 - TITLE_BAR_HEIGHT)
        );
    }

    #[test]
    fn test_untitled_window_has_full_content() {
        let w = create_test_window(WindowFlags::RESIZABLE);
        assert_eq!(w.title_bar_rect(), None);
        assert_eq!(w.content_rect(), Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn test_flag_bits_match_abi() {
        assert_eq!(WindowFlags::RESIZABLE.bits(), 1);
        assert_eq!(WindowFlags::SHADOW.bits(), 32);
        assert_eq!(WindowFlags::STANDARD.bits(), 0b11_1111);
    }

    #[test]
    fn test_visibility() {
        let mut w = create_test_window(WindowFlags::STANDARD);
        assert!(w.is_visible() && w.is_interactive());
        w.state = WindowState::Minimized;
        assert!(w.is_visible() && !w.is_interactive());
        w.state = WindowState::Hidden;
        assert!(!w.is_visible());
    }
}
