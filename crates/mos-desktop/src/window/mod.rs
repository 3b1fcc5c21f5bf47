//! Window management module
//!
//! Provides window lifecycle, focus management, z-order and hit testing.

mod config;
mod delegate;
mod manager;
#[allow(clippy::module_inception)]
mod window;

pub use config::WindowConfig;
pub use delegate::WindowDelegate;
pub use manager::WindowManager;
pub use window::{GlassEffect, ShadowEffect, Window, WindowEffects, WindowFlags, WindowState};

use mos_hal::ErrorKind;

/// Unique window identifier
pub type WindowId = u64;

/// Window registry errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    /// The manager already holds `max` windows
    #[error("window table full ({max} windows)")]
    WindowTableFull { max: usize },

    /// The window is not registered with this manager
    #[error("unknown window {0}")]
    UnknownWindow(WindowId),

    /// Resize requested on a window without the `RESIZABLE` flag
    #[error("window {0} is not resizable")]
    NotResizable(WindowId),

    /// Minimize requested on a window without the `MINIMIZABLE` flag
    #[error("window {0} is not minimizable")]
    NotMinimizable(WindowId),

    /// Maximize requested on a window without the `MAXIMIZABLE` flag
    #[error("window {0} is not maximizable")]
    NotMaximizable(WindowId),
}

impl WindowError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WindowError::WindowTableFull { .. } => ErrorKind::ResourceExhausted,
            WindowError::UnknownWindow(_) => ErrorKind::NotFound,
            WindowError::NotResizable(_)
            | WindowError::NotMinimizable(_)
            | WindowError::NotMaximizable(_) => ErrorKind::InvalidState,
        }
    }
}
