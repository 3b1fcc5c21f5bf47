//! Window delegate (content provider callbacks)

use super::{Window, WindowId};
use crate::render::{PixelBuffer, RenderError};

/// Callbacks attached to a window at creation.
///
/// The window holds the delegate until it is destroyed; whatever state the
/// delegate captures is released then. All methods have no-op defaults.
pub trait WindowDelegate: Send + Sync {
    /// Draw the window content into `surface`, sized to the window bounds.
    ///
    /// Returning an error skips the window for this frame only.
    fn draw(&self, window: &Window, surface: &mut PixelBuffer) -> Result<(), RenderError> {
        let _ = (window, surface);
        Ok(())
    }

    /// The window bounds changed size
    fn resized(&self, id: WindowId, width: u32, height: u32) {
        let _ = (id, width, height);
    }

    /// The window was destroyed
    fn closed(&self, id: WindowId) {
        let _ = id;
    }
}
