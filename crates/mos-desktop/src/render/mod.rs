//! Render pipeline
//!
//! Everything is rasterized on CPU [`PixelBuffer`]s. The [`Compositor`]
//! consults the GPU device only to decide which effect passes may run.
//!
//! Per frame, for each visible window back to front:
//!
//! ```text
//! base draw ─▶ blur ─▶ shadow ─▶ glass ─▶ vignette ─▶ transition ─▶ blit
//! ```
//!
//! Particle systems render as an overlay after every window.

mod buffer;
mod compositor;
mod context;
mod effects;
mod particles;
mod texture;

pub use buffer::PixelBuffer;
pub use compositor::{Compositor, FrameReport};
pub use context::GraphicsContext;
pub use particles::{Particle, ParticleConfig, ParticleSystem};
pub use texture::{Texture, TextureId, TextureStore};

use mos_alloc::AllocError;
use mos_hal::{ErrorKind, HalError};

use crate::window::WindowId;

/// Rendering errors
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// The window has zero width or height
    #[error("window {0} has empty bounds")]
    EmptyBounds(WindowId),

    /// A window delegate failed to draw
    #[error("draw failed: {0}")]
    DrawFailed(String),

    /// No texture with this id
    #[error("texture {0} not found")]
    UnknownTexture(TextureId),

    /// Texture dimensions or pixel data rejected
    #[error("invalid texture: {0}")]
    InvalidTexture(&'static str),

    /// Texture table or texture pool exhausted
    #[error("texture memory: {0}")]
    TextureMemory(#[from] AllocError),

    /// Device failure
    #[error("device: {0}")]
    Device(#[from] HalError),

    /// Configuration rejected at startup
    #[error("invalid compositor configuration: {0}")]
    InvalidConfig(&'static str),
}

impl RenderError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::UnknownTexture(_) => ErrorKind::NotFound,
            RenderError::TextureMemory(e) => e.kind(),
            RenderError::Device(e) => e.kind(),
            RenderError::EmptyBounds(_)
            | RenderError::DrawFailed(_)
            | RenderError::InvalidTexture(_)
            | RenderError::InvalidConfig(_) => ErrorKind::InvalidState,
        }
    }
}
