//! Display and graphics configuration
//!
//! Compile-time constants, read once when the compositor and window manager
//! are created.

use serde::{Deserialize, Serialize};

use crate::render::RenderError;

// ============================================================================
// Display
// ============================================================================

pub const DISPLAY_WIDTH: u32 = 2560;
pub const DISPLAY_HEIGHT: u32 = 1600;
pub const DISPLAY_REFRESH_RATE: u32 = 60;
pub const DISPLAY_COLOR_DEPTH: u32 = 32;

// ============================================================================
// Shell chrome
// ============================================================================

/// Reserved at the bottom of the display; excluded from the work area
pub const DOCK_HEIGHT: u32 = 80;
/// Reserved at the top of the display; excluded from the work area
pub const MENUBAR_HEIGHT: u32 = 28;
pub const TITLE_BAR_HEIGHT: u32 = 22;

// ============================================================================
// Windows
// ============================================================================

pub const WINDOW_MIN_WIDTH: u32 = 200;
pub const WINDOW_MIN_HEIGHT: u32 = 150;
pub const WINDOW_SHADOW_BLUR: f32 = 15.0;
pub const WINDOW_CORNER_RADIUS: f32 = 10.0;
pub const MAX_WINDOWS: usize = 256;
/// Titles longer than this are truncated
pub const MAX_TITLE_LEN: usize = 511;

// ============================================================================
// Effects
// ============================================================================

pub const ENABLE_GPU_ACCELERATION: bool = true;
pub const ENABLE_BLUR_EFFECTS: bool = true;
pub const ENABLE_SHADOW_EFFECTS: bool = true;
pub const ENABLE_GLASS_MORPHISM: bool = true;
pub const ENABLE_PARTICLE_EFFECTS: bool = true;
pub const ENABLE_VIGNETTE: bool = true;

// ============================================================================
// Performance
// ============================================================================

pub const TARGET_FPS: u32 = 60;
pub const VSYNC_ENABLED: bool = true;

/// Texture memory managed by the texture pool (64 MB)
pub const TEXTURE_MEMORY_SIZE: usize = 64 * 1024 * 1024;
pub const TEXTURE_BLOCK_SIZE: usize = 4096;

/// Compositor configuration consumed at startup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositorConfig {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
    pub refresh_rate: u32,
    /// Request a GPU-capable device
    pub gpu_acceleration: bool,
    pub blur: bool,
    pub shadow: bool,
    pub glass: bool,
    pub particles: bool,
    pub vignette: bool,
    /// Default shadow blur radius for windows with the `SHADOW` flag
    pub shadow_blur: f32,
    pub corner_radius: f32,
    pub max_windows: usize,
    pub texture_memory: usize,
    pub texture_block_size: usize,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
            color_depth: DISPLAY_COLOR_DEPTH,
            refresh_rate: DISPLAY_REFRESH_RATE,
            gpu_acceleration: ENABLE_GPU_ACCELERATION,
            blur: ENABLE_BLUR_EFFECTS,
            shadow: ENABLE_SHADOW_EFFECTS,
            glass: ENABLE_GLASS_MORPHISM,
            particles: ENABLE_PARTICLE_EFFECTS,
            vignette: ENABLE_VIGNETTE,
            shadow_blur: WINDOW_SHADOW_BLUR,
            corner_radius: WINDOW_CORNER_RADIUS,
            max_windows: MAX_WINDOWS,
            texture_memory: TEXTURE_MEMORY_SIZE,
            texture_block_size: TEXTURE_BLOCK_SIZE,
        }
    }
}

impl CompositorConfig {
    /// Reject configurations the compositor cannot start with
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig("display must be non-empty"));
        }
        if self.color_depth != DISPLAY_COLOR_DEPTH {
            return Err(RenderError::InvalidConfig("only 32-bit color is supported"));
        }
        if self.max_windows == 0 {
            return Err(RenderError::InvalidConfig("max_windows must be non-zero"));
        }
        if self.texture_block_size == 0 || self.texture_memory < self.texture_block_size {
            return Err(RenderError::InvalidConfig(
                "texture memory must hold at least one block",
            ));
        }
        Ok(())
    }

    /// Number of blocks in the texture pool
    pub fn texture_blocks(&self) -> usize {
        if self.texture_block_size == 0 {
            0
        } else {
            self.texture_memory / self.texture_block_size
        }
    }
}
