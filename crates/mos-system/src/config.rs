//! System configuration
//!
//! One aggregate read once when the [`Desktop`](crate::Desktop) is built.
//! Every default comes from the compile-time constants of the kernel and
//! desktop crates.

use mos_desktop::config::{TARGET_FPS, VSYNC_ENABLED};
use mos_desktop::CompositorConfig;
use mos_kernel::KernelConfig;
use serde::{Deserialize, Serialize};

use crate::SystemError;

/// Largest frame step; longer gaps are skipped, not replayed
pub const MAX_FRAME_DT: f32 = 0.25;

/// Scheduler ticks driven by each event-loop iteration
pub const SCHEDULER_TICKS_PER_FRAME: u64 = 1;

/// Frame pacing parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    pub target_fps: u32,
    pub vsync: bool,
    /// Delta-time clamp in seconds
    pub max_dt: f32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            vsync: VSYNC_ENABLED,
            max_dt: MAX_FRAME_DT,
        }
    }
}

/// Everything the desktop context needs at startup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub kernel: KernelConfig,
    pub compositor: CompositorConfig,
    pub pacing: PacingConfig,
    #[serde(default = "default_ticks_per_frame")]
    pub ticks_per_frame: u64,
}

fn default_ticks_per_frame() -> u64 {
    SCHEDULER_TICKS_PER_FRAME
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            kernel: KernelConfig::default(),
            compositor: CompositorConfig::default(),
            pacing: PacingConfig::default(),
            ticks_per_frame: SCHEDULER_TICKS_PER_FRAME,
        }
    }
}

impl SystemConfig {
    /// Reject configurations any layer would refuse
    pub fn validate(&self) -> Result<(), SystemError> {
        self.kernel.validate()?;
        self.compositor.validate()?;
        if self.pacing.target_fps == 0 {
            return Err(SystemError::InvalidConfig("target_fps must be non-zero"));
        }
        if self.pacing.max_dt.is_nan() || self.pacing.max_dt <= 0.0 {
            return Err(SystemError::InvalidConfig("max_dt must be positive"));
        }
        Ok(())
    }
}
