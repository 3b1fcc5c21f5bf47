//! Transition and animation systems
//!
//! Transitions are driven by elapsed time supplied by the caller. A
//! transition sampled at `t = 0` yields its start value and at `t >= d`
//! yields exactly its end value.

mod easing;
#[allow(clippy::module_inception)]
mod transition;

pub use easing::{ease_in_cubic, ease_in_out, ease_out_cubic, linear, Easing};
pub use transition::{Transition, TransitionKind, TransitionSample};

/// Default fade duration in seconds
pub const FADE_DURATION: f32 = 0.25;

/// Default slide and scale duration in seconds
pub const MOTION_DURATION: f32 = 0.35;
