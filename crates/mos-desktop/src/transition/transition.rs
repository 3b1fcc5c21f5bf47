//! Window transitions (fade, slide, scale)

use serde::{Deserialize, Serialize};

use super::{Easing, FADE_DURATION, MOTION_DURATION};

/// What a transition animates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Opacity in [0, 1]
    Fade { from: f32, to: f32 },
    /// Pixel offset from the window's bounds
    Slide { from: (f32, f32), to: (f32, f32) },
    /// Scale factor about the window center
    Scale { from: f32, to: f32 },
}

/// Visual parameters a transition contributes to one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSample {
    pub opacity: f32,
    pub offset: (f32, f32),
    pub scale: f32,
}

impl Default for TransitionSample {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            offset: (0.0, 0.0),
            scale: 1.0,
        }
    }
}

impl TransitionSample {
    /// Override the parameter `transition` animates with its current value
    pub fn with(mut self, transition: &Transition) -> Self {
        let current = transition.sample();
        match transition.kind {
            TransitionKind::Fade { .. } => self.opacity = current.opacity,
            TransitionKind::Slide { .. } => self.offset = current.offset,
            TransitionKind::Scale { .. } => self.scale = current.scale,
        }
        self
    }
}

/// Time-bounded animation of one window parameter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    /// Total duration in seconds
    pub duration: f32,
    /// Elapsed time in seconds (monotonic)
    pub elapsed: f32,
    pub easing: Easing,
}

impl Transition {
    pub fn new(kind: TransitionKind, duration: f32, easing: Easing) -> Self {
        Self {
            kind,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    /// Fade from transparent to opaque
    pub fn fade_in() -> Self {
        Self::new(
            TransitionKind::Fade { from: 0.0, to: 1.0 },
            FADE_DURATION,
            Easing::EaseOut,
        )
    }

    /// Fade from opaque to transparent
    pub fn fade_out() -> Self {
        Self::new(
            TransitionKind::Fade { from: 1.0, to: 0.0 },
            FADE_DURATION,
            Easing::EaseIn,
        )
    }

    /// Slide in from an offset
    pub fn slide_in(dx: f32, dy: f32) -> Self {
        Self::new(
            TransitionKind::Slide {
                from: (dx, dy),
                to: (0.0, 0.0),
            },
            MOTION_DURATION,
            Easing::EaseOut,
        )
    }

    /// Grow from `from` to full size
    pub fn scale_in(from: f32) -> Self {
        Self::new(
            TransitionKind::Scale { from, to: 1.0 },
            MOTION_DURATION,
            Easing::EaseInOut,
        )
    }

    /// Advance by `dt` seconds. Negative deltas are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed += dt;
        }
    }

    /// Get the progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Check if transition is complete
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Eased progress, pinned to exactly 1.0 once complete
    pub fn eased_progress(&self) -> f32 {
        if self.is_complete() {
            1.0
        } else {
            self.easing.apply(self.progress())
        }
    }

    /// Current visual parameters
    pub fn sample(&self) -> TransitionSample {
        let t = self.eased_progress();
        let complete = self.is_complete();
        let lerp = |from: f32, to: f32| if complete { to } else { from + (to - from) * t };

        let mut sample = TransitionSample::default();
        match self.kind {
            TransitionKind::Fade { from, to } => {
                sample.opacity = lerp(from, to).clamp(0.0, 1.0);
            }
            TransitionKind::Slide { from, to } => {
                sample.offset = (lerp(from.0, to.0), lerp(from.1, to.1));
            }
            TransitionKind::Scale { from, to } => {
                sample.scale = lerp(from, to).max(0.0);
            }
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fade(duration: f32) -> Transition {
        Transition::new(
            TransitionKind::Fade { from: 0.2, to: 0.9 },
            duration,
            Easing::Linear,
        )
    }

    #[test]
    fn test_fade_boundaries() {
        let mut t = fade(1.0);
        assert_eq!(t.sample().opacity, 0.2);
        assert!(!t.is_complete());

        t.advance(0.5);
        assert!((t.sample().opacity - 0.55).abs() < 0.001);

        t.advance(0.5);
        assert!(t.is_complete());
        assert_eq!(t.sample().opacity, 0.9);

        // Past the end stays exactly at the end value
        t.advance(10.0);
        assert_eq!(t.sample().opacity, 0.9);
    }

    #[test]
    fn test_end_value_exact_with_easing() {
        for easing in [Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            let mut t = Transition::new(
                TransitionKind::Scale { from: 0.3, to: 0.7 },
                0.3,
                easing,
            );
            assert_eq!(t.sample().scale, 0.3);
            for _ in 0..20 {
                t.advance(1.0 / 60.0);
            }
            assert!(t.is_complete());
            assert_eq!(t.sample().scale, 0.7);
        }
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let t = fade(0.0);
        assert!(t.is_complete());
        assert_eq!(t.sample().opacity, 0.9);
    }

    #[test]
    fn test_slide_offsets() {
        let mut t = Transition::slide_in(100.0, -40.0);
        assert_eq!(t.sample().offset, (100.0, -40.0));
        t.advance(t.duration);
        assert_eq!(t.sample().offset, (0.0, 0.0));
        assert_eq!(t.sample().opacity, 1.0);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut t = fade(1.0);
        t.advance(-5.0);
        assert_eq!(t.elapsed, 0.0);
    }

    #[test]
    fn test_transition_json_round_trip() {
        let t = Transition::scale_in(0.8);
        let json = serde_json::to_string(&t).unwrap();
        let restored: Transition = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, t);
    }
}
