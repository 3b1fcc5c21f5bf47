//! Frame pacing

use std::time::{Duration, Instant};

use crate::config::PacingConfig;

/// Turns wall-clock frame starts into clamped delta times.
///
/// A stall longer than `max_dt` is skipped: the next frame advances by
/// `max_dt` only, it does not replay the missed time.
#[derive(Clone, Debug)]
pub struct FramePacer {
    budget: Duration,
    max_dt: f32,
    last: Option<Instant>,
    frames: u64,
}

impl FramePacer {
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            budget: Duration::from_secs_f64(1.0 / config.target_fps.max(1) as f64),
            max_dt: config.max_dt.max(0.0),
            last: None,
            frames: 0,
        }
    }

    /// Time allotted to one frame
    pub fn frame_budget(&self) -> Duration {
        self.budget
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Delta time for a frame starting at `now`. The first frame gets one
    /// nominal frame budget.
    pub fn begin_frame(&mut self, now: Instant) -> f32 {
        let elapsed = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => self.budget,
        };
        self.last = Some(now);
        self.frames += 1;
        self.clamp(elapsed)
    }

    /// Clamp an elapsed duration to the frame step limit
    pub fn clamp(&self, elapsed: Duration) -> f32 {
        self.clamp_secs(elapsed.as_secs_f32())
    }

    /// Clamp a caller-supplied step in seconds to `[0, max_dt]`
    pub fn clamp_secs(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            0.0
        } else {
            dt.clamp(0.0, self.max_dt)
        }
    }

    /// How long to sleep after a frame that started at `started` to hold
    /// the target rate
    pub fn remaining(&self, started: Instant, now: Instant) -> Duration {
        self.budget
            .saturating_sub(now.saturating_duration_since(started))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacer() -> FramePacer {
        FramePacer::new(&PacingConfig {
            target_fps: 50,
            vsync: true,
            max_dt: 0.1,
        })
    }

    #[test]
    fn test_first_frame_uses_budget() {
        let mut pacer = pacer();
        assert_eq!(pacer.frame_budget(), Duration::from_millis(20));
        let dt = pacer.begin_frame(Instant::now());
        assert!((dt - 0.02).abs() < 1e-6);
        assert_eq!(pacer.frames(), 1);
    }

    #[test]
    fn test_measures_between_frames() {
        let mut pacer = pacer();
        let start = Instant::now();
        pacer.begin_frame(start);
        let dt = pacer.begin_frame(start + Duration::from_millis(30));
        assert!((dt - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut pacer = pacer();
        let start = Instant::now();
        pacer.begin_frame(start);
        let dt = pacer.begin_frame(start + Duration::from_secs(5));
        assert_eq!(dt, 0.1);
    }

    #[test]
    fn test_clamp_secs() {
        let pacer = pacer();
        assert_eq!(pacer.clamp_secs(-1.0), 0.0);
        assert_eq!(pacer.clamp_secs(f32::NAN), 0.0);
        assert_eq!(pacer.clamp_secs(f32::INFINITY), 0.1);
        assert_eq!(pacer.clamp_secs(0.05), 0.05);
    }

    #[test]
    fn test_remaining() {
        let pacer = pacer();
        let start = Instant::now();
        assert_eq!(
            pacer.remaining(start, start + Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert_eq!(
            pacer.remaining(start, start + Duration::from_millis(40)),
            Duration::ZERO
        );
    }
}
