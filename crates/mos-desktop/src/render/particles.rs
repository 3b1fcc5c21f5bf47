//! Particle overlays
//!
//! A [`ParticleSystem`] emits particles from a point at a fixed rate for a
//! bounded time, integrates them under gravity and fades them out as their
//! life runs down. Emission is driven by a seeded xorshift generator, so the
//! same config and the same sequence of `update` steps always produce the same
//! particles.

use serde::{Deserialize, Serialize};

use super::PixelBuffer;
use crate::math::{Color, Point};

// ============================================================================
// Config
// ============================================================================

/// Emitter parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Emission point in screen space
    pub origin: Point,
    /// Particles emitted per second
    pub rate: f32,
    /// Live particle cap
    pub max_particles: usize,
    /// Seconds each particle lives
    pub lifetime: f32,
    /// Seconds the emitter stays active
    pub emit_duration: f32,
    /// Initial speed in pixels per second
    pub speed: f32,
    /// Downward acceleration in pixels per second squared
    pub gravity: f32,
    pub color: Color,
    pub size: u32,
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            origin: Point::new(0, 0),
            rate: 120.0,
            max_particles: 512,
            lifetime: 1.0,
            emit_duration: 0.5,
            speed: 180.0,
            gravity: 240.0,
            color: Color::WHITE,
            size: 2,
            seed: 0x9E37_79B9_7F4A_7C15,
        }
    }
}

// ============================================================================
// Particles
// ============================================================================

/// One live particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    /// Seconds left to live
    pub life: f32,
    pub max_life: f32,
}

impl Particle {
    /// Remaining life in [0, 1]; drives the fade
    #[inline]
    pub fn life_fraction(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Emitter plus its live particles
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    config: ParticleConfig,
    particles: Vec<Particle>,
    elapsed: f32,
    /// Fractional particles owed from previous steps
    pending: f32,
    rng: u64,
}

impl ParticleSystem {
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            particles: Vec::with_capacity(config.max_particles.min(1024)),
            elapsed: 0.0,
            pending: 0.0,
            // xorshift never leaves the zero state
            rng: config.seed.max(1),
            config,
        }
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Emission has stopped and every particle has died
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.config.emit_duration && self.particles.is_empty()
    }

    /// Advance the simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);

        for p in &mut self.particles {
            p.velocity[1] += self.config.gravity * dt;
            p.position[0] += p.velocity[0] * dt;
            p.position[1] += p.velocity[1] * dt;
            p.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);

        let emit_window = (self.config.emit_duration - self.elapsed).clamp(0.0, dt);
        self.elapsed += dt;
        self.pending += self.config.rate.max(0.0) * emit_window;

        while self.pending >= 1.0 {
            self.pending -= 1.0;
            if self.particles.len() >= self.config.max_particles {
                continue;
            }
            let particle = self.spawn();
            self.particles.push(particle);
        }
    }

    /// Draw every particle onto `target`, faded by remaining life
    pub fn render(&self, target: &mut PixelBuffer) {
        for p in &self.particles {
            let color = self.config.color.scale_alpha(p.life_fraction());
            let (x, y) = (p.position[0].round() as i32, p.position[1].round() as i32);
            if self.config.size <= 1 {
                target.blend(x, y, color);
            } else {
                target.draw_circle(x, y, self.config.size / 2, color);
            }
        }
    }

    fn spawn(&mut self) -> Particle {
        let angle = self.next_unit() * core::f32::consts::TAU;
        let speed = self.config.speed * (0.5 + 0.5 * self.next_unit());
        Particle {
            position: [self.config.origin.x as f32, self.config.origin.y as f32],
            velocity: [angle.cos() * speed, angle.sin() * speed],
            life: self.config.lifetime,
            max_life: self.config.lifetime,
        }
    }

    /// Uniform value in [0, 1)
    fn next_unit(&mut self) -> f32 {
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 7;
        self.rng ^= self.rng << 17;
        (self.rng >> 40) as f32 / (1u64 << 24) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ParticleConfig {
        ParticleConfig {
            origin: Point::new(50, 50),
            rate: 100.0,
            max_particles: 1000,
            lifetime: 0.5,
            emit_duration: 0.2,
            ..Default::default()
        }
    }

    #[test]
    fn test_emission_rate() {
        let mut system = ParticleSystem::new(config());
        system.update(0.1);
        assert_eq!(system.len(), 10);
    }

    #[test]
    fn test_emission_stops_and_particles_die() {
        let mut system = ParticleSystem::new(config());
        for _ in 0..4 {
            system.update(0.1);
        }
        // Emitted 20 in the first 0.2s, nothing after
        assert_eq!(system.len(), 20);
        assert!(!system.is_finished());

        for _ in 0..10 {
            system.update(0.1);
        }
        assert!(system.is_empty());
        assert!(system.is_finished());
    }

    #[test]
    fn test_max_particles_cap() {
        let mut system = ParticleSystem::new(ParticleConfig {
            max_particles: 5,
            ..config()
        });
        system.update(0.1);
        assert_eq!(system.len(), 5);
    }

    #[test]
    fn test_deterministic() {
        let mut a = ParticleSystem::new(config());
        let mut b = ParticleSystem::new(config());
        for _ in 0..3 {
            a.update(0.05);
            b.update(0.05);
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_render_draws_near_origin() {
        let mut system = ParticleSystem::new(ParticleConfig {
            size: 1,
            rate: 128.0,
            ..config()
        });
        system.update(1.0 / 128.0);
        assert_eq!(system.len(), 1);

        let mut target = PixelBuffer::new(100, 100);
        system.render(&mut target);
        let lit = target.pixels().iter().filter(|p| p.a > 0).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_render_oversized_particles() {
        let mut system = ParticleSystem::new(ParticleConfig {
            size: u32::MAX,
            rate: 128.0,
            ..config()
        });
        system.update(1.0 / 128.0);

        let mut target = PixelBuffer::new(100, 100);
        system.render(&mut target);
        // One particle covers the whole buffer
        assert!(target.pixels().iter().all(|p| p.a > 0));
    }
}
