//! Ambient falling sparkles
//!
//! A fixed pool of points that drift down through the scene and respawn
//! at the top when they fall out the bottom. The pool never grows or
//! shrinks; activity only changes the overall opacity and whether the
//! points move.

use glam::Vec3;
use rand::Rng;

use super::easing::{damp, random_between, sanitize_delta};
use super::palette::{Rgb, sparkle_color};
use crate::config::SparkleConfig;

/// One sparkle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparkleParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Rgb,
}

/// The sparkle pool and its fade state
#[derive(Debug, Clone)]
pub struct SparkleField {
    config: SparkleConfig,
    particles: Vec<SparkleParticle>,
    opacity: f32,
}

impl SparkleField {
    /// Scatter the pool across the configured volume
    pub fn new<R: Rng + ?Sized>(config: SparkleConfig, rng: &mut R) -> Self {
        let particles = (0..config.count)
            .map(|_| {
                let position = Vec3::new(
                    random_between(rng, -config.half_width, config.half_width),
                    random_between(rng, config.bottom, config.top),
                    random_between(rng, -config.half_depth, config.half_depth),
                );
                SparkleParticle {
                    position,
                    velocity: random_velocity(&config, rng),
                    color: sparkle_color(rng),
                }
            })
            .collect();

        Self {
            config,
            particles,
            opacity: 0.0,
        }
    }

    pub fn particles(&self) -> &[SparkleParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Layer opacity applied to every point
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn config(&self) -> &SparkleConfig {
        &self.config
    }

    /// Advance one frame.
    ///
    /// `time` is the clock's elapsed time; it keys the sway so drift looks
    /// irregular without per-particle phase state.
    pub fn tick<R: Rng + ?Sized>(&mut self, delta: f32, is_active: bool, time: f32, rng: &mut R) {
        let dt = sanitize_delta(delta, self.config.max_delta);
        if dt == 0.0 {
            return;
        }

        let (target, rate) = if is_active {
            (self.config.target_opacity, self.config.fade_in_rate)
        } else {
            (0.0, self.config.fade_out_rate)
        };
        self.opacity = damp(self.opacity, target, rate, dt);

        if !is_active {
            return;
        }

        let time = if time.is_finite() { time } else { 0.0 };
        let amp = self.config.sway_amplitude;
        let freq = self.config.sway_frequency;

        for (i, p) in self.particles.iter_mut().enumerate() {
            let phase = i as f32;
            p.position += p.velocity * dt;
            p.position.x += (time * freq + phase * 0.37).sin() * amp * dt;
            p.position.z += (time * freq * 0.8 + phase * 0.53).cos() * amp * dt;

            if p.position.y < self.config.bottom {
                p.position = Vec3::new(
                    random_between(rng, -self.config.half_width, self.config.half_width),
                    self.config.top + random_between(rng, 0.0, self.config.respawn_band),
                    random_between(rng, -self.config.half_depth, self.config.half_depth),
                );
                p.velocity = random_velocity(&self.config, rng);
            }
        }
    }
}

fn random_velocity<R: Rng + ?Sized>(config: &SparkleConfig, rng: &mut R) -> Vec3 {
    Vec3::new(
        random_between(rng, -config.drift, config.drift),
        -random_between(rng, config.fall_speed_min, config.fall_speed_max),
        random_between(rng, -config.drift, config.drift),
    )
}
