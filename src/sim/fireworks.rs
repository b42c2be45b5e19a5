//! Firework shells
//!
//! A fixed pool of shells, each owning a contiguous slice of burst and
//! trail particles. A shell rises from below the scene trailing sparks,
//! bursts at its apex into a sphere of sparks that drag, fall and fade,
//! then returns to the pool once every spark has burned out.
//!
//! Shell *s* owns bursts `[s·P, (s+1)·P)` and trails `[s·T, (s+1)·T)`.
//! Nothing is allocated after construction; dead sparks are parked
//! off-screen with zero size.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;
use std::ops::Range;

use super::easing::{damp, random_between, sanitize_delta};
use super::palette::{ColorSet, FIREWORK_PALETTES, Rgb, TRAIL_TINT, random_palette};
use crate::config::FireworkConfig;

/// Where hidden particles are parked
pub const HIDDEN_POSITION: Vec3 = Vec3::new(0.0, -1000.0, 0.0);

/// Shell life-cycle phase (only meaningful while the shell is active)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellPhase {
    Rising,
    Bursting,
}

/// One firework launch unit
#[derive(Debug, Clone)]
pub struct Shell {
    pub active: bool,
    pub phase: ShellPhase,
    pub x: f32,
    pub z: f32,
    pub rise_y: f32,
    pub rise_velocity: f32,
    pub target_y: f32,
    /// Seconds since the burst
    pub burst_age: f32,
    pub palette: &'static ColorSet,
}

impl Shell {
    fn idle() -> Self {
        Self {
            active: false,
            phase: ShellPhase::Rising,
            x: 0.0,
            z: 0.0,
            rise_y: 0.0,
            rise_velocity: 0.0,
            target_y: 0.0,
            burst_age: 0.0,
            palette: &FIREWORK_PALETTES[0],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.rise_y, self.z)
    }

    pub fn is_rising(&self) -> bool {
        self.active && self.phase == ShellPhase::Rising
    }

    pub fn is_bursting(&self) -> bool {
        self.active && self.phase == ShellPhase::Bursting
    }

    fn launch<R: Rng + ?Sized>(&mut self, config: &FireworkConfig, rng: &mut R) {
        self.active = true;
        self.phase = ShellPhase::Rising;
        self.x = -config.depth_offset + random_between(rng, -config.depth_jitter, config.depth_jitter);
        self.z = random_between(rng, -config.lateral_spread, config.lateral_spread);
        self.rise_y = config.launch_height;
        self.rise_velocity = random_between(rng, config.rise_speed_min, config.rise_speed_max);
        self.target_y = random_between(rng, config.apex_min, config.apex_max);
        self.burst_age = 0.0;
        self.palette = random_palette(rng);
    }

    /// Lay the trail along the rise path and climb. Returns true at the apex.
    fn rise(&mut self, dt: f32, trails: &mut [TrailParticle], config: &FireworkConfig) -> bool {
        let count = trails.len() as f32;
        for (i, trail) in trails.iter_mut().enumerate() {
            let brightness = 1.0 - i as f32 / count;
            trail.position = Vec3::new(self.x, self.rise_y - i as f32 * config.trail_spacing, self.z);
            trail.color = TRAIL_TINT.scale(brightness);
            trail.size = config.trail_size * brightness;
        }
        self.rise_y += self.rise_velocity * dt;
        self.rise_y >= self.target_y
    }

    /// Switch to bursting: fill the burst slice with fresh sparks
    fn burst<R: Rng + ?Sized>(
        &mut self,
        bursts: &mut [BurstParticle],
        trails: &mut [TrailParticle],
        config: &FireworkConfig,
        rng: &mut R,
    ) {
        let origin = self.position();
        for spark in bursts.iter_mut() {
            let speed = random_between(rng, config.burst_speed_min, config.burst_speed_max);
            let size = random_between(rng, config.size_min, config.size_max);
            *spark = BurstParticle {
                position: origin,
                velocity: sphere_direction(rng) * speed,
                color: self.palette.colors[0],
                size,
                base_size: size,
                age: 0.0,
                lifetime: random_between(rng, config.lifetime_min, config.lifetime_max),
            };
        }
        for trail in trails.iter_mut() {
            trail.hide();
        }
        self.phase = ShellPhase::Bursting;
        self.burst_age = 0.0;
    }

    /// Integrate live sparks. Returns true while any spark is still alive.
    fn step_burst<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        bursts: &mut [BurstParticle],
        config: &FireworkConfig,
        rng: &mut R,
    ) -> bool {
        self.burst_age += dt;
        let drag = config.drag.powf(dt * 60.0);
        let mut alive = false;

        for spark in bursts.iter_mut() {
            if spark.is_expired() {
                continue;
            }
            spark.age += dt;
            if spark.is_expired() {
                spark.hide();
                continue;
            }

            spark.velocity *= drag;
            spark.velocity.y += config.gravity * dt;
            spark.position += spark.velocity * dt;

            let t = if spark.lifetime > 0.0 {
                spark.age / spark.lifetime
            } else {
                1.0
            };
            let fade = (1.0 - t * t).max(0.0);
            let flicker = random_between(rng, config.flicker_min, 1.0);
            spark.color = self.palette.sample(t).scale(fade * flicker);
            spark.size = spark.base_size * fade * flicker;
            alive = true;
        }

        alive
    }
}

/// A spark from a shell burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Display color (already faded)
    pub color: Rgb,
    /// Display size (already faded)
    pub size: f32,
    pub base_size: f32,
    pub age: f32,
    pub lifetime: f32,
}

impl BurstParticle {
    /// A parked, already-expired spark
    pub const HIDDEN: BurstParticle = BurstParticle {
        position: HIDDEN_POSITION,
        velocity: Vec3::ZERO,
        color: Rgb::BLACK,
        size: 0.0,
        base_size: 0.0,
        age: 1.0,
        lifetime: 0.0,
    };

    pub fn is_expired(&self) -> bool {
        self.age > self.lifetime
    }

    fn hide(&mut self) {
        self.position = HIDDEN_POSITION;
        self.velocity = Vec3::ZERO;
        self.color = Rgb::BLACK;
        self.size = 0.0;
    }
}

/// A cosmetic marker behind a rising shell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailParticle {
    pub position: Vec3,
    pub color: Rgb,
    pub size: f32,
}

impl TrailParticle {
    pub const HIDDEN: TrailParticle = TrailParticle {
        position: HIDDEN_POSITION,
        color: Rgb::BLACK,
        size: 0.0,
    };

    fn hide(&mut self) {
        *self = Self::HIDDEN;
    }
}

/// Uniform direction on the unit sphere (θ ∈ [0, 2π), φ = acos(2u − 1))
fn sphere_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    let u: f32 = rng.random();
    let phi = (2.0 * u - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
}

/// The firework show: shell pool plus its particle pools
#[derive(Debug, Clone)]
pub struct FireworkShow {
    config: FireworkConfig,
    shells: Vec<Shell>,
    bursts: Vec<BurstParticle>,
    trails: Vec<TrailParticle>,
    burst_opacity: f32,
    trail_opacity: f32,
    launch_timer: f32,
    /// Opening volley latch; re-armed by a hard reset
    volley_fired: bool,
}

impl FireworkShow {
    pub fn new(config: FireworkConfig) -> Self {
        let shells = (0..config.max_shells).map(|_| Shell::idle()).collect();
        let bursts = vec![BurstParticle::HIDDEN; config.max_shells * config.particles_per_shell];
        let trails = vec![TrailParticle::HIDDEN; config.max_shells * config.trail_per_shell];
        Self {
            config,
            shells,
            bursts,
            trails,
            burst_opacity: 0.0,
            trail_opacity: 0.0,
            launch_timer: 0.0,
            volley_fired: false,
        }
    }

    pub fn config(&self) -> &FireworkConfig {
        &self.config
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn bursts(&self) -> &[BurstParticle] {
        &self.bursts
    }

    pub fn trails(&self) -> &[TrailParticle] {
        &self.trails
    }

    /// Sparks owned by shell `s`
    pub fn shell_bursts(&self, s: usize) -> &[BurstParticle] {
        &self.bursts[self.burst_range(s)]
    }

    /// Trail markers owned by shell `s`
    pub fn shell_trails(&self, s: usize) -> &[TrailParticle] {
        &self.trails[self.trail_range(s)]
    }

    pub fn burst_opacity(&self) -> f32 {
        self.burst_opacity
    }

    pub fn trail_opacity(&self) -> f32 {
        self.trail_opacity
    }

    pub fn active_shells(&self) -> usize {
        self.shells.iter().filter(|s| s.active).count()
    }

    fn burst_range(&self, s: usize) -> Range<usize> {
        let n = self.config.particles_per_shell;
        s * n..(s + 1) * n
    }

    fn trail_range(&self, s: usize) -> Range<usize> {
        let n = self.config.trail_per_shell;
        s * n..(s + 1) * n
    }

    /// Launch one shell from the inactive pool. Returns false when the pool is exhausted.
    pub fn launch_shell<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let Some(index) = self.shells.iter().position(|s| !s.active) else {
            return false;
        };
        let shell = &mut self.shells[index];
        shell.launch(&self.config, rng);
        log::debug!(
            "Shell {} launched: apex {:.2}, palette {}",
            index,
            shell.target_y,
            shell.palette.name
        );
        true
    }

    /// Deactivate every shell and park every particle
    pub fn reset(&mut self) {
        for shell in &mut self.shells {
            *shell = Shell::idle();
        }
        self.bursts.fill(BurstParticle::HIDDEN);
        self.trails.fill(TrailParticle::HIDDEN);
        self.launch_timer = 0.0;
        self.volley_fired = false;
    }

    /// Advance one frame
    pub fn tick<R: Rng + ?Sized>(&mut self, delta: f32, is_active: bool, rng: &mut R) {
        if is_active && !self.volley_fired {
            self.volley_fired = true;
            self.launch_timer = 0.0;
            let mut launched = 0;
            while launched < self.config.initial_volley && self.launch_shell(rng) {
                launched += 1;
            }
            log::info!("Fireworks started with a volley of {}", launched);
        }

        let dt = sanitize_delta(delta, self.config.max_delta);
        if dt == 0.0 {
            return;
        }

        let c = &self.config;
        let (burst_target, trail_target, rate) = if is_active {
            (c.burst_opacity, c.trail_opacity, c.fade_in_rate)
        } else {
            (0.0, 0.0, c.fade_out_rate)
        };
        self.burst_opacity = damp(self.burst_opacity, burst_target, rate, dt);
        self.trail_opacity = damp(self.trail_opacity, trail_target, rate, dt);

        if !is_active && self.burst_opacity < self.config.reset_epsilon {
            if self.volley_fired || self.shells.iter().any(|s| s.active) {
                log::info!("Fireworks faded out; resetting shells");
                self.reset();
            }
            return;
        }

        if is_active {
            self.launch_timer += dt;
            let interval = self.config.launch_interval;
            if interval > 0.0 {
                while self.launch_timer >= interval {
                    self.launch_timer -= interval;
                    self.launch_shell(rng);
                }
            } else {
                self.launch_shell(rng);
            }
        }

        let pps = self.config.particles_per_shell;
        let tps = self.config.trail_per_shell;
        let Self {
            config,
            shells,
            bursts,
            trails,
            ..
        } = self;

        for (s, shell) in shells.iter_mut().enumerate() {
            if !shell.active {
                continue;
            }
            let sparks = &mut bursts[s * pps..(s + 1) * pps];
            let trail = &mut trails[s * tps..(s + 1) * tps];
            match shell.phase {
                ShellPhase::Rising => {
                    if shell.rise(dt, trail, config) {
                        shell.burst(sparks, trail, config, rng);
                        log::debug!("Shell {} burst at {:.2}", s, shell.rise_y);
                    }
                }
                ShellPhase::Bursting => {
                    if !shell.step_burst(dt, sparks, config, rng) {
                        shell.active = false;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn quiet_config() -> FireworkConfig {
        // One shell at a time, no follow-up launches
        FireworkConfig {
            initial_volley: 1,
            launch_interval: 1000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_volley_launches_rising_shells() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut show = FireworkShow::new(FireworkConfig::default());
        show.tick(DT, true, &mut rng);

        let rising: Vec<&Shell> = show.shells().iter().filter(|s| s.is_rising()).collect();
        assert_eq!(rising.len(), 5);
        assert_eq!(show.active_shells(), 5);

        let c = show.config();
        for shell in &rising {
            assert!(shell.target_y >= c.apex_min && shell.target_y <= c.apex_max);
            assert!(shell.z.abs() <= c.lateral_spread);
            assert!((shell.x + c.depth_offset).abs() <= c.depth_jitter);
        }
        for (i, a) in rising.iter().enumerate() {
            for b in &rising[i + 1..] {
                assert_ne!(a.target_y, b.target_y);
            }
        }
    }

    #[test]
    fn test_interval_launches_follow_up_shells() {
        let mut rng = Pcg32::seed_from_u64(12);
        let config = FireworkConfig {
            initial_volley: 0,
            launch_interval: 0.5,
            ..Default::default()
        };
        let mut show = FireworkShow::new(config);
        // 1.02 s of frames at 60 Hz: two interval launches
        for _ in 0..61 {
            show.tick(DT, true, &mut rng);
        }
        assert_eq!(show.active_shells(), 2);
    }

    #[test]
    fn test_exhausted_pool_skips_launch() {
        let mut rng = Pcg32::seed_from_u64(13);
        let mut show = FireworkShow::new(FireworkConfig::default());
        for _ in 0..show.config().max_shells {
            assert!(show.launch_shell(&mut rng));
        }
        assert!(!show.launch_shell(&mut rng));
        assert_eq!(show.active_shells(), show.config().max_shells);
    }

    #[test]
    fn test_rising_trail_follows_shell() {
        let mut rng = Pcg32::seed_from_u64(14);
        let mut show = FireworkShow::new(quiet_config());
        show.tick(DT, true, &mut rng);

        let shell = show.shells()[0].clone();
        assert!(shell.is_rising());
        let trail = show.shell_trails(0);
        let start_y = shell.rise_y - shell.rise_velocity * DT;
        assert!((trail[0].position.y - start_y).abs() < 1e-4);
        assert_eq!(trail[0].position.x, shell.x);
        for pair in trail.windows(2) {
            assert!(pair[1].position.y < pair[0].position.y);
            assert!(pair[1].size < pair[0].size);
            assert!(pair[1].color.r < pair[0].color.r);
        }
        // Other shells' trails stay parked
        assert!(show.shell_trails(1).iter().all(|t| *t == TrailParticle::HIDDEN));
    }

    #[test]
    fn test_apex_bursts_in_same_tick() {
        let mut rng = Pcg32::seed_from_u64(15);
        let mut show = FireworkShow::new(quiet_config());
        show.tick(DT, true, &mut rng);

        show.shells[0].rise_y = show.shells[0].target_y - 0.001;
        show.tick(DT, true, &mut rng);

        let shell = &show.shells()[0];
        assert!(shell.is_bursting());
        assert_eq!(shell.burst_age, 0.0);
        let sparks = show.shell_bursts(0);
        assert_eq!(sparks.len(), show.config().particles_per_shell);
        for spark in sparks {
            assert_eq!(spark.age, 0.0);
            assert_eq!(spark.position, shell.position());
            assert!(spark.lifetime >= show.config().lifetime_min);
            let speed = spark.velocity.length();
            assert!(speed >= show.config().burst_speed_min - 1e-4);
            assert!(speed <= show.config().burst_speed_max + 1e-4);
        }
        assert!(show.shell_trails(0).iter().all(|t| *t == TrailParticle::HIDDEN));
        // Neighbouring slices untouched
        assert!(show.shell_bursts(1).iter().all(|b| *b == BurstParticle::HIDDEN));
    }

    #[test]
    fn test_sparks_fall_and_fade() {
        let mut rng = Pcg32::seed_from_u64(16);
        let mut show = FireworkShow::new(quiet_config());
        show.tick(DT, true, &mut rng);
        show.shells[0].rise_y = show.shells[0].target_y;
        show.tick(DT, true, &mut rng);
        let fresh = show.shell_bursts(0).to_vec();

        for _ in 0..30 {
            show.tick(DT, true, &mut rng);
        }
        // Drag alone would leave vy at vy0·drag^30; gravity pulls it lower
        let drag_only = show.config().drag.powi(30);
        for (before, after) in fresh.iter().zip(show.shell_bursts(0)) {
            if after.is_expired() {
                continue;
            }
            assert!(after.velocity.y < before.velocity.y * drag_only);
            assert!(after.size < before.base_size);
            assert!(after.age > 0.0);
        }
    }

    #[test]
    fn test_expired_sparks_free_the_shell() {
        let mut rng = Pcg32::seed_from_u64(17);
        let mut show = FireworkShow::new(quiet_config());
        show.tick(DT, true, &mut rng);
        show.shells[0].rise_y = show.shells[0].target_y;
        show.tick(DT, true, &mut rng);
        assert!(show.shells()[0].is_bursting());

        // Longest lifetime is 2.2 s
        for _ in 0..150 {
            show.tick(DT, true, &mut rng);
        }
        assert!(!show.shells()[0].active);
        for spark in show.shell_bursts(0) {
            assert!(spark.is_expired());
            assert_eq!(spark.position, HIDDEN_POSITION);
            assert_eq!(spark.size, 0.0);
            assert_eq!(spark.color, Rgb::BLACK);
        }
        // Slot is reusable
        assert!(show.launch_shell(&mut rng));
        assert!(show.shells()[0].is_rising());
    }

    #[test]
    fn test_fade_out_hard_resets_and_rearms_volley() {
        let mut rng = Pcg32::seed_from_u64(18);
        let mut show = FireworkShow::new(FireworkConfig::default());
        for _ in 0..120 {
            show.tick(DT, true, &mut rng);
        }
        assert!(show.burst_opacity() > 0.9);
        assert!(show.trail_opacity() < show.burst_opacity());
        assert!(show.active_shells() > 0);

        // Deactivation fades instead of clearing at once
        show.tick(DT, false, &mut rng);
        assert!(show.active_shells() > 0);

        for _ in 0..600 {
            show.tick(DT, false, &mut rng);
        }
        assert!(show.burst_opacity() < show.config().reset_epsilon);
        assert_eq!(show.active_shells(), 0);
        assert!(show.bursts().iter().all(|b| *b == BurstParticle::HIDDEN));

        show.tick(DT, true, &mut rng);
        assert_eq!(show.active_shells(), 5);
    }

    #[test]
    fn test_nan_delta_does_not_corrupt_state() {
        let mut rng = Pcg32::seed_from_u64(19);
        let mut show = FireworkShow::new(quiet_config());
        show.tick(DT, true, &mut rng);
        show.tick(f32::NAN, true, &mut rng);
        show.tick(f32::INFINITY, true, &mut rng);
        assert!(show.shells()[0].rise_y.is_finite());
        assert!(show.burst_opacity().is_finite());
    }

    #[test]
    fn test_sphere_direction_is_unit_and_balanced() {
        let mut rng = Pcg32::seed_from_u64(20);
        let mut sum = Vec3::ZERO;
        let n = 5000;
        for _ in 0..n {
            let d = sphere_direction(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4);
            sum += d;
        }
        let mean = sum / n as f32;
        assert!(mean.length() < 0.05, "mean {mean:?}");
    }
}
