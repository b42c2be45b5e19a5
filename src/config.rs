//! Scene configuration
//!
//! Durations, speeds, counts and bounds for every simulated component.
//! All values are construction-time parameters; `Default` gives the tuned
//! card. Configs deserialize from JSON with missing fields falling back to
//! their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Timeline phase timings and start poses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Cake start height above the table
    pub cake_start_height: f32,
    /// Cake descent duration (D1, seconds)
    pub cake_duration: f32,
    /// Table start offset along Z
    pub table_start_z: f32,
    /// Table slide duration (seconds)
    pub table_slide_duration: f32,
    /// How long before the cake lands the table finishes sliding
    pub table_lead: f32,
    /// Candle start height above the cake
    pub candle_start_height: f32,
    /// Pause between table/cake landing and the candle drop
    pub candle_pause: f32,
    /// Candle drop duration (seconds)
    pub candle_duration: f32,
    /// Background fade window length, ending at the candle drop
    pub background_fade_duration: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            cake_start_height: 6.0,
            cake_duration: 3.0,
            table_start_z: -8.0,
            table_slide_duration: 1.2,
            table_lead: 0.1,
            candle_start_height: 2.5,
            candle_pause: 0.4,
            candle_duration: 1.0,
            background_fade_duration: 1.5,
        }
    }
}

/// Ambient falling sparkles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkleConfig {
    pub count: usize,
    /// Scatter rectangle half-extent along X
    pub half_width: f32,
    /// Scatter rectangle half-extent along Z
    pub half_depth: f32,
    /// Particles below this height respawn
    pub bottom: f32,
    /// Respawned particles appear at or above this height
    pub top: f32,
    /// Height of the respawn band above `top`
    pub respawn_band: f32,
    pub fall_speed_min: f32,
    pub fall_speed_max: f32,
    /// Max horizontal drift speed per axis
    pub drift: f32,
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
    /// Opacity approached while active
    pub target_opacity: f32,
    pub fade_in_rate: f32,
    pub fade_out_rate: f32,
    pub max_delta: f32,
}

impl Default for SparkleConfig {
    fn default() -> Self {
        Self {
            count: SPARKLE_COUNT,
            half_width: 12.0,
            half_depth: 12.0,
            bottom: -2.0,
            top: 14.0,
            respawn_band: 2.0,
            fall_speed_min: 0.4,
            fall_speed_max: 1.1,
            drift: 0.12,
            sway_amplitude: 0.3,
            sway_frequency: 0.7,
            target_opacity: 0.6,
            fade_in_rate: 1.5,
            fade_out_rate: 4.0,
            max_delta: MAX_FRAME_DELTA,
        }
    }
}

/// Firework shells, bursts and trails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworkConfig {
    pub max_shells: usize,
    pub particles_per_shell: usize,
    pub trail_per_shell: usize,
    pub initial_volley: usize,
    /// Seconds between follow-up launches while active
    pub launch_interval: f32,
    /// Shells launch this far behind the origin along -X
    pub depth_offset: f32,
    pub depth_jitter: f32,
    /// Half-width of the Z launch spread
    pub lateral_spread: f32,
    /// Height shells start rising from (below the origin)
    pub launch_height: f32,
    pub rise_speed_min: f32,
    pub rise_speed_max: f32,
    pub apex_min: f32,
    pub apex_max: f32,
    pub burst_speed_min: f32,
    pub burst_speed_max: f32,
    /// Vertical acceleration on sparks (negative pulls down)
    pub gravity: f32,
    /// Velocity retained per 1/60 s
    pub drag: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    /// Lower bound of the per-frame brightness flicker
    pub flicker_min: f32,
    /// Distance between successive trail particles
    pub trail_spacing: f32,
    pub trail_size: f32,
    pub burst_opacity: f32,
    pub trail_opacity: f32,
    pub fade_in_rate: f32,
    pub fade_out_rate: f32,
    /// Burst opacity below which an inactive show hard-resets
    pub reset_epsilon: f32,
    pub max_delta: f32,
}

impl Default for FireworkConfig {
    fn default() -> Self {
        Self {
            max_shells: MAX_SHELLS,
            particles_per_shell: PARTICLES_PER_SHELL,
            trail_per_shell: TRAIL_PER_SHELL,
            initial_volley: INITIAL_VOLLEY,
            launch_interval: 0.8,
            depth_offset: 12.0,
            depth_jitter: 3.0,
            lateral_spread: 14.0,
            launch_height: -3.0,
            rise_speed_min: 7.0,
            rise_speed_max: 10.0,
            apex_min: 6.0,
            apex_max: 11.0,
            burst_speed_min: 2.5,
            burst_speed_max: 5.5,
            gravity: -3.0,
            drag: 0.98,
            size_min: 0.1,
            size_max: 0.22,
            lifetime_min: 1.2,
            lifetime_max: 2.2,
            flicker_min: 0.8,
            trail_spacing: 0.18,
            trail_size: 0.14,
            burst_opacity: 1.0,
            trail_opacity: 0.7,
            fade_in_rate: 3.0,
            fade_out_rate: 1.5,
            reset_epsilon: 0.01,
            max_delta: MAX_FRAME_DELTA,
        }
    }
}

/// Interactive prop behaviour (picture frames, bouquet, cards)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropConfig {
    /// Distance in front of the camera while inspected
    pub inspect_distance: f32,
    /// Vertical offset relative to the camera while inspected
    pub inspect_height: f32,
    /// Upward lift while hovered
    pub hover_lift: f32,
    pub position_rate: f32,
    pub rotation_rate: f32,
    /// Radians of rotation per pixel of drag
    pub drag_sensitivity: f32,
    /// Pointer travel (px) above which a press no longer counts as a click
    pub click_threshold: f32,
    /// Rotate half a turn so back-facing geometry faces the camera
    pub flip_back_face: bool,
}

impl Default for PropConfig {
    fn default() -> Self {
        Self {
            inspect_distance: 2.2,
            inspect_height: -0.05,
            hover_lift: 0.1,
            position_rate: 6.0,
            rotation_rate: 8.0,
            drag_sensitivity: 0.008,
            click_threshold: 5.0,
            flip_back_face: false,
        }
    }
}

/// Full scene configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub timeline: TimelineConfig,
    pub sparkles: SparkleConfig,
    pub fireworks: FireworkConfig,
    pub props: PropConfig,
}

impl SceneConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would put NaN or inverted ranges into the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timeline;
        duration("timeline.cake_duration", t.cake_duration)?;
        duration("timeline.table_slide_duration", t.table_slide_duration)?;
        duration("timeline.table_lead", t.table_lead)?;
        duration("timeline.candle_pause", t.candle_pause)?;
        duration("timeline.candle_duration", t.candle_duration)?;
        duration("timeline.background_fade_duration", t.background_fade_duration)?;
        finite("timeline.cake_start_height", t.cake_start_height)?;
        finite("timeline.table_start_z", t.table_start_z)?;
        finite("timeline.candle_start_height", t.candle_start_height)?;

        let s = &self.sparkles;
        pool("sparkles.count", s.count)?;
        range("sparkles.height", s.bottom, s.top)?;
        range("sparkles.fall_speed", s.fall_speed_min, s.fall_speed_max)?;
        duration("sparkles.max_delta", s.max_delta)?;
        for (name, v) in [
            ("sparkles.half_width", s.half_width),
            ("sparkles.half_depth", s.half_depth),
            ("sparkles.respawn_band", s.respawn_band),
            ("sparkles.drift", s.drift),
            ("sparkles.sway_amplitude", s.sway_amplitude),
            ("sparkles.sway_frequency", s.sway_frequency),
            ("sparkles.target_opacity", s.target_opacity),
            ("sparkles.fade_in_rate", s.fade_in_rate),
            ("sparkles.fade_out_rate", s.fade_out_rate),
        ] {
            finite(name, v)?;
        }

        let f = &self.fireworks;
        pool("fireworks.max_shells", f.max_shells)?;
        pool("fireworks.particles_per_shell", f.particles_per_shell)?;
        pool("fireworks.trail_per_shell", f.trail_per_shell)?;
        duration("fireworks.launch_interval", f.launch_interval)?;
        duration("fireworks.max_delta", f.max_delta)?;
        range("fireworks.rise_speed", f.rise_speed_min, f.rise_speed_max)?;
        range("fireworks.apex", f.apex_min, f.apex_max)?;
        range("fireworks.burst_speed", f.burst_speed_min, f.burst_speed_max)?;
        range("fireworks.size", f.size_min, f.size_max)?;
        range("fireworks.lifetime", f.lifetime_min, f.lifetime_max)?;
        range("fireworks.flicker", f.flicker_min, 1.0)?;
        for (name, v) in [
            ("fireworks.depth_offset", f.depth_offset),
            ("fireworks.depth_jitter", f.depth_jitter),
            ("fireworks.lateral_spread", f.lateral_spread),
            ("fireworks.launch_height", f.launch_height),
            ("fireworks.gravity", f.gravity),
            ("fireworks.drag", f.drag),
            ("fireworks.trail_spacing", f.trail_spacing),
            ("fireworks.trail_size", f.trail_size),
            ("fireworks.burst_opacity", f.burst_opacity),
            ("fireworks.trail_opacity", f.trail_opacity),
            ("fireworks.fade_in_rate", f.fade_in_rate),
            ("fireworks.fade_out_rate", f.fade_out_rate),
            ("fireworks.reset_epsilon", f.reset_epsilon),
        ] {
            finite(name, v)?;
        }

        let p = &self.props;
        for (name, v) in [
            ("props.inspect_distance", p.inspect_distance),
            ("props.inspect_height", p.inspect_height),
            ("props.hover_lift", p.hover_lift),
            ("props.position_rate", p.position_rate),
            ("props.rotation_rate", p.rotation_rate),
            ("props.drag_sensitivity", p.drag_sensitivity),
            ("props.click_threshold", p.click_threshold),
        ] {
            finite(name, v)?;
        }

        Ok(())
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn duration(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { name, value })
    }
}

fn range(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    finite(name, min)?;
    finite(name, max)?;
    if min > max {
        return Err(ConfigError::InvertedRange { name, min, max });
    }
    Ok(())
}

fn pool(name: &'static str, size: usize) -> Result<(), ConfigError> {
    if size == 0 {
        Err(ConfigError::EmptyPool { name })
    } else {
        Ok(())
    }
}
