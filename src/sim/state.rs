//! Scene state and core simulation types
//!
//! Everything the per-frame tick mutates lives here, together with the
//! single seeded RNG every component draws from.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::fireworks::FireworkShow;
use super::lighting::LightLevels;
use super::prop::{CameraPose, PropSet};
use super::sparkles::SparkleField;
use super::timeline::{SceneRig, SceneTimeline};
use crate::config::SceneConfig;
use crate::error::ConfigError;

/// Notifications pushed by the core, drained by the host each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum SceneEvent {
    /// Page overlay opacity changed
    BackgroundOpacity(f32),
    /// Environment lighting progress changed
    EnvironmentProgress(f32),
    /// The timeline finished (once per play session)
    AnimationComplete,
    /// A prop drag started or ended; orbit controls follow this
    DragStateChanged(bool),
}

/// Flags raised by the surrounding UI for a single frame
#[derive(Debug, Clone, Default)]
pub struct SceneInput {
    /// Play the cake/table/candle timeline
    pub is_playing: bool,
    /// Falling sparkles visible
    pub sparkles_active: bool,
    /// Firework show running
    pub fireworks_active: bool,
    /// Current camera transform (props inspect relative to it)
    pub camera: CameraPose,
}

/// Complete scene state
#[derive(Debug, Clone)]
pub struct SceneState {
    /// Seed for reproducibility
    pub seed: u64,
    pub config: SceneConfig,
    /// Host-owned animated objects
    pub rig: SceneRig,
    pub timeline: SceneTimeline,
    pub sparkles: SparkleField,
    pub fireworks: FireworkShow,
    pub props: PropSet,
    /// Frames ticked so far
    pub frame_count: u64,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<SceneEvent>,
    pub(crate) was_dragging: bool,
}

impl SceneState {
    /// Scene with the default configuration
    pub fn new(seed: u64) -> Self {
        Self::build(SceneConfig::default(), seed)
    }

    /// Scene with a custom configuration
    pub fn with_config(config: SceneConfig, seed: u64) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            log::warn!("Rejected scene config: {}", err);
            return Err(err);
        }
        Ok(Self::build(config, seed))
    }

    fn build(config: SceneConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let sparkles = SparkleField::new(config.sparkles.clone(), &mut rng);
        log::info!(
            "Scene created (seed {}, {} sparkles, {} shells)",
            seed,
            config.sparkles.count,
            config.fireworks.max_shells
        );
        Self {
            seed,
            rig: SceneRig::default(),
            timeline: SceneTimeline::new(config.timeline.clone()),
            sparkles,
            fireworks: FireworkShow::new(config.fireworks.clone()),
            props: PropSet::new(),
            frame_count: 0,
            rng,
            events: Vec::new(),
            was_dragging: false,
            config,
        }
    }

    /// Events pushed since the last drain
    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Light levels for the current timeline signals
    pub fn light_levels(&self) -> LightLevels {
        LightLevels::from_progress(self.timeline.signals())
    }
}
