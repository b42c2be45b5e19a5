//! Deterministic scene simulation
//!
//! All animation and particle logic lives here. This module must stay
//! pure and reproducible:
//! - Time only comes in through `FrameTime`
//! - Seeded RNG only, passed down from `SceneState`
//! - Fixed-size pools, stable iteration order
//! - No rendering or platform dependencies

pub mod clock;
pub mod easing;
pub mod fireworks;
pub mod lighting;
pub mod palette;
pub mod prop;
pub mod sparkles;
pub mod state;
pub mod tick;
pub mod timeline;

pub use clock::{FrameClock, FrameTime};
pub use easing::{clamp, ease_out_cubic, lerp};
pub use fireworks::{BurstParticle, FireworkShow, Shell, ShellPhase, TrailParticle};
pub use lighting::LightLevels;
pub use palette::{ColorSet, Rgb};
pub use prop::{
    CameraPose, InteractiveProp, NoCapture, PointerCapture, PropId, PropPose, PropSet, PropState,
};
pub use sparkles::{SparkleField, SparkleParticle};
pub use state::{SceneEvent, SceneInput, SceneState};
pub use tick::tick;
pub use timeline::{
    ObjectPose, PhaseWindow, ScenePoses, SceneProgress, SceneRig, SceneTimeline, TimelineRunState,
};
