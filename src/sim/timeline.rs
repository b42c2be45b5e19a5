//! Scene timeline controller
//!
//! Drives the cake descent, table slide and candle drop from a single
//! clock, derives the background-fade / environment signals consumed by
//! lighting, and reports completion exactly once per play session.
//!
//! Phase layout (default timings):
//! ```text
//! 0.0          1.7 1.9       2.9 3.0 3.4        4.4
//! |--- cake --------------------|
//!              |--- table ---|
//!                  |--- fade -------|
//!                                    |- candle -|
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::easing::{clamp, ease_out_cubic, lerp};
use super::state::SceneEvent;
use crate::config::TimelineConfig;
use crate::consts::SIGNAL_EPSILON;

/// When a sub-animation runs, relative to session start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseWindow {
    pub start: f32,
    pub duration: f32,
}

impl PhaseWindow {
    pub const fn new(start: f32, duration: f32) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// Linear progress through the window, clamped to [0, 1].
    /// Zero-length windows step from 0 to 1 at `start`.
    pub fn fraction(&self, t: f32) -> f32 {
        if self.duration <= 0.0 {
            return if t >= self.start { 1.0 } else { 0.0 };
        }
        clamp((t - self.start) / self.duration, 0.0, 1.0)
    }

    /// Eased progress through the window
    pub fn eased(&self, t: f32) -> f32 {
        ease_out_cubic(self.fraction(t))
    }

    pub fn has_started(&self, t: f32) -> bool {
        t >= self.start
    }
}

impl TimelineConfig {
    pub fn cake_window(&self) -> PhaseWindow {
        PhaseWindow::new(0.0, self.cake_duration)
    }

    /// The table starts sliding so that it settles just before the cake lands
    pub fn table_window(&self) -> PhaseWindow {
        let start = (self.cake_duration - self.table_slide_duration - self.table_lead).max(0.0);
        PhaseWindow::new(start, self.table_slide_duration)
    }

    /// The candle drops once both cake and table are in place, after a pause
    pub fn candle_window(&self) -> PhaseWindow {
        let settled = self.cake_window().end().max(self.table_window().end());
        PhaseWindow::new(settled + self.candle_pause, self.candle_duration)
    }

    /// Background fade ends exactly when the candle starts dropping
    pub fn fade_window(&self) -> PhaseWindow {
        let end = self.candle_window().start;
        let start = (end - self.background_fade_duration).max(0.0);
        PhaseWindow::new(start, end - start)
    }

    /// Session length: the candle landing is the last event
    pub fn total_duration(&self) -> f32 {
        self.candle_window().end()
    }
}

/// Transform of one animated scene object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectPose {
    pub position: Vec3,
    /// Rotation about the vertical axis (radians)
    pub rotation_y: f32,
    pub visible: bool,
}

impl Default for ObjectPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_y: 0.0,
            visible: true,
        }
    }
}

/// Poses of the three timeline-driven objects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoses {
    pub cake: ObjectPose,
    pub table: ObjectPose,
    pub candle: ObjectPose,
}

impl ScenePoses {
    /// Pose before anything has moved: everything raised/offset, candle hidden
    pub fn start(config: &TimelineConfig) -> Self {
        Self {
            cake: ObjectPose {
                position: Vec3::new(0.0, config.cake_start_height, 0.0),
                rotation_y: 0.0,
                visible: true,
            },
            table: ObjectPose {
                position: Vec3::new(0.0, 0.0, config.table_start_z),
                rotation_y: 0.0,
                visible: true,
            },
            candle: ObjectPose {
                position: Vec3::new(0.0, config.candle_start_height, 0.0),
                rotation_y: 0.0,
                visible: false,
            },
        }
    }

    /// Poses `t` seconds into a session (clamped to [0, total])
    pub fn at(config: &TimelineConfig, t: f32) -> Self {
        let t = clamp(t, 0.0, config.total_duration());

        let cake_f = config.cake_window().eased(t);
        let cake = ObjectPose {
            position: Vec3::new(0.0, lerp(config.cake_start_height, 0.0, cake_f), 0.0),
            rotation_y: TAU * cake_f,
            visible: true,
        };

        let table_f = config.table_window().eased(t);
        let table = ObjectPose {
            position: Vec3::new(0.0, 0.0, lerp(config.table_start_z, 0.0, table_f)),
            rotation_y: 0.0,
            visible: true,
        };

        let candle_window = config.candle_window();
        let candle = if candle_window.has_started(t) {
            ObjectPose {
                position: Vec3::new(
                    0.0,
                    lerp(config.candle_start_height, 0.0, candle_window.eased(t)),
                    0.0,
                ),
                rotation_y: 0.0,
                visible: true,
            }
        } else {
            ObjectPose {
                position: Vec3::new(0.0, config.candle_start_height, 0.0),
                rotation_y: 0.0,
                visible: false,
            }
        };

        Self {
            cake,
            table,
            candle,
        }
    }

    /// Resting pose at the end of the session
    pub fn finished(config: &TimelineConfig) -> Self {
        Self::at(config, config.total_duration())
    }
}

/// Global signals consumed by lighting and the page overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneProgress {
    pub background_opacity: f32,
    pub environment_progress: f32,
}

impl SceneProgress {
    /// Before the fade: opaque backdrop, no environment light
    pub const IDLE: SceneProgress = SceneProgress {
        background_opacity: 1.0,
        environment_progress: 0.0,
    };
    /// After the fade
    pub const DONE: SceneProgress = SceneProgress {
        background_opacity: 0.0,
        environment_progress: 1.0,
    };

    pub fn at(config: &TimelineConfig, t: f32) -> Self {
        let faded = config.fade_window().eased(t);
        Self {
            background_opacity: 1.0 - faded,
            environment_progress: faded,
        }
    }
}

impl Default for SceneProgress {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Animated objects owned by the host scene.
///
/// Each slot stays `None` until the host has mounted the model; the
/// timeline skips frames until all three are present.
#[derive(Debug, Clone, Default)]
pub struct SceneRig {
    pub cake: Option<ObjectPose>,
    pub table: Option<ObjectPose>,
    pub candle: Option<ObjectPose>,
}

impl SceneRig {
    /// Rig with all three objects mounted at the origin
    pub fn mounted() -> Self {
        Self {
            cake: Some(ObjectPose::default()),
            table: Some(ObjectPose::default()),
            candle: Some(ObjectPose::default()),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.cake.is_some() && self.table.is_some() && self.candle.is_some()
    }

    /// Current poses, if every object is mounted
    pub fn poses(&self) -> Option<ScenePoses> {
        Some(ScenePoses {
            cake: self.cake?,
            table: self.table?,
            candle: self.candle?,
        })
    }

    fn apply(&mut self, poses: &ScenePoses) {
        if let (Some(cake), Some(table), Some(candle)) =
            (&mut self.cake, &mut self.table, &mut self.candle)
        {
            *cake = poses.cake;
            *table = poses.table;
            *candle = poses.candle;
        }
    }
}

/// Lifecycle of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineRunState {
    /// Waiting for `is_playing`
    Idle,
    /// Objects being snapped to their start pose (one frame)
    Priming,
    /// Session in progress
    Playing,
    /// Session finished; holds the final pose until stopped
    Completed,
}

/// The scene timeline state machine
#[derive(Debug, Clone)]
pub struct SceneTimeline {
    config: TimelineConfig,
    run_state: TimelineRunState,
    primed: bool,
    /// Clock reading when the current session started
    start_time: Option<f32>,
    elapsed: f32,
    /// One-shot completion latch
    notified: bool,
    signals: SceneProgress,
    last_opacity: Option<f32>,
    last_environment: Option<f32>,
}

impl SceneTimeline {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            run_state: TimelineRunState::Idle,
            primed: false,
            start_time: None,
            elapsed: 0.0,
            notified: false,
            signals: SceneProgress::IDLE,
            last_opacity: None,
            last_environment: None,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn run_state(&self) -> TimelineRunState {
        self.run_state
    }

    /// Seconds into the current session (0 when idle)
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Latest computed signals (emitted or not)
    pub fn signals(&self) -> SceneProgress {
        self.signals
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn total_duration(&self) -> f32 {
        self.config.total_duration()
    }

    /// Advance one frame.
    ///
    /// `now` is the clock's elapsed time; the session start is latched on
    /// the first playing frame and elapsed time is measured from it.
    pub fn tick(
        &mut self,
        rig: &mut SceneRig,
        is_playing: bool,
        now: f32,
        events: &mut Vec<SceneEvent>,
    ) {
        if !rig.is_mounted() || !now.is_finite() {
            return;
        }

        if !self.primed {
            self.run_state = TimelineRunState::Priming;
            rig.apply(&ScenePoses::start(&self.config));
            self.primed = true;
        }

        if !is_playing {
            if self.start_time.take().is_some() {
                log::info!("Timeline stopped after {:.2}s", self.elapsed);
                rig.apply(&ScenePoses::start(&self.config));
            }
            self.run_state = TimelineRunState::Idle;
            self.elapsed = 0.0;
            self.notified = false;
            self.emit(SceneProgress::IDLE, events);
            return;
        }

        let start = *self.start_time.get_or_insert_with(|| {
            log::info!("Timeline session started at {:.3}s", now);
            now
        });
        let total = self.config.total_duration();
        self.elapsed = clamp(now - start, 0.0, total);

        if now - start >= total {
            rig.apply(&ScenePoses::finished(&self.config));
            self.run_state = TimelineRunState::Completed;
            self.emit(SceneProgress::DONE, events);
            if !self.notified {
                self.notified = true;
                log::info!("Timeline complete ({:.2}s)", total);
                events.push(SceneEvent::AnimationComplete);
            }
            return;
        }

        self.run_state = TimelineRunState::Playing;
        rig.apply(&ScenePoses::at(&self.config, self.elapsed));
        self.emit(SceneProgress::at(&self.config, self.elapsed), events);
    }

    /// Record the signals and push the ones that changed enough
    fn emit(&mut self, progress: SceneProgress, events: &mut Vec<SceneEvent>) {
        self.signals = progress;
        if should_emit(self.last_opacity, progress.background_opacity) {
            self.last_opacity = Some(progress.background_opacity);
            events.push(SceneEvent::BackgroundOpacity(progress.background_opacity));
        }
        if should_emit(self.last_environment, progress.environment_progress) {
            self.last_environment = Some(progress.environment_progress);
            events.push(SceneEvent::EnvironmentProgress(progress.environment_progress));
        }
    }
}

/// Throttle: emit on a change larger than `SIGNAL_EPSILON`, but always land
/// exactly on the 0/1 endpoints.
fn should_emit(last: Option<f32>, value: f32) -> bool {
    match last {
        None => true,
        Some(prev) => {
            (value - prev).abs() > SIGNAL_EPSILON
                || ((value == 0.0 || value == 1.0) && value != prev)
        }
    }
}
