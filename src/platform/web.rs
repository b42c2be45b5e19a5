//! Browser façade
//!
//! `CardScene` wraps the whole core for a JavaScript host: the page feeds it
//! `requestAnimationFrame` timestamps and UI flags, reads poses and particle
//! buffers back, and drains scene events as JSON.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{EulerRot, Quat, Vec2, Vec3};
use js_sys::Float32Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::PointerEvent;

use crate::config::SceneConfig;
use crate::renderer::ParticleBuffers;
use crate::settings::Settings;
use crate::sim::{
    CameraPose, FrameClock, InteractiveProp, ObjectPose, PointerCapture, PropId, PropPose,
    SceneInput, SceneRig, SceneState, tick,
};

/// Set up logging and panic reporting; safe to call more than once
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Greeting card core ready");
    }
}

/// Window pointer event recorded during a drag
#[derive(Debug, Clone, Copy)]
enum WindowPointer {
    Move(Vec2),
    Up,
}

/// Pointer capture backed by window `pointermove`/`pointerup` listeners.
///
/// Events are queued and replayed into the props before anything else reads
/// pointer state (the next frame, click or press), so listeners never touch
/// scene state directly.
#[derive(Default)]
pub struct WindowPointerCapture {
    queue: Rc<RefCell<Vec<WindowPointer>>>,
    on_move: Option<Closure<dyn FnMut(PointerEvent)>>,
    on_up: Option<Closure<dyn FnMut(PointerEvent)>>,
}

impl WindowPointerCapture {
    /// Window listeners are attached
    fn is_held(&self) -> bool {
        self.on_move.is_some()
    }

    fn take_events(&self) -> Vec<WindowPointer> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

impl PointerCapture for WindowPointerCapture {
    fn acquire(&mut self) {
        if self.on_move.is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            log::warn!("No window, drag will not track outside the prop");
            return;
        };

        let queue = self.queue.clone();
        let on_move = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            let at = Vec2::new(event.client_x() as f32, event.client_y() as f32);
            queue.borrow_mut().push(WindowPointer::Move(at));
        });
        let queue = self.queue.clone();
        let on_up = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
            queue.borrow_mut().push(WindowPointer::Up);
        });

        if let Err(err) = window
            .add_event_listener_with_callback("pointermove", on_move.as_ref().unchecked_ref())
        {
            log::warn!("Cannot track drag outside the prop: {:?}", err);
            return;
        }
        self.on_move = Some(on_move);

        if let Err(err) =
            window.add_event_listener_with_callback("pointerup", on_up.as_ref().unchecked_ref())
        {
            log::warn!("Cannot track drag release outside the prop: {:?}", err);
            return;
        }
        self.on_up = Some(on_up);
    }

    fn release(&mut self) {
        let window = web_sys::window();
        if let Some(on_move) = self.on_move.take()
            && let Some(window) = &window
        {
            let _ = window.remove_event_listener_with_callback(
                "pointermove",
                on_move.as_ref().unchecked_ref(),
            );
        }
        if let Some(on_up) = self.on_up.take()
            && let Some(window) = &window
        {
            let _ = window
                .remove_event_listener_with_callback("pointerup", on_up.as_ref().unchecked_ref());
        }
    }
}

impl Drop for WindowPointerCapture {
    fn drop(&mut self) {
        self.release();
    }
}

/// `[x, y, z, rotation_y, visible]`, empty when the object is not mounted
fn object_pose_array(pose: Option<ObjectPose>) -> Vec<f32> {
    match pose {
        Some(p) => vec![
            p.position.x,
            p.position.y,
            p.position.z,
            p.rotation_y,
            if p.visible { 1.0 } else { 0.0 },
        ],
        None => Vec::new(),
    }
}

fn js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

#[wasm_bindgen]
pub struct CardScene {
    state: SceneState,
    settings: Settings,
    clock: FrameClock,
    input: SceneInput,
    capture: WindowPointerCapture,
}

#[wasm_bindgen]
impl CardScene {
    /// Scene built from the stored user settings
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<CardScene, JsError> {
        let settings = Settings::load();
        let state = SceneState::with_config(settings.scene_config(), seed).map_err(js_error)?;
        Ok(Self::from_parts(state, settings))
    }

    /// Scene built from a JSON `SceneConfig` (missing fields use defaults)
    #[wasm_bindgen(js_name = fromConfigJson)]
    pub fn from_config_json(json: &str, seed: u64) -> Result<CardScene, JsError> {
        let config = SceneConfig::from_json(json).map_err(js_error)?;
        let state = SceneState::with_config(config, seed).map_err(js_error)?;
        Ok(Self::from_parts(state, Settings::load()))
    }

    fn from_parts(state: SceneState, settings: Settings) -> Self {
        Self {
            state,
            settings,
            clock: FrameClock::new(),
            input: SceneInput::default(),
            capture: WindowPointerCapture::default(),
        }
    }

    /// The cake, table and candle models have loaded
    pub fn mount(&mut self) {
        if !self.state.rig.is_mounted() {
            self.state.rig = SceneRig::mounted();
        }
    }

    pub fn unmount(&mut self) {
        self.state.rig = SceneRig::default();
    }

    #[wasm_bindgen(js_name = setPlaying)]
    pub fn set_playing(&mut self, playing: bool) {
        self.input.is_playing = playing;
    }

    #[wasm_bindgen(js_name = setSparklesActive)]
    pub fn set_sparkles_active(&mut self, active: bool) {
        self.input.sparkles_active = active;
    }

    #[wasm_bindgen(js_name = setFireworksActive)]
    pub fn set_fireworks_active(&mut self, active: bool) {
        self.input.fireworks_active = active;
    }

    /// Camera position and orientation quaternion
    #[wasm_bindgen(js_name = setCamera)]
    #[allow(clippy::too_many_arguments)]
    pub fn set_camera(&mut self, px: f32, py: f32, pz: f32, qx: f32, qy: f32, qz: f32, qw: f32) {
        self.input.camera = CameraPose {
            position: Vec3::new(px, py, pz),
            rotation: Quat::from_xyzw(qx, qy, qz, qw).normalize(),
        };
    }

    /// Replay queued window pointer events into the props
    fn flush_pointer_queue(&mut self) {
        for event in self.capture.take_events() {
            match event {
                WindowPointer::Move(at) => self.state.props.pointer_move(at),
                WindowPointer::Up => self.state.props.pointer_up(&mut self.capture),
            }
        }
    }

    /// Advance one rendered frame at host timestamp `time_ms`
    pub fn frame(&mut self, time_ms: f64) {
        self.flush_pointer_queue();

        let mut input = self.input.clone();
        self.settings.filter_input(&mut input);
        let frame = self.clock.advance(time_ms);
        tick(&mut self.state, &input, frame);
    }

    /// Pending scene events as a JSON array
    #[wasm_bindgen(js_name = drainEventsJson)]
    pub fn drain_events_json(&mut self) -> Result<String, JsError> {
        let events = self.state.drain_events();
        serde_json::to_string(&events).map_err(js_error)
    }

    #[wasm_bindgen(js_name = backgroundOpacity)]
    pub fn background_opacity(&self) -> f32 {
        self.state.timeline.signals().background_opacity
    }

    #[wasm_bindgen(js_name = environmentProgress)]
    pub fn environment_progress(&self) -> f32 {
        self.state.timeline.signals().environment_progress
    }

    /// `[ambient, environment, key_light, overlay_opacity]`
    #[wasm_bindgen(js_name = lightLevels)]
    pub fn light_levels(&self) -> Vec<f32> {
        let l = self.state.light_levels();
        vec![l.ambient, l.environment, l.key_light, l.overlay_opacity]
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.state.props.is_dragging()
    }

    #[wasm_bindgen(js_name = cakePose)]
    pub fn cake_pose(&self) -> Vec<f32> {
        object_pose_array(self.state.rig.cake)
    }

    #[wasm_bindgen(js_name = tablePose)]
    pub fn table_pose(&self) -> Vec<f32> {
        object_pose_array(self.state.rig.table)
    }

    #[wasm_bindgen(js_name = candlePose)]
    pub fn candle_pose(&self) -> Vec<f32> {
        object_pose_array(self.state.rig.candle)
    }

    /// Sparkle instances, 8 floats each (position, size, rgba)
    #[wasm_bindgen(js_name = sparkleInstances)]
    pub fn sparkle_instances(&self) -> Float32Array {
        let buffers = ParticleBuffers::from_scene(&self.state);
        Float32Array::from(bytemuck::cast_slice::<_, f32>(&buffers.sparkles))
    }

    #[wasm_bindgen(js_name = burstInstances)]
    pub fn burst_instances(&self) -> Float32Array {
        let buffers = ParticleBuffers::from_scene(&self.state);
        Float32Array::from(bytemuck::cast_slice::<_, f32>(&buffers.bursts))
    }

    #[wasm_bindgen(js_name = trailInstances)]
    pub fn trail_instances(&self) -> Float32Array {
        let buffers = ParticleBuffers::from_scene(&self.state);
        Float32Array::from(bytemuck::cast_slice::<_, f32>(&buffers.trails))
    }

    /// Register a prop resting at `(x, y, z)` turned `rotation_y` radians
    #[wasm_bindgen(js_name = addProp)]
    pub fn add_prop(&mut self, id: u32, x: f32, y: f32, z: f32, rotation_y: f32) {
        let rest = PropPose::new(
            Vec3::new(x, y, z),
            Quat::from_euler(EulerRot::YXZ, rotation_y, 0.0, 0.0),
        );
        let config = self.state.config.props.clone();
        self.state
            .props
            .insert(InteractiveProp::new(PropId(id), rest, config));
    }

    /// `[x, y, z, qx, qy, qz, qw]`, empty for unknown ids
    #[wasm_bindgen(js_name = propPose)]
    pub fn prop_pose(&self, id: u32) -> Vec<f32> {
        match self.state.props.get(PropId(id)) {
            Some(prop) => {
                let pose = prop.pose();
                let (p, q) = (pose.position, pose.orientation);
                vec![p.x, p.y, p.z, q.x, q.y, q.z, q.w]
            }
            None => Vec::new(),
        }
    }

    #[wasm_bindgen(js_name = propPointerEnter)]
    pub fn prop_pointer_enter(&mut self, id: u32) {
        self.state.props.pointer_enter(PropId(id));
    }

    #[wasm_bindgen(js_name = propPointerLeave)]
    pub fn prop_pointer_leave(&mut self, id: u32) {
        self.state.props.pointer_leave(PropId(id));
    }

    #[wasm_bindgen(js_name = propPointerDown)]
    pub fn prop_pointer_down(&mut self, id: u32, x: f32, y: f32) {
        self.flush_pointer_queue();
        self.state
            .props
            .pointer_down(PropId(id), Vec2::new(x, y), &mut self.capture);
    }

    /// Pointer moved over a prop's hit region. Ignored during a drag, when
    /// the window listener already sees the same event.
    #[wasm_bindgen(js_name = propPointerMove)]
    pub fn prop_pointer_move(&mut self, x: f32, y: f32) {
        self.flush_pointer_queue();
        if self.capture.is_held() {
            return;
        }
        self.state.props.pointer_move(Vec2::new(x, y));
    }

    /// Pointer released over a prop's hit region
    #[wasm_bindgen(js_name = propPointerUp)]
    pub fn prop_pointer_up(&mut self) {
        self.flush_pointer_queue();
        self.state.props.pointer_up(&mut self.capture);
    }

    /// Returns whether the click toggled the prop
    #[wasm_bindgen(js_name = propClick)]
    pub fn prop_click(&mut self, id: u32) -> bool {
        self.flush_pointer_queue();
        self.state.props.click(PropId(id), &mut self.capture)
    }

    #[wasm_bindgen(js_name = backgroundClick)]
    pub fn background_click(&mut self) {
        self.flush_pointer_queue();
        self.state.props.background_click(&mut self.capture);
    }

    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.settings).map_err(js_error)
    }

    /// Store new settings and rebuild the particle layers from them.
    /// The rig, props and timeline session carry over.
    #[wasm_bindgen(js_name = applySettingsJson)]
    pub fn apply_settings_json(&mut self, json: &str) -> Result<(), JsError> {
        let settings: Settings = serde_json::from_str(json).map_err(js_error)?;
        let mut state =
            SceneState::with_config(settings.scene_config(), self.state.seed).map_err(js_error)?;

        state.rig = std::mem::take(&mut self.state.rig);
        state.props = std::mem::take(&mut self.state.props);
        state.timeline = self.state.timeline.clone();
        state.frame_count = self.state.frame_count;
        state.was_dragging = self.state.was_dragging;
        self.state = state;

        settings.save();
        self.settings = settings;
        Ok(())
    }
}
