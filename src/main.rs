//! Greeting Card entry point
//!
//! On the web this only sets up logging; the page drives `CardScene`.
//! Natively it runs a scripted headless playback and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    greeting_card::platform::web::init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Greeting Card (native) starting...");
    log::info!("Rendering needs the web build; running a headless playback instead");

    headless::run(std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(7));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::{EulerRot, Quat, Vec2, Vec3};

    use greeting_card::Settings;
    use greeting_card::renderer::ParticleBuffers;
    use greeting_card::sim::{
        FrameClock, InteractiveProp, NoCapture, PropId, PropPose, SceneEvent, SceneInput,
        SceneRig, SceneState, tick,
    };

    const FPS: f32 = 60.0;
    const SECONDS: f32 = 10.0;

    const FRAME: PropId = PropId(1);
    const BOUQUET: PropId = PropId(2);

    /// What the page would be doing at time `t`
    fn script(t: f32, input: &mut SceneInput) {
        input.is_playing = t >= 0.5;
        input.sparkles_active = t >= 0.5;
        input.fireworks_active = (5.0..8.0).contains(&t);
    }

    pub fn run(seed: u64) {
        let settings = Settings::load();
        let mut state = match SceneState::with_config(settings.scene_config(), seed) {
            Ok(state) => state,
            Err(err) => {
                log::error!("Cannot build scene: {}", err);
                return;
            }
        };

        let config = state.config.props.clone();
        state.props.insert(InteractiveProp::new(
            FRAME,
            PropPose::new(Vec3::new(-1.2, 0.9, 0.4), Quat::IDENTITY),
            config.clone(),
        ));
        state.props.insert(InteractiveProp::new(
            BOUQUET,
            PropPose::new(
                Vec3::new(1.3, 0.9, 0.2),
                Quat::from_euler(EulerRot::YXZ, -0.4, 0.0, 0.0),
            ),
            config,
        ));

        let mut clock = FrameClock::new();
        let mut input = SceneInput::default();
        let mut capture = NoCapture;
        let frames = (SECONDS * FPS) as usize;
        let mut event_count = 0;
        let mut peak_shells = 0;

        clock.step(0.0);
        for i in 0..frames {
            let frame = clock.step(1.0 / FPS);

            // Models finish loading a few frames in
            if i == 10 {
                state.rig = SceneRig::mounted();
                log::info!("Rig mounted at {:.2}s", frame.elapsed);
            }

            // Pick up the photo frame, spin it, put it back
            match i {
                120 => {
                    state.props.click(FRAME, &mut capture);
                }
                160 => state.props.pointer_down(FRAME, Vec2::new(400.0, 300.0), &mut capture),
                161..=190 => state
                    .props
                    .pointer_move(Vec2::new(400.0 + (i - 160) as f32 * 4.0, 300.0)),
                191 => state.props.pointer_up(&mut capture),
                240 => state.props.background_click(&mut capture),
                _ => {}
            }

            script(frame.elapsed, &mut input);
            settings.filter_input(&mut input);
            tick(&mut state, &input, frame);
            peak_shells = peak_shells.max(state.fireworks.active_shells());

            for event in state.drain_events() {
                event_count += 1;
                match event {
                    SceneEvent::AnimationComplete | SceneEvent::DragStateChanged(_) => {
                        log::info!("{:>6.2}s {:?}", frame.elapsed, event)
                    }
                    _ => log::debug!("{:>6.2}s {:?}", frame.elapsed, event),
                }
            }
        }

        let buffers = ParticleBuffers::from_scene(&state);
        let lights = state.light_levels();
        log::info!(
            "Finished {} frames: {} events, timeline {:?}, peak {} shells",
            state.frame_count,
            event_count,
            state.timeline.run_state(),
            peak_shells
        );
        log::info!(
            "Lights: ambient {:.2}, key {:.2}, overlay {:.2}",
            lights.ambient,
            lights.key_light,
            lights.overlay_opacity
        );
        log::info!(
            "Instance buffers: {} sparkle, {} burst, {} trail bytes",
            buffers.sparkle_bytes().len(),
            buffers.burst_bytes().len(),
            buffers.trail_bytes().len()
        );
        if let Some(prop) = state.props.get(FRAME) {
            log::info!("Photo frame back at {:?}", prop.pose().position);
        }
    }
}
