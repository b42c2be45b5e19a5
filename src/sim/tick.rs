//! Per-frame scene tick
//!
//! Runs every component once, in a fixed order: the timeline first (it
//! gates playback and emits the lighting signals), then the two particle
//! systems, then the props.

use super::clock::FrameTime;
use super::state::{SceneEvent, SceneInput, SceneState};

/// Advance the scene by one rendered frame
pub fn tick(state: &mut SceneState, input: &SceneInput, frame: FrameTime) {
    state.frame_count += 1;

    let SceneState {
        rig,
        timeline,
        sparkles,
        fireworks,
        props,
        rng,
        events,
        was_dragging,
        ..
    } = state;

    timeline.tick(rig, input.is_playing, frame.elapsed, events);
    sparkles.tick(frame.delta, input.sparkles_active, frame.elapsed, rng);
    fireworks.tick(frame.delta, input.fireworks_active, rng);
    props.update(frame.delta, &input.camera);

    let dragging = props.is_dragging();
    if dragging != *was_dragging {
        *was_dragging = dragging;
        events.push(SceneEvent::DragStateChanged(dragging));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::FrameClock;
    use crate::sim::prop::{InteractiveProp, NoCapture, PropId, PropPose};
    use crate::sim::timeline::{ScenePoses, SceneProgress, SceneRig, TimelineRunState};
    use crate::config::PropConfig;
    use glam::{Quat, Vec2, Vec3};

    const DT: f32 = 1.0 / 60.0;

    fn mounted(seed: u64) -> (SceneState, FrameClock) {
        let mut state = SceneState::new(seed);
        state.rig = SceneRig::mounted();
        let mut clock = FrameClock::new();
        clock.step(0.0);
        (state, clock)
    }

    fn run(state: &mut SceneState, clock: &mut FrameClock, input: &SceneInput, frames: usize) {
        for _ in 0..frames {
            let frame = clock.step(DT);
            tick(state, input, frame);
        }
    }

    #[test]
    fn test_idle_scene_holds_start_pose() {
        let (mut state, mut clock) = mounted(1);
        run(&mut state, &mut clock, &SceneInput::default(), 30);

        assert_eq!(state.timeline.run_state(), TimelineRunState::Idle);
        assert_eq!(state.timeline.signals(), SceneProgress::IDLE);
        assert_eq!(state.rig.poses(), Some(ScenePoses::start(&state.config.timeline)));
        assert_eq!(state.light_levels().overlay_opacity, 1.0);
        assert_eq!(state.frame_count, 30);
    }

    #[test]
    fn test_full_playback_completes_once() {
        let (mut state, mut clock) = mounted(2);
        let input = SceneInput {
            is_playing: true,
            ..Default::default()
        };
        // 4.4 s timeline, run 6 s
        run(&mut state, &mut clock, &input, 360);

        let events = state.drain_events();
        let completions = events
            .iter()
            .filter(|e| matches!(e, SceneEvent::AnimationComplete))
            .count();
        assert_eq!(completions, 1);
        assert!(events.contains(&SceneEvent::BackgroundOpacity(0.0)));
        assert!(events.contains(&SceneEvent::EnvironmentProgress(1.0)));
        assert_eq!(state.timeline.run_state(), TimelineRunState::Completed);
        assert!(state.rig.candle.unwrap().visible);
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_timeline_waits_for_mount() {
        let mut state = SceneState::new(3);
        let mut clock = FrameClock::new();
        clock.step(0.0);
        let input = SceneInput {
            is_playing: true,
            ..Default::default()
        };
        run(&mut state, &mut clock, &input, 10);
        assert!(!state.timeline.is_primed());
        assert!(state.events().is_empty());

        state.rig = SceneRig::mounted();
        run(&mut state, &mut clock, &input, 1);
        assert_eq!(state.timeline.run_state(), TimelineRunState::Playing);
        // Session starts at mount, not at clock zero
        assert_eq!(state.timeline.elapsed(), 0.0);
    }

    #[test]
    fn test_components_run_independently() {
        let (mut state, mut clock) = mounted(4);
        let input = SceneInput {
            sparkles_active: true,
            fireworks_active: true,
            ..Default::default()
        };
        run(&mut state, &mut clock, &input, 60);

        assert_eq!(state.timeline.run_state(), TimelineRunState::Idle);
        assert!(state.sparkles.opacity() > 0.0);
        assert!(state.fireworks.active_shells() >= 5);
        assert_eq!(state.sparkles.len(), state.config.sparkles.count);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let (mut a, mut clock_a) = mounted(99);
        let (mut b, mut clock_b) = mounted(99);
        let input = SceneInput {
            is_playing: true,
            sparkles_active: true,
            fireworks_active: true,
            ..Default::default()
        };
        run(&mut a, &mut clock_a, &input, 200);
        run(&mut b, &mut clock_b, &input, 200);

        assert_eq!(a.sparkles.particles(), b.sparkles.particles());
        assert_eq!(a.fireworks.bursts(), b.fireworks.bursts());
        assert_eq!(a.rig.poses(), b.rig.poses());
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_drag_state_event() {
        let (mut state, mut clock) = mounted(5);
        let rest = PropPose::new(Vec3::new(1.0, 0.5, 0.0), Quat::IDENTITY);
        state
            .props
            .insert(InteractiveProp::new(PropId(7), rest, PropConfig::default()));
        let input = SceneInput::default();

        state.props.set_active(PropId(7), true, &mut NoCapture);
        state.props.pointer_down(PropId(7), Vec2::ZERO, &mut NoCapture);
        run(&mut state, &mut clock, &input, 1);
        state.props.pointer_up(&mut NoCapture);
        run(&mut state, &mut clock, &input, 2);

        let drags: Vec<SceneEvent> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SceneEvent::DragStateChanged(_)))
            .collect();
        assert_eq!(
            drags,
            vec![
                SceneEvent::DragStateChanged(true),
                SceneEvent::DragStateChanged(false)
            ]
        );
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&SceneEvent::BackgroundOpacity(0.5)).unwrap();
        assert_eq!(json, r#"{"type":"BackgroundOpacity","value":0.5}"#);
        let json = serde_json::to_string(&SceneEvent::AnimationComplete).unwrap();
        assert_eq!(json, r#"{"type":"AnimationComplete"}"#);
    }
}
