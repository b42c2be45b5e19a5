//! Interactive props (picture frames, bouquet, cards)
//!
//! Each prop rests somewhere in the scene, lifts slightly when hovered,
//! and on click flies up in front of the camera for inspection, where it
//! can be spun by dragging. The actual pose always eases toward the target
//! pose so transitions never pop.
//!
//! Drags keep tracking the pointer after it leaves the prop, which needs a
//! window-wide listener. That listener is a capability injected as a
//! [`PointerCapture`]: acquired on entering a drag, released on leaving it.

use glam::{EulerRot, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use super::easing::{damp_factor, frame_delta};
use crate::config::PropConfig;

/// Window-wide pointer tracking for the duration of a drag
pub trait PointerCapture {
    /// Start routing pointer move/up events from the whole window
    fn acquire(&mut self);
    /// Stop routing them
    fn release(&mut self);
}

/// Capture for hosts that already deliver global pointer events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropId(pub u32);

/// Interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropState {
    Resting,
    Hovered,
    /// Held up in front of the camera
    Active,
    /// Active and being rotated by the pointer
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.5, 6.0),
            rotation: Quat::IDENTITY,
        }
    }
}

impl CameraPose {
    /// Point `offset` in camera space, in world space
    pub fn transform_point(&self, offset: Vec3) -> Vec3 {
        self.position + self.rotation * offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl PropPose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// Pointer press being tracked to tell clicks from drags
#[derive(Debug, Clone, Copy)]
struct Press {
    last: Vec2,
    travel: f32,
    /// Pointer is up; travel is frozen until the following click reads it
    released: bool,
}

#[derive(Debug, Clone)]
pub struct InteractiveProp {
    id: PropId,
    config: PropConfig,
    rest: PropPose,
    pose: PropPose,
    is_active: bool,
    is_hovered: bool,
    is_dragging: bool,
    /// (pitch, yaw) accumulated while dragging
    user_rotation: Vec2,
    press: Option<Press>,
    captured: bool,
}

impl InteractiveProp {
    pub fn new(id: PropId, rest: PropPose, config: PropConfig) -> Self {
        Self {
            id,
            config,
            rest,
            pose: rest,
            is_active: false,
            is_hovered: false,
            is_dragging: false,
            user_rotation: Vec2::ZERO,
            press: None,
            captured: false,
        }
    }

    pub fn id(&self) -> PropId {
        self.id
    }

    pub fn rest(&self) -> PropPose {
        self.rest
    }

    /// Current (smoothed) pose
    pub fn pose(&self) -> PropPose {
        self.pose
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn state(&self) -> PropState {
        match (self.is_active, self.is_dragging, self.is_hovered) {
            (true, true, _) => PropState::Dragging,
            (true, false, _) => PropState::Active,
            (false, _, true) => PropState::Hovered,
            (false, _, false) => PropState::Resting,
        }
    }

    /// Rotation added on top of the camera-facing orientation
    pub fn user_rotation_offset(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.user_rotation.y, self.user_rotation.x, 0.0)
    }

    pub fn pointer_enter(&mut self) {
        if !self.is_active {
            self.is_hovered = true;
        }
    }

    pub fn pointer_leave(&mut self) {
        self.is_hovered = false;
    }

    /// Pointer pressed on the prop's hit region
    pub fn pointer_down(&mut self, at: Vec2, capture: &mut dyn PointerCapture) {
        self.press = Some(Press {
            last: at,
            travel: 0.0,
            released: false,
        });
        if self.is_active && !self.is_dragging {
            self.is_dragging = true;
            if !self.captured {
                capture.acquire();
                self.captured = true;
            }
        }
    }

    /// Pointer moved (hit region or, while captured, anywhere in the window)
    pub fn pointer_move(&mut self, at: Vec2) {
        let Some(press) = self.press.as_mut().filter(|p| !p.released) else {
            return;
        };
        let delta = at - press.last;
        press.last = at;
        press.travel += delta.length();

        if self.is_dragging {
            let sensitivity = self.config.drag_sensitivity;
            self.user_rotation.x += delta.y * sensitivity;
            self.user_rotation.y += delta.x * sensitivity;
        }
    }

    /// Pointer released anywhere
    pub fn pointer_up(&mut self, capture: &mut dyn PointerCapture) {
        if let Some(press) = self.press.as_mut() {
            press.released = true;
        }
        if self.is_dragging {
            self.is_dragging = false;
            self.release_capture(capture);
        }
    }

    /// Click on the prop. Toggles focus unless the press turned into a drag.
    /// Returns true when the click registered.
    pub fn click(&mut self, capture: &mut dyn PointerCapture) -> bool {
        let travel = self.press.take().map_or(0.0, |p| p.travel);
        if travel > self.config.click_threshold {
            return false;
        }
        let active = !self.is_active;
        self.set_active(active, capture);
        true
    }

    /// Focus or release the prop. Deactivating cancels any drag and clears
    /// the user rotation.
    pub fn set_active(&mut self, active: bool, capture: &mut dyn PointerCapture) {
        if active {
            self.is_active = true;
            self.is_hovered = false;
            return;
        }
        if self.is_dragging {
            self.is_dragging = false;
        }
        self.release_capture(capture);
        self.is_active = false;
        self.user_rotation = Vec2::ZERO;
        self.press = None;
    }

    fn release_capture(&mut self, capture: &mut dyn PointerCapture) {
        if self.captured {
            capture.release();
            self.captured = false;
        }
    }

    /// Pose the prop is easing toward
    pub fn target_pose(&self, camera: &CameraPose) -> PropPose {
        if self.is_active {
            let position = camera.transform_point(Vec3::new(
                0.0,
                self.config.inspect_height,
                -self.config.inspect_distance,
            ));
            let flip = if self.config.flip_back_face {
                Quat::from_rotation_y(PI)
            } else {
                Quat::IDENTITY
            };
            let orientation = camera.rotation * flip * self.user_rotation_offset();
            PropPose::new(position, orientation.normalize())
        } else if self.is_hovered {
            PropPose::new(
                self.rest.position + Vec3::Y * self.config.hover_lift,
                self.rest.orientation,
            )
        } else {
            self.rest
        }
    }

    /// Ease the actual pose toward the target
    pub fn update(&mut self, delta: f32, camera: &CameraPose) {
        let dt = frame_delta(delta);
        if dt == 0.0 {
            return;
        }
        let target = self.target_pose(camera);
        let pos_t = damp_factor(self.config.position_rate, dt);
        let rot_t = damp_factor(self.config.rotation_rate, dt);
        self.pose.position = self.pose.position.lerp(target.position, pos_t);
        self.pose.orientation = self
            .pose
            .orientation
            .slerp(target.orientation, rot_t)
            .normalize();
    }
}

/// All interactive props in the scene; at most one is focused at a time
#[derive(Debug, Clone, Default)]
pub struct PropSet {
    props: Vec<InteractiveProp>,
}

impl PropSet {
    pub fn new() -> Self {
        Self { props: Vec::new() }
    }

    /// Add a prop; replaces an existing prop with the same id
    pub fn insert(&mut self, prop: InteractiveProp) {
        match self.props.iter_mut().find(|p| p.id == prop.id) {
            Some(existing) => *existing = prop,
            None => {
                self.props.push(prop);
                self.props.sort_by_key(|p| p.id);
            }
        }
    }

    pub fn get(&self, id: PropId) -> Option<&InteractiveProp> {
        self.props.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractiveProp> {
        self.props.iter()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    fn get_mut(&mut self, id: PropId) -> Option<&mut InteractiveProp> {
        self.props.iter_mut().find(|p| p.id == id)
    }

    /// The focused prop, if any
    pub fn active(&self) -> Option<PropId> {
        self.props.iter().find(|p| p.is_active).map(|p| p.id)
    }

    /// True while any prop is being dragged (orbit controls should pause)
    pub fn is_dragging(&self) -> bool {
        self.props.iter().any(|p| p.is_dragging)
    }

    pub fn pointer_enter(&mut self, id: PropId) {
        if let Some(prop) = self.get_mut(id) {
            prop.pointer_enter();
        }
    }

    pub fn pointer_leave(&mut self, id: PropId) {
        if let Some(prop) = self.get_mut(id) {
            prop.pointer_leave();
        }
    }

    pub fn pointer_down(&mut self, id: PropId, at: Vec2, capture: &mut dyn PointerCapture) {
        if let Some(prop) = self.get_mut(id) {
            prop.pointer_down(at, capture);
        }
    }

    pub fn pointer_move(&mut self, at: Vec2) {
        for prop in &mut self.props {
            prop.pointer_move(at);
        }
    }

    pub fn pointer_up(&mut self, capture: &mut dyn PointerCapture) {
        for prop in &mut self.props {
            prop.pointer_up(capture);
        }
    }

    /// Click on a prop; focusing it releases whichever prop had focus
    pub fn click(&mut self, id: PropId, capture: &mut dyn PointerCapture) -> bool {
        let Some(prop) = self.get_mut(id) else {
            return false;
        };
        if !prop.click(capture) {
            return false;
        }
        if prop.is_active {
            self.release_others(id, capture);
            log::debug!("Prop {:?} focused", id);
        }
        true
    }

    /// Click on empty scene: release focus
    pub fn background_click(&mut self, capture: &mut dyn PointerCapture) {
        for prop in &mut self.props {
            if prop.is_active {
                prop.set_active(false, capture);
            }
        }
    }

    /// External toggle from the UI
    pub fn set_active(&mut self, id: PropId, active: bool, capture: &mut dyn PointerCapture) {
        let Some(prop) = self.get_mut(id) else {
            return;
        };
        prop.set_active(active, capture);
        if active {
            self.release_others(id, capture);
        }
    }

    fn release_others(&mut self, keep: PropId, capture: &mut dyn PointerCapture) {
        for prop in &mut self.props {
            if prop.id != keep && prop.is_active {
                prop.set_active(false, capture);
            }
        }
    }

    pub fn update(&mut self, delta: f32, camera: &CameraPose) {
        for prop in &mut self.props {
            prop.update(delta, camera);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct RecordingCapture {
        acquired: u32,
        released: u32,
        held: bool,
    }

    impl PointerCapture for RecordingCapture {
        fn acquire(&mut self) {
            assert!(!self.held, "capture acquired twice");
            self.acquired += 1;
            self.held = true;
        }

        fn release(&mut self) {
            assert!(self.held, "capture released without being held");
            self.released += 1;
            self.held = false;
        }
    }

    fn frame() -> InteractiveProp {
        let rest = PropPose::new(Vec3::new(2.0, 1.0, -1.0), Quat::from_rotation_y(0.4));
        InteractiveProp::new(PropId(1), rest, PropConfig::default())
    }

    fn settle(prop: &mut InteractiveProp, camera: &CameraPose) {
        for _ in 0..600 {
            prop.update(DT, camera);
        }
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_hover_lifts_and_leave_returns() {
        let mut prop = frame();
        let camera = CameraPose::default();
        prop.pointer_enter();
        assert_eq!(prop.state(), PropState::Hovered);
        settle(&mut prop, &camera);
        let lifted = prop.rest().position + Vec3::Y * PropConfig::default().hover_lift;
        assert!(close(prop.pose().position, lifted));

        prop.pointer_leave();
        assert_eq!(prop.state(), PropState::Resting);
        settle(&mut prop, &camera);
        assert!(close(prop.pose().position, prop.rest().position));
    }

    #[test]
    fn test_click_brings_prop_to_camera() {
        let mut prop = frame();
        let mut capture = RecordingCapture::default();
        let camera = CameraPose::default();
        assert!(prop.click(&mut capture));
        assert_eq!(prop.state(), PropState::Active);

        // Pose eases rather than snapping
        prop.update(DT, &camera);
        assert!(!close(prop.pose().position, prop.target_pose(&camera).position));

        settle(&mut prop, &camera);
        let c = PropConfig::default();
        let expected = camera.position + Vec3::new(0.0, c.inspect_height, -c.inspect_distance);
        assert!(close(prop.pose().position, expected));
        assert!(prop.pose().orientation.angle_between(camera.rotation) < 1e-2);

        // Hovering an inspected prop does not change state
        prop.pointer_enter();
        assert_eq!(prop.state(), PropState::Active);
    }

    #[test]
    fn test_drag_rotates_and_suppresses_click() {
        let mut prop = frame();
        let mut capture = RecordingCapture::default();
        prop.click(&mut capture);

        prop.pointer_down(Vec2::new(100.0, 100.0), &mut capture);
        assert_eq!(prop.state(), PropState::Dragging);
        assert_eq!(capture.acquired, 1);

        prop.pointer_move(Vec2::new(110.0, 100.0));
        prop.pointer_move(Vec2::new(110.0, 95.0));
        let sens = PropConfig::default().drag_sensitivity;
        let expected = Quat::from_euler(EulerRot::YXZ, 10.0 * sens, -5.0 * sens, 0.0);
        assert!(prop.user_rotation_offset().angle_between(expected) < 1e-5);

        prop.pointer_up(&mut capture);
        assert_eq!(prop.state(), PropState::Active);
        assert_eq!(capture.released, 1);

        // The click that ends a drag must not toggle focus
        assert!(!prop.click(&mut capture));
        assert!(prop.is_active());
    }

    #[test]
    fn test_small_jitter_still_clicks() {
        let mut prop = frame();
        let mut capture = RecordingCapture::default();
        prop.pointer_down(Vec2::new(10.0, 10.0), &mut capture);
        prop.pointer_move(Vec2::new(12.0, 11.0));
        assert!(prop.click(&mut capture));
        assert!(prop.is_active());
        // Resting props never capture
        assert_eq!(capture.acquired, 0);
    }

    #[test]
    fn test_capture_never_doubles() {
        let mut prop = frame();
        let mut capture = RecordingCapture::default();
        prop.click(&mut capture);
        prop.pointer_down(Vec2::ZERO, &mut capture);
        prop.pointer_down(Vec2::ZERO, &mut capture);
        prop.pointer_up(&mut capture);
        prop.pointer_up(&mut capture);
        assert_eq!(capture.acquired, 1);
        assert_eq!(capture.released, 1);
        assert!(!capture.held);
    }

    #[test]
    fn test_deactivate_cancels_drag() {
        let mut prop = frame();
        let mut capture = RecordingCapture::default();
        prop.click(&mut capture);
        prop.pointer_down(Vec2::ZERO, &mut capture);
        prop.pointer_move(Vec2::new(40.0, 25.0));
        assert_ne!(prop.user_rotation_offset(), Quat::IDENTITY);

        prop.set_active(false, &mut capture);
        assert_eq!(prop.state(), PropState::Resting);
        assert_eq!(prop.user_rotation_offset(), Quat::IDENTITY);
        assert!(!capture.held);
        assert_eq!(capture.released, 1);
    }

    #[test]
    fn test_toggle_on_then_off_returns_to_rest() {
        let mut prop = frame();
        let mut capture = RecordingCapture::default();
        let camera = CameraPose::default();
        assert!(prop.click(&mut capture));
        prop.update(DT, &camera);
        assert!(prop.click(&mut capture));

        assert_eq!(prop.state(), PropState::Resting);
        assert_eq!(prop.user_rotation_offset(), Quat::IDENTITY);
        settle(&mut prop, &camera);
        assert!(close(prop.pose().position, prop.rest().position));
        assert!(prop.pose().orientation.angle_between(prop.rest().orientation) < 1e-3);
    }

    #[test]
    fn test_back_face_flip() {
        let config = PropConfig {
            flip_back_face: true,
            ..Default::default()
        };
        let mut prop = InteractiveProp::new(
            PropId(3),
            PropPose::new(Vec3::ZERO, Quat::IDENTITY),
            config,
        );
        prop.set_active(true, &mut NoCapture);
        let camera = CameraPose {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_y(0.5),
        };
        let target = prop.target_pose(&camera);
        let expected = Quat::from_rotation_y(0.5 + PI);
        assert!(target.orientation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_prop_set_single_focus() {
        let mut set = PropSet::new();
        let mut capture = RecordingCapture::default();
        for id in 1..=3 {
            let rest = PropPose::new(Vec3::new(id as f32, 0.0, 0.0), Quat::IDENTITY);
            set.insert(InteractiveProp::new(PropId(id), rest, PropConfig::default()));
        }
        assert_eq!(set.len(), 3);

        assert!(set.click(PropId(1), &mut capture));
        assert_eq!(set.active(), Some(PropId(1)));

        // Dragging the focused prop, then focusing another cancels the drag
        set.pointer_down(PropId(1), Vec2::ZERO, &mut capture);
        assert!(set.is_dragging());
        set.set_active(PropId(2), true, &mut capture);
        assert_eq!(set.active(), Some(PropId(2)));
        assert!(!set.is_dragging());
        assert!(!capture.held);

        set.background_click(&mut capture);
        assert_eq!(set.active(), None);
        assert!(!set.click(PropId(99), &mut capture));
    }

    #[test]
    fn test_global_pointer_up_ends_drag() {
        let mut set = PropSet::new();
        let mut capture = RecordingCapture::default();
        set.insert(frame());
        set.set_active(PropId(1), true, &mut capture);
        set.pointer_down(PropId(1), Vec2::ZERO, &mut capture);
        // Pointer wanders far outside the prop before release
        set.pointer_move(Vec2::new(800.0, -300.0));
        set.pointer_up(&mut capture);
        assert!(!set.is_dragging());
        assert_eq!(capture.released, 1);
        assert!(set.get(PropId(1)).unwrap().is_active());
    }

    #[test]
    fn test_drag_then_click_keeps_focus() {
        // Browser order: down, window moves, up, then the click event
        let mut set = PropSet::new();
        set.insert(frame());
        let mut capture = RecordingCapture::default();
        set.set_active(PropId(1), true, &mut capture);

        set.pointer_down(PropId(1), Vec2::new(100.0, 100.0), &mut capture);
        set.pointer_move(Vec2::new(300.0, 100.0));
        set.pointer_up(&mut capture);
        let toggled = set.click(PropId(1), &mut capture);

        assert!(!toggled);
        assert!(set.get(PropId(1)).unwrap().is_active());
        assert_eq!(capture.acquired, 1);
        assert_eq!(capture.released, 1);
    }

    #[test]
    fn test_moves_after_release_do_not_count_as_travel() {
        let mut set = PropSet::new();
        set.insert(frame());
        let mut capture = RecordingCapture::default();

        set.pointer_down(PropId(1), Vec2::new(50.0, 50.0), &mut capture);
        set.pointer_move(Vec2::new(52.0, 50.0));
        set.pointer_up(&mut capture);
        // Pointer wanders off before the click event arrives
        set.pointer_move(Vec2::new(600.0, 400.0));

        assert!(set.click(PropId(1), &mut capture));
        assert!(set.get(PropId(1)).unwrap().is_active());
        assert_eq!(capture.acquired, 0);
    }
}
