//! Pointer, touch and wheel input → rotation target and camera distance.

use crate::camera::CameraState;
use crate::constants::*;
use glam::Vec2;

/// Platform-neutral input event. Coordinates are in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    Leave,
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd,
    /// Vertical wheel delta in pixels; positive zooms out.
    Wheel { delta_y: f32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging { last: Vec2 },
}

/// Rotation state shared with the animation loop.
///
/// `target` accumulates drag deltas and auto-rotate steps; `current` is what
/// the scene shows and lags `target` through [`ease_toward`]. Both are
/// `(x, y)` Euler angles in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionState {
    pub phase: DragPhase,
    pub target: Vec2,
    pub current: Vec2,
    pub auto_rotate: bool,
}

impl InteractionState {
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }
}

/// Move `current` a fixed fraction of the way toward `target`.
///
/// With `factor` in (0, 1] the gap shrinks geometrically and never changes
/// sign, so the approach is monotonic on each axis.
#[inline]
pub fn ease_toward(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Drives [`InteractionState`] and the camera distance from raw input.
#[derive(Clone, Debug)]
pub struct InteractionController {
    state: InteractionState,
    drag_sensitivity: f32,
    wheel_sensitivity: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InteractionController {
    pub fn new(auto_rotate: bool) -> Self {
        Self {
            state: InteractionState {
                auto_rotate,
                ..Default::default()
            },
            drag_sensitivity: DRAG_SENSITIVITY,
            wheel_sensitivity: WHEEL_ZOOM_SENSITIVITY,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut InteractionState {
        &mut self.state
    }

    /// Enable or disable auto-rotate. Accumulated rotation is kept.
    pub fn set_auto_rotate(&mut self, on: bool) {
        self.state.auto_rotate = on;
    }

    pub fn handle(&mut self, input: PointerInput, camera: &mut CameraState) {
        match input {
            PointerInput::Down { x, y } | PointerInput::TouchStart { x, y } => {
                self.state.phase = DragPhase::Dragging {
                    last: Vec2::new(x, y),
                };
            }
            PointerInput::Move { x, y } | PointerInput::TouchMove { x, y } => {
                if let DragPhase::Dragging { last } = self.state.phase {
                    let pos = Vec2::new(x, y);
                    let d = pos - last;
                    if d.is_finite() {
                        self.state.target.y += d.x * self.drag_sensitivity;
                        self.state.target.x += d.y * self.drag_sensitivity;
                        self.state.phase = DragPhase::Dragging { last: pos };
                    }
                }
            }
            PointerInput::Up | PointerInput::Leave | PointerInput::TouchEnd => {
                self.state.phase = DragPhase::Idle;
            }
            PointerInput::Wheel { delta_y } => {
                camera.zoom_by(delta_y * self.wheel_sensitivity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_never_overshoots() {
        let mut c = 0.0;
        for _ in 0..100 {
            let next = ease_toward(c, 1.0, ROTATION_EASING);
            assert!(next > c && next <= 1.0);
            c = next;
        }
    }

    #[test]
    fn touch_and_mouse_share_the_drag_path() {
        let mut cam = CameraState::new(100, 100);
        let mut ctl = InteractionController::new(false);
        ctl.handle(PointerInput::TouchStart { x: 0.0, y: 0.0 }, &mut cam);
        ctl.handle(PointerInput::TouchMove { x: 100.0, y: 0.0 }, &mut cam);
        ctl.handle(PointerInput::TouchEnd, &mut cam);
        assert!(!ctl.state().is_dragging());
        assert!((ctl.state().target.y - 100.0 * DRAG_SENSITIVITY).abs() < 1e-6);
        assert_eq!(ctl.state().target.x, 0.0);
    }

    #[test]
    fn drag_accumulates_moves_and_idle_moves_are_ignored() {
        let mut cam = CameraState::new(100, 100);
        let mut ctl = InteractionController::new(false);
        ctl.handle(PointerInput::Down { x: 0.0, y: 0.0 }, &mut cam);
        ctl.handle(PointerInput::Move { x: 10.0, y: 4.0 }, &mut cam);
        ctl.handle(PointerInput::Move { x: 30.0, y: -6.0 }, &mut cam);
        ctl.handle(PointerInput::Up, &mut cam);

        assert_eq!(ctl.state().phase, DragPhase::Idle);
        let target = ctl.state().target;
        // total travel is (30, -6): x drives yaw, y drives pitch
        assert!((target.y - 30.0 * DRAG_SENSITIVITY).abs() < 1e-6);
        assert!((target.x + 6.0 * DRAG_SENSITIVITY).abs() < 1e-6);

        ctl.handle(PointerInput::Move { x: 500.0, y: 500.0 }, &mut cam);
        assert_eq!(ctl.state().target, target);
        assert_eq!(ctl.state().phase, DragPhase::Idle);
    }

    #[test]
    fn move_without_down_leaves_target() {
        let mut cam = CameraState::new(100, 100);
        let mut ctl = InteractionController::new(false);
        ctl.handle(PointerInput::TouchMove { x: 80.0, y: 80.0 }, &mut cam);
        assert_eq!(ctl.state().target, Vec2::ZERO);
    }

    #[test]
    fn leave_ends_the_drag() {
        let mut cam = CameraState::new(100, 100);
        let mut ctl = InteractionController::new(false);
        ctl.handle(PointerInput::Down { x: 5.0, y: 5.0 }, &mut cam);
        ctl.handle(PointerInput::Leave, &mut cam);
        assert_eq!(ctl.state().phase, DragPhase::Idle);
    }

    #[test]
    fn auto_rotate_toggle_keeps_rotation() {
        let mut cam = CameraState::new(100, 100);
        let mut ctl = InteractionController::new(true);
        ctl.handle(PointerInput::Down { x: 0.0, y: 0.0 }, &mut cam);
        ctl.handle(PointerInput::Move { x: 40.0, y: 20.0 }, &mut cam);
        let before = ctl.state().target;
        ctl.set_auto_rotate(false);
        ctl.set_auto_rotate(true);
        assert_eq!(ctl.state().target, before);
    }
}
