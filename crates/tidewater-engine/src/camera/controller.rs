use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use crate::input::{InputEvent, MouseButton, MouseButtonState, PointerButtonEvent};

/// Margin kept between pitch and the poles so `look_at` never sees a forward
/// vector parallel to `+Y`.
pub const PITCH_EPSILON: f32 = 0.01;

const PITCH_LIMIT: f32 = FRAC_PI_2 - PITCH_EPSILON;

/// Drag state machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Yaw/pitch camera driven by primary-button drags.
///
/// Owned by the application and read by the renderers once per frame.
#[derive(Debug, Clone)]
pub struct CameraController {
    yaw: f32,
    pitch: f32,
    sensitivity: f32,
    state: DragState,
}

impl CameraController {
    /// Default radians per logical pixel of pointer movement.
    pub const DEFAULT_SENSITIVITY: f32 = 0.002;

    pub fn new(yaw: f32, pitch: f32, sensitivity: f32) -> Self {
        Self {
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            sensitivity,
            state: DragState::Idle,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cp * sy, sp, cp * cy)
    }

    pub fn button_down(&mut self, button: MouseButton) {
        if button.is_primary() {
            self.state = DragState::Dragging;
        }
    }

    pub fn button_up(&mut self, button: MouseButton) {
        if button.is_primary() {
            self.state = DragState::Idle;
        }
    }

    /// Ends any drag, e.g. on focus loss.
    pub fn cancel_drag(&mut self) {
        self.state = DragState::Idle;
    }

    /// Applies pointer movement. Ignored unless dragging.
    ///
    /// Dragging right turns the view right; dragging up tilts it up.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        if self.state != DragState::Dragging {
            return;
        }

        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Feeds an engine input event through the state machine.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerButton(PointerButtonEvent { button, state, .. }) => match state {
                MouseButtonState::Pressed => self.button_down(*button),
                MouseButtonState::Released => self.button_up(*button),
            },
            InputEvent::PointerMoved(m) => self.pointer_moved(m.dx, m.dy),
            InputEvent::Focused(false) | InputEvent::PointerLeft => self.cancel_drag(),
            _ => {}
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.0, 0.0, Self::DEFAULT_SENSITIVITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Modifiers, PointerMoveEvent};

    fn drag(cam: &mut CameraController, dx: f32, dy: f32) {
        cam.button_down(MouseButton::Left);
        cam.pointer_moved(dx, dy);
        cam.button_up(MouseButton::Left);
    }

    #[test]
    fn forward_at_rest_points_down_positive_z() {
        let f = CameraController::default().forward();
        assert!(f.x.abs() < 1e-6);
        assert!(f.y.abs() < 1e-6);
        assert!((f.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn forward_is_unit_length() {
        let cam = CameraController::new(2.3, -0.7, 0.002);
        assert!((cam.forward().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn moves_without_button_do_nothing() {
        let mut cam = CameraController::default();
        cam.pointer_moved(300.0, -120.0);
        assert_eq!(cam.yaw(), 0.0);
        assert_eq!(cam.pitch(), 0.0);
        assert_eq!(cam.state(), DragState::Idle);
    }

    #[test]
    fn secondary_button_does_not_start_a_drag() {
        let mut cam = CameraController::default();
        cam.button_down(MouseButton::Right);
        assert_eq!(cam.state(), DragState::Idle);
        cam.pointer_moved(100.0, 0.0);
        assert_eq!(cam.yaw(), 0.0);
    }

    #[test]
    fn dragging_right_turns_right() {
        let mut cam = CameraController::default();
        drag(&mut cam, 100.0, 0.0);
        assert!((cam.yaw() + 0.2).abs() < 1e-6);
        // Looking down +Z, screen-right is -X.
        assert!(cam.forward().x < 0.0);
    }

    #[test]
    fn dragging_up_tilts_up() {
        let mut cam = CameraController::default();
        drag(&mut cam, 0.0, -50.0);
        assert!(cam.pitch() > 0.0);
        assert!(cam.forward().y > 0.0);
    }

    #[test]
    fn pitch_stays_clamped_under_huge_drags() {
        let mut cam = CameraController::default();
        for _ in 0..1000 {
            drag(&mut cam, 0.0, -10_000.0);
            assert!(cam.pitch() < FRAC_PI_2 - PITCH_EPSILON + 1e-6);
        }
        for _ in 0..1000 {
            drag(&mut cam, 0.0, 10_000.0);
            assert!(cam.pitch() > -FRAC_PI_2 + PITCH_EPSILON - 1e-6);
        }
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut cam = CameraController::default();
        for _ in 0..100 {
            drag(&mut cam, -10_000.0, 0.0);
        }
        assert!(cam.yaw() > 2.0 * std::f32::consts::PI);
        assert!((cam.forward().length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn events_drive_the_state_machine() {
        let mut cam = CameraController::default();
        let button = |state| {
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state,
                x: 0.0,
                y: 0.0,
                modifiers: Modifiers::default(),
            })
        };
        let moved = InputEvent::PointerMoved(PointerMoveEvent { x: 5.0, y: 0.0, dx: 5.0, dy: 0.0 });

        cam.handle_event(&button(MouseButtonState::Pressed));
        assert_eq!(cam.state(), DragState::Dragging);
        cam.handle_event(&moved);
        let yaw = cam.yaw();
        assert!(yaw < 0.0);

        cam.handle_event(&InputEvent::Focused(false));
        assert_eq!(cam.state(), DragState::Idle);
        cam.handle_event(&moved);
        assert_eq!(cam.yaw(), yaw);
    }
}
