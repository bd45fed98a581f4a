use super::types::{InputEvent, Modifiers, PointerButtonEvent, PointerMoveEvent};

/// Current input state for the window.
///
/// Tracks what event translation needs between events: modifiers, focus and
/// the last known pointer position.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y, .. }) => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { modifiers, .. } => {
                self.modifiers = *modifiers;
            }

            InputEvent::PointerButton(PointerButtonEvent { x, y, modifiers, .. }) => {
                self.pointer_pos = Some((*x, *y));
                self.modifiers = *modifiers;
            }
        }
    }

    /// Movement from the last known pointer position to `(x, y)`.
    pub fn pointer_delta(&self, x: f32, y: f32) -> (f32, f32) {
        match self.pointer_pos {
            Some((px, py)) => (x - px, y - py),
            None => (0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, KeyState, MouseButton, MouseButtonState};

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y, dx: 0.0, dy: 0.0 })
    }

    #[test]
    fn pointer_delta_is_zero_without_a_previous_position() {
        let mut state = InputState::default();
        assert_eq!(state.pointer_delta(5.0, 5.0), (0.0, 0.0));

        state.apply_event(&moved(5.0, 5.0));
        assert_eq!(state.pointer_delta(8.0, 1.0), (3.0, -4.0));
    }

    #[test]
    fn leaving_the_window_forgets_the_pointer() {
        let mut state = InputState::default();
        state.apply_event(&moved(5.0, 5.0));
        state.apply_event(&InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);
        assert_eq!(state.pointer_delta(40.0, 40.0), (0.0, 0.0));
    }

    #[test]
    fn button_events_carry_position_and_modifiers() {
        let mut state = InputState::default();
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        state.apply_event(&InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
            x: 10.0,
            y: 20.0,
            modifiers: shift,
        }));
        assert_eq!(state.pointer_pos, Some((10.0, 20.0)));
        assert_eq!(state.modifiers, shift);
    }

    #[test]
    fn key_and_focus_events_update_state() {
        let mut state = InputState::default();
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        state.apply_event(&InputEvent::Key {
            key: Key::ArrowUp,
            state: KeyState::Pressed,
            modifiers: ctrl,
            repeat: false,
        });
        assert_eq!(state.modifiers, ctrl);

        state.apply_event(&InputEvent::Focused(true));
        assert!(state.focused);
        state.apply_event(&InputEvent::Focused(false));
        assert!(!state.focused);
    }
}
