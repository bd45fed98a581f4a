//! Camera: pointer-drag orientation plus the projection used by both renderers.
//!
//! The controller only tracks *direction*. The water renderer places it at a
//! configured eye position; the skybox uses it from the origin.

mod controller;
mod projection;

pub use controller::{CameraController, DragState, PITCH_EPSILON};
pub use projection::{direction_view, Projection};
