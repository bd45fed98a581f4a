//! Tidewater engine crate.
//!
//! Platform + GPU runtime for the animated water scene: window and frame loop,
//! device and surface management, camera and settings state, and the water and
//! skybox renderers.

pub mod assets;
pub mod camera;
pub mod core;
pub mod device;
pub mod error;
pub mod input;
pub mod logging;
pub mod render;
pub mod scheduler;
pub mod settings;
pub mod time;
pub mod window;

pub use error::EngineError;
