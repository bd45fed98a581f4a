//! Texture assets: decoding and validation before GPU upload.
//!
//! Everything here runs once during setup. Any failure is an
//! [`EngineError::Asset`](crate::error::EngineError::Asset) and aborts setup.

mod cube;
mod image_data;

pub use cube::{CubeFace, CubeFaces, CUBE_FACE_FILES};
pub use image_data::ImageData;
