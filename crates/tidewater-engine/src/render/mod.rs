//! GPU rendering subsystem.
//!
//! A frame is planned first (`FramePlan`: ordered uniform writes and draw
//! calls) and then handed to a `FrameExecutor`. `SceneRenderer` owns every GPU
//! object and provides the executor that talks to wgpu.
//!
//! Convention:
//! - Right-handed world, `+Y` up, wgpu `[0, 1]` clip depth.
//! - Matrices are uploaded column-major.

mod config;
mod ctx;
mod mesh;
mod plan;
mod scene;
mod skybox;
mod texture;
pub mod uniforms;
mod water;

pub use config::{SceneConfig, SkyboxMode};
pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::{Mesh, MeshBuffers, MeshKind, Vertex};
pub use plan::{DrawCall, FrameExecutor, FrameInputs, FramePlan, PlanStep};
pub use scene::{FramePlanner, GpuFrameExecutor, SceneRenderer};
pub use skybox::{SkyboxPass, SkyboxRenderer};
pub use water::{WaterPass, WaterRenderer};

#[cfg(test)]
pub(crate) use plan::recording::RecordingExecutor;
