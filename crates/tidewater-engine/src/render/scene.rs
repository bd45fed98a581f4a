//! Frame orchestration: plan the water and sky, then execute on the GPU.

use crate::assets::{CubeFaces, ImageData};
use crate::error::EngineError;
use crate::render::config::SceneConfig;
use crate::render::mesh::Mesh;
use crate::render::plan::{DrawCall, FrameExecutor, FrameInputs, FramePlan};
use crate::render::skybox::{SkyboxPass, SkyboxRenderer};
use crate::render::uniforms::UniformBuffers;
use crate::render::water::{WaterPass, WaterRenderer};
use crate::render::{RenderCtx, RenderTarget};

/// Builds one `FramePlan` per frame: water writes and draw, then the sky.
#[derive(Debug, Clone)]
pub struct FramePlanner {
    water: WaterPass,
    skybox: SkyboxPass,
}

impl FramePlanner {
    pub fn new(config: &SceneConfig, water_index_count: u32) -> Self {
        Self {
            water: WaterPass::new(config, water_index_count),
            skybox: SkyboxPass::new(config),
        }
    }

    pub fn plan(&self, inputs: &FrameInputs<'_>) -> FramePlan {
        let mut plan = FramePlan::new();
        self.water.record(&mut plan, inputs);
        self.skybox.record(&mut plan, inputs);
        plan
    }
}

/// Owns every GPU object of the scene. Built once before the loop starts.
pub struct SceneRenderer {
    config: SceneConfig,
    planner: FramePlanner,
    uniforms: UniformBuffers,
    water: WaterRenderer,
    skybox: SkyboxRenderer,
}

impl SceneRenderer {
    /// `config` is sanitized before use.
    pub fn new(
        ctx: &RenderCtx<'_>,
        config: SceneConfig,
        faces: &CubeFaces,
        noise: &ImageData,
    ) -> Result<Self, EngineError> {
        let config = config.sanitized();
        let mesh = Mesh::from_kind(config.mesh)?;
        mesh.check_buffer_limit(ctx.device.limits().max_buffer_size)?;

        let uniforms = UniformBuffers::new(ctx.device);
        let water = WaterRenderer::new(ctx, &uniforms, &mesh, noise)?;
        let skybox = SkyboxRenderer::new(ctx, &uniforms, &config, faces)?;
        let planner = FramePlanner::new(&config, water.index_count());

        Ok(Self {
            config,
            planner,
            uniforms,
            water,
            skybox,
        })
    }

    pub fn plan(&self, inputs: &FrameInputs<'_>) -> FramePlan {
        self.planner.plan(inputs)
    }

    /// Executor bound to this frame's encoder and attachments.
    pub fn executor<'a>(
        &'a self,
        ctx: &'a RenderCtx<'a>,
        target: RenderTarget<'a>,
    ) -> GpuFrameExecutor<'a> {
        GpuFrameExecutor {
            scene: self,
            ctx,
            target,
        }
    }
}

/// Performs plan writes on the queue, then records every draw into one pass
/// that clears color and depth.
pub struct GpuFrameExecutor<'a> {
    scene: &'a SceneRenderer,
    ctx: &'a RenderCtx<'a>,
    target: RenderTarget<'a>,
}

impl FrameExecutor for GpuFrameExecutor<'_> {
    fn execute(&mut self, plan: &FramePlan) -> Result<(), EngineError> {
        plan.validate()?;

        for write in plan.writes() {
            self.scene.uniforms.write(self.ctx.queue, write)?;
        }

        let depth_attachment =
            self.target
                .depth_view
                .map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        let mut rpass = self
            .target
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tidewater scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.scene.config.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: depth_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

        for call in plan.draws() {
            log::trace!("draw {call:?}");
            match call {
                DrawCall::Water { index_count } => self.scene.water.draw(&mut rpass, index_count)?,
                DrawCall::SkyboxFullscreen | DrawCall::SkyboxCube { .. } => {
                    self.scene.skybox.draw(&mut rpass, call)?
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraController;
    use crate::render::config::SkyboxMode;
    use crate::render::plan::PlanStep;
    use crate::render::uniforms::UniformRegion;
    use crate::settings::Settings;

    #[test]
    fn water_comes_before_the_sky() {
        let planner = FramePlanner::new(&SceneConfig::default(), 10);
        let settings = Settings::default();
        let plan = planner.plan(&FrameInputs {
            forward: CameraController::new(0.0, 0.0, 0.002).forward(),
            elapsed: 1.0,
            aspect: 1.0,
            settings: &settings,
        });

        let draws: Vec<_> = plan.draws().collect();
        assert_eq!(
            draws,
            vec![DrawCall::Water { index_count: 10 }, DrawCall::SkyboxFullscreen]
        );

        // The skybox matrix is written after the water draw and before its own.
        let steps = plan.steps();
        let n = steps.len();
        assert!(matches!(
            &steps[n - 2],
            PlanStep::Write(w) if w.region == UniformRegion::SkyboxView
        ));
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn direct_view_plans_a_cube() {
        let config = SceneConfig {
            skybox_mode: SkyboxMode::DirectView,
            ..SceneConfig::default()
        };
        let planner = FramePlanner::new(&config, 10);
        let settings = Settings::default();
        let plan = planner.plan(&FrameInputs {
            forward: glam::Vec3::Z,
            elapsed: 0.0,
            aspect: 2.0,
            settings: &settings,
        });
        assert!(plan.draws().any(|d| d == DrawCall::SkyboxCube { index_count: 36 }));
    }
}
