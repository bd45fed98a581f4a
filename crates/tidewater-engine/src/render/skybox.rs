use glam::{Mat4, Vec3};

use crate::assets::CubeFaces;
use crate::camera::{direction_view, Projection};
use crate::error::EngineError;
use crate::render::config::{SceneConfig, SkyboxMode};
use crate::render::mesh::{draw_range, Mesh, MeshBuffers, Vertex};
use crate::render::plan::{DrawCall, FrameInputs, FramePlan};
use crate::render::texture;
use crate::render::uniforms::{uniform_layout_entry, UniformBuffers, UniformRegion, UniformWrite};
use crate::render::RenderCtx;

/// Per-frame matrix write and draw of the background.
#[derive(Debug, Clone)]
pub struct SkyboxPass {
    mode: SkyboxMode,
    projection: Projection,
    cube_index_count: u32,
}

impl SkyboxPass {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            mode: config.skybox_mode,
            projection: config.projection,
            cube_index_count: Mesh::unit_cube().index_count(),
        }
    }

    pub fn mode(&self) -> SkyboxMode {
        self.mode
    }

    /// Direction matrix for the current mode. Camera position never enters it.
    pub fn matrix(&self, forward: Vec3, aspect: f32) -> Mat4 {
        let view_projection = self.projection.matrix(aspect) * direction_view(forward);
        match self.mode {
            SkyboxMode::InverseViewProjection => view_projection.inverse(),
            SkyboxMode::DirectView => view_projection,
        }
    }

    pub fn record(&self, plan: &mut FramePlan, inputs: &FrameInputs<'_>) {
        plan.write(UniformWrite::mat4(
            UniformRegion::SkyboxView,
            0,
            &self.matrix(inputs.forward, inputs.aspect),
        ));
        plan.draw(match self.mode {
            SkyboxMode::InverseViewProjection => DrawCall::SkyboxFullscreen,
            SkyboxMode::DirectView => DrawCall::SkyboxCube {
                index_count: self.cube_index_count,
            },
        });
    }
}

/// GPU side of the background: cube texture, pipeline, and the unit cube when
/// drawing in `DirectView` mode.
pub struct SkyboxRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    cube: Option<MeshBuffers>,
    _texture: wgpu::Texture,
}

impl SkyboxRenderer {
    pub fn new(
        ctx: &RenderCtx<'_>,
        uniforms: &UniformBuffers,
        config: &SceneConfig,
        faces: &CubeFaces,
    ) -> Result<Self, EngineError> {
        let (shader_src, label) = match config.skybox_mode {
            SkyboxMode::InverseViewProjection => {
                (include_str!("shaders/skybox.wgsl"), "tidewater skybox shader")
            }
            SkyboxMode::DirectView => (
                include_str!("shaders/skybox_cube.wgsl"),
                "tidewater skybox cube shader",
            ),
        };
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tidewater skybox bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    uniform_layout_entry(
                        2,
                        UniformRegion::SkyboxView,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ),
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("tidewater skybox pipeline layout"),
                bind_group_layouts: &[&bgl],
                immediate_size: 0,
            });

        let cube_layout = [Vertex::layout()];
        let vertex_buffers = match config.skybox_mode {
            SkyboxMode::InverseViewProjection => &cube_layout[..0],
            SkyboxMode::DirectView => &cube_layout[..],
        };

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("tidewater skybox pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: vertex_buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                // Sky sits at depth 1.0, so LessEqual keeps it behind the water.
                depth_stencil: ctx.depth_format.map(|format| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: config.skybox_depth_write,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let cube_texture = texture::upload_cube(ctx.device, ctx.queue, faces, "tidewater skybox");
        let cube_view = cube_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("tidewater skybox view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(6),
            ..Default::default()
        });
        let sampler = texture::linear_sampler(
            ctx.device,
            wgpu::AddressMode::ClampToEdge,
            "tidewater skybox sampler",
        );

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tidewater skybox bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                uniforms.binding(2, UniformRegion::SkyboxView)?,
            ],
        });

        let cube = match config.skybox_mode {
            SkyboxMode::InverseViewProjection => None,
            SkyboxMode::DirectView => Some(MeshBuffers::upload(
                ctx.device,
                &Mesh::unit_cube(),
                "tidewater skybox cube",
            )),
        };

        log::info!(
            "skybox renderer ready ({:?}, depth write {})",
            config.skybox_mode,
            config.skybox_depth_write
        );

        Ok(Self {
            pipeline,
            bind_group,
            cube,
            _texture: cube_texture,
        })
    }

    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, call: DrawCall) -> Result<(), EngineError> {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);

        match (call, self.cube.as_ref()) {
            (DrawCall::SkyboxFullscreen, None) => {
                rpass.draw(0..3, 0..1);
                Ok(())
            }
            (DrawCall::SkyboxCube { index_count }, Some(cube)) => {
                let range = draw_range("skybox cube", index_count, cube.index_count)?;
                rpass.set_vertex_buffer(0, cube.vertex.slice(..));
                rpass.set_index_buffer(cube.index.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(range, 0, 0..1);
                Ok(())
            }
            (call, _) => Err(EngineError::Frame(format!(
                "{call:?} does not match the configured skybox pipeline"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraController;
    use crate::settings::Settings;

    fn pass(mode: SkyboxMode) -> SkyboxPass {
        SkyboxPass::new(&SceneConfig {
            skybox_mode: mode,
            ..SceneConfig::default()
        })
    }

    fn approx(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    #[test]
    fn inverse_mode_inverts_direct_mode() {
        let forward = CameraController::new(0.7, 0.3, 0.002).forward();
        let inv = pass(SkyboxMode::InverseViewProjection).matrix(forward, 1.5);
        let direct = pass(SkyboxMode::DirectView).matrix(forward, 1.5);
        assert!(approx(inv * direct, Mat4::IDENTITY));
    }

    #[test]
    fn matrix_ignores_camera_position() {
        let a = SkyboxPass::new(&SceneConfig::default());
        let b = SkyboxPass::new(&SceneConfig {
            eye: Vec3::new(40.0, -3.0, 12.0),
            ..SceneConfig::default()
        });
        let forward = Vec3::new(0.2, -0.1, 0.9).normalize();
        assert_eq!(a.matrix(forward, 1.0), b.matrix(forward, 1.0));
    }

    #[test]
    fn screen_centre_unprojects_along_forward() {
        let forward = CameraController::new(-1.1, 0.4, 0.002).forward();
        let inv = pass(SkyboxMode::InverseViewProjection).matrix(forward, 1.0);
        let p = inv * glam::Vec4::new(0.0, 0.0, 1.0, 1.0);
        let dir = (p.truncate() / p.w).normalize();
        assert!((dir - forward.normalize()).length() < 1e-3);
    }

    #[test]
    fn draw_call_follows_mode() {
        let settings = Settings::default();
        let inputs = FrameInputs {
            forward: Vec3::Z,
            elapsed: 0.0,
            aspect: 1.0,
            settings: &settings,
        };

        let mut plan = FramePlan::new();
        pass(SkyboxMode::InverseViewProjection).record(&mut plan, &inputs);
        assert_eq!(plan.draws().collect::<Vec<_>>(), vec![DrawCall::SkyboxFullscreen]);

        let mut plan = FramePlan::new();
        pass(SkyboxMode::DirectView).record(&mut plan, &inputs);
        assert_eq!(
            plan.draws().collect::<Vec<_>>(),
            vec![DrawCall::SkyboxCube { index_count: 36 }]
        );
        assert_eq!(plan.writes().count(), 1);
    }
}
