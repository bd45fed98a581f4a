use glam::{Mat4, Vec3};

use crate::assets::ImageData;
use crate::camera::Projection;
use crate::error::EngineError;
use crate::render::config::SceneConfig;
use crate::render::mesh::{draw_range, Mesh, MeshBuffers, Vertex};
use crate::render::plan::{DrawCall, FrameInputs, FramePlan};
use crate::render::texture;
use crate::render::uniforms::{
    uniform_layout_entry, SceneOptionsUniform, TimeUniform, UniformBuffers, UniformRegion,
    UniformWrite, WaveOptionsUniform, TRANSFORM_MODEL_OFFSET, TRANSFORM_PROJECTION_OFFSET,
    TRANSFORM_VIEW_OFFSET,
};
use crate::render::RenderCtx;

/// Per-frame uniform writes and draw of the water surface.
#[derive(Debug, Clone)]
pub struct WaterPass {
    eye: Vec3,
    model: Mat4,
    projection: Projection,
    index_count: u32,
}

impl WaterPass {
    pub fn new(config: &SceneConfig, index_count: u32) -> Self {
        Self {
            eye: config.eye,
            model: config.model,
            projection: config.projection,
            index_count,
        }
    }

    /// Look-at from the eye toward `eye + forward`, `+Y` up.
    pub fn view(&self, forward: Vec3) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.eye + forward, Vec3::Y)
    }

    pub fn record(&self, plan: &mut FramePlan, inputs: &FrameInputs<'_>) {
        let projection = self.projection.matrix(inputs.aspect);
        let view = self.view(inputs.forward);

        plan.write(UniformWrite::mat4(
            UniformRegion::Transform,
            TRANSFORM_MODEL_OFFSET,
            &self.model,
        ));
        plan.write(UniformWrite::mat4(
            UniformRegion::Transform,
            TRANSFORM_VIEW_OFFSET,
            &view,
        ));
        plan.write(UniformWrite::mat4(
            UniformRegion::Transform,
            TRANSFORM_PROJECTION_OFFSET,
            &projection,
        ));
        plan.write(UniformWrite::pod(
            UniformRegion::Time,
            0,
            &TimeUniform {
                elapsed: inputs.elapsed,
            },
        ));
        plan.write(UniformWrite::pod(
            UniformRegion::WaveOptions,
            0,
            &WaveOptionsUniform::from(&inputs.settings.wave),
        ));
        plan.write(UniformWrite::pod(
            UniformRegion::SceneOptions,
            0,
            &SceneOptionsUniform::from(&inputs.settings.scene),
        ));
        plan.draw(DrawCall::Water {
            index_count: self.index_count,
        });
    }
}

/// GPU side of the water surface. Every resource is created in `new`.
pub struct WaterRenderer {
    pipeline: wgpu::RenderPipeline,
    uniforms_bind_group: wgpu::BindGroup,
    noise_bind_group: wgpu::BindGroup,
    mesh: MeshBuffers,
    index_format: wgpu::IndexFormat,
    _noise: wgpu::Texture,
}

impl WaterRenderer {
    pub fn new(
        ctx: &RenderCtx<'_>,
        uniforms: &UniformBuffers,
        mesh: &Mesh,
        noise: &ImageData,
    ) -> Result<Self, EngineError> {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tidewater water shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/water.wgsl").into()),
        });

        let uniforms_bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tidewater water uniforms bgl"),
                entries: &[
                    uniform_layout_entry(
                        0,
                        UniformRegion::Transform,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ),
                    uniform_layout_entry(
                        1,
                        UniformRegion::Time,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ),
                    uniform_layout_entry(
                        2,
                        UniformRegion::WaveOptions,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ),
                    uniform_layout_entry(
                        3,
                        UniformRegion::SceneOptions,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ),
                ],
            });

        let noise_bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tidewater water noise bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
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
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("tidewater water pipeline layout"),
                bind_group_layouts: &[&uniforms_bgl, &noise_bgl],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("tidewater water pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
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
                    topology: mesh.topology,
                    strip_index_format: mesh.strip_index_format(),
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: ctx.depth_format.map(|format| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let uniforms_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tidewater water uniforms bind group"),
            layout: &uniforms_bgl,
            entries: &[
                uniforms.binding(0, UniformRegion::Transform)?,
                uniforms.binding(1, UniformRegion::Time)?,
                uniforms.binding(2, UniformRegion::WaveOptions)?,
                uniforms.binding(3, UniformRegion::SceneOptions)?,
            ],
        });

        let noise_texture = texture::upload_2d(ctx.device, ctx.queue, noise, "tidewater noise");
        let noise_view = noise_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let noise_sampler = texture::linear_sampler(
            ctx.device,
            wgpu::AddressMode::Repeat,
            "tidewater noise sampler",
        );

        let noise_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tidewater water noise bind group"),
            layout: &noise_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&noise_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&noise_sampler),
                },
            ],
        });

        let mesh_buffers = MeshBuffers::upload(ctx.device, mesh, "tidewater water mesh");

        log::info!(
            "water renderer ready ({} vertices, {} indices, {:?})",
            mesh.vertex_count(),
            mesh.index_count(),
            mesh.topology
        );

        Ok(Self {
            pipeline,
            uniforms_bind_group,
            noise_bind_group,
            mesh: mesh_buffers,
            index_format: wgpu::IndexFormat::Uint32,
            _noise: noise_texture,
        })
    }

    pub fn index_count(&self) -> u32 {
        self.mesh.index_count
    }

    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, index_count: u32) -> Result<(), EngineError> {
        let range = draw_range("water", index_count, self.mesh.index_count)?;
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.uniforms_bind_group, &[]);
        rpass.set_bind_group(1, &self.noise_bind_group, &[]);
        rpass.set_vertex_buffer(0, self.mesh.vertex.slice(..));
        rpass.set_index_buffer(self.mesh.index.slice(..), self.index_format);
        rpass.draw_indexed(range, 0, 0..1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraController;
    use crate::render::plan::PlanStep;
    use crate::render::uniforms::UniformMirror;
    use crate::settings::{MemoryStore, Settings, SettingsStore};

    fn inputs(settings: &Settings) -> FrameInputs<'_> {
        FrameInputs {
            forward: CameraController::new(0.0, -0.25, 0.002).forward(),
            elapsed: 3.5,
            aspect: 16.0 / 9.0,
            settings,
        }
    }

    fn run(plan: &FramePlan) -> UniformMirror {
        let mut mirror = UniformMirror::new();
        for w in plan.writes() {
            mirror.apply(w).unwrap();
        }
        mirror
    }

    #[test]
    fn writes_precede_the_draw() {
        let settings = Settings::default();
        let pass = WaterPass::new(&SceneConfig::default(), 99);
        let mut plan = FramePlan::new();
        pass.record(&mut plan, &inputs(&settings));

        let steps = plan.steps();
        assert_eq!(steps.len(), 7);
        assert!(steps[..6].iter().all(|s| matches!(s, PlanStep::Write(_))));
        assert_eq!(steps[6], PlanStep::Draw(DrawCall::Water { index_count: 99 }));
    }

    #[test]
    fn transform_region_holds_model_view_projection() {
        let settings = Settings::default();
        let config = SceneConfig::default();
        let pass = WaterPass::new(&config, 4);
        let frame = inputs(&settings);
        let mut plan = FramePlan::new();
        pass.record(&mut plan, &frame);
        let mirror = run(&plan);

        assert_eq!(mirror.read_mat4(UniformRegion::Transform, 0), Some(Mat4::IDENTITY));
        assert_eq!(
            mirror.read_mat4(UniformRegion::Transform, 64),
            Some(pass.view(frame.forward))
        );
        assert_eq!(
            mirror.read_mat4(UniformRegion::Transform, 128),
            Some(config.projection.matrix(frame.aspect))
        );
        assert_eq!(mirror.read_f32(UniformRegion::Time, 0), Some(3.5));
    }

    #[test]
    fn stored_settings_reach_wave_options() {
        let mut store = MemoryStore::default();
        store.set("amplitude", "2.5".into());
        store.set("sunPosition", "0.25".into());
        let settings = Settings::load(&store);

        let pass = WaterPass::new(&SceneConfig::default(), 4);
        let mut plan = FramePlan::new();
        pass.record(&mut plan, &inputs(&settings));
        let mirror = run(&plan);

        assert_eq!(mirror.read_f32(UniformRegion::WaveOptions, 0), Some(2.5));
        assert_eq!(mirror.read_f32(UniformRegion::WaveOptions, 4), Some(1.0));
        assert_eq!(mirror.read_f32(UniformRegion::WaveOptions, 16), Some(0.0));
        assert_eq!(mirror.read_f32(UniformRegion::SceneOptions, 0), Some(0.25));
    }

    #[test]
    fn view_looks_from_the_eye() {
        let pass = WaterPass::new(&SceneConfig::default(), 4);
        let view = pass.view(Vec3::Z);
        let eye_in_view = view.transform_point3(SceneConfig::default().eye);
        assert!(eye_in_view.length() < 1e-5);
    }
}
