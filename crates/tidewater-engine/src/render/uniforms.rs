//! Byte layout of every uniform region shared with the shaders.
//!
//! The offsets below are mirrored in `shaders/*.wgsl`. Changing one without the
//! other silently corrupts rendering.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::error::EngineError;
use crate::settings::{SceneParams, WaveParams};

pub const MAT4_SIZE: u64 = 64;

pub const TRANSFORM_MODEL_OFFSET: u64 = 0;
pub const TRANSFORM_VIEW_OFFSET: u64 = 64;
pub const TRANSFORM_PROJECTION_OFFSET: u64 = 128;

/// Uniform buffer sizes are rounded up to this.
const BUFFER_ALIGN: u64 = 16;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformRegion {
    /// model / view / projection, 3 × mat4.
    Transform,
    /// Elapsed seconds.
    Time,
    /// Seven wave parameters.
    WaveOptions,
    /// Sun position.
    SceneOptions,
    /// Skybox direction matrix.
    SkyboxView,
}

impl UniformRegion {
    pub const ALL: [UniformRegion; 5] = [
        UniformRegion::Transform,
        UniformRegion::Time,
        UniformRegion::WaveOptions,
        UniformRegion::SceneOptions,
        UniformRegion::SkyboxView,
    ];

    /// Bytes the shader reads.
    pub const fn size(self) -> u64 {
        match self {
            UniformRegion::Transform => 3 * MAT4_SIZE,
            UniformRegion::Time => std::mem::size_of::<TimeUniform>() as u64,
            UniformRegion::WaveOptions => std::mem::size_of::<WaveOptionsUniform>() as u64,
            UniformRegion::SceneOptions => std::mem::size_of::<SceneOptionsUniform>() as u64,
            UniformRegion::SkyboxView => MAT4_SIZE,
        }
    }

    /// Size of the backing buffer.
    pub const fn buffer_size(self) -> u64 {
        self.size().div_ceil(BUFFER_ALIGN) * BUFFER_ALIGN
    }

    pub fn label(self) -> &'static str {
        match self {
            UniformRegion::Transform => "tidewater transform ubo",
            UniformRegion::Time => "tidewater time ubo",
            UniformRegion::WaveOptions => "tidewater wave options ubo",
            UniformRegion::SceneOptions => "tidewater scene options ubo",
            UniformRegion::SkyboxView => "tidewater skybox view ubo",
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TimeUniform {
    pub elapsed: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct WaveOptionsUniform {
    pub amplitude: f32,
    pub frequency: f32,
    pub amplitude_multiplier: f32,
    pub frequency_multiplier: f32,
    pub base_phase: f32,
    pub base_speed: f32,
    pub max_waves: f32,
}

impl From<&WaveParams> for WaveOptionsUniform {
    fn from(w: &WaveParams) -> Self {
        Self {
            amplitude: w.amplitude,
            frequency: w.frequency,
            amplitude_multiplier: w.amplitude_multiplier,
            frequency_multiplier: w.frequency_multiplier,
            base_phase: w.base_phase,
            base_speed: w.base_speed,
            max_waves: w.max_waves,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneOptionsUniform {
    pub sun_position: f32,
}

impl From<&SceneParams> for SceneOptionsUniform {
    fn from(s: &SceneParams) -> Self {
        Self {
            sun_position: s.sun_position,
        }
    }
}

/// One `Queue::write_buffer` worth of data.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformWrite {
    pub region: UniformRegion,
    pub offset: u64,
    pub data: Vec<u8>,
}

impl UniformWrite {
    pub fn pod<T: Pod>(region: UniformRegion, offset: u64, value: &T) -> Self {
        Self {
            region,
            offset,
            data: bytemuck::bytes_of(value).to_vec(),
        }
    }

    /// Column-major, as WGSL `mat4x4<f32>` expects.
    pub fn mat4(region: UniformRegion, offset: u64, m: &Mat4) -> Self {
        Self::pod(region, offset, &m.to_cols_array())
    }

    /// Checks the write stays inside its region.
    pub fn validate(&self) -> Result<(), EngineError> {
        let end = self.offset + self.data.len() as u64;
        if end > self.region.size() {
            return Err(EngineError::Frame(format!(
                "{:?} write [{}..{}) exceeds region size {}",
                self.region,
                self.offset,
                end,
                self.region.size()
            )));
        }
        // wgpu requires 4-byte aligned buffer writes.
        if self.offset % 4 != 0 || self.data.len() % 4 != 0 {
            return Err(EngineError::Frame(format!(
                "{:?} write at {} is not 4-byte aligned",
                self.region, self.offset
            )));
        }
        Ok(())
    }
}

/// Host-side image of every uniform region.
///
/// Applies writes exactly as the queue would, which lets layout and frame
/// ordering be checked without a device.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct UniformMirror {
    regions: HashMap<UniformRegion, Vec<u8>>,
}

#[cfg(test)]
impl UniformMirror {
    pub fn new() -> Self {
        Self {
            regions: UniformRegion::ALL
                .into_iter()
                .map(|r| (r, vec![0u8; r.size() as usize]))
                .collect(),
        }
    }

    pub fn apply(&mut self, write: &UniformWrite) -> Result<(), EngineError> {
        write.validate()?;
        let start = write.offset as usize;
        let bytes = self
            .regions
            .get_mut(&write.region)
            .ok_or_else(|| EngineError::Frame(format!("unknown region {:?}", write.region)))?;
        bytes[start..start + write.data.len()].copy_from_slice(&write.data);
        Ok(())
    }

    pub fn bytes(&self, region: UniformRegion) -> &[u8] {
        self.regions.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `None` when `offset..offset + len` falls outside the region.
    fn read(&self, region: UniformRegion, offset: u64, len: usize) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        self.bytes(region).get(start..start.checked_add(len)?)
    }

    pub fn read_f32(&self, region: UniformRegion, offset: u64) -> Option<f32> {
        self.read(region, offset, 4).map(bytemuck::pod_read_unaligned)
    }

    pub fn read_mat4(&self, region: UniformRegion, offset: u64) -> Option<Mat4> {
        let cols: [f32; 16] =
            bytemuck::pod_read_unaligned(self.read(region, offset, MAT4_SIZE as usize)?);
        Some(Mat4::from_cols_array(&cols))
    }
}

#[cfg(test)]
impl Default for UniformMirror {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU buffers backing the regions. Created once at setup.
pub struct UniformBuffers {
    buffers: HashMap<UniformRegion, wgpu::Buffer>,
}

impl UniformBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffers = UniformRegion::ALL
            .into_iter()
            .map(|region| {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(region.label()),
                    size: region.buffer_size(),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                (region, buffer)
            })
            .collect();

        Self { buffers }
    }

    pub fn buffer(&self, region: UniformRegion) -> Result<&wgpu::Buffer, EngineError> {
        self.buffers
            .get(&region)
            .ok_or_else(|| EngineError::Frame(format!("no buffer for {region:?}")))
    }

    /// Bind group entry exposing exactly the bytes the shader reads.
    pub fn binding(
        &self,
        binding: u32,
        region: UniformRegion,
    ) -> Result<wgpu::BindGroupEntry<'_>, EngineError> {
        Ok(wgpu::BindGroupEntry {
            binding,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: self.buffer(region)?,
                offset: 0,
                size: std::num::NonZeroU64::new(region.buffer_size()),
            }),
        })
    }

    pub fn write(&self, queue: &wgpu::Queue, write: &UniformWrite) -> Result<(), EngineError> {
        write.validate()?;
        queue.write_buffer(self.buffer(write.region)?, write.offset, &write.data);
        Ok(())
    }
}

/// Layout entry for a uniform buffer binding of `region`.
pub(crate) fn uniform_layout_entry(
    binding: u32,
    region: UniformRegion,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: std::num::NonZeroU64::new(region.size()),
        },
        count: None,
    }
}
