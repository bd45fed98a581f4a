//! Procedural meshes and their one-time GPU upload.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::error::EngineError;

/// Position-only vertex, 12 bytes, shader location 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Geometry drawn as the water surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MeshKind {
    /// A single triangle; handy for bring-up of a new backend.
    Triangle,
    /// Grid over `[-size, size]²` on the `y = 0` plane.
    Plane { size: f32, detail: u32 },
}

impl MeshKind {
    pub const DEFAULT_PLANE_SIZE: f32 = 2.0;
    pub const DEFAULT_PLANE_DETAIL: u32 = 128;
    /// Largest grid the generator accepts: 2049² vertices, about 48 MiB of
    /// vertex data and 32 MiB of indices.
    pub const MAX_PLANE_DETAIL: u32 = 2048;
}

impl Default for MeshKind {
    fn default() -> Self {
        MeshKind::Plane {
            size: Self::DEFAULT_PLANE_SIZE,
            detail: Self::DEFAULT_PLANE_DETAIL,
        }
    }
}

/// CPU-side mesh. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: wgpu::PrimitiveTopology,
}

impl Mesh {
    pub fn from_kind(kind: MeshKind) -> Result<Self, EngineError> {
        match kind {
            MeshKind::Triangle => Ok(Self::triangle()),
            MeshKind::Plane { size, detail } => Self::plane(size, detail),
        }
    }

    /// Tessellated plane drawn as one triangle strip.
    ///
    /// Rows are joined by a degenerate pair (last top, first vertex of the next
    /// row), so the index count is `2·(detail+1)·detail + 2·(detail−1)`.
    pub fn plane(size: f32, detail: u32) -> Result<Self, EngineError> {
        if detail == 0 {
            return Err(EngineError::Config("plane detail must be at least 1".into()));
        }
        if detail > MeshKind::MAX_PLANE_DETAIL {
            return Err(EngineError::Config(format!(
                "plane detail {detail} exceeds the maximum of {}",
                MeshKind::MAX_PLANE_DETAIL
            )));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(EngineError::Config(format!("plane size must be positive, got {size}")));
        }

        let row = detail + 1;
        let inv = 1.0 / detail as f32;
        let vertex_count = row
            .checked_mul(row)
            .ok_or_else(|| EngineError::Config(format!("plane detail {detail} overflows u32 indices")))?;

        let mut vertices = Vec::with_capacity(vertex_count as usize);
        for y in 0..=detail {
            for x in 0..=detail {
                let u = x as f32 * inv;
                let v = y as f32 * inv;
                vertices.push(Vertex {
                    position: [u * 2.0 * size - size, 0.0, v * 2.0 * size - size],
                });
            }
        }

        let mut indices = Vec::with_capacity(plane_index_count(detail));
        for y in 0..detail {
            for x in 0..=detail {
                indices.push(y * row + x);
                indices.push((y + 1) * row + x);
            }
            if y + 1 < detail {
                // Degenerate pair: repeat the last top, then jump to the next row start.
                indices.push((y + 1) * row + detail);
                indices.push((y + 1) * row);
            }
        }

        Ok(Self {
            vertices,
            indices,
            topology: wgpu::PrimitiveTopology::TriangleStrip,
        })
    }

    pub fn triangle() -> Self {
        Self {
            vertices: vec![
                Vertex { position: [0.0, 0.5, 0.0] },
                Vertex { position: [-0.5, -0.5, 0.0] },
                Vertex { position: [0.5, -0.5, 0.0] },
            ],
            indices: vec![0, 1, 2],
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }

    /// Axis-aligned cube of half-extent 1 around the origin, 36 indices.
    pub fn unit_cube() -> Self {
        let vertices = [
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
        ]
        .map(|position| Vertex { position })
        .to_vec();

        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 2, 3, 0, // -Z
            5, 4, 7, 7, 6, 5, // +Z
            4, 0, 3, 3, 7, 4, // -X
            1, 5, 6, 6, 2, 1, // +X
            3, 2, 6, 6, 7, 3, // +Y
            4, 5, 1, 1, 0, 4, // -Y
        ];

        Self {
            vertices,
            indices,
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Fails when either buffer would exceed the device's `max_buffer_size`.
    pub fn check_buffer_limit(&self, max_buffer_size: u64) -> Result<(), EngineError> {
        let vertex_bytes = self.vertices.len() as u64 * Vertex::STRIDE;
        let index_bytes = self.indices.len() as u64 * std::mem::size_of::<u32>() as u64;
        let largest = vertex_bytes.max(index_bytes);
        if largest > max_buffer_size {
            return Err(EngineError::Config(format!(
                "mesh needs a {largest} byte buffer; the device allows {max_buffer_size}"
            )));
        }
        Ok(())
    }

    /// Index format the pipeline must declare for strip topologies.
    pub fn strip_index_format(&self) -> Option<wgpu::IndexFormat> {
        match self.topology {
            wgpu::PrimitiveTopology::TriangleStrip | wgpu::PrimitiveTopology::LineStrip => {
                Some(wgpu::IndexFormat::Uint32)
            }
            _ => None,
        }
    }
}

fn plane_index_count(detail: u32) -> usize {
    let d = detail as usize;
    2 * (d + 1) * d + 2 * (d - 1)
}

/// Index range for a planned draw. A plan that asks for more indices than were
/// uploaded no longer matches the pipeline.
pub(crate) fn draw_range(
    label: &str,
    requested: u32,
    uploaded: u32,
) -> Result<std::ops::Range<u32>, EngineError> {
    if requested > uploaded {
        return Err(EngineError::Frame(format!(
            "{label} draw wants {requested} indices but only {uploaded} were uploaded"
        )));
    }
    Ok(0..requested)
}

/// Vertex + index buffers uploaded once.
pub struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn upload(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vbo")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} ibo")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "uploaded {label}: {} vertices, {} indices",
            mesh.vertex_count(),
            mesh.index_count()
        );

        Self {
            vertex,
            index,
            index_count: mesh.index_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_is_twelve_bytes() {
        assert_eq!(Vertex::STRIDE, 12);
        assert_eq!(Vertex::layout().attributes[0].shader_location, 0);
        assert_eq!(Vertex::layout().attributes[0].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn unit_plane_corners_in_row_major_order() {
        let mesh = Mesh::plane(1.0, 1).unwrap();
        let positions: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [-1.0, 0.0, -1.0],
                [1.0, 0.0, -1.0],
                [-1.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
            ]
        );
        assert_eq!(mesh.indices, vec![0, 2, 1, 3]);
    }

    #[test]
    fn counts_hold_for_many_details() {
        for detail in 1..=40 {
            let mesh = Mesh::plane(3.0, detail).unwrap();
            let d = detail as usize;
            assert_eq!(mesh.vertices.len(), (d + 1) * (d + 1));
            assert_eq!(mesh.indices.len(), plane_index_count(detail));
            let max = *mesh.indices.iter().max().unwrap();
            assert_eq!(max, mesh.vertex_count() - 1);
        }
    }

    #[test]
    fn rows_are_joined_by_a_degenerate_pair() {
        let mesh = Mesh::plane(1.0, 2).unwrap();
        // Row 0: (0,3) (1,4) (2,5), join: 5, 3, row 1: (3,6) (4,7) (5,8).
        assert_eq!(
            mesh.indices,
            vec![0, 3, 1, 4, 2, 5, 5, 3, 3, 6, 4, 7, 5, 8]
        );
    }

    #[test]
    fn plane_spans_the_requested_extent() {
        let mesh = Mesh::plane(2.5, 10).unwrap();
        for v in &mesh.vertices {
            assert_eq!(v.position[1], 0.0);
            assert!(v.position[0] >= -2.5 && v.position[0] <= 2.5);
            assert!(v.position[2] >= -2.5 && v.position[2] <= 2.5);
        }
        assert_eq!(mesh.vertices.first().unwrap().position, [-2.5, 0.0, -2.5]);
        assert_eq!(mesh.vertices.last().unwrap().position, [2.5, 0.0, 2.5]);
    }

    #[test]
    fn zero_detail_is_a_config_error() {
        let err = Mesh::plane(1.0, 0).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn oversized_detail_is_a_config_error() {
        for detail in [MeshKind::MAX_PLANE_DETAIL + 1, 65_535, u32::MAX] {
            let err = Mesh::plane(1.0, detail).unwrap_err();
            assert!(matches!(err, EngineError::Config(_)), "detail {detail}: {err:?}");
        }
    }

    #[test]
    fn buffer_limit_rejects_large_meshes() {
        let mesh = Mesh::plane(1.0, 64).unwrap();
        let vertex_bytes = 65 * 65 * Vertex::STRIDE;
        let index_bytes = mesh.indices.len() as u64 * 4;
        let needed = vertex_bytes.max(index_bytes);

        assert!(mesh.check_buffer_limit(needed).is_ok());
        assert!(matches!(
            mesh.check_buffer_limit(needed - 1),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn largest_plane_fits_the_default_buffer_limit() {
        let d = MeshKind::MAX_PLANE_DETAIL as u64;
        let vertex_bytes = (d + 1) * (d + 1) * Vertex::STRIDE;
        let index_bytes = (2 * (d + 1) * d + 2 * (d - 1)) * 4;
        let default_limit = wgpu::Limits::default().max_buffer_size;
        assert!(vertex_bytes <= default_limit);
        assert!(index_bytes <= default_limit);
    }

    #[test]
    fn draw_range_rejects_a_plan_larger_than_the_upload() {
        assert_eq!(draw_range("water", 10, 10).unwrap(), 0..10);
        assert_eq!(draw_range("water", 4, 10).unwrap(), 0..4);
        assert!(matches!(
            draw_range("water", 11, 10),
            Err(EngineError::Frame(_))
        ));
    }

    #[test]
    fn strip_format_only_for_strips() {
        assert_eq!(
            Mesh::plane(1.0, 4).unwrap().strip_index_format(),
            Some(wgpu::IndexFormat::Uint32)
        );
        assert_eq!(Mesh::triangle().strip_index_format(), None);
    }

    #[test]
    fn unit_cube_has_36_in_range_indices() {
        let cube = Mesh::unit_cube();
        assert_eq!(cube.index_count(), 36);
        assert!(cube.indices.iter().all(|&i| i < cube.vertex_count()));
    }
}
