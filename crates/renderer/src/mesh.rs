//! Procedural meshes
//!
//! Both meshes use the same interleaved layout: position (3 floats)
//! followed by normal (3 floats), with `u32` triangle indices.

use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{RenderError, Result};

/// Floats per interleaved vertex (position + normal)
pub const FLOATS_PER_VERTEX: usize = 6;

/// CPU-side indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        let base = vertex * FLOATS_PER_VERTEX;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    pub fn normal(&self, vertex: usize) -> Vec3 {
        let base = vertex * FLOATS_PER_VERTEX + 3;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }
}

/// Latitude/longitude sphere around the origin, poles on the Z axis
///
/// Produces `stacks + 1` rings of `sectors + 1` vertices (the seam column
/// is duplicated so each ring closes). The first and last stacks emit one
/// triangle per sector since their other triangle would be degenerate.
pub fn sphere(radius: f32, sectors: u32, stacks: u32) -> Result<MeshData> {
    if sectors == 0 || stacks == 0 {
        return Err(RenderError::InvalidTessellation { sectors, stacks });
    }

    let sector_step = TAU / sectors as f32;
    let stack_step = PI / stacks as f32;

    let ring = (sectors + 1) as usize;
    let mut vertices = Vec::with_capacity((stacks as usize + 1) * ring * FLOATS_PER_VERTEX);

    for i in 0..=stacks {
        let stack_angle = FRAC_PI_2 - i as f32 * stack_step;
        let (sin_stack, cos_stack) = stack_angle.sin_cos();

        for j in 0..=sectors {
            let (sin_sector, cos_sector) = (j as f32 * sector_step).sin_cos();
            let normal = Vec3::new(cos_stack * cos_sector, cos_stack * sin_sector, sin_stack);
            let position = normal * radius;
            vertices.extend_from_slice(&[
                position.x, position.y, position.z, normal.x, normal.y, normal.z,
            ]);
        }
    }

    let quads = sectors as usize * (stacks as usize).saturating_sub(1);
    let mut indices = Vec::with_capacity(6 * quads);
    for i in 0..stacks {
        let mut k1 = i * (sectors + 1);
        let mut k2 = k1 + sectors + 1;

        for _ in 0..sectors {
            if i != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    Ok(MeshData { vertices, indices })
}

/// Unit cube (extents ±0.5) with flat per-face normals
#[rustfmt::skip]
const CUBE_VERTICES: [f32; 36 * FLOATS_PER_VERTEX] = [
    // Position          Normal
    // -Z
    -0.5, -0.5, -0.5,  0.0,  0.0, -1.0,
     0.5, -0.5, -0.5,  0.0,  0.0, -1.0,
     0.5,  0.5, -0.5,  0.0,  0.0, -1.0,
     0.5,  0.5, -0.5,  0.0,  0.0, -1.0,
    -0.5,  0.5, -0.5,  0.0,  0.0, -1.0,
    -0.5, -0.5, -0.5,  0.0,  0.0, -1.0,
    // +Z
    -0.5, -0.5,  0.5,  0.0,  0.0,  1.0,
     0.5, -0.5,  0.5,  0.0,  0.0,  1.0,
     0.5,  0.5,  0.5,  0.0,  0.0,  1.0,
     0.5,  0.5,  0.5,  0.0,  0.0,  1.0,
    -0.5,  0.5,  0.5,  0.0,  0.0,  1.0,
    -0.5, -0.5,  0.5,  0.0,  0.0,  1.0,
    // -X
    -0.5,  0.5,  0.5, -1.0,  0.0,  0.0,
    -0.5,  0.5, -0.5, -1.0,  0.0,  0.0,
    -0.5, -0.5, -0.5, -1.0,  0.0,  0.0,
    -0.5, -0.5, -0.5, -1.0,  0.0,  0.0,
    -0.5, -0.5,  0.5, -1.0,  0.0,  0.0,
    -0.5,  0.5,  0.5, -1.0,  0.0,  0.0,
    // +X
     0.5,  0.5,  0.5,  1.0,  0.0,  0.0,
     0.5,  0.5, -0.5,  1.0,  0.0,  0.0,
     0.5, -0.5, -0.5,  1.0,  0.0,  0.0,
     0.5, -0.5, -0.5,  1.0,  0.0,  0.0,
     0.5, -0.5,  0.5,  1.0,  0.0,  0.0,
     0.5,  0.5,  0.5,  1.0,  0.0,  0.0,
    // -Y
    -0.5, -0.5, -0.5,  0.0, -1.0,  0.0,
     0.5, -0.5, -0.5,  0.0, -1.0,  0.0,
     0.5, -0.5,  0.5,  0.0, -1.0,  0.0,
     0.5, -0.5,  0.5,  0.0, -1.0,  0.0,
    -0.5, -0.5,  0.5,  0.0, -1.0,  0.0,
    -0.5, -0.5, -0.5,  0.0, -1.0,  0.0,
    // +Y
    -0.5,  0.5, -0.5,  0.0,  1.0,  0.0,
     0.5,  0.5, -0.5,  0.0,  1.0,  0.0,
     0.5,  0.5,  0.5,  0.0,  1.0,  0.0,
     0.5,  0.5,  0.5,  0.0,  1.0,  0.0,
    -0.5,  0.5,  0.5,  0.0,  1.0,  0.0,
    -0.5,  0.5, -0.5,  0.0,  1.0,  0.0,
];

pub fn cube() -> MeshData {
    MeshData {
        vertices: CUBE_VERTICES.to_vec(),
        indices: (0..36).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_tessellation_is_error() {
        assert!(matches!(
            sphere(0.5, 0, 8),
            Err(RenderError::InvalidTessellation { sectors: 0, .. })
        ));
        assert!(sphere(0.5, 8, 0).is_err());
    }

    #[test]
    fn test_single_stack_has_no_triangles() {
        let mesh = sphere(1.0, 4, 1).unwrap();
        assert_eq!(mesh.vertex_count(), 2 * 5);
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_sphere_poles_on_z() {
        let mesh = sphere(2.0, 8, 4).unwrap();
        assert!((mesh.position(0) - Vec3::Z * 2.0).length() < 1e-5);
        let last = mesh.vertex_count() - 1;
        assert!((mesh.position(last) - Vec3::NEG_Z * 2.0).length() < 1e-5);
    }

    #[test]
    fn test_cube_layout() {
        let mesh = cube();
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.index_count(), 36);
        for v in 0..mesh.vertex_count() {
            let p = mesh.position(v);
            assert_eq!(p.abs(), Vec3::splat(0.5));
            // Face normal points out of the face the vertex lies on
            let n = mesh.normal(v);
            assert!((p.dot(n) - 0.5).abs() < 1e-6);
        }
    }
}
