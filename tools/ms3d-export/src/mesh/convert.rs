use anyhow::{bail, Result};
use ms3d_common::{to_target, to_target_uv, Interner, Mesh, Normal, Vertex};

use super::skin::resolve_bone;
use super::triangulate::fan_triangulate;
use crate::config::NormalMode;
use crate::scene::MeshData;

/// Convert one scene mesh.
///
/// Every polygon corner becomes a deduplicated vertex (position, uv, bone)
/// plus a deduplicated normal, then the polygon is fan-triangulated.
/// `material` is the mesh's index into the model material list.
pub fn convert_mesh(
    data: &MeshData,
    material: i32,
    normal_mode: NormalMode,
    bone_threshold: f32,
) -> Result<Mesh> {
    let mut vertices: Interner<Vertex> = Interner::new();
    let mut normals: Interner<Normal> = Interner::new();
    let mut triangles = Vec::new();
    let mut dropped = 0usize;
    let mut missing_uvs = 0usize;

    for (polygon_index, polygon) in data.polygons.iter().enumerate() {
        let face_normal = match normal_mode {
            NormalMode::Face => Some(normals.intern(Normal::new(to_target(polygon.normal())))),
            NormalMode::Vertex => None,
        };

        let mut corners = Vec::with_capacity(polygon.loops.len());
        for corner in &polygon.loops {
            let Some(source) = data.vertices.get(corner.vertex as usize) else {
                bail!(
                    "Mesh '{}' polygon {} references vertex {}, but only {} exist",
                    data.name,
                    polygon_index,
                    corner.vertex,
                    data.vertices.len()
                );
            };

            let uv = match corner.uv() {
                Some(uv) => to_target_uv(uv),
                None => {
                    missing_uvs += 1;
                    [0.0, 0.0]
                }
            };
            let bone = resolve_bone(corner.vertex, &data.vertex_groups, bone_threshold);
            let vertex = vertices.intern(Vertex::new(0, to_target(source.position()), uv, bone));

            let normal = match face_normal {
                Some(index) => index,
                None => normals.intern(Normal::new(to_target(source.normal()))),
            };
            corners.push((vertex, normal));
        }

        let fan = fan_triangulate(&corners, vertices.as_slice(), polygon_index as u32 + 1);
        dropped += corners.len().saturating_sub(2) - fan.len();
        triangles.extend(fan);
    }

    if missing_uvs > 0 {
        tracing::warn!(
            "Mesh '{}': {} corners have no UV, using (0, 0)",
            data.name,
            missing_uvs
        );
    }
    tracing::debug!(
        "Mesh '{}': {} vertices, {} normals, {} triangles ({} degenerate dropped)",
        data.name,
        vertices.len(),
        normals.len(),
        triangles.len(),
        dropped
    );

    Ok(Mesh {
        vertices: vertices.into_vec(),
        normals: normals.into_vec(),
        triangles,
        ..Mesh::new(data.name.clone(), material)
    })
}
