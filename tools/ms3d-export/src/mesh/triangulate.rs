//! Fan triangulation of polygon loops

use glam::DVec3;
use ms3d_common::{Triangle, Vertex};

/// Fan triangles whose corner angle at the first vertex is smaller than this
/// (radians) are dropped as slivers.
pub const DEGENERATE_ANGLE_EPSILON: f64 = 1e-5;

/// Split a polygon into a triangle fan around its first corner.
///
/// `corners` are `(vertex index, normal index)` pairs into the mesh lists;
/// `vertices` is the mesh vertex list so far (already in MS3D axes and
/// rounded). Candidate `(c0, ci, ci+1)` is skipped when the angle between
/// `v0 - vi` and `v0 - vi+1` is below [`DEGENERATE_ANGLE_EPSILON`] or either
/// edge has zero length.
pub fn fan_triangulate(
    corners: &[(u32, u32)],
    vertices: &[Vertex],
    smoothing_group: u32,
) -> Vec<Triangle> {
    if corners.len() < 3 {
        return Vec::new();
    }

    let position = |index: u32| {
        vertices
            .get(index as usize)
            .map(|v| DVec3::from_array(v.position))
    };

    let (v0, n0) = corners[0];
    let mut triangles = Vec::with_capacity(corners.len() - 2);
    for pair in corners[1..].windows(2) {
        let (vi, ni) = pair[0];
        let (vj, nj) = pair[1];

        let (Some(p0), Some(pi), Some(pj)) = (position(v0), position(vi), position(vj)) else {
            continue;
        };
        if is_degenerate(p0 - pi, p0 - pj) {
            continue;
        }

        triangles.push(Triangle {
            flags: 0,
            vertices: [v0, vi, vj],
            normals: [n0, ni, nj],
            smoothing_group,
        });
    }
    triangles
}

fn is_degenerate(a: DVec3, b: DVec3) -> bool {
    if a.length_squared() == 0.0 || b.length_squared() == 0.0 {
        return true;
    }
    // atan2 stays accurate for tiny angles where acos of the dot does not
    let angle = a.cross(b).length().atan2(a.dot(b));
    angle < DEGENERATE_ANGLE_EPSILON
}
