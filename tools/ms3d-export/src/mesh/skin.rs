//! Vertex to bone assignment
//!
//! MS3D binds each vertex to at most one bone, so weights collapse to the
//! strongest group.

use ms3d_common::NO_BONE;

use crate::scene::VertexGroup;

/// Pick the bone for `vertex` from its object's vertex groups.
///
/// The strongest group wins, the first one on ties. A vertex that is not in
/// a group counts as weight 0, and weight 0 never binds. Returns the group's
/// index, or [`NO_BONE`] when the strongest weight is below `threshold`.
pub fn resolve_bone(vertex: u32, groups: &[VertexGroup], threshold: f32) -> i32 {
    let mut best_weight = 0.0f32;
    let mut best = NO_BONE;

    for (index, group) in groups.iter().enumerate() {
        let weight = group.weight(vertex).unwrap_or(0.0);
        if weight > best_weight {
            best_weight = weight;
            best = index as i32;
        }
    }

    if best != NO_BONE && best_weight >= threshold {
        best
    } else {
        NO_BONE
    }
}
