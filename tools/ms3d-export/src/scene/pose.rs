//! Pose evaluation
//!
//! The animation sampler reads poses through [`PoseSampler`] instead of
//! stepping the scene's current frame. [`ArmatureData`] implements it by
//! interpolating its pose tracks.

use glam::{Quat, Vec3};
use hashbrown::HashMap;

use super::types::{ArmatureData, PoseKey};

/// Armature-space pose of one bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseBone {
    pub head: Vec3,
    pub rotation: Quat,
}

/// Evaluates an armature's pose at a source frame
pub trait PoseSampler {
    /// One entry per bone, in the armature's bone order
    fn sample_pose_at(&self, frame: f64) -> Vec<PoseBone>;
}

impl PoseSampler for ArmatureData {
    fn sample_pose_at(&self, frame: f64) -> Vec<PoseBone> {
        let tracks: HashMap<&str, &[PoseKey]> = self
            .pose
            .iter()
            .map(|t| (t.bone.as_str(), t.keys.as_slice()))
            .collect();

        self.bones
            .iter()
            .map(|bone| match tracks.get(bone.name.as_str()) {
                Some(keys) if !keys.is_empty() => interpolate_keys(keys, frame as f32),
                // Untracked bones stay in rest pose
                _ => PoseBone {
                    head: bone.head(),
                    rotation: bone.rest_rotation(),
                },
            })
            .collect()
    }
}

/// Linear head / spherical rotation interpolation, clamped at both ends.
/// `keys` must be sorted by frame and non-empty.
fn interpolate_keys(keys: &[PoseKey], frame: f32) -> PoseBone {
    let to_pose = |key: &PoseKey| PoseBone {
        head: Vec3::from_array(key.head),
        rotation: Quat::from_array(key.rotation).normalize(),
    };

    // Index of the first key after `frame`
    let next = keys.partition_point(|k| k.frame <= frame);
    if next == 0 {
        return to_pose(&keys[0]);
    }
    if next >= keys.len() {
        return to_pose(&keys[keys.len() - 1]);
    }

    let k0 = &keys[next - 1];
    let k1 = &keys[next];
    let span = k1.frame - k0.frame;
    let factor = if span > 0.0 {
        ((frame - k0.frame) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let p0 = to_pose(k0);
    let p1 = to_pose(k1);
    PoseBone {
        head: p0.head.lerp(p1.head, factor),
        rotation: p0.rotation.slerp(p1.rotation, factor),
    }
}
