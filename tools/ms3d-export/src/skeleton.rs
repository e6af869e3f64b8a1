//! Skeleton conversion (armature rest pose -> MS3D bones)
//!
//! Root bones are placed in world space through the armature object's world
//! matrix. Child bones keep their armature-space rest head, which MS3D reads
//! relative to the parent.

use glam::Mat4;
use ms3d_common::{to_target, to_target_euler, Bone};

use crate::scene::ArmatureData;

/// One bone per armature bone, in armature order, with idle pose set and no
/// keys yet.
pub fn build_bones(armature: &ArmatureData, world: Mat4) -> Vec<Bone> {
    armature
        .bones
        .iter()
        .map(|bone| {
            let (parent, head) = match bone.parent.as_deref() {
                None | Some("") => ("", world.transform_point3(bone.head())),
                Some(parent) => (parent, bone.head()),
            };
            Bone::new(
                bone.name.clone(),
                parent,
                to_target(head),
                to_target_euler(bone.rest_rotation()),
            )
        })
        .collect()
}
