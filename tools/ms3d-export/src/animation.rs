//! Animation sampling
//!
//! MS3D stores keys on a 30 fps timeline but allows fractional key times, so
//! the source range is resampled at a user-chosen rate:
//!
//! ```text
//! sample i:  source frame = start + i * source_fps / sample_fps
//!            export frame = 1 + i * 30 / sample_fps
//! ```
//!
//! Sampling stops once the source frame passes `end + 1`.

use glam::Vec3;
use ms3d_common::{from_target, to_target, to_target_euler, Bone, KeyFrame, ANIMATION_FRAME_RATE};

use crate::scene::{PoseSampler, Timeline};

/// Value of the `Frames:` header for a source timeline.
///
/// Halves round to even, like material shininess.
pub fn frame_count(timeline: Timeline) -> u32 {
    let frames = (timeline.end - timeline.start + 1.0) * ANIMATION_FRAME_RATE / timeline.fps;
    frames.round_ties_even().max(0.0) as u32
}

/// Append position and rotation keys to `bones` by sampling `pose`.
///
/// Keys hold the offset from the idle pose: roots use the raw posed head,
/// children the posed head minus their idle position. Rotations are the
/// posed Euler angles minus the idle angles.
pub fn sample_animation(
    bones: &mut [Bone],
    pose: &dyn PoseSampler,
    timeline: Timeline,
    sample_fps: f64,
) {
    if !(timeline.fps > 0.0 && sample_fps > 0.0) {
        tracing::warn!(
            "Skipping animation sampling: invalid rates (scene {} fps, sample {} fps)",
            timeline.fps,
            sample_fps
        );
        return;
    }

    // Idle heads back in source axes, for child deltas
    let idle_heads: Vec<Vec3> = bones
        .iter()
        .map(|bone| Vec3::from_array(from_target(bone.idle_position).map(|c| c as f32)))
        .collect();

    let source_step = timeline.fps / sample_fps;
    let export_step = ANIMATION_FRAME_RATE / sample_fps;

    let mut sample = 0u32;
    loop {
        let source_frame = timeline.start + sample as f64 * source_step;
        if source_frame > timeline.end + 1.0 {
            break;
        }
        let export_frame = 1.0 + sample as f64 * export_step;

        let posed = pose.sample_pose_at(source_frame);
        for ((bone, idle_head), pose_bone) in bones.iter_mut().zip(&idle_heads).zip(&posed) {
            let offset = if bone.is_root() {
                pose_bone.head
            } else {
                pose_bone.head - *idle_head
            };
            bone.position_keys.push(KeyFrame::new(export_frame, to_target(offset)));

            let euler = to_target_euler(pose_bone.rotation);
            let delta = [0, 1, 2].map(|axis| euler[axis] - bone.idle_rotation[axis]);
            bone.rotation_keys.push(KeyFrame::new(export_frame, delta));
        }

        sample += 1;
    }

    tracing::debug!("Sampled {} keys per bone for {} bones", sample, bones.len());
}

/// Root bones start from a zero rotation; their keys carry the full offset.
pub fn zero_root_rotations(bones: &mut [Bone]) {
    for bone in bones.iter_mut().filter(|b| b.is_root()) {
        bone.idle_rotation = [0.0; 3];
    }
}
