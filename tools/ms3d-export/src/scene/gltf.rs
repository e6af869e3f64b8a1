//! glTF/GLB scene loader
//!
//! Builds a [`Scene`] from a glTF file so it can go through the same export
//! path as any other host scene:
//! - every node with a mesh becomes a mesh object (primitives merged, one
//!   polygon per triangle)
//! - every skin becomes an armature; skinned meshes are parented to it and
//!   get one vertex group per joint from JOINTS_0/WEIGHTS_0
//! - one animation clip is baked into pose tracks at a fixed frame rate
//!
//! glTF is Y-up with a top-left UV origin; both are converted to the Z-up,
//! bottom-left convention the exporter expects.

use anyhow::{bail, Context, Result};
use glam::{Mat4, Quat, Vec3};
use hashbrown::HashMap;
use std::f32::consts::FRAC_1_SQRT_2;
use std::path::Path;

use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation;

use super::types::{
    ArmatureBone, ArmatureData, BoneTrack, MeshData, MeshLoop, MeshVertex, ObjectData, Polygon,
    PoseKey, Scene, SceneMaterial, SceneObject, VertexGroup,
};

/// Default frame rate used to bake glTF animation clips
pub const DEFAULT_BAKE_FRAME_RATE: f32 = 30.0;

/// +90° about X: maps glTF (x, y, z) to Z-up (x, -z, y)
const Y_UP_TO_Z_UP: Quat = Quat::from_xyzw(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);

/// How to import a glTF file
#[derive(Debug, Clone)]
pub struct GltfImportOptions {
    /// Frame rate the animation clip is baked at; becomes the scene fps
    pub frame_rate: f32,
    /// Animation clip to bake (first clip if `None`)
    pub animation: Option<String>,
}

impl Default for GltfImportOptions {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_BAKE_FRAME_RATE,
            animation: None,
        }
    }
}

/// Load a glTF/GLB file as a scene. All objects are marked selected.
pub fn load_gltf_scene(input: &Path, options: &GltfImportOptions) -> Result<Scene> {
    if !(options.frame_rate > 0.0) {
        bail!("Invalid bake frame rate {}", options.frame_rate);
    }

    let (document, buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;
    let base_dir = input.parent().unwrap_or_else(|| Path::new("."));

    let hierarchy = NodeHierarchy::new(&document);

    let animation = match &options.animation {
        Some(name) => Some(
            document
                .animations()
                .find(|a| a.name() == Some(name.as_str()))
                .with_context(|| {
                    let available: Vec<_> =
                        document.animations().filter_map(|a| a.name()).collect();
                    format!(
                        "Animation '{}' not found in glTF. Available animations: {:?}",
                        name, available
                    )
                })?,
        ),
        None => document.animations().next(),
    };

    let channels = match &animation {
        Some(animation) => read_channels(animation, &buffers)?,
        None => Vec::new(),
    };
    let duration = channels
        .iter()
        .filter_map(|c| c.times.last().copied())
        .fold(0.0f32, f32::max);
    let frame_span = (duration * options.frame_rate).round() as i32;

    // Baked world transforms of every node, one set per frame
    let frames: Vec<Vec<Mat4>> = if channels.is_empty() {
        Vec::new()
    } else {
        (0..=frame_span)
            .map(|frame| {
                let t = frame as f32 / options.frame_rate;
                hierarchy.world_matrices(&animated_locals(&document, &channels, t))
            })
            .collect()
    };

    let mut objects = Vec::new();
    let mut armature_names = HashMap::new();

    for (skin_index, skin) in document.skins().enumerate() {
        let name = skin
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Armature{}", skin_index));
        armature_names.insert(skin.index(), name.clone());

        let armature = convert_skin(&skin, &hierarchy, &frames);
        tracing::debug!(
            "glTF skin '{}': {} bones, {} baked frames",
            name,
            armature.bones.len(),
            frames.len()
        );

        objects.push(SceneObject {
            name,
            selected: true,
            parent: None,
            matrix_world: Mat4::IDENTITY.to_cols_array_2d(),
            data: ObjectData::Armature(armature),
        });
    }

    for node in document.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };

        let object_name = node
            .name()
            .or(mesh.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Mesh{}", node.index()));
        let skin = node.skin();
        let data = convert_mesh(&mesh, skin.as_ref(), &object_name, &buffers, base_dir)?;

        objects.push(SceneObject {
            name: object_name,
            selected: true,
            parent: skin.and_then(|s| armature_names.get(&s.index()).cloned()),
            matrix_world: convert_matrix(hierarchy.rest_world[node.index()]).to_cols_array_2d(),
            data: ObjectData::Mesh(data),
        });
    }

    let mut scene = Scene {
        frame_start: 1,
        frame_end: 1 + frame_span.max(0),
        fps: options.frame_rate,
        objects,
    };
    scene.sort_pose_keys();

    tracing::info!(
        "Loaded glTF {:?}: {} objects, frames {}..={} at {} fps",
        input,
        scene.objects.len(),
        scene.frame_start,
        scene.frame_end,
        scene.fps
    );

    Ok(scene)
}

// ============================================================================
// Axis conversion
// ============================================================================

fn convert_point(v: Vec3) -> Vec3 {
    Y_UP_TO_Z_UP * v
}

fn convert_rotation(q: Quat) -> Quat {
    Y_UP_TO_Z_UP * q * Y_UP_TO_Z_UP.conjugate()
}

fn convert_matrix(m: Mat4) -> Mat4 {
    let axes = Mat4::from_quat(Y_UP_TO_Z_UP);
    axes * m * axes.transpose()
}

// ============================================================================
// Node hierarchy
// ============================================================================

struct NodeHierarchy {
    parents: HashMap<usize, usize>,
    rest_local: Vec<Mat4>,
    rest_world: Vec<Mat4>,
}

impl NodeHierarchy {
    fn new(document: &gltf::Document) -> Self {
        let mut parents = HashMap::new();
        for node in document.nodes() {
            for child in node.children() {
                parents.insert(child.index(), node.index());
            }
        }
        let rest_local: Vec<Mat4> = document
            .nodes()
            .map(|n| Mat4::from_cols_array_2d(&n.transform().matrix()))
            .collect();

        let mut hierarchy = Self {
            parents,
            rest_local,
            rest_world: Vec::new(),
        };
        hierarchy.rest_world = hierarchy.world_matrices(&hierarchy.rest_local);
        hierarchy
    }

    /// Compose `locals` up each node's parent chain
    fn world_matrices(&self, locals: &[Mat4]) -> Vec<Mat4> {
        (0..locals.len())
            .map(|node| {
                let mut world = locals[node];
                let mut current = node;
                while let Some(&parent) = self.parents.get(&current) {
                    world = locals[parent] * world;
                    current = parent;
                }
                world
            })
            .collect()
    }

    /// Nearest ancestor of `node` that is in `joints`
    fn joint_parent(&self, node: usize, joints: &HashMap<usize, usize>) -> Option<usize> {
        let mut current = node;
        while let Some(&parent) = self.parents.get(&current) {
            if let Some(&joint) = joints.get(&parent) {
                return Some(joint);
            }
            current = parent;
        }
        None
    }
}

// ============================================================================
// Skins
// ============================================================================

fn convert_skin(skin: &gltf::Skin, hierarchy: &NodeHierarchy, frames: &[Vec<Mat4>]) -> ArmatureData {
    let joints: Vec<gltf::Node> = skin.joints().collect();
    let joint_map: HashMap<usize, usize> = joints
        .iter()
        .enumerate()
        .map(|(i, j)| (j.index(), i))
        .collect();
    let names: Vec<String> = joints.iter().map(joint_name).collect();

    let bones = joints
        .iter()
        .map(|joint| {
            let rest = convert_matrix(hierarchy.rest_world[joint.index()]);
            ArmatureBone {
                name: joint_name(joint),
                parent: hierarchy
                    .joint_parent(joint.index(), &joint_map)
                    .map(|p| names[p].clone()),
                head_local: rest.w_axis.truncate().to_array(),
                matrix_local: rest.to_cols_array_2d(),
            }
        })
        .collect();

    let pose = if frames.is_empty() {
        Vec::new()
    } else {
        joints
            .iter()
            .map(|joint| BoneTrack {
                bone: joint_name(joint),
                keys: frames
                    .iter()
                    .enumerate()
                    .map(|(frame, world)| {
                        let (_scale, rotation, translation) =
                            world[joint.index()].to_scale_rotation_translation();
                        PoseKey {
                            frame: 1.0 + frame as f32,
                            head: convert_point(translation).to_array(),
                            rotation: convert_rotation(rotation).to_array(),
                        }
                    })
                    .collect(),
            })
            .collect()
    };

    ArmatureData { bones, pose }
}

fn joint_name(joint: &gltf::Node) -> String {
    joint
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Bone{}", joint.index()))
}

// ============================================================================
// Meshes
// ============================================================================

fn convert_mesh(
    mesh: &gltf::Mesh,
    skin: Option<&gltf::Skin>,
    object_name: &str,
    buffers: &[gltf::buffer::Data],
    base_dir: &Path,
) -> Result<MeshData> {
    let mut vertex_groups: Vec<VertexGroup> = skin
        .map(|s| s.joints().map(|j| VertexGroup::new(joint_name(&j))).collect())
        .unwrap_or_default();

    let mut vertices = Vec::new();
    let mut polygons = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            tracing::warn!(
                "Skipping non-triangle primitive {} of mesh '{}'",
                primitive.index(),
                object_name
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions: Vec<Vec3> = reader
            .read_positions()
            .with_context(|| format!("No positions in mesh '{}'", object_name))?
            .map(|p| convert_point(Vec3::from_array(p)))
            .collect();
        let normals: Option<Vec<Vec3>> = reader
            .read_normals()
            .map(|iter| iter.map(|n| convert_point(Vec3::from_array(n))).collect());
        let uvs: Option<Vec<[f32; 2]>> = reader
            .read_tex_coords(0)
            .map(|iter| iter.into_f32().map(|[u, v]| [u, 1.0 - v]).collect());
        let joints: Option<Vec<[u16; 4]>> =
            reader.read_joints(0).map(|iter| iter.into_u16().collect());
        let weights: Option<Vec<[f32; 4]>> =
            reader.read_weights(0).map(|iter| iter.into_f32().collect());
        let indices: Vec<u32> = reader
            .read_indices()
            .map(|iter| iter.into_u32().collect())
            .unwrap_or_else(|| (0..positions.len() as u32).collect());

        let offset = vertices.len() as u32;

        for (i, position) in positions.iter().enumerate() {
            let normal = normals
                .as_ref()
                .and_then(|n| n.get(i).copied())
                .unwrap_or(Vec3::ZERO);
            vertices.push(MeshVertex {
                co: position.to_array(),
                normal: normal.to_array(),
            });
        }

        if let (Some(joints), Some(weights)) = (&joints, &weights) {
            for (i, (joint_set, weight_set)) in joints.iter().zip(weights).enumerate() {
                for (&joint, &weight) in joint_set.iter().zip(weight_set) {
                    if weight <= 0.0 {
                        continue;
                    }
                    if let Some(group) = vertex_groups.get_mut(joint as usize) {
                        *group.weights.entry(offset + i as u32).or_insert(0.0) += weight;
                    }
                }
            }
        }

        for tri in indices.chunks_exact(3) {
            let corners = [tri[0], tri[1], tri[2]];
            let [a, b, c] = corners.map(|i| positions.get(i as usize).copied().unwrap_or(Vec3::ZERO));
            polygons.push(Polygon {
                loops: corners
                    .iter()
                    .map(|&i| MeshLoop {
                        vertex: offset + i,
                        uv: uvs.as_ref().and_then(|uv| uv.get(i as usize).copied()),
                    })
                    .collect(),
                normal: (b - a).cross(c - a).normalize_or_zero().to_array(),
            });
        }
    }

    let material = mesh
        .primitives()
        .next()
        .and_then(|p| convert_material(&p.material(), base_dir));

    Ok(MeshData {
        name: mesh.name().unwrap_or(object_name).to_string(),
        vertices,
        polygons,
        vertex_groups,
        material,
    })
}

fn convert_material(material: &gltf::Material, base_dir: &Path) -> Option<SceneMaterial> {
    // The implicit default material has no index
    let index = material.index()?;
    let pbr = material.pbr_metallic_roughness();

    let image_texture = pbr
        .base_color_texture()
        .and_then(|info| match info.texture().source().source() {
            gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
                Some(base_dir.join(uri).display().to_string())
            }
            _ => None,
        });

    let mut converted = SceneMaterial::new(
        material
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Material{}", index)),
    );
    converted.diffuse_color = pbr.base_color_factor();
    converted.metallic = pbr.metallic_factor();
    converted.image_texture = image_texture;
    Some(converted)
}

// ============================================================================
// Animation baking
// ============================================================================

enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

struct ChannelData {
    node: usize,
    times: Vec<f32>,
    values: ChannelValues,
    step: bool,
}

fn read_channels(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<ChannelData>> {
    let mut channels = Vec::new();

    for channel in animation.channels() {
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let times: Vec<f32> = reader
            .read_inputs()
            .context("Animation channel has no input times")?
            .collect();
        let Some(outputs) = reader.read_outputs() else {
            continue;
        };

        let interpolation = channel.sampler().interpolation();
        let values = match outputs {
            ReadOutputs::Translations(iter) => {
                ChannelValues::Translation(iter.map(Vec3::from_array).collect())
            }
            ReadOutputs::Rotations(iter) => {
                ChannelValues::Rotation(iter.into_f32().map(Quat::from_array).collect())
            }
            ReadOutputs::Scales(iter) => ChannelValues::Scale(iter.map(Vec3::from_array).collect()),
            ReadOutputs::MorphTargetWeights(_) => continue,
        };

        // Cubic spline outputs are (in-tangent, value, out-tangent) triples;
        // keep the values and interpolate linearly
        let values = if interpolation == Interpolation::CubicSpline {
            match values {
                ChannelValues::Translation(v) => ChannelValues::Translation(spline_values(v)),
                ChannelValues::Rotation(v) => ChannelValues::Rotation(spline_values(v)),
                ChannelValues::Scale(v) => ChannelValues::Scale(spline_values(v)),
            }
        } else {
            values
        };

        channels.push(ChannelData {
            node: channel.target().node().index(),
            times,
            values,
            step: interpolation == Interpolation::Step,
        });
    }

    Ok(channels)
}

fn spline_values<T: Copy>(values: Vec<T>) -> Vec<T> {
    values.chunks_exact(3).map(|c| c[1]).collect()
}

/// Local matrices of every node at time `t`, rest pose where not animated
fn animated_locals(document: &gltf::Document, channels: &[ChannelData], t: f32) -> Vec<Mat4> {
    let mut trs: Vec<(Vec3, Quat, Vec3)> = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            (
                Vec3::from_array(translation),
                Quat::from_array(rotation),
                Vec3::from_array(scale),
            )
        })
        .collect();

    for channel in channels {
        let Some(target) = trs.get_mut(channel.node) else {
            continue;
        };
        match &channel.values {
            ChannelValues::Translation(values) => {
                if let Some(v) = sample(&channel.times, values, t, channel.step, Vec3::lerp) {
                    target.0 = v;
                }
            }
            ChannelValues::Rotation(values) => {
                if let Some(q) = sample(&channel.times, values, t, channel.step, Quat::slerp) {
                    target.1 = q.normalize();
                }
            }
            ChannelValues::Scale(values) => {
                if let Some(v) = sample(&channel.times, values, t, channel.step, Vec3::lerp) {
                    target.2 = v;
                }
            }
        }
    }

    trs.into_iter()
        .map(|(translation, rotation, scale)| {
            Mat4::from_scale_rotation_translation(scale, rotation, translation)
        })
        .collect()
}

/// Sample a keyframed channel at `t`, clamped at both ends
fn sample<T: Copy>(
    times: &[f32],
    values: &[T],
    t: f32,
    step: bool,
    mix: impl Fn(T, T, f32) -> T,
) -> Option<T> {
    let count = times.len().min(values.len());
    if count == 0 {
        return None;
    }

    let next = times[..count].partition_point(|&k| k <= t);
    if next == 0 {
        return Some(values[0]);
    }
    if next >= count {
        return Some(values[count - 1]);
    }

    let (t0, t1) = (times[next - 1], times[next]);
    if step || t1 <= t0 {
        return Some(values[next - 1]);
    }
    let factor = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
    Some(mix(values[next - 1], values[next], factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_point_y_up_to_z_up() {
        let v = convert_point(Vec3::new(1.0, 2.0, 3.0));
        assert!((v - Vec3::new(1.0, -3.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_convert_matrix_moves_translation() {
        let m = convert_matrix(Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));
        assert!((m.w_axis.truncate() - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_sample_linear_and_step() {
        let times = [0.0, 1.0];
        let values = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)];
        let mid = sample(&times, &values, 0.5, false, Vec3::lerp).unwrap();
        assert!((mid.x - 1.0).abs() < 1e-6);
        let held = sample(&times, &values, 0.5, true, Vec3::lerp).unwrap();
        assert_eq!(held, Vec3::ZERO);
        assert_eq!(sample(&times, &values, 3.0, false, Vec3::lerp), Some(values[1]));
        assert_eq!(sample::<Vec3>(&[], &[], 0.0, false, Vec3::lerp), None);
    }
}
