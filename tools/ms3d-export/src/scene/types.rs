//! Host scene description consumed by the exporter
//!
//! Field names follow the usual DCC conventions (Z-up, `head_local`,
//! `matrix_world`, per-loop UVs). Matrices are column-major 4x4 arrays,
//! quaternions are `[x, y, z, w]`.

use anyhow::{bail, Result};
use glam::{Mat4, Quat, Vec2, Vec3};
use hashbrown::HashMap;
use serde::{Deserialize, Deserializer};

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

fn identity_matrix() -> [[f32; 4]; 4] {
    IDENTITY
}

fn identity_quat() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_frame() -> i32 {
    1
}

fn default_fps() -> f32 {
    24.0
}

fn default_diffuse() -> [f32; 4] {
    [0.8, 0.8, 0.8, 1.0]
}

fn default_specular() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_specular_intensity() -> f32 {
    0.5
}

/// A full scene: playback range and objects
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    #[serde(default = "default_frame")]
    pub frame_start: i32,
    #[serde(default = "default_frame")]
    pub frame_end: i32,
    /// Playback rate in frames per second
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Playback range and rate of the scene
    pub fn timeline(&self) -> Timeline {
        Timeline {
            start: self.frame_start as f64,
            end: self.frame_end as f64,
            fps: self.fps as f64,
        }
    }

    /// Reject a playback rate the exporter cannot resample from
    pub fn validate(&self) -> Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            bail!("Invalid scene frame rate {} (must be a positive number)", self.fps);
        }
        Ok(())
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Direct children of `parent`, in scene order
    pub fn children<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a SceneObject> + 'a {
        self.objects
            .iter()
            .filter(move |o| o.parent.as_deref() == Some(parent))
    }

    /// Sort pose keys by frame so samplers can binary search them
    pub fn sort_pose_keys(&mut self) {
        for object in &mut self.objects {
            if let ObjectData::Armature(armature) = &mut object.data {
                for track in &mut armature.pose {
                    track.keys.sort_by(|a, b| a.frame.total_cmp(&b.frame));
                }
            }
        }
    }
}

/// Source playback range and rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    pub start: f64,
    pub end: f64,
    pub fps: f64,
}

/// A scene object with its transform and type-specific data
#[derive(Debug, Clone, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    /// Parent object name
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "identity_matrix")]
    pub matrix_world: [[f32; 4]; 4],
    pub data: ObjectData,
}

impl SceneObject {
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.matrix_world)
    }

    pub fn as_mesh(&self) -> Option<&MeshData> {
        match &self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_armature(&self) -> Option<&ArmatureData> {
        match &self.data {
            ObjectData::Armature(armature) => Some(armature),
            _ => None,
        }
    }

    /// Short type tag for listings
    pub fn type_name(&self) -> &'static str {
        match &self.data {
            ObjectData::Mesh(_) => "MESH",
            ObjectData::Armature(_) => "ARMATURE",
            ObjectData::Other => "OTHER",
        }
    }
}

/// Type-specific object data, tagged by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectData {
    Mesh(MeshData),
    Armature(ArmatureData),
    /// Cameras, lights, empties: never exported
    #[serde(other)]
    Other,
}

/// Polygon mesh data
#[derive(Debug, Clone, Deserialize)]
pub struct MeshData {
    /// Mesh datablock name (written as the MS3D mesh name)
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    pub polygons: Vec<Polygon>,
    /// Bone weight groups; a group's index is its position in this list
    #[serde(default)]
    pub vertex_groups: Vec<VertexGroup>,
    /// Active material of the owning object
    #[serde(default)]
    pub material: Option<SceneMaterial>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MeshVertex {
    pub co: [f32; 3],
    #[serde(default)]
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.co)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// A polygon given as an ordered loop of corners
#[derive(Debug, Clone, Deserialize)]
pub struct Polygon {
    pub loops: Vec<MeshLoop>,
    /// Geometric face normal
    pub normal: [f32; 3],
}

impl Polygon {
    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// One polygon corner
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MeshLoop {
    pub vertex: u32,
    /// Coordinate in the active UV layer, absent without one
    #[serde(default)]
    pub uv: Option<[f32; 2]>,
}

impl MeshLoop {
    pub fn uv(&self) -> Option<Vec2> {
        self.uv.map(Vec2::from_array)
    }
}

/// Named per-vertex weights for one bone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VertexGroup {
    pub name: String,
    /// Stored as `[vertex, weight]` pairs in scene files
    #[serde(default, deserialize_with = "weights_from_pairs")]
    pub weights: HashMap<u32, f32>,
}

fn weights_from_pairs<'de, D: Deserializer<'de>>(d: D) -> Result<HashMap<u32, f32>, D::Error> {
    let pairs = Vec::<(u32, f32)>::deserialize(d)?;
    Ok(pairs.into_iter().collect())
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: HashMap::new(),
        }
    }

    /// Weight of `vertex` in this group, `None` if it is not a member
    pub fn weight(&self, vertex: u32) -> Option<f32> {
        self.weights.get(&vertex).copied()
    }
}

/// The channels of a host material the exporter can translate
#[derive(Debug, Clone, Deserialize)]
pub struct SceneMaterial {
    pub name: String,
    #[serde(default = "default_diffuse")]
    pub diffuse_color: [f32; 4],
    #[serde(default = "default_specular")]
    pub specular_color: [f32; 3],
    #[serde(default = "default_specular_intensity")]
    pub specular_intensity: f32,
    #[serde(default)]
    pub metallic: f32,
    /// Resolved path of the first image texture node
    #[serde(default)]
    pub image_texture: Option<String>,
}

impl SceneMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_color: default_diffuse(),
            specular_color: default_specular(),
            specular_intensity: default_specular_intensity(),
            metallic: 0.0,
            image_texture: None,
        }
    }
}

/// Skeleton data plus the pose tracks used to evaluate it over time
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArmatureData {
    pub bones: Vec<ArmatureBone>,
    #[serde(default)]
    pub pose: Vec<BoneTrack>,
}

/// A bone in rest position, in armature space
#[derive(Debug, Clone, Deserialize)]
pub struct ArmatureBone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub head_local: [f32; 3],
    #[serde(default = "identity_matrix")]
    pub matrix_local: [[f32; 4]; 4],
}

impl ArmatureBone {
    pub fn head(&self) -> Vec3 {
        Vec3::from_array(self.head_local)
    }

    /// Rotation part of the rest matrix
    pub fn rest_rotation(&self) -> Quat {
        let (_scale, rotation, _translation) =
            Mat4::from_cols_array_2d(&self.matrix_local).to_scale_rotation_translation();
        rotation
    }
}

/// Pose keys for one bone
#[derive(Debug, Clone, Deserialize)]
pub struct BoneTrack {
    pub bone: String,
    pub keys: Vec<PoseKey>,
}

/// Armature-space pose of a bone at one source frame
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PoseKey {
    pub frame: f32,
    pub head: [f32; 3],
    #[serde(default = "identity_quat")]
    pub rotation: [f32; 4],
}
