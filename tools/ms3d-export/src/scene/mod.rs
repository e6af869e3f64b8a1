//! Host scene model and loaders
//!
//! The exporter only sees scenes through these types. A scene can come from
//! a JSON scene dump written by a host application, or from a glTF/GLB file.

pub mod gltf;
mod pose;
mod types;

use anyhow::{bail, Context, Result};
use std::path::Path;

// Re-export public API
pub use self::gltf::{load_gltf_scene, GltfImportOptions};
pub use pose::{PoseBone, PoseSampler};
pub use types::{
    ArmatureBone, ArmatureData, BoneTrack, MeshData, MeshLoop, MeshVertex, ObjectData, Polygon,
    PoseKey, Scene, SceneMaterial, SceneObject, Timeline, VertexGroup,
};

/// Load a JSON scene dump
pub fn load_json_scene(path: &Path) -> Result<Scene> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene: {}", path.display()))?;
    parse_json_scene(&content).with_context(|| format!("Invalid scene file: {}", path.display()))
}

/// Parse a JSON scene dump from a string
pub fn parse_json_scene(content: &str) -> Result<Scene> {
    let mut scene: Scene = serde_json::from_str(content).context("Failed to parse scene JSON")?;
    scene.validate()?;
    scene.sort_pose_keys();
    Ok(scene)
}

/// Load a scene, picking the loader from the file extension
pub fn load_scene(path: &Path, gltf_options: &GltfImportOptions) -> Result<Scene> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => load_json_scene(path),
        "gltf" | "glb" => load_gltf_scene(path, gltf_options),
        _ => bail!(
            "Unsupported scene format: {:?} (use .json, .gltf, or .glb)",
            path
        ),
    }
}
