//! Export settings
//!
//! Settings can come from a TOML file (`--config export.toml`); CLI flags
//! override what the file says. Every field is optional.
//!
//! ```toml
//! export_selection = false
//! bone_threshold = 0.25
//! animation_fps = 60
//! normals = "vertex"
//! separate_animations = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Where triangle corner normals come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NormalMode {
    /// One normal per polygon, shared by all of its corners
    #[default]
    Face,
    /// Each corner uses its vertex normal
    Vertex,
}

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("bone_threshold must be between 0 and 1, got {0}")]
    BoneThreshold(f32),

    #[error("animation_fps must be between 1 and 300, got {0}")]
    AnimationFps(u32),
}

/// Settings for one export run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Only export selected objects (plus the meshes bound to selected armatures)
    pub export_selection: bool,

    /// Sample pose keys. When off, bones get placeholder keys.
    pub export_animations: bool,

    /// Minimum weight for a vertex to be bound to its strongest bone
    pub bone_threshold: f32,

    /// Keyframes sampled per second of source animation
    pub animation_fps: u32,

    pub normals: NormalMode,

    /// Write materials to `<name> mats.<ext>`
    pub separate_materials: bool,

    /// Write the first animation to `<name> anim.<ext>`
    pub separate_animations: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_selection: true,
            export_animations: true,
            bone_threshold: 0.5,
            animation_fps: 30,
            normals: NormalMode::Face,
            separate_materials: false,
            separate_animations: false,
        }
    }
}

impl ExportConfig {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse and validate settings from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse export config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.bone_threshold) {
            return Err(ConfigError::BoneThreshold(self.bone_threshold));
        }
        if !(1..=300).contains(&self.animation_fps) {
            return Err(ConfigError::AnimationFps(self.animation_fps));
        }
        Ok(())
    }
}
