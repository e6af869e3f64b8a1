//! ms3d-export library
//!
//! Converts host scenes (JSON scene dumps, glTF/GLB) into MilkShape 3D ASCII
//! documents. The CLI in `main.rs` is a thin wrapper around [`export_scene`].

pub mod animation;
pub mod collect;
pub mod config;
pub mod export;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod skeleton;

// Re-export the document model from ms3d-common
pub use ms3d_common::{Ms3dModel, ANIMATION_FRAME_RATE, NO_BONE, NO_MATERIAL};

pub use collect::{collect_export_items, ExportItem};
pub use config::{ConfigError, ExportConfig, NormalMode};
pub use export::{assemble, export_scene, plan_documents, write_document, OutputDocument, Section};
pub use scene::{load_scene, GltfImportOptions, PoseSampler, Scene};
