//! Shared types and utilities for MilkShape 3D ASCII documents
//!
//! This crate provides the format-level pieces shared between:
//! - `ms3d-export` (scene conversion library and CLI)
//! - tests and tools that inspect exported documents
//!
//! # Modules
//!
//! - [`coords`] - Source (Z-up) to MS3D (Y-up) coordinate conversion
//! - [`formats`] - MS3D ASCII document model, deduplication, and text writer

pub mod coords;
pub mod formats;

// Re-export coordinate helpers
pub use coords::{from_target, round6, to_target, to_target_euler, to_target_uv};

// Re-export commonly used format items
pub use formats::{
    write_bones, write_header, write_materials, write_meshes, write_no_bones, write_no_materials,
    write_trailer, Animation, Bone, FormatError, Interner, KeyFrame, Material, Mesh, Ms3dModel,
    Normal, Triangle, Vertex, ANIMATION_FRAME_RATE, NO_BONE, NO_MATERIAL,
};
