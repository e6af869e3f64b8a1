//! MilkShape 3D ASCII document model and text writer
//!
//! The document model mirrors the sections of an MS3D ASCII file: meshes
//! (with their own deduplicated vertex and normal lists), materials, and one
//! bone list per animation. [`writer`] turns a populated [`Ms3dModel`] into
//! text; it performs no conversion of its own.

pub mod intern;
pub mod material;
pub mod mesh;
pub mod skeleton;
pub mod writer;

pub use intern::{InternKey, Interner};
pub use material::Material;
pub use mesh::{Mesh, Normal, Triangle, Vertex, NO_BONE, NO_MATERIAL};
pub use skeleton::{Animation, Bone, KeyFrame};
pub use writer::{
    write_bones, write_header, write_materials, write_meshes, write_no_bones, write_no_materials,
    write_trailer,
};

/// MS3D keyframe times are expressed on a fixed 30 fps timeline.
pub const ANIMATION_FRAME_RATE: f64 = 30.0;

/// Errors raised when a document breaks an MS3D invariant
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// A triangle references a vertex or normal the mesh does not own
    #[error("mesh '{mesh}' triangle {triangle} references {kind} {index}, but only {count} exist")]
    TriangleIndexOutOfRange {
        mesh: String,
        triangle: usize,
        kind: &'static str,
        index: u32,
        count: usize,
    },

    /// Two bones in one animation share a name
    #[error("bone name '{0}' is used more than once")]
    DuplicateBone(String),

    /// A bone names a parent that is not part of the same animation
    #[error("bone '{bone}' has unknown parent '{parent}'")]
    UnknownParent { bone: String, parent: String },
}

/// Everything that ends up in one export run
#[derive(Debug, Clone, Default)]
pub struct Ms3dModel {
    /// Value of the `Frames:` header line
    pub frame_count: u32,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    /// One bone list per exported armature
    pub animations: Vec<Animation>,
}
