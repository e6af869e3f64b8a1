//! Mesh conversion (scene polygons -> MS3D mesh)

mod convert;
pub mod skin;
pub mod triangulate;

// Re-export public API
pub use convert::convert_mesh;
pub use skin::resolve_bone;
pub use triangulate::{fan_triangulate, DEGENERATE_ANGLE_EPSILON};
