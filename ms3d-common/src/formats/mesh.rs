//! Mesh geometry records
//!
//! Vertices and normals are rounded to the 6 decimals the text format keeps,
//! so two records compare equal exactly when they would print identically.

use crate::coords::round6;
use crate::formats::intern::InternKey;
use crate::formats::FormatError;

/// Bone index of a vertex that is not bound to any bone
pub const NO_BONE: i32 = -1;

/// Material index of a mesh without a material
pub const NO_MATERIAL: i32 = -1;

/// A mesh vertex: position, texture coordinate, and owning bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub flags: u8,
    pub position: [f64; 3],
    pub uv: [f64; 2],
    /// Owning bone, or [`NO_BONE`]
    pub bone: i32,
}

impl Vertex {
    /// Create a vertex, rounding position and uv to 6 decimals
    pub fn new(flags: u8, position: [f64; 3], uv: [f64; 2], bone: i32) -> Self {
        Self {
            flags,
            position: position.map(round6),
            uv: uv.map(round6),
            bone,
        }
    }
}

impl InternKey for Vertex {
    type Key = (u8, [u64; 5], i32);

    fn intern_key(&self) -> Self::Key {
        let [x, y, z] = self.position;
        let [u, v] = self.uv;
        (self.flags, [x, y, z, u, v].map(float_key), self.bone)
    }
}

/// A mesh normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    pub direction: [f64; 3],
}

impl Normal {
    /// Create a normal, rounding each component to 6 decimals
    pub fn new(direction: [f64; 3]) -> Self {
        Self {
            direction: direction.map(round6),
        }
    }
}

impl InternKey for Normal {
    type Key = [u64; 3];

    fn intern_key(&self) -> Self::Key {
        self.direction.map(float_key)
    }
}

/// Bit pattern used for hashing. `-0.0` and `0.0` compare equal, so both map
/// to the same key.
fn float_key(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

/// A triangle referencing vertices and normals of its mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub flags: u8,
    pub vertices: [u32; 3],
    /// Per-corner normals, parallel to `vertices`
    pub normals: [u32; 3],
    /// 1-based index of the source polygon
    pub smoothing_group: u32,
}

/// A named mesh with its own vertex, normal, and triangle lists
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub flags: u8,
    /// Index into the model's material list, or [`NO_MATERIAL`]
    pub material: i32,
    pub vertices: Vec<Vertex>,
    pub normals: Vec<Normal>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, material: i32) -> Self {
        Self {
            name: name.into(),
            flags: 0,
            material,
            vertices: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Check that every triangle index refers to an existing vertex and normal
    pub fn validate(&self) -> Result<(), FormatError> {
        for (triangle_index, triangle) in self.triangles.iter().enumerate() {
            let lists = [
                ("vertex", &triangle.vertices, self.vertices.len()),
                ("normal", &triangle.normals, self.normals.len()),
            ];
            for (kind, indices, count) in lists {
                if let Some(&index) = indices.iter().find(|&&i| i as usize >= count) {
                    return Err(FormatError::TriangleIndexOutOfRange {
                        mesh: self.name.clone(),
                        triangle: triangle_index,
                        kind,
                        index,
                        count,
                    });
                }
            }
        }
        Ok(())
    }
}
