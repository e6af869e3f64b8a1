//! Bones and keyframe streams
//!
//! Bones refer to their parent by name. Nothing owns across bones; the
//! relation is resolved through [`Animation::parent_index`] when needed.

use hashbrown::HashSet;

use crate::formats::FormatError;

/// A single key on a position or rotation stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFrame {
    /// 1-based frame number on the 30 fps MS3D timeline
    pub time: f64,
    pub value: [f64; 3],
}

impl KeyFrame {
    pub fn new(time: f64, value: [f64; 3]) -> Self {
        Self { time, value }
    }
}

/// A skeleton bone with its idle pose and animation keys
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Parent bone name, empty for roots
    pub parent: String,
    pub flags: u8,
    /// World-space head for roots, bone-local for children (MS3D axes)
    pub idle_position: [f64; 3],
    /// YZX Euler angles
    pub idle_rotation: [f64; 3],
    pub position_keys: Vec<KeyFrame>,
    pub rotation_keys: Vec<KeyFrame>,
}

impl Bone {
    pub fn new(
        name: impl Into<String>,
        parent: impl Into<String>,
        idle_position: [f64; 3],
        idle_rotation: [f64; 3],
    ) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            flags: 0,
            idle_position,
            idle_rotation,
            position_keys: Vec::new(),
            rotation_keys: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }
}

/// The bones of one armature, sharing one timeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    /// Armature the bones came from (used for logging only)
    pub name: String,
    pub bones: Vec<Bone>,
}

impl Animation {
    pub fn new(name: impl Into<String>, bones: Vec<Bone>) -> Self {
        Self {
            name: name.into(),
            bones,
        }
    }

    /// Index of the parent of `bone`, `None` for roots and unknown parents
    pub fn parent_index(&self, bone: usize) -> Option<usize> {
        let parent = &self.bones.get(bone)?.parent;
        if parent.is_empty() {
            return None;
        }
        self.bones.iter().position(|b| &b.name == parent)
    }

    /// Check bone names are unique and every parent name resolves
    pub fn validate(&self) -> Result<(), FormatError> {
        let mut seen = HashSet::new();
        for bone in &self.bones {
            if !seen.insert(bone.name.as_str()) {
                return Err(FormatError::DuplicateBone(bone.name.clone()));
            }
        }

        for (index, bone) in self.bones.iter().enumerate() {
            if !bone.is_root() && self.parent_index(index).is_none() {
                return Err(FormatError::UnknownParent {
                    bone: bone.name.clone(),
                    parent: bone.parent.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Animation {
        Animation::new(
            "Armature",
            vec![
                Bone::new("Root", "", [0.0; 3], [0.0; 3]),
                Bone::new("Spine", "Root", [0.0, 1.0, 0.0], [0.0; 3]),
                Bone::new("Head", "Spine", [0.0, 1.0, 0.0], [0.0; 3]),
            ],
        )
    }

    #[test]
    fn test_parent_index_lookup() {
        let anim = chain();
        assert_eq!(anim.parent_index(0), None);
        assert_eq!(anim.parent_index(1), Some(0));
        assert_eq!(anim.parent_index(2), Some(1));
        assert_eq!(anim.parent_index(3), None);
    }

    #[test]
    fn test_validate_ok() {
        assert!(chain().validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_parent() {
        let mut anim = chain();
        anim.bones[2].parent = "Neck".to_string();
        assert_eq!(
            anim.validate(),
            Err(FormatError::UnknownParent {
                bone: "Head".to_string(),
                parent: "Neck".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_duplicate_name() {
        let mut anim = chain();
        anim.bones[2].name = "Spine".to_string();
        assert_eq!(
            anim.validate(),
            Err(FormatError::DuplicateBone("Spine".to_string()))
        );
    }
}
