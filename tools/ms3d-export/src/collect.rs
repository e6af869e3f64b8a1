//! Export list collection
//!
//! Resolves which scene objects take part in an export and how. The list is
//! closed once (armatures pull in their mesh children) and then handed to the
//! assembler, which never touches the scene graph again.

use hashbrown::HashSet;

use crate::scene::{ArmatureData, MeshData, Scene, SceneObject};

/// One unit of work for the assembler
#[derive(Debug, Clone, Copy)]
pub enum ExportItem<'a> {
    /// A mesh that is not bound to an exported armature
    MeshOnly {
        object: &'a SceneObject,
        mesh: &'a MeshData,
    },
    /// An armature and the first mesh parented to it
    ArmatureWithMesh {
        object: &'a SceneObject,
        armature: &'a ArmatureData,
        mesh_object: &'a SceneObject,
        mesh: &'a MeshData,
    },
    /// An armature without mesh children (bones only)
    ArmatureOnly {
        object: &'a SceneObject,
        armature: &'a ArmatureData,
    },
}

impl<'a> ExportItem<'a> {
    /// The armature object and its data, if any
    pub fn armature(&self) -> Option<(&'a SceneObject, &'a ArmatureData)> {
        match *self {
            ExportItem::ArmatureWithMesh {
                object, armature, ..
            }
            | ExportItem::ArmatureOnly { object, armature } => Some((object, armature)),
            ExportItem::MeshOnly { .. } => None,
        }
    }

    /// The mesh object and its data, if any
    pub fn mesh(&self) -> Option<(&'a SceneObject, &'a MeshData)> {
        match *self {
            ExportItem::MeshOnly { object, mesh } => Some((object, mesh)),
            ExportItem::ArmatureWithMesh {
                mesh_object, mesh, ..
            } => Some((mesh_object, mesh)),
            ExportItem::ArmatureOnly { .. } => None,
        }
    }
}

fn is_exportable(object: &SceneObject) -> bool {
    object.as_mesh().is_some() || object.as_armature().is_some()
}

/// Build the export list.
///
/// Starts from the selected objects (or every object), keeps meshes and
/// armatures, then appends the extra mesh children of each armature that are
/// not listed yet. An armature binds its first mesh child; that mesh is not
/// exported again on its own.
pub fn collect_export_items(scene: &Scene, export_selection: bool) -> Vec<ExportItem<'_>> {
    let mut list: Vec<&SceneObject> = scene
        .objects
        .iter()
        .filter(|o| (!export_selection || o.selected) && is_exportable(o))
        .collect();
    let mut listed: HashSet<&str> = list.iter().map(|o| o.name.as_str()).collect();

    // Closure: only armatures add entries, and only meshes are added
    let mut bound: Vec<Option<&SceneObject>> = Vec::with_capacity(list.len());
    let mut index = 0;
    while index < list.len() {
        let object = list[index];
        let mut first_mesh = None;
        if object.as_armature().is_some() {
            for child in scene.children(&object.name).filter(|c| c.as_mesh().is_some()) {
                if first_mesh.is_none() {
                    first_mesh = Some(child);
                } else if listed.insert(child.name.as_str()) {
                    list.push(child);
                }
            }
        }
        bound.push(first_mesh);
        index += 1;
    }

    let bound_meshes: HashSet<&str> = bound.iter().flatten().map(|m| m.name.as_str()).collect();

    let mut items = Vec::with_capacity(list.len());
    for (object, first_mesh) in list.into_iter().zip(bound) {
        match (object.as_armature(), first_mesh) {
            (Some(armature), Some(mesh_object)) => {
                if let Some(mesh) = mesh_object.as_mesh() {
                    items.push(ExportItem::ArmatureWithMesh {
                        object,
                        armature,
                        mesh_object,
                        mesh,
                    });
                }
            }
            (Some(armature), None) => items.push(ExportItem::ArmatureOnly { object, armature }),
            (None, _) => {
                if bound_meshes.contains(object.name.as_str()) {
                    tracing::debug!("'{}' is exported with its armature", object.name);
                    continue;
                }
                if let Some(mesh) = object.as_mesh() {
                    items.push(ExportItem::MeshOnly { object, mesh });
                }
            }
        }
    }
    items
}
