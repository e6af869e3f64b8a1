//! Model assembly and document output
//!
//! [`assemble`] turns a scene into an [`Ms3dModel`]; [`plan_documents`]
//! decides which blocks go to which file; [`write_document`] writes one
//! planned file. [`export_scene`] runs all three.

use anyhow::{Context, Result};
use ms3d_common::{
    write_bones, write_header, write_materials, write_meshes, write_no_bones, write_no_materials,
    write_trailer, Animation, Ms3dModel, NO_MATERIAL,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::animation::{frame_count, sample_animation, zero_root_rotations};
use crate::collect::collect_export_items;
use crate::config::ExportConfig;
use crate::material::convert_material;
use crate::mesh::convert_mesh;
use crate::scene::Scene;
use crate::skeleton::build_bones;

/// Build the document model for `scene`
pub fn assemble(scene: &Scene, config: &ExportConfig) -> Result<Ms3dModel> {
    let timeline = scene.timeline();
    let mut model = Ms3dModel {
        frame_count: frame_count(timeline),
        ..Default::default()
    };

    for item in collect_export_items(scene, config.export_selection) {
        if let Some((object, armature)) = item.armature() {
            let mut bones = build_bones(armature, object.world_matrix());
            if config.export_animations {
                sample_animation(&mut bones, armature, timeline, config.animation_fps as f64);
            }
            zero_root_rotations(&mut bones);
            tracing::debug!("Armature '{}': {} bones", object.name, bones.len());
            model.animations.push(Animation::new(object.name.clone(), bones));
        }

        if let Some((object, mesh)) = item.mesh() {
            let material = match &mesh.material {
                Some(source) => {
                    model.materials.push(convert_material(source));
                    (model.materials.len() - 1) as i32
                }
                None => NO_MATERIAL,
            };
            let converted = convert_mesh(mesh, material, config.normals, config.bone_threshold)
                .with_context(|| format!("Failed to convert mesh of '{}'", object.name))?;
            model.meshes.push(converted);
        }
    }

    Ok(model)
}

/// One block of an output document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Meshes,
    Materials,
    /// `Materials: 0`
    NoMaterials,
    /// Bones of the animation at this index
    Bones(usize),
    /// `Bones: 0`
    NoBones,
    Trailer,
}

/// A file to write and the blocks it holds, in order
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDocument {
    pub path: PathBuf,
    pub sections: Vec<Section>,
}

/// Route the model's blocks to the primary document and its siblings.
///
/// Only one animation fits in a document. The first one goes to the primary
/// document (or `<stem> anim.<ext>` when animations are separated); each
/// further animation `k` goes to `<stem> anim <k>.<ext>`.
pub fn plan_documents(path: &Path, config: &ExportConfig, model: &Ms3dModel) -> Vec<OutputDocument> {
    let mut primary = vec![Section::Header, Section::Meshes];
    let mut siblings = Vec::new();

    if config.separate_materials {
        primary.push(Section::NoMaterials);
        siblings.push(OutputDocument {
            path: sibling_path(path, "mats"),
            sections: vec![Section::Materials],
        });
    } else {
        primary.push(Section::Materials);
    }

    if model.animations.is_empty() {
        primary.push(Section::NoBones);
    } else if config.separate_animations {
        primary.push(Section::NoBones);
        siblings.push(OutputDocument {
            path: sibling_path(path, "anim"),
            sections: vec![Section::Bones(0)],
        });
    } else {
        primary.push(Section::Bones(0));
    }

    for index in 1..model.animations.len() {
        siblings.push(OutputDocument {
            path: sibling_path(path, &format!("anim {}", index)),
            sections: vec![Section::Bones(index)],
        });
    }

    primary.push(Section::Trailer);

    let mut documents = vec![OutputDocument {
        path: path.to_path_buf(),
        sections: primary,
    }];
    documents.extend(siblings);
    documents
}

/// `dir/model.txt` + `mats` -> `dir/model mats.txt`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{} {}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{} {}", stem, suffix),
    };
    path.with_file_name(name)
}

/// Write the blocks of one planned document
pub fn write_sections<W: Write>(
    w: &mut W,
    sections: &[Section],
    model: &Ms3dModel,
    with_keys: bool,
) -> Result<()> {
    for section in sections {
        match *section {
            Section::Header => write_header(w, model.frame_count)?,
            Section::Meshes => write_meshes(w, &model.meshes)?,
            Section::Materials => write_materials(w, &model.materials)?,
            Section::NoMaterials => write_no_materials(w)?,
            Section::Bones(index) => {
                let animation = model
                    .animations
                    .get(index)
                    .with_context(|| format!("No animation at index {}", index))?;
                write_bones(w, animation, with_keys)?;
            }
            Section::NoBones => write_no_bones(w)?,
            Section::Trailer => write_trailer(w)?,
        }
    }
    Ok(())
}

/// Create, fill and flush one document. The file is closed on return.
pub fn write_document(document: &OutputDocument, model: &Ms3dModel, with_keys: bool) -> Result<()> {
    let file = File::create(&document.path)
        .with_context(|| format!("Failed to create output file: {:?}", document.path))?;
    let mut writer = BufWriter::new(file);

    write_sections(&mut writer, &document.sections, model, with_keys)
        .with_context(|| format!("Failed to write {:?}", document.path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {:?}", document.path))?;
    Ok(())
}

/// Convert `scene` and write every planned document. Returns the written paths.
pub fn export_scene(scene: &Scene, output: &Path, config: &ExportConfig) -> Result<Vec<PathBuf>> {
    config.validate()?;
    scene.validate()?;

    let model = assemble(scene, config)?;
    for animation in &model.animations {
        if let Err(e) = animation.validate() {
            tracing::warn!("Armature '{}': {}", animation.name, e);
        }
    }
    if model.animations.len() > 1 {
        tracing::warn!(
            "{} armatures exported; each extra armature goes to its own file",
            model.animations.len()
        );
    }

    let documents = plan_documents(output, config, &model);
    for document in &documents {
        write_document(document, &model, config.export_animations)?;
    }

    tracing::info!(
        "Exported {:?}: {} meshes, {} materials, {} animations, {} frames ({} files)",
        output,
        model.meshes.len(),
        model.materials.len(),
        model.animations.len(),
        model.frame_count,
        documents.len()
    );

    Ok(documents.into_iter().map(|d| d.path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::parse_json_scene;
    use ms3d_common::Bone;

    fn model_with_animations(count: usize) -> Ms3dModel {
        Ms3dModel {
            frame_count: 1,
            animations: (0..count)
                .map(|i| {
                    Animation::new(
                        format!("Rig{}", i),
                        vec![Bone::new("Root", "", [0.0; 3], [0.0; 3])],
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    fn names(documents: &[OutputDocument]) -> Vec<String> {
        documents
            .iter()
            .map(|d| d.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_sibling_path() {
        let path = Path::new("out/model.txt");
        assert_eq!(sibling_path(path, "mats"), Path::new("out/model mats.txt"));
        assert_eq!(sibling_path(path, "anim 2"), Path::new("out/model anim 2.txt"));
        assert_eq!(sibling_path(Path::new("model"), "anim"), Path::new("model anim"));
    }

    #[test]
    fn test_plan_single_document() {
        let config = ExportConfig::default();
        let docs = plan_documents(Path::new("model.txt"), &config, &model_with_animations(1));
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].sections,
            vec![
                Section::Header,
                Section::Meshes,
                Section::Materials,
                Section::Bones(0),
                Section::Trailer
            ]
        );

        let docs = plan_documents(Path::new("model.txt"), &config, &model_with_animations(0));
        assert_eq!(docs[0].sections[3], Section::NoBones);
    }

    #[test]
    fn test_plan_separate_files() {
        let config = ExportConfig {
            separate_materials: true,
            separate_animations: true,
            ..Default::default()
        };
        let docs = plan_documents(Path::new("model.txt"), &config, &model_with_animations(3));
        assert_eq!(
            names(&docs),
            vec![
                "model.txt",
                "model mats.txt",
                "model anim.txt",
                "model anim 1.txt",
                "model anim 2.txt"
            ]
        );
        assert_eq!(docs[0].sections[2], Section::NoMaterials);
        assert_eq!(docs[0].sections[3], Section::NoBones);
        assert_eq!(docs[1].sections, vec![Section::Materials]);
        assert_eq!(docs[4].sections, vec![Section::Bones(2)]);
    }

    #[test]
    fn test_extra_animations_always_split() {
        let config = ExportConfig::default();
        let docs = plan_documents(Path::new("model.txt"), &config, &model_with_animations(2));
        assert_eq!(names(&docs), vec!["model.txt", "model anim 1.txt"]);
        assert_eq!(docs[0].sections[3], Section::Bones(0));
    }

    #[test]
    fn test_assemble_material_indices() {
        let scene = parse_json_scene(
            r#"{
            "objects": [
                { "name": "A", "selected": true, "data": { "type": "MESH", "name": "A",
                  "vertices": [], "polygons": [] } },
                { "name": "B", "selected": true, "data": { "type": "MESH", "name": "B",
                  "vertices": [], "polygons": [], "material": { "name": "Red" } } }
            ]
        }"#,
        )
        .unwrap();
        let model = assemble(&scene, &ExportConfig::default()).unwrap();
        assert_eq!(model.meshes.len(), 2);
        assert_eq!(model.meshes[0].material, NO_MATERIAL);
        assert_eq!(model.meshes[1].material, 0);
        assert_eq!(model.materials[0].name, "Red");
        assert!(model.animations.is_empty());
    }

    #[test]
    fn test_placeholder_keys_without_animation() {
        let model = model_with_animations(1);
        let mut out = Vec::new();
        write_sections(&mut out, &[Section::Bones(0)], &model, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("1\n1 0 0 0\n1\n1 0 0 0\n"));
    }

    #[test]
    fn test_export_rejects_zero_fps_scene() {
        let mut scene = parse_json_scene(r#"{ "objects": [] }"#).unwrap();
        scene.fps = 0.0;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.txt");

        let err = export_scene(&scene, &output, &ExportConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Invalid scene frame rate"));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_animation_is_an_error() {
        let model = model_with_animations(0);
        let mut out = Vec::new();
        assert!(write_sections(&mut out, &[Section::Bones(0)], &model, true).is_err());
    }
}
