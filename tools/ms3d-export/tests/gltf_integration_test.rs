//! Integration tests for the glTF import pipeline.
//!
//! Tests the complete flow:
//! 1. Generate a skinned, animated glTF programmatically
//! 2. Load it as a scene and export through ms3d-export
//! 3. Validate the document model and the written text

mod gltf_generator;

use tempfile::tempdir;

use ms3d_export::scene::{load_gltf_scene, load_scene, GltfImportOptions};
use ms3d_export::{assemble, export_scene, ExportConfig, NO_BONE};

#[test]
fn test_load_gltf_scene_structure() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = gltf_generator::write_skinned_quad(dir.path());

    let scene = load_gltf_scene(&path, &GltfImportOptions::default()).expect("Failed to load glTF");

    // 1 second clip baked at 30 fps
    assert_eq!(scene.frame_start, 1);
    assert_eq!(scene.frame_end, 31);
    assert_eq!(scene.fps, 30.0);

    let rig = scene.object("Rig").expect("Missing armature").as_armature().unwrap();
    let names: Vec<&str> = rig.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Root", "Tip"]);
    assert_eq!(rig.bones[1].parent.as_deref(), Some("Root"));
    // glTF +Y becomes +Z
    assert!((rig.bones[1].head()[2] - 1.0).abs() < 1e-5);
    assert_eq!(rig.pose.len(), 2);
    assert_eq!(rig.pose[1].keys.len(), 31);

    let body = scene.object("Body").expect("Missing mesh");
    assert!(body.selected);
    assert_eq!(body.parent.as_deref(), Some("Rig"));
    let mesh = body.as_mesh().unwrap();
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.polygons.len(), 2);
    assert_eq!(mesh.vertex_groups.len(), 2);
    assert_eq!(mesh.vertex_groups[1].weight(2), Some(1.0));
    assert_eq!(mesh.vertex_groups[1].weight(0), None);

    let material = mesh.material.as_ref().expect("Missing material");
    assert_eq!(material.name, "Skin");
    assert_eq!(material.diffuse_color, [1.0, 0.5, 0.25, 1.0]);
    assert_eq!(material.metallic, 0.25);
    assert_eq!(material.image_texture, None);
}

#[test]
fn test_assemble_gltf_scene() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = gltf_generator::write_skinned_quad(dir.path());

    let scene = load_scene(&path, &GltfImportOptions::default()).expect("Failed to load glTF");
    let model = assemble(&scene, &ExportConfig::default()).expect("Assembly failed");

    assert_eq!(model.frame_count, 31);
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.materials.len(), 1);
    assert_eq!(model.animations.len(), 1);

    let mesh = &model.meshes[0];
    assert_eq!(mesh.material, 0);
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.triangles.len(), 2);
    // Both triangles share the quad's face normal
    assert_eq!(mesh.normals.len(), 1);
    let bones: Vec<i32> = mesh.vertices.iter().map(|v| v.bone).collect();
    assert_eq!(bones, vec![0, 0, 1, 1]);
    assert!(!bones.contains(&NO_BONE));
    // V flipped back to a bottom-left origin, then negated
    assert_eq!(mesh.vertices[2].uv, [1.0, -1.0]);

    let animation = &model.animations[0];
    assert_eq!(animation.name, "Rig");
    assert!(animation.validate().is_ok());
    let tip = &animation.bones[1];
    assert_eq!(tip.parent, "Root");
    // Source frames 1..=32 at the default 30 fps
    assert_eq!(tip.position_keys.len(), 32);
    assert_eq!(tip.rotation_keys.len(), 32);
    assert_eq!(tip.rotation_keys[0].time, 1.0);

    // glTF +Z is Z-up -Y, so the wave ends as -90° about Y
    let [x, y, z] = tip.rotation_keys[31].value;
    assert!(x.abs() < 1e-3, "x = {}", x);
    assert!((y + std::f64::consts::FRAC_PI_2).abs() < 1e-3, "y = {}", y);
    assert!(z.abs() < 1e-3, "z = {}", z);

    // Roots start from a zero rotation
    assert_eq!(animation.bones[0].idle_rotation, [0.0; 3]);
}

#[test]
fn test_export_gltf_end_to_end() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = gltf_generator::write_skinned_quad(dir.path());
    let output = dir.path().join("rig.txt");

    let options = GltfImportOptions {
        frame_rate: 24.0,
        ..Default::default()
    };
    let scene = load_scene(&path, &options).expect("Failed to load glTF");
    let config = ExportConfig {
        separate_animations: true,
        ..Default::default()
    };
    let written = export_scene(&scene, &output, &config).expect("Export failed");
    assert_eq!(written.len(), 2);

    // 24 baked frames + 1 -> round(25 * 30 / 24) = 31
    let primary = std::fs::read_to_string(&output).expect("Failed to read output");
    assert!(primary.starts_with("// MilkShape 3D ASCII\n// Converted using ms3d-export\nFrames: 31\n"));
    assert!(primary.contains("Meshes: 1\n\"Body\" 0 0\n4\n"));
    assert!(primary.contains(
        "Materials: 1\n\"Skin\"\n0.200000 0.200000 0.200000 1.000000\n1.000000 0.500000 0.250000 1.000000\n"
    ));
    assert!(primary.contains("Bones: 0\n"));

    let animation = std::fs::read_to_string(dir.path().join("rig anim.txt"))
        .expect("Failed to read animation file");
    assert!(animation.starts_with("Bones: 2\n\"Root\"\n\"\"\n"));
    assert!(animation.contains("\"Tip\"\n\"Root\"\n"));
}

#[test]
fn test_unknown_animation_name() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = gltf_generator::write_skinned_quad(dir.path());

    let options = GltfImportOptions {
        animation: Some("Run".to_string()),
        ..Default::default()
    };
    let err = load_gltf_scene(&path, &options).unwrap_err();
    assert!(format!("{:#}", err).contains("Animation 'Run' not found"));
}

#[test]
fn test_cli_exports_gltf() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = gltf_generator::write_skinned_quad(dir.path());
    let output = dir.path().join("cli.txt");

    let status = std::process::Command::new(env!("CARGO_BIN_EXE_ms3d-export"))
        .args([
            "export",
            path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--animation",
            "Wave",
            "--no-animations",
        ])
        .status()
        .expect("Failed to run ms3d-export");
    assert!(status.success(), "ms3d-export export command failed");

    let text = std::fs::read_to_string(&output).expect("Failed to read output");
    assert!(text.contains("Bones: 2\n"));
    assert_eq!(text.matches("1\n1 0 0 0\n1\n1 0 0 0\n").count(), 2);
}
