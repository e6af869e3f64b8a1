//! ms3d-export - MilkShape 3D ASCII export tool
//!
//! Converts scenes (JSON scene dumps, glTF/GLB) to MS3D ASCII text.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use ms3d_export::scene::{self, GltfImportOptions};
use ms3d_export::{animation, collect, export, ExportConfig, ExportItem, NormalMode};

#[derive(Parser)]
#[command(name = "ms3d-export")]
#[command(about = "MilkShape 3D ASCII export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene to MS3D ASCII
    Export {
        /// Input scene (.json, .gltf, .glb)
        input: PathBuf,

        /// Output file (default: input with .txt extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML export settings; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Export all objects instead of the selection
        #[arg(long)]
        all: bool,

        /// Write bones without sampled keys
        #[arg(long)]
        no_animations: bool,

        /// Minimum weight for a vertex to be bound to a bone (0-1)
        #[arg(long)]
        bone_threshold: Option<f32>,

        /// Keyframes sampled per second (1-300)
        #[arg(long)]
        fps: Option<u32>,

        /// Normal source
        #[arg(long, value_enum)]
        normals: Option<NormalMode>,

        /// Write materials to a separate file
        #[arg(long)]
        separate_materials: bool,

        /// Write the first animation to a separate file
        #[arg(long)]
        separate_animations: bool,

        /// glTF animation to bake (default: first animation)
        #[arg(short, long)]
        animation: Option<String>,

        /// Frame rate used when baking glTF animation
        #[arg(long)]
        bake_rate: Option<f32>,
    },

    /// List the objects an export would include
    List {
        /// Input scene (.json, .gltf, .glb)
        input: PathBuf,

        /// Consider all objects instead of the selection
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            output,
            config,
            all,
            no_animations,
            bone_threshold,
            fps,
            normals,
            separate_materials,
            separate_animations,
            animation,
            bake_rate,
        } => {
            let mut settings = match &config {
                Some(path) => ExportConfig::load(path)?,
                None => ExportConfig::default(),
            };
            if all {
                settings.export_selection = false;
            }
            if no_animations {
                settings.export_animations = false;
            }
            if let Some(threshold) = bone_threshold {
                settings.bone_threshold = threshold;
            }
            if let Some(fps) = fps {
                settings.animation_fps = fps;
            }
            if let Some(normals) = normals {
                settings.normals = normals;
            }
            if separate_materials {
                settings.separate_materials = true;
            }
            if separate_animations {
                settings.separate_animations = true;
            }
            settings.validate()?;

            let gltf_options = gltf_options(animation, bake_rate);
            let scene = scene::load_scene(&input, &gltf_options)?;
            let output = output.unwrap_or_else(|| input.with_extension("txt"));

            let written = export::export_scene(&scene, &output, &settings)?;
            for path in &written {
                tracing::info!("Wrote {:?}", path);
            }
        }
        Commands::List { input, all } => {
            let scene = scene::load_scene(&input, &GltfImportOptions::default())?;
            list_objects(&input, &scene, !all);
        }
    }

    Ok(())
}

fn gltf_options(animation: Option<String>, bake_rate: Option<f32>) -> GltfImportOptions {
    let mut options = GltfImportOptions {
        animation,
        ..Default::default()
    };
    if let Some(rate) = bake_rate {
        options.frame_rate = rate;
    }
    options
}

fn list_objects(input: &Path, scene: &scene::Scene, export_selection: bool) {
    let timeline = scene.timeline();
    tracing::info!(
        "Scene {:?}: frames {}..={} at {} fps ({} MS3D frames)",
        input,
        timeline.start,
        timeline.end,
        timeline.fps,
        animation::frame_count(timeline)
    );

    let items = collect::collect_export_items(scene, export_selection);
    if items.is_empty() {
        tracing::info!("Nothing to export");
        return;
    }

    for (i, item) in items.iter().enumerate() {
        match item {
            ExportItem::MeshOnly { object, mesh } => {
                tracing::info!(
                    "  [{}] {} '{}': {} vertices, {} polygons",
                    i,
                    object.type_name(),
                    object.name,
                    mesh.vertices.len(),
                    mesh.polygons.len()
                );
            }
            ExportItem::ArmatureWithMesh {
                object,
                armature,
                mesh_object,
                mesh,
            } => {
                tracing::info!(
                    "  [{}] {} '{}': {} bones, skinning '{}' ({} vertices, {} groups)",
                    i,
                    object.type_name(),
                    object.name,
                    armature.bones.len(),
                    mesh_object.name,
                    mesh.vertices.len(),
                    mesh.vertex_groups.len()
                );
            }
            ExportItem::ArmatureOnly { object, armature } => {
                tracing::info!(
                    "  [{}] {} '{}': {} bones, no mesh",
                    i,
                    object.type_name(),
                    object.name,
                    armature.bones.len()
                );
            }
        }
    }
}
