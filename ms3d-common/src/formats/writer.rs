//! MS3D ASCII text writer
//!
//! Each function emits one block of the document. Callers decide which
//! blocks go to which output; see `ms3d_export::export` for the routing.
//!
//! # Layout
//! ```text
//! // MilkShape 3D ASCII           header comment
//! Frames: <n>                      frame count on the 30 fps timeline
//! Frame: 1
//!
//! Meshes: <n>                      per mesh: header, vertices, normals, triangles
//! Materials: <n>                   per material: 9 lines
//! Bones: <n>                       per bone: name, parent, idle pose, key streams
//! GroupComments: 0                 trailer
//! ```
//!
//! Every float is printed with exactly 6 decimals; strings are quoted.

use anyhow::Result;
use std::io::Write;

use crate::coords::round6;
use crate::formats::{Animation, Material, Mesh};

/// Placeholder key streams written for each bone when animation is off.
/// The format requires the counts even without keys.
const PLACEHOLDER_KEYS: &str = "1\n1 0 0 0\n1\n1 0 0 0\n";

/// Write the header comment, frame count, and current frame marker
pub fn write_header<W: Write>(w: &mut W, frame_count: u32) -> Result<()> {
    write!(
        w,
        "// MilkShape 3D ASCII\n// Converted using ms3d-export\nFrames: {}\nFrame: 1\n\n",
        frame_count
    )?;
    Ok(())
}

/// Write the `Meshes:` block. Fails if a mesh references missing geometry.
pub fn write_meshes<W: Write>(w: &mut W, meshes: &[Mesh]) -> Result<()> {
    writeln!(w, "Meshes: {}", meshes.len())?;
    for mesh in meshes {
        mesh.validate()?;

        writeln!(w, "\"{}\" {} {}", mesh.name, mesh.flags, mesh.material)?;

        writeln!(w, "{}", mesh.vertices.len())?;
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            let [s, t] = v.uv;
            writeln!(
                w,
                "{} {:.6} {:.6} {:.6} {:.6} {:.6} {}",
                v.flags, x, y, z, s, t, v.bone
            )?;
        }

        writeln!(w, "{}", mesh.normals.len())?;
        for n in &mesh.normals {
            let [x, y, z] = n.direction;
            writeln!(w, "{:.6} {:.6} {:.6}", x, y, z)?;
        }

        writeln!(w, "{}", mesh.triangles.len())?;
        for t in &mesh.triangles {
            writeln!(
                w,
                "{} {} {} {} {} {} {} {}",
                t.flags,
                t.vertices[0],
                t.vertices[1],
                t.vertices[2],
                t.normals[0],
                t.normals[1],
                t.normals[2],
                t.smoothing_group
            )?;
        }
    }
    Ok(())
}

/// Write the `Materials:` block
pub fn write_materials<W: Write>(w: &mut W, materials: &[Material]) -> Result<()> {
    writeln!(w, "Materials: {}", materials.len())?;
    for mat in materials {
        writeln!(w, "\"{}\"", mat.name)?;
        for color in [&mat.ambient, &mat.diffuse, &mat.specular, &mat.emissive] {
            write_color(w, color)?;
        }
        // Shininess is stored as a whole number
        writeln!(w, "{:.6}", (mat.shininess as f64).round_ties_even())?;
        writeln!(w, "{:.6}", round6(mat.alpha as f64))?;
        writeln!(w, "\"{}\"", mat.color_map)?;
        writeln!(w, "\"{}\"", mat.alpha_map)?;
    }
    Ok(())
}

/// Write `Materials: 0`, used when materials go to their own document
pub fn write_no_materials<W: Write>(w: &mut W) -> Result<()> {
    writeln!(w, "Materials: 0")?;
    Ok(())
}

/// Write the `Bones:` block of one animation.
///
/// With `with_keys` false each bone gets a single zero key per stream
/// instead of its sampled keys.
pub fn write_bones<W: Write>(w: &mut W, animation: &Animation, with_keys: bool) -> Result<()> {
    writeln!(w, "Bones: {}", animation.bones.len())?;
    for bone in &animation.bones {
        writeln!(w, "\"{}\"", bone.name)?;
        writeln!(w, "\"{}\"", bone.parent)?;

        let [px, py, pz] = bone.idle_position.map(round6);
        let [rx, ry, rz] = bone.idle_rotation.map(round6);
        writeln!(
            w,
            "{} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
            bone.flags, px, py, pz, rx, ry, rz
        )?;

        if !with_keys {
            w.write_all(PLACEHOLDER_KEYS.as_bytes())?;
            continue;
        }

        for keys in [&bone.position_keys, &bone.rotation_keys] {
            writeln!(w, "{}", keys.len())?;
            for key in keys.iter() {
                let [x, y, z] = key.value.map(round6);
                writeln!(
                    w,
                    "{:.6} {:.6} {:.6} {:.6}",
                    round6(key.time),
                    x,
                    y,
                    z
                )?;
            }
        }
    }
    Ok(())
}

/// Write `Bones: 0`, used when no animation shares this document
pub fn write_no_bones<W: Write>(w: &mut W) -> Result<()> {
    writeln!(w, "Bones: 0")?;
    Ok(())
}

/// Write the four comment counts that close a primary document
pub fn write_trailer<W: Write>(w: &mut W) -> Result<()> {
    w.write_all(b"GroupComments: 0\nMaterialComments: 0\nBoneComments: 0\nModelComment: 0\n")?;
    Ok(())
}

fn write_color<W: Write>(w: &mut W, color: &[f32; 4]) -> Result<()> {
    let [r, g, b, a] = color.map(|c| round6(c as f64));
    writeln!(w, "{:.6} {:.6} {:.6} {:.6}", r, g, b, a)?;
    Ok(())
}
