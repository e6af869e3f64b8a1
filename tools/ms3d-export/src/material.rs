//! Material translation (best effort)
//!
//! Only the channels MS3D has a slot for are carried over. Ambient, emissive
//! and alpha keep the MS3D defaults.

use ms3d_common::Material;

use crate::scene::SceneMaterial;

/// Translate a scene material.
///
/// Specular intensity goes into the specular alpha channel and metallic is
/// written as shininess.
pub fn convert_material(source: &SceneMaterial) -> Material {
    let [r, g, b] = source.specular_color;
    Material {
        diffuse: source.diffuse_color,
        specular: [r, g, b, source.specular_intensity],
        shininess: source.metallic,
        color_map: source.image_texture.clone().unwrap_or_default(),
        ..Material::new(source.name.clone())
    }
}
