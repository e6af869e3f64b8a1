//! Material records

/// An MS3D material. Colors are RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
    pub shininess: f32,
    pub alpha: f32,
    /// Color texture path, empty when absent
    pub color_map: String,
    /// Alpha texture path, empty when absent
    pub alpha_map: String,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [1.0, 1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0, 0.0],
            shininess: 0.0,
            alpha: 1.0,
            color_map: String::new(),
            alpha_map: String::new(),
        }
    }
}
