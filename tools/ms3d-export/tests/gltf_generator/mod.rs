//! Programmatic glTF generation for integration tests.
//!
//! Writes a `.gltf` + `.bin` pair with:
//! - a skinned quad (positions, normals, UVs, joints, weights, indices)
//! - a 2-bone skeleton (Root -> Tip)
//! - a 1 second "Wave" clip rotating Tip 90° about glTF +Z
//! - one material "Skin"

use serde_json::{json, Value};
use std::path::{Path, PathBuf};

const F32: u32 = 5126;
const U16: u32 = 5123;
const U8: u32 = 5121;

/// Binary buffer under construction plus its views and accessors
#[derive(Default)]
struct BufferBuilder {
    data: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl BufferBuilder {
    /// Append `bytes` as a new view + accessor, returning the accessor index
    fn push(
        &mut self,
        bytes: &[u8],
        component_type: u32,
        type_: &str,
        count: usize,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> usize {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);

        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
        }));

        let mut accessor = json!({
            "bufferView": self.views.len() - 1,
            "componentType": component_type,
            "count": count,
            "type": type_,
        });
        if let Some((min, max)) = bounds {
            accessor["min"] = json!(min);
            accessor["max"] = json!(max);
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }
}

/// Write `<dir>/rig.gltf` and `<dir>/rig.bin`, returning the .gltf path
pub fn write_skinned_quad(dir: &Path) -> PathBuf {
    // Unit quad in the XY plane, facing +Z
    let positions: [[f32; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];
    let normals: [[f32; 3]; 4] = [[0.0, 0.0, 1.0]; 4];
    // Top-left origin
    let uvs: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    // Bottom edge on Root, top edge on Tip
    let joints: [[u8; 4]; 4] = [[0, 0, 0, 0], [0, 0, 0, 0], [1, 0, 0, 0], [1, 0, 0, 0]];
    let weights: [[f32; 4]; 4] = [[1.0, 0.0, 0.0, 0.0]; 4];
    let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];

    let times: [f32; 2] = [0.0, 1.0];
    let half = std::f32::consts::FRAC_1_SQRT_2;
    let rotations: [[f32; 4]; 2] = [[0.0, 0.0, 0.0, 1.0], [0.0, 0.0, half, half]];

    let mut buffer = BufferBuilder::default();
    let position_accessor = buffer.push(
        bytemuck::cast_slice(&positions),
        F32,
        "VEC3",
        4,
        Some((vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 0.0])),
    );
    let normal_accessor = buffer.push(bytemuck::cast_slice(&normals), F32, "VEC3", 4, None);
    let uv_accessor = buffer.push(bytemuck::cast_slice(&uvs), F32, "VEC2", 4, None);
    let joint_accessor = buffer.push(bytemuck::cast_slice(&joints), U8, "VEC4", 4, None);
    let weight_accessor = buffer.push(bytemuck::cast_slice(&weights), F32, "VEC4", 4, None);
    let index_accessor = buffer.push(bytemuck::cast_slice(&indices), U16, "SCALAR", 6, None);
    let time_accessor = buffer.push(
        bytemuck::cast_slice(&times),
        F32,
        "SCALAR",
        2,
        Some((vec![0.0], vec![1.0])),
    );
    let rotation_accessor = buffer.push(bytemuck::cast_slice(&rotations), F32, "VEC4", 2, None);

    let bin_path = dir.join("rig.bin");
    std::fs::write(&bin_path, &buffer.data).expect("Failed to write .bin");

    let root = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0, 2] } ],
        "nodes": [
            { "name": "Root", "children": [1] },
            { "name": "Tip", "translation": [0.0, 1.0, 0.0] },
            { "name": "Body", "mesh": 0, "skin": 0 }
        ],
        "skins": [ { "name": "Rig", "joints": [0, 1] } ],
        "meshes": [ {
            "primitives": [ {
                "attributes": {
                    "POSITION": position_accessor,
                    "NORMAL": normal_accessor,
                    "TEXCOORD_0": uv_accessor,
                    "JOINTS_0": joint_accessor,
                    "WEIGHTS_0": weight_accessor
                },
                "indices": index_accessor,
                "material": 0
            } ]
        } ],
        "materials": [ {
            "name": "Skin",
            "pbrMetallicRoughness": {
                "baseColorFactor": [1.0, 0.5, 0.25, 1.0],
                "metallicFactor": 0.25
            }
        } ],
        "animations": [ {
            "name": "Wave",
            "channels": [ { "sampler": 0, "target": { "node": 1, "path": "rotation" } } ],
            "samplers": [ {
                "input": time_accessor,
                "output": rotation_accessor,
                "interpolation": "LINEAR"
            } ]
        } ],
        "buffers": [ { "uri": "rig.bin", "byteLength": buffer.data.len() } ],
        "bufferViews": buffer.views,
        "accessors": buffer.accessors
    });

    let gltf_path = dir.join("rig.gltf");
    let text = serde_json::to_string_pretty(&root).expect("Failed to serialize glTF");
    std::fs::write(&gltf_path, text).expect("Failed to write .gltf");
    gltf_path
}
