// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! GLTF/GLB exporter

use crate::assembly::{Assembly, Color};
use crate::geometry::Mesh;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const GLB_MAGIC: u32 = 0x46546C67; // "glTF"
const CHUNK_JSON: u32 = 0x4E4F534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E4942; // "BIN\0"

const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// Accumulates one shared binary buffer plus the JSON objects describing it
#[derive(Default)]
struct GltfBuilder {
    buffer: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Value>,
    materials: Vec<Value>,
    nodes: Vec<Value>,
}

impl GltfBuilder {
    fn push_view(&mut self, bytes: &[u8], target: u32) -> usize {
        align_buffer(&mut self.buffer);
        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": self.buffer.len(),
            "byteLength": bytes.len(),
            "target": target
        }));
        self.buffer.extend_from_slice(bytes);
        self.buffer_views.len() - 1
    }

    fn push_accessor(&mut self, accessor: Value) -> usize {
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    /// Add a mesh with an optional colour and a node placing it at `offset`
    fn add_mesh(&mut self, name: &str, mesh: &Mesh, color: Option<Color>, offset: [f64; 3]) {
        let mut positions = Vec::with_capacity(mesh.vertices.len() * 12);
        let mut normals = Vec::with_capacity(mesh.vertices.len() * 12);
        for vertex in &mesh.vertices {
            for c in vertex.position.iter() {
                positions.extend_from_slice(&(*c as f32).to_le_bytes());
            }
            for c in vertex.normal.iter() {
                normals.extend_from_slice(&(*c as f32).to_le_bytes());
            }
        }
        let mut indices = Vec::with_capacity(mesh.triangles.len() * 12);
        for triangle in &mesh.triangles {
            for &i in &triangle.indices {
                indices.extend_from_slice(&(i as u32).to_le_bytes());
            }
        }

        let (min, max) = calculate_bounds(mesh);

        let view = self.push_view(&positions, ARRAY_BUFFER);
        let position = self.push_accessor(json!({
            "bufferView": view,
            "componentType": FLOAT,
            "count": mesh.vertices.len(),
            "type": "VEC3",
            "min": min,
            "max": max
        }));
        let view = self.push_view(&normals, ARRAY_BUFFER);
        let normal = self.push_accessor(json!({
            "bufferView": view,
            "componentType": FLOAT,
            "count": mesh.vertices.len(),
            "type": "VEC3"
        }));
        let view = self.push_view(&indices, ELEMENT_ARRAY_BUFFER);
        let index = self.push_accessor(json!({
            "bufferView": view,
            "componentType": UNSIGNED_INT,
            "count": mesh.triangles.len() * 3,
            "type": "SCALAR"
        }));

        let mut primitive = json!({
            "attributes": { "POSITION": position, "NORMAL": normal },
            "indices": index,
            "mode": 4
        });
        if let Some(color) = color {
            self.materials.push(json!({
                "name": name,
                "pbrMetallicRoughness": {
                    "baseColorFactor": color.0,
                    "metallicFactor": 0.0,
                    "roughnessFactor": 0.8
                }
            }));
            primitive["material"] = json!(self.materials.len() - 1);
        }

        self.meshes.push(json!({ "name": name, "primitives": [primitive] }));
        let mut node = json!({ "name": name, "mesh": self.meshes.len() - 1 });
        if offset != [0.0; 3] {
            node["translation"] = json!(offset);
        }
        self.nodes.push(node);
    }

    /// Finish the document with a single buffer that has no URI yet
    fn finish(mut self) -> (Value, Vec<u8>) {
        align_buffer(&mut self.buffer);
        let buffer = json!({ "byteLength": self.buffer.len() });

        let node_ids: Vec<usize> = (0..self.nodes.len()).collect();
        let mut gltf = json!({
            "asset": {
                "generator": concat!("casegen ", env!("CARGO_PKG_VERSION")),
                "version": "2.0"
            },
            "scene": 0,
            "scenes": [{ "nodes": node_ids }],
            "nodes": self.nodes,
            "meshes": self.meshes,
            "accessors": self.accessors,
            "bufferViews": self.buffer_views,
            "buffers": [buffer]
        });
        if !self.materials.is_empty() {
            gltf["materials"] = json!(self.materials);
        }

        (gltf, self.buffer)
    }
}

fn single(mesh: &Mesh) -> GltfBuilder {
    let mut builder = GltfBuilder::default();
    builder.add_mesh("part", mesh, None, [0.0; 3]);
    builder
}

fn assembly_builder(assembly: &Assembly) -> GltfBuilder {
    let mut builder = GltfBuilder::default();
    for part in &assembly.parts {
        let offset = [part.offset.x, part.offset.y, part.offset.z];
        builder.add_mesh(&part.name, &part.mesh, Some(part.color), offset);
    }
    builder
}

/// Export a mesh to `.gltf` with the buffer embedded as a data URI
pub fn export_gltf(mesh: &Mesh, path: &Path) -> Result<()> {
    write_gltf(single(mesh), path)
}

/// Export a mesh to binary GLB
pub fn export_glb(mesh: &Mesh, path: &Path) -> Result<()> {
    write_glb(single(mesh), path)
}

/// Export an assembly with one node and material per part. A `.glb` path
/// selects the binary container.
pub fn export_gltf_assembly(assembly: &Assembly, path: &Path) -> Result<()> {
    let builder = assembly_builder(assembly);
    let is_glb = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glb"));
    if is_glb {
        write_glb(builder, path)
    } else {
        write_gltf(builder, path)
    }
}

fn write_gltf(builder: GltfBuilder, path: &Path) -> Result<()> {
    let (mut gltf, buffer) = builder.finish();
    gltf["buffers"][0]["uri"] = json!(format!(
        "data:application/octet-stream;base64,{}",
        BASE64.encode(&buffer)
    ));

    let json_string = serde_json::to_string_pretty(&gltf)?;
    std::fs::write(path, json_string)
        .with_context(|| format!("failed to write glTF file {}", path.display()))?;
    Ok(())
}

fn write_glb(builder: GltfBuilder, path: &Path) -> Result<()> {
    let (gltf, buffer) = builder.finish();

    let mut json_bytes = serde_json::to_vec(&gltf)?;
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }

    let total_length = 12 + 8 + json_bytes.len() + 8 + buffer.len();

    let file = File::create(path)
        .with_context(|| format!("failed to create GLB file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    // Header
    out.write_all(&GLB_MAGIC.to_le_bytes())?;
    out.write_all(&2u32.to_le_bytes())?;
    out.write_all(&(total_length as u32).to_le_bytes())?;

    out.write_all(&(json_bytes.len() as u32).to_le_bytes())?;
    out.write_all(&CHUNK_JSON.to_le_bytes())?;
    out.write_all(&json_bytes)?;

    // The buffer is already padded to four bytes
    out.write_all(&(buffer.len() as u32).to_le_bytes())?;
    out.write_all(&CHUNK_BIN.to_le_bytes())?;
    out.write_all(&buffer)?;

    out.flush()?;
    Ok(())
}

fn calculate_bounds(mesh: &Mesh) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];

    for vertex in &mesh.vertices {
        for axis in 0..3 {
            let c = vertex.position[axis] as f32;
            min[axis] = min[axis].min(c);
            max[axis] = max[axis].max(c);
        }
    }

    (min, max)
}

fn align_buffer(buffer: &mut Vec<u8>) {
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;
    use tempfile::tempdir;

    #[test]
    fn test_export_glb() -> Result<()> {
        let mesh = Primitive::cuboid(Vector3::new(10.0, 10.0, 10.0), true).to_mesh()?;
        let dir = tempdir()?;
        let path = dir.path().join("cube.glb");

        export_glb(&mesh, &path)?;

        let bytes = std::fs::read(&path)?;
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 2);
        let declared = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        assert_eq!(declared as usize, bytes.len());
        assert_eq!(&bytes[16..20], b"JSON");
        Ok(())
    }

    #[test]
    fn test_export_gltf_embeds_buffer() -> Result<()> {
        let mesh = Primitive::cuboid(Vector3::new(2.0, 2.0, 2.0), false).to_mesh()?;
        let dir = tempdir()?;
        let path = dir.path().join("cube.gltf");

        export_gltf(&mesh, &path)?;

        let gltf: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let uri = gltf["buffers"][0]["uri"].as_str().unwrap();
        let payload = uri.strip_prefix("data:application/octet-stream;base64,").unwrap();
        let decoded = BASE64.decode(payload)?;
        assert_eq!(gltf["buffers"][0]["byteLength"], json!(decoded.len()));
        assert_eq!(gltf["accessors"][0]["max"], json!([2.0, 2.0, 2.0]));
        // No sidecar file
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
