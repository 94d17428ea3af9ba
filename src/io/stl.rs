// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL writers

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use nalgebra::Vector3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

fn facet_normal(mesh: &Mesh, indices: &[usize; 3]) -> Vector3<f64> {
    let [a, b, c] = indices.map(|i| mesh.vertices[i].position);
    (b - a).cross(&(c - a)).try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
}

fn to_f32(v: &Vector3<f64>) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// Write a binary STL
pub fn export_stl(mesh: &Mesh, path: &Path) -> Result<()> {
    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .map(|tri| {
            let normal = facet_normal(mesh, &tri.indices);
            StlTriangle {
                normal: Normal::new(to_f32(&normal)),
                vertices: tri
                    .indices
                    .map(|i| StlVertex::new(to_f32(&mesh.vertices[i].position.coords))),
            }
        })
        .collect();

    let file = File::create(path)
        .with_context(|| format!("failed to create STL file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).context("failed to write STL file")?;
    writer.flush()?;
    Ok(())
}

/// Write an ASCII STL named `solid`
pub fn export_stl_ascii(mesh: &Mesh, path: &Path, solid: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create STL file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "solid {solid}")?;
    for tri in &mesh.triangles {
        let n = facet_normal(mesh, &tri.indices);
        writeln!(out, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(out, "    outer loop")?;
        for &i in &tri.indices {
            let p = mesh.vertices[i].position;
            writeln!(out, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(out, "    endloop")?;
        writeln!(out, "  endfacet")?;
    }
    writeln!(out, "endsolid {solid}")?;

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use tempfile::tempdir;

    #[test]
    fn test_binary_stl_reads_back() -> Result<()> {
        let mesh = Primitive::cuboid(Vector3::new(10.0, 10.0, 10.0), true).to_mesh()?;
        let dir = tempdir()?;
        let path = dir.path().join("cube.stl");

        export_stl(&mesh, &path)?;

        // 80 byte header, count, 50 bytes per facet
        assert_eq!(std::fs::metadata(&path)?.len(), 84 + 50 * 12);
        let mut file = File::open(&path)?;
        let indexed = stl_io::read_stl(&mut file)?;
        assert_eq!(indexed.faces.len(), 12);
        assert_eq!(indexed.vertices.len(), 8);
        Ok(())
    }

    #[test]
    fn test_ascii_stl_structure() -> Result<()> {
        let mesh = Primitive::cuboid(Vector3::new(1.0, 2.0, 3.0), false).to_mesh()?;
        let dir = tempdir()?;
        let path = dir.path().join("cube.stl");

        export_stl_ascii(&mesh, &path, "cube")?;

        let text = std::fs::read_to_string(&path)?;
        assert!(text.starts_with("solid cube"));
        assert!(text.trim_end().ends_with("endsolid cube"));
        assert_eq!(text.matches("facet normal").count(), 12);
        Ok(())
    }
}
