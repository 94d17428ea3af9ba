// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh and assembly exporters, build manifest

mod export_3mf;
mod export_gltf;
mod format;
mod manifest;
mod stl;

pub use export_3mf::{export_3mf, export_3mf_assembly};
pub use export_gltf::{export_glb, export_gltf, export_gltf_assembly};
pub use format::ExportFormat;
pub use manifest::{file_sha256, Manifest, ManifestEntry};
pub use stl::{export_stl, export_stl_ascii};

use crate::geometry::Mesh;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Write `mesh` to `path` in the given format
pub fn export_mesh(mesh: &Mesh, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Stl => export_stl(mesh, path)?,
        ExportFormat::StlAscii => {
            let solid = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("casegen");
            export_stl_ascii(mesh, path, solid)?
        }
        ExportFormat::ThreeMf => export_3mf(mesh, path)?,
        ExportFormat::Gltf => export_gltf(mesh, path)?,
        ExportFormat::Glb => export_glb(mesh, path)?,
    }
    info!(
        path = %path.display(),
        %format,
        triangles = mesh.triangle_count(),
        "exported mesh"
    );
    Ok(())
}
