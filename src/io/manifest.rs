// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Build manifest written next to the exported files

use super::ExportFormat;
use crate::params::{Dimensions, Parameters, Variant};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// One exported file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Part name, or `assembly`
    pub part: String,
    pub path: PathBuf,
    pub format: ExportFormat,
    pub triangles: usize,
    /// Enclosed volume in mm³
    pub volume: f64,
    pub sha256: String,
}

/// Record of one build run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub generated_at: String,
    pub variant: Variant,
    pub parameters: Parameters,
    pub dimensions: Dimensions,
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(params: &Parameters) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            variant: params.variant,
            parameters: params.clone(),
            dimensions: params.dimensions(),
            files: Vec::new(),
        }
    }

    /// Hash an exported file and record it
    pub fn record(
        &mut self,
        part: &str,
        path: &Path,
        format: ExportFormat,
        triangles: usize,
        volume: f64,
    ) -> Result<()> {
        let sha256 = file_sha256(path)?;
        self.files.push(ManifestEntry {
            part: part.to_string(),
            path: path.to_path_buf(),
            format,
            triangles,
            volume,
            sha256,
        });
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write manifest {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Lowercase hex SHA-256 of a file
pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to hash {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_sha256() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("abc.txt");
        std::fs::write(&path, "abc")?;
        assert_eq!(
            file_sha256(&path)?,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        Ok(())
    }

    #[test]
    fn test_manifest_save_and_load() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("lid.stl");
        std::fs::write(&file, b"solid lid\nendsolid lid\n")?;

        let mut manifest = Manifest::new(&Parameters::compact());
        manifest.record("lid", &file, ExportFormat::StlAscii, 0, 0.0)?;
        let path = dir.path().join("manifest.json");
        manifest.save(&path)?;

        let loaded = Manifest::load(&path)?;
        assert_eq!(loaded.variant, Variant::Compact);
        assert_eq!(loaded.files, manifest.files);
        assert_eq!(loaded.files[0].sha256.len(), 64);
        Ok(())
    }
}
