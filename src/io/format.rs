// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Supported output formats

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Binary STL
    #[default]
    Stl,
    /// ASCII STL
    StlAscii,
    /// 3D Manufacturing Format package
    #[serde(rename = "3mf")]
    #[value(name = "3mf")]
    ThreeMf,
    /// glTF JSON with an embedded buffer
    Gltf,
    /// Binary glTF
    Glb,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Stl | ExportFormat::StlAscii => "stl",
            ExportFormat::ThreeMf => "3mf",
            ExportFormat::Gltf => "gltf",
            ExportFormat::Glb => "glb",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Stl => "stl",
            ExportFormat::StlAscii => "stl-ascii",
            ExportFormat::ThreeMf => "3mf",
            ExportFormat::Gltf => "gltf",
            ExportFormat::Glb => "glb",
        }
    }

    /// Guess the format from a file extension. `.stl` maps to binary STL.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| anyhow!("{} has no file extension", path.display()))?;
        ext.parse()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stl" => Ok(ExportFormat::Stl),
            "stl-ascii" | "stl_ascii" | "ascii" => Ok(ExportFormat::StlAscii),
            "3mf" => Ok(ExportFormat::ThreeMf),
            "gltf" => Ok(ExportFormat::Gltf),
            "glb" => Ok(ExportFormat::Glb),
            other => Err(anyhow!("unsupported export format: {other}")),
        }
    }
}
