// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Build pipeline: parts, exports, assembly and manifest

use crate::assembly::Assembly;
use crate::config::BuildConfig;
use crate::geometry::{analyze, Mesh};
use crate::io::{self, ExportFormat, Manifest};
use crate::parts::build_parts;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// File name of the manifest written into the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Outcome of a build run
pub struct BuildReport {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    pub duration: Duration,
}

/// Runs a configured build
pub struct Runner {
    config: BuildConfig,
    show_progress: bool,
}

impl Runner {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while building
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    fn progress_bar(&self, steps: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(steps as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    }

    /// Build the configured parts, export them and the assembly, and write
    /// the manifest
    pub fn run(&self) -> Result<BuildReport> {
        let start = Instant::now();
        let params = self.config.parameters();
        let kinds = self.config.parts();
        let format = self.config.output.format;
        let out_dir = &self.config.output.dir;
        let colors = self.config.part_colors()?;

        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

        let steps = kinds.len() + 1 + usize::from(self.config.output.assembly);
        let bar = self.progress_bar(steps);

        bar.set_message("building parts");
        let parts = build_parts(&params, &kinds)?;
        bar.inc(1);

        let mut manifest = Manifest::new(&params);
        for (kind, mesh) in &parts {
            bar.set_message(format!("exporting {kind}"));
            let path = part_path(out_dir, kind.name(), format);
            export_and_record(&mut manifest, kind.name(), mesh, &path, format)?;
            bar.inc(1);
        }

        if self.config.output.assembly {
            bar.set_message("exporting assembly");
            let mut assembly = Assembly::from_parts(&params, self.config.explode_gap, &parts)?;
            for (kind, color) in colors {
                assembly.set_color(kind, color);
            }
            let path = part_path(out_dir, "assembly", format);
            export_assembly(&assembly, &path, format)?;
            let merged = assembly.to_mesh();
            let stats = analyze(&merged);
            manifest.record("assembly", &path, format, stats.triangle_count, stats.volume)?;
            bar.inc(1);
        }

        let manifest_path = out_dir.join(MANIFEST_FILE);
        manifest.save(&manifest_path)?;
        bar.finish_and_clear();

        let duration = start.elapsed();
        info!(
            variant = %params.variant,
            files = manifest.files.len(),
            elapsed_ms = duration.as_millis() as u64,
            "build finished"
        );

        Ok(BuildReport {
            manifest,
            manifest_path,
            duration,
        })
    }
}

/// Output path of a part, e.g. `out/lid.3mf`
pub fn part_path(dir: &Path, name: &str, format: ExportFormat) -> PathBuf {
    dir.join(format!("{name}.{}", format.extension()))
}

fn export_and_record(
    manifest: &mut Manifest,
    name: &str,
    mesh: &Mesh,
    path: &Path,
    format: ExportFormat,
) -> Result<()> {
    io::export_mesh(mesh, path, format)?;
    let stats = analyze(mesh);
    manifest.record(name, path, format, stats.triangle_count, stats.volume)
}

/// Export an assembly. Formats with scene support keep parts and colours
/// apart, STL gets the merged mesh.
pub fn export_assembly(assembly: &Assembly, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::ThreeMf => io::export_3mf_assembly(assembly, path)?,
        ExportFormat::Gltf | ExportFormat::Glb => io::export_gltf_assembly(assembly, path)?,
        ExportFormat::Stl | ExportFormat::StlAscii => {
            io::export_mesh(&assembly.to_mesh(), path, format)?
        }
    }
    info!(path = %path.display(), parts = assembly.parts.len(), "exported assembly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_path() {
        let path = part_path(Path::new("out"), "lid", ExportFormat::ThreeMf);
        assert_eq!(path, PathBuf::from("out/lid.3mf"));
        let path = part_path(Path::new("out"), "base", ExportFormat::StlAscii);
        assert_eq!(path, PathBuf::from("out/base.stl"));
    }
}
