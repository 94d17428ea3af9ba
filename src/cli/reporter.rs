// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::geometry::GeometryStats;
use crate::io::Manifest;
use crate::params::{Dimensions, Variant};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    fn rule() {
        println!("{}", "━".repeat(60).bright_black());
    }

    /// Report derived dimensions of a variant
    pub fn report_dimensions(variant: Variant, d: &Dimensions) {
        Self::rule();
        println!("{} {}", "Variant:".bold(), variant.name().cyan());
        Self::rule();
        Self::print_row(
            "Outer",
            &format!(
                "{:.2} x {:.2} x {:.2} mm",
                d.outer_width, d.outer_length, d.outer_thickness
            ),
        );
        Self::print_row(
            "Inner",
            &format!("{:.2} x {:.2} mm", d.inner_width, d.inner_length),
        );
        Self::print_row("Cavity depth", &format!("{:.2} mm", d.cavity_depth));
        Self::print_row("Lip depth", &format!("{:.2} mm", d.lip_depth));
        Self::print_row("Rail length", &format!("{:.2} mm", d.rail_length));
        Self::print_row("Wall", &format!("{:.2} mm", d.wall_thickness));
        Self::rule();
    }

    /// Report analytics of one part
    pub fn report_stats(name: &str, stats: &GeometryStats, duration: Duration) {
        let [sx, sy, sz] = stats.size();
        println!("\n{} {}", "Part:".bold(), name.cyan());
        Self::print_row("Vertices", &stats.vertex_count.to_string());
        Self::print_row("Triangles", &stats.triangle_count.to_string());
        Self::print_row("Volume", &format!("{:.2} mm³", stats.volume));
        Self::print_row("Surface", &format!("{:.2} mm²", stats.surface_area));
        Self::print_row("Size", &format!("{sx:.2} x {sy:.2} x {sz:.2} mm"));
        let closed = if stats.is_watertight {
            "yes".green()
        } else {
            "no".yellow()
        };
        println!("  {} {}", "Watertight:".bright_black(), closed);
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
    }

    /// Report the files written by a build
    pub fn report_build(manifest: &Manifest, duration: Duration) {
        Self::rule();
        println!(
            "{} {} ({} files)",
            "Built:".bold(),
            manifest.variant.name().cyan(),
            manifest.files.len()
        );
        Self::rule();
        for entry in &manifest.files {
            println!(
                "  {:<12} {} {}",
                entry.part.green(),
                entry.path.display(),
                format!("{} tris, {:.1} mm³", entry.triangles, entry.volume).bright_black()
            );
        }
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        Self::rule();
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_row(name: &str, value: &str) {
        println!(
            "  {} {}",
            format!("{}:", name).bright_black(),
            value.cyan()
        );
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
