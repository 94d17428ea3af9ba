// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! casegen CLI

use anyhow::{Context, Result};
use casegen::assembly::{Assembly, DEFAULT_EXPLODE_GAP};
use casegen::cli::{export_assembly, Reporter, Runner};
use casegen::config::{BuildConfig, DEFAULT_CONFIG_FILE};
use casegen::geometry::analyze;
use casegen::io::ExportFormat;
use casegen::parts::{build_part, PartKind};
use casegen::Variant;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "casegen")]
#[command(about = "Parametric enclosure generator for an ESP32 + mmWave presence sensor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./casegen.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build parts and export them with the assembly and a manifest
    Build {
        #[arg(long, value_enum)]
        variant: Option<Variant>,

        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Parts to build, comma separated
        #[arg(short, long, value_enum, value_delimiter = ',')]
        parts: Vec<PartKind>,

        /// Cut the sensor openings into the lid
        #[arg(long)]
        lid_cuts: bool,

        /// Skip the assembly export
        #[arg(long)]
        no_assembly: bool,
    },

    /// Export the coloured assembly to a single file
    Assembly {
        /// Output file; the extension selects the format
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,

        #[arg(long, value_enum)]
        variant: Option<Variant>,

        /// Vertical gap between base and lid
        #[arg(long)]
        gap: Option<f64>,
    },

    /// Print derived dimensions
    Dims {
        #[arg(long, value_enum)]
        variant: Option<Variant>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print geometry statistics per part
    Stats {
        #[arg(long, value_enum)]
        variant: Option<Variant>,

        #[arg(short, long, value_enum, value_delimiter = ',')]
        parts: Vec<PartKind>,
    },

    /// Write a configuration file with the full preset
    InitConfig {
        #[arg(value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = Variant::Standard)]
        variant: Variant,
    },

    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "casegen=debug" } else { "casegen=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        Reporter::report_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let load_config = || BuildConfig::load(cli.config.as_deref());

    match cli.command {
        Commands::Build {
            variant,
            format,
            out,
            parts,
            lid_cuts,
            no_assembly,
        } => {
            let mut config = load_config()?;
            if let Some(variant) = variant {
                config.set_variant(variant);
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            if let Some(out) = out {
                config.output.dir = out;
            }
            if !parts.is_empty() {
                config.output.parts = parts;
            }
            if lid_cuts {
                config.lid_cuts = Some(true);
            }
            if no_assembly {
                config.output.assembly = false;
            }
            build_command(config)
        }
        Commands::Assembly { out, variant, gap } => {
            let mut config = load_config()?;
            if let Some(variant) = variant {
                config.set_variant(variant);
            }
            if let Some(gap) = gap {
                config.explode_gap = gap;
            }
            assembly_command(&config, &out)
        }
        Commands::Dims { variant, json } => {
            let mut config = load_config()?;
            if let Some(variant) = variant {
                config.set_variant(variant);
            }
            dims_command(&config, json)
        }
        Commands::Stats { variant, parts } => {
            let mut config = load_config()?;
            if let Some(variant) = variant {
                config.set_variant(variant);
            }
            if !parts.is_empty() {
                config.output.parts = parts;
            }
            stats_command(&config)
        }
        Commands::InitConfig { path, variant } => init_config_command(&path, variant),
        Commands::Version => {
            println!("casegen v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn build_command(config: BuildConfig) -> Result<()> {
    let report = Runner::new(config).with_progress(true).run()?;
    Reporter::report_build(&report.manifest, report.duration);
    Reporter::success(&format!(
        "Manifest written to {}",
        report.manifest_path.display()
    ));
    Ok(())
}

fn assembly_command(config: &BuildConfig, out: &Path) -> Result<()> {
    let format = ExportFormat::from_path(out)?;
    let params = config.parameters();
    params.validate()?;

    let colors = config.part_colors()?;

    let start = Instant::now();
    let mut assembly = Assembly::build(&params, config.explode_gap)?;
    for (kind, color) in colors {
        if !assembly.set_color(kind, color) {
            Reporter::report_warning(&format!("{kind} is not part of the {} assembly", params.variant));
        }
    }
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    export_assembly(&assembly, out, format)?;

    if config.explode_gap < 0.0 {
        Reporter::report_warning("negative gap: the lid intersects the base");
    }
    Reporter::success(&format!(
        "Assembly ({} parts) written to {} in {}",
        assembly.parts.len(),
        out.display(),
        Reporter::format_duration(start.elapsed())
    ));
    Ok(())
}

fn dims_command(config: &BuildConfig, json: bool) -> Result<()> {
    let params = config.parameters();
    params.validate()?;
    let dims = params.dimensions();

    if json {
        println!("{}", serde_json::to_string_pretty(&dims)?);
    } else {
        Reporter::report_dimensions(params.variant, &dims);
    }
    Ok(())
}

fn stats_command(config: &BuildConfig) -> Result<()> {
    let params = config.parameters();
    params.validate()?;

    for kind in config.parts() {
        let start = Instant::now();
        let mesh = build_part(&params, kind)?;
        let stats = analyze(&mesh);
        Reporter::report_stats(kind.name(), &stats, start.elapsed());
    }
    Ok(())
}

fn init_config_command(path: &Path, variant: Variant) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    BuildConfig::with_preset(variant).save(path)?;
    Reporter::report_info(&format!(
        "Wrote {} preset to {} (explode gap {DEFAULT_EXPLODE_GAP} mm)",
        variant,
        path.display()
    ));
    Ok(())
}
