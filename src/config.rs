// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Build configuration: TOML file, environment overrides, defaults

use crate::assembly::{Color, DEFAULT_EXPLODE_GAP};
use crate::io::ExportFormat;
use crate::params::{Parameters, Variant};
use crate::parts::PartKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "casegen.toml";

/// Where and how parts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub format: ExportFormat,
    /// Parts to export; printable parts when empty
    pub parts: Vec<PartKind>,
    /// Also export the coloured assembly
    pub assembly: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
            format: ExportFormat::Stl,
            parts: Vec::new(),
            assembly: true,
        }
    }
}

/// Build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub variant: Variant,
    /// Force the lid sensor cuts on or off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lid_cuts: Option<bool>,
    /// Vertical gap between base and lid in the assembly
    pub explode_gap: f64,
    pub output: OutputConfig,
    /// Assembly colour per part name, e.g. `lid = "white"`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: BTreeMap<String, String>,
    /// Full parameter set replacing the variant preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            lid_cuts: None,
            explode_gap: DEFAULT_EXPLODE_GAP,
            output: OutputConfig::default(),
            colors: BTreeMap::new(),
            parameters: None,
        }
    }
}

impl BuildConfig {
    /// Config for a variant with its preset written out in full
    pub fn with_preset(variant: Variant) -> Self {
        Self {
            variant,
            parameters: Some(variant.parameters()),
            ..Self::default()
        }
    }

    /// Load configuration from file. A top-level `variant` wins over the one
    /// inside a `[parameters]` table; without it the table picks the variant.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let table: toml::Table = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        let explicit_variant = table.contains_key("variant");
        let mut config: BuildConfig = toml::Value::Table(table)
            .try_into()
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))?;

        if let Some(table_variant) = config.parameters.as_ref().map(|p| p.variant) {
            if explicit_variant {
                config.set_variant(config.variant);
            } else {
                config.variant = table_variant;
            }
        }
        Ok(config)
    }

    /// Load `path`, or `casegen.toml` when present, or the defaults, then
    /// apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CASEGEN_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(variant) = lookup("CASEGEN_VARIANT") {
            let variant = variant
                .parse::<Variant>()
                .map_err(anyhow::Error::msg)
                .context("CASEGEN_VARIANT")?;
            self.set_variant(variant);
        }

        if let Some(dir) = lookup("CASEGEN_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        if let Some(format) = lookup("CASEGEN_FORMAT") {
            self.output.format = format.parse().context("CASEGEN_FORMAT")?;
        }

        if let Some(cuts) = lookup("CASEGEN_LID_CUTS") {
            self.lid_cuts = Some(parse_flag(&cuts).context("CASEGEN_LID_CUTS")?);
        }

        Ok(())
    }

    /// Switch variant. A parameter table written for another variant no
    /// longer applies and is dropped.
    pub fn set_variant(&mut self, variant: Variant) {
        self.variant = variant;
        if let Some(params) = &self.parameters {
            if params.variant != variant {
                warn!(
                    configured = %params.variant,
                    requested = %variant,
                    "dropping parameter table for a different variant"
                );
                self.parameters = None;
            }
        }
    }

    /// Parameters this build uses
    pub fn parameters(&self) -> Parameters {
        let mut params = self
            .parameters
            .clone()
            .unwrap_or_else(|| self.variant.parameters());
        if let Some(enabled) = self.lid_cuts {
            params.lid.sensor_cuts.enabled = enabled;
        }
        params
    }

    /// Assembly colour overrides resolved to parts and colours
    pub fn part_colors(&self) -> Result<Vec<(PartKind, Color)>> {
        self.colors
            .iter()
            .map(|(part, name)| {
                let kind = part
                    .parse::<PartKind>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("colors.{part}"))?;
                let color = Color::named(name)
                    .with_context(|| format!("colors.{part}: unknown colour {name:?}"))?;
                Ok((kind, color))
            })
            .collect()
    }

    /// Parts to export
    pub fn parts(&self) -> Vec<PartKind> {
        if self.output.parts.is_empty() {
            PartKind::printable()
        } else {
            self.output.parts.clone()
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
