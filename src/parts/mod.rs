// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Part builders for the enclosure and the board proxies

mod base;
mod boards;
mod clip;
mod lid;

pub use base::{base_shell, mcu_placement};
pub use boards::{mcu_board, radar_board};
pub use clip::corner_clip;
pub use lid::lid;

use crate::geometry::{GeometryError, Mesh};
use crate::params::Parameters;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Overshoot of cutting tools past the faces they open
pub const OVERCUT: f64 = 0.1;

/// Every part the generator can build
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Base,
    Lid,
    Clip,
    McuBoard,
    RadarBoard,
}

impl PartKind {
    /// Parts that are meant to be printed, as opposed to board proxies
    pub fn printable() -> Vec<PartKind> {
        vec![PartKind::Base, PartKind::Lid, PartKind::Clip]
    }

    pub fn name(self) -> &'static str {
        match self {
            PartKind::Base => "base",
            PartKind::Lid => "lid",
            PartKind::Clip => "clip",
            PartKind::McuBoard => "mcu_board",
            PartKind::RadarBoard => "radar_board",
        }
    }

    pub fn is_printable(self) -> bool {
        matches!(self, PartKind::Base | PartKind::Lid | PartKind::Clip)
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        match key.as_str() {
            "base" | "case" => Ok(PartKind::Base),
            "lid" => Ok(PartKind::Lid),
            "clip" | "corner_clip" => Ok(PartKind::Clip),
            "mcu" | "mcu_board" => Ok(PartKind::McuBoard),
            "radar" | "radar_board" => Ok(PartKind::RadarBoard),
            other => Err(format!("unknown part: {other}")),
        }
    }
}

/// Build a single part. Board proxies are built without tolerance.
pub fn build_part(params: &Parameters, kind: PartKind) -> Result<Mesh> {
    let mesh = match kind {
        PartKind::Base => base_shell(params),
        PartKind::Lid => lid(params),
        PartKind::Clip => corner_clip(params),
        PartKind::McuBoard => mcu_board(params, 0.0),
        PartKind::RadarBoard => radar_board(params),
    }
    .and_then(|mesh| {
        if mesh.is_empty() {
            return Err(GeometryError::EmptyResult {
                operation: kind.name().to_string(),
            }
            .into());
        }
        Ok(mesh)
    })
    .with_context(|| format!("failed to build {kind}"))?;

    debug!(part = %kind, vertices = mesh.vertex_count(), "part ready");
    Ok(mesh)
}

/// Validate the parameters, then build the requested parts in parallel.
/// The output follows the order of `kinds`.
pub fn build_parts(params: &Parameters, kinds: &[PartKind]) -> Result<Vec<(PartKind, Mesh)>> {
    params.validate()?;

    kinds
        .par_iter()
        .map(|&kind| build_part(params, kind).map(|mesh| (kind, mesh)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_kind_parsing() {
        assert_eq!("mcu-board".parse::<PartKind>().unwrap(), PartKind::McuBoard);
        assert_eq!("Radar".parse::<PartKind>().unwrap(), PartKind::RadarBoard);
        assert!("hinge".parse::<PartKind>().is_err());
    }

    #[test]
    fn test_printable_parts() {
        let printable = PartKind::printable();
        assert_eq!(printable.len(), 3);
        assert!(printable.iter().all(|kind| kind.is_printable()));
        assert!(!PartKind::McuBoard.is_printable());
    }

    #[test]
    fn test_build_parts_keeps_order() {
        let params = Parameters::compact();
        let kinds = [PartKind::RadarBoard, PartKind::McuBoard];
        let parts = build_parts(&params, &kinds).unwrap();
        let order: Vec<PartKind> = parts.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(order, kinds);
    }

    #[test]
    fn test_empty_part_is_an_error() {
        // Notch wider and deeper than the clip itself
        let mut params = Parameters::standard();
        params.clip.margin = 0.0;
        params.clip.fit = -1.0;
        params.clip.notch_depth = 100.0;

        let err = build_part(&params, PartKind::Clip).unwrap_err();
        assert_eq!(
            err.downcast_ref::<GeometryError>(),
            Some(&GeometryError::EmptyResult {
                operation: "clip".to_string()
            })
        );
    }

    #[test]
    fn test_build_parts_rejects_invalid_parameters() {
        let mut params = Parameters::standard();
        params.enclosure.wall_thickness = 0.0;
        assert!(build_parts(&params, &[PartKind::Base]).is_err());
    }
}
