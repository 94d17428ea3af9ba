// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! casegen
//!
//! Parametric enclosure generator for an ESP32 microcontroller board and a
//! mmWave presence radar. Builds the printable base, lid and mounting clip
//! on a small mesh CSG kernel and exports them as STL, 3MF or glTF.

pub mod assembly;
pub mod cli;
pub mod config;
pub mod geometry;
pub mod io;
pub mod params;
pub mod parts;

pub use assembly::{Assembly, AssemblyPart, Color};
pub use config::BuildConfig;
pub use geometry::{GeometryError, Mesh, Primitive};
pub use io::{export_mesh, ExportFormat, Manifest};
pub use params::{Dimensions, ParameterError, Parameters, Variant};
pub use parts::{build_part, build_parts, PartKind};

use anyhow::Result;

/// Build one part of a variant with its preset parameters
pub fn render(variant: Variant, kind: PartKind) -> Result<Mesh> {
    let params = variant.parameters();
    params.validate()?;
    build_part(&params, kind)
}
