// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Lid with alignment lip, finger grip and sensor openings
//!
//! The lid is modelled upside down relative to the base: the plate occupies
//! z in [0, wall] and the lip hangs below it, so placing the lid at the base
//! rim height seats the lip inside the cavity.

use crate::geometry::{Mesh, Profile, SketchPlane};
use crate::params::{Dimensions, Parameters, Variant};
use anyhow::{Context, Result};
use nalgebra::Vector3;
use tracing::debug;

use super::OVERCUT;

/// Build the lid for the configured variant
pub fn lid(params: &Parameters) -> Result<Mesh> {
    let d = params.dimensions();
    let lid = match params.variant {
        Variant::Compact => compact_lid(params, &d)?,
        Variant::Standard => standard_lid(params, &d)?,
    };
    debug!(
        variant = %params.variant,
        sensor_cuts = params.lid.sensor_cuts.enabled,
        triangles = lid.triangle_count(),
        "built lid"
    );
    Ok(lid)
}

fn plate(params: &Parameters, d: &Dimensions) -> Result<Mesh> {
    Profile::rounded_rectangle(
        d.outer_width,
        d.outer_length,
        params.enclosure.corner_radius,
        params.resolution.arc_segments,
    )
    .context("lid plate profile")?
    .extrude(params.enclosure.wall_thickness)
}

/// Rectangular cut through the plate centred on (x, y)
fn plate_cut(params: &Parameters, width: f64, length: f64, x: f64, y: f64) -> Result<Mesh> {
    Profile::rectangle(width, length)?
        .translate(x, y)
        .extrude_between(-OVERCUT, params.enclosure.wall_thickness + OVERCUT)
}

/// Thin lip border hanging below the plate and a single sensor window
fn compact_lid(params: &Parameters, d: &Dimensions) -> Result<Mesh> {
    let res = &params.resolution;
    let (inner_w, inner_l) = d.compact_lip_inner();

    let lip_solid = Profile::rounded_rectangle(
        d.inner_width,
        d.inner_length,
        params.lid.lip_corner_radius,
        res.arc_segments,
    )
    .context("lip profile")?
    .extrude(-d.lip_depth)?;
    let lip_cavity = Profile::rectangle(inner_w, inner_l)?
        .extrude_between(-d.lip_depth - 1.0, OVERCUT)?;
    let lip = lip_solid.difference(&lip_cavity)?;

    let cover = plate(params, d)?.union(&lip)?;

    let window = &params.lid.window;
    let window_y = inner_l / 2.0 - window.inset - window.length / 2.0;
    let cut = plate_cut(params, window.width, window.length, 0.0, window_y)?;
    cover.difference(&cut).context("sensor window")
}

/// Plate with a lip ring that holds the radar board, finger grip on the -Y
/// lip face, and the optional sensor cuts
fn standard_lid(params: &Parameters, d: &Dimensions) -> Result<Mesh> {
    let e = &params.enclosure;
    let res = &params.resolution;
    let lid = &params.lid;
    let radar = &params.radar;

    let ring_width = d.inner_width + lid.fit;
    let ring_length = d.inner_length + lid.fit;
    let ring_bottom = e.wall_thickness - d.lip_depth;

    let ring_outer = Profile::rounded_rectangle(ring_width, ring_length, e.corner_radius, res.arc_segments)
        .context("lip ring profile")?
        .extrude_between(ring_bottom, e.wall_thickness)?;
    let ring_inner = Profile::rectangle(radar.width, radar.length)?
        .extrude_between(ring_bottom - OVERCUT, e.wall_thickness + OVERCUT)?;
    let ring = ring_outer.difference(&ring_inner)?;

    let mut cover = plate(params, d)?.union(&ring)?;

    // Undercut in the -Y lip face to lift the lid with a fingernail. The
    // exposed face runs from the ring bottom up to the plate at z = 0.
    let grip = &lid.grip;
    let grip_center_z = ring_bottom / 2.0 - grip.drop;
    let grip_profile =
        Profile::rounded_rectangle(grip.width, grip.height, grip.corner_radius, res.arc_segments)
            .context("grip profile")?;
    let grip_length = grip.depth + OVERCUT;
    let grip_cut = grip_profile
        .extrude_on(SketchPlane::Xz, grip_length)?
        .translated(Vector3::new(
            0.0,
            -ring_length / 2.0 - OVERCUT + grip_length,
            grip_center_z,
        ));
    cover = cover.difference(&grip_cut).context("finger grip")?;

    if lid.sensor_cuts.enabled {
        let cuts = &lid.sensor_cuts;
        let x = radar.width / 2.0 - cuts.width / 2.0 - cuts.edge_gap;
        let y = radar.length / 2.0 - cuts.length / 2.0 - cuts.edge_gap;
        for cx in [-x, x] {
            let cut = plate_cut(params, cuts.width, cuts.length, cx, y)?;
            cover = cover.difference(&cut).context("sensor cut")?;
        }
    }

    Ok(cover)
}
