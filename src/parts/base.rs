// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Base shell of the enclosure

use crate::geometry::{Align, Mesh, Profile};
use crate::params::{Dimensions, Parameters, Variant};
use anyhow::{Context, Result};
use nalgebra::Vector3;
use tracing::debug;

use super::boards::{mcu_cutting_tool, usb_c_body};
use super::OVERCUT;

/// Where the microcontroller board proxy sits inside the base
pub fn mcu_placement(params: &Parameters) -> Vector3<f64> {
    let d = params.dimensions();
    let e = &params.enclosure;
    let z = e.wall_thickness + e.bottom_clearance - params.mcu.pcb_thickness;

    match params.variant {
        Variant::Compact => Vector3::new(0.0, 0.5 - params.usb_c.overhang, z),
        Variant::Standard => Vector3::new(
            0.0,
            -d.inner_length / 2.0 + params.mcu.length / 2.0 + params.usb_c.overhang - 1.0,
            z,
        ),
    }
}

/// Rounded outer block with the rectangular cavity removed
fn hollow_shell(params: &Parameters, d: &Dimensions) -> Result<Mesh> {
    let e = &params.enclosure;
    let outer = Profile::rounded_rectangle(
        d.outer_width,
        d.outer_length,
        e.corner_radius,
        params.resolution.arc_segments,
    )
    .context("outer case profile")?
    .extrude(d.outer_thickness)?;

    let cavity = Profile::rectangle(d.inner_width, d.inner_length)?
        .extrude_between(e.wall_thickness, d.outer_thickness + OVERCUT)?;

    outer.difference(&cavity)
}

/// Support rail across the cavity floor between `y0` and `y1`
fn rail_between(params: &Parameters, d: &Dimensions, y0: f64, y1: f64) -> Result<Mesh> {
    let e = &params.enclosure;
    Profile::rectangle(d.inner_width, y1 - y0)?
        .aligned(Align::Center, Align::Min)
        .translate(0.0, y0)
        .extrude_between(e.wall_thickness, e.wall_thickness + e.bottom_clearance)
}

/// Rail ending on the +Y cavity wall
fn rail(params: &Parameters, d: &Dimensions) -> Result<Mesh> {
    let end = d.inner_length / 2.0;
    rail_between(params, d, end - d.rail_length, end)
}

/// Rail centred half a side clearance in from the +Y cavity wall. The part
/// that would run into the wall is already solid, so it is clamped there.
fn centred_rail(params: &Parameters, d: &Dimensions) -> Result<Mesh> {
    let end = d.inner_length / 2.0;
    let center = end - params.enclosure.side_clearance / 2.0;
    let y0 = center - d.rail_length / 2.0;
    let y1 = (center + d.rail_length / 2.0).min(end);
    rail_between(params, d, y0, y1)
}

/// Build the base shell for the configured variant
pub fn base_shell(params: &Parameters) -> Result<Mesh> {
    let d = params.dimensions();
    let base = match params.variant {
        Variant::Compact => compact_base(params, &d)?,
        Variant::Standard => standard_base(params, &d)?,
    };
    debug!(
        variant = %params.variant,
        triangles = base.triangle_count(),
        "built base shell"
    );
    Ok(base)
}

/// Shell, rail, then the toleranced board proxy cut out of both
fn compact_base(params: &Parameters, d: &Dimensions) -> Result<Mesh> {
    let shell = hollow_shell(params, d)?;
    let case = shell.union(&centred_rail(params, d)?)?;

    let placement = mcu_placement(params);
    let wall_y = -d.outer_length / 2.0 - placement.y;
    let tool = mcu_cutting_tool(params, wall_y)?.translated(placement);

    case.difference(&tool).context("board cut")
}

/// Shell with a USB-C slot, rail and the board-holder pocket
fn standard_base(params: &Parameters, d: &Dimensions) -> Result<Mesh> {
    let e = &params.enclosure;
    let usb = &params.usb_c;

    let mut case = hollow_shell(params, d)?;

    // Slot through the -Y wall, centred on the seated receptacle
    let slot_center_z = e.wall_thickness + e.bottom_clearance + usb.thickness / 2.0;
    let pad = e.print_tolerance;
    let slot_base_z = slot_center_z - (usb.thickness + pad) / 2.0;
    let front_y = -d.outer_length / 2.0 - OVERCUT;
    let slot_length = e.wall_thickness + 2.0 * OVERCUT;
    let slot = usb_c_body(params, pad, slot_base_z, front_y, slot_length)?;
    case = case.difference(&slot).context("USB-C slot")?;

    case = case.union(&rail(params, d)?)?;

    // Pocket at the rail's -Y edge that the far PCB edge drops into
    let rail_top = e.wall_thickness + e.bottom_clearance;
    let pocket = Profile::rectangle(
        params.mcu.width + e.print_tolerance,
        e.holder_length + e.print_tolerance,
    )?
    .aligned(Align::Center, Align::Min)
    .translate(0.0, d.inner_length / 2.0 - d.rail_length)
    .extrude_between(rail_top - params.mcu.pcb_thickness, rail_top + OVERCUT)?;

    case.difference(&pocket).context("board holder")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analyze;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_mcu_placement_is_flush() {
        let params = Parameters::standard();
        let d = params.dimensions();
        let placement = mcu_placement(&params);
        // The receptacle face ends on the outer -Y face of the case
        let usb_front = placement.y - params.mcu.length / 2.0 - params.usb_c.overhang;
        assert_relative_eq!(usb_front, -d.outer_length / 2.0, epsilon = 1e-9);
        assert_relative_eq!(placement.z, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_centred_rail_is_clamped() {
        let params = Parameters::compact();
        let d = params.dimensions();
        let bbox = centred_rail(&params, &d).unwrap().bounding_box();
        // 3.5 side clearance + 2 extra, centred 1.75 in from the wall
        assert_relative_eq!(bbox.min.y, d.inner_length / 2.0 - 4.5, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.y, d.inner_length / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clamped_rail_adds_only_cavity_material() {
        let params = Parameters::compact();
        let d = params.dimensions();
        let shell = hollow_shell(&params, &d).unwrap();
        let joined = analyze(&shell.union(&centred_rail(&params, &d).unwrap()).unwrap());

        let rail = d.inner_width * 4.5 * params.enclosure.bottom_clearance;
        assert_relative_eq!(joined.volume, analyze(&shell).volume + rail, max_relative = 1e-9);
        assert!(joined.is_watertight);
    }

    #[test]
    fn test_rail_position() {
        let params = Parameters::standard();
        let d = params.dimensions();
        let bbox = rail(&params, &d).unwrap().bounding_box();
        assert_relative_eq!(bbox.max.y, d.inner_length / 2.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.min.y, d.inner_length / 2.0 - 7.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.min.z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.z, 3.0, epsilon = 1e-9);
    }
}
