// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Board proxies: the microcontroller with its USB-C receptacle and the
//! radar board

use crate::geometry::{Mesh, Profile, SketchPlane};
use crate::params::Parameters;
use anyhow::{Context, Result};
use nalgebra::Vector3;
use tracing::debug;

use super::OVERCUT;

/// USB-C receptacle, its -Y face at `front_y` and running `length` towards +Y,
/// resting on z = `base_z`. `pad` grows the cross-section on every side
/// pair.
pub(crate) fn usb_c_body(
    params: &Parameters,
    pad: f64,
    base_z: f64,
    front_y: f64,
    length: f64,
) -> Result<Mesh> {
    let usb = &params.usb_c;
    let height = usb.thickness + pad;
    let profile = Profile::rounded_rectangle(
        usb.width + pad,
        height,
        usb.corner_radius,
        params.resolution.arc_segments,
    )
    .context("USB-C profile")?;

    // The XZ sketch extrudes towards -Y from y = 0
    let body = profile.extrude_on(SketchPlane::Xz, length)?;
    Ok(body.translated(Vector3::new(0.0, front_y + length, base_z + height / 2.0)))
}

/// Microcontroller PCB with the USB-C receptacle on top, centred in XY with
/// the PCB bottom on z = 0. The receptacle protrudes `overhang` past the -Y
/// edge. `tolerance` enlarges the proxy for use as a cutting tool.
pub fn mcu_board(params: &Parameters, tolerance: f64) -> Result<Mesh> {
    let mcu = &params.mcu;
    let usb = &params.usb_c;

    let pcb = Profile::rectangle(mcu.width + tolerance, mcu.length + tolerance)?
        .extrude(mcu.pcb_thickness)?;

    let front_y = -mcu.length / 2.0 - usb.overhang;
    let connector = usb_c_body(params, tolerance, mcu.pcb_thickness, front_y, usb.length)?;

    let board = pcb.union(&connector)?;
    debug!(triangles = board.triangle_count(), tolerance, "built MCU board");
    Ok(board)
}

/// Cutting tool for the compact base: the toleranced board proxy whose
/// USB-C channel runs on through the -Y wall at `wall_y`
pub(crate) fn mcu_cutting_tool(params: &Parameters, wall_y: f64) -> Result<Mesh> {
    let mcu = &params.mcu;
    let usb = &params.usb_c;
    let tolerance = params.enclosure.print_tolerance;

    let board = mcu_board(params, tolerance)?;
    let inner_end = -mcu.length / 2.0 - usb.overhang + usb.length;
    let front_y = wall_y - OVERCUT;
    let channel = usb_c_body(
        params,
        tolerance,
        mcu.pcb_thickness,
        front_y,
        inner_end - front_y,
    )?;

    board.union(&channel)
}

/// Radar board centred in XY, bottom on z = 0, with mounting holes near the
/// -Y corners when a hole diameter is configured
pub fn radar_board(params: &Parameters) -> Result<Mesh> {
    let radar = &params.radar;
    let res = &params.resolution;

    let mut board = Profile::rounded_rectangle(
        radar.width,
        radar.length,
        radar.corner_radius,
        res.arc_segments,
    )
    .context("radar board profile")?
    .extrude(radar.thickness)?;

    if let Some(diameter) = radar.mounting_hole_diameter {
        let x = radar.width / 2.0 - radar.mounting_hole_offset;
        let y = -radar.length / 2.0 + radar.mounting_hole_offset;
        let hole = Profile::circle(diameter / 2.0, res.circle_segments)?
            .extrude_between(-OVERCUT, radar.thickness + OVERCUT)?;

        for hx in [x, -x] {
            board = board.difference(&hole.translated(Vector3::new(hx, y, 0.0)))?;
        }
    }

    debug!(triangles = board.triangle_count(), "built radar board");
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analyze;
    use approx::assert_relative_eq;

    #[test]
    fn test_usb_body_placement() {
        let params = Parameters::standard();
        let body = usb_c_body(&params, 0.0, 1.0, -15.0, 7.23).unwrap();
        let bbox = body.bounding_box();
        assert_relative_eq!(bbox.min.y, -15.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.y, -15.0 + 7.23, epsilon = 1e-9);
        assert_relative_eq!(bbox.min.z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.z, 1.0 + 3.02, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.x - bbox.min.x, 8.77, epsilon = 1e-9);
    }

    #[test]
    fn test_mcu_board_extent() {
        let params = Parameters::standard();
        let board = mcu_board(&params, 0.0).unwrap();
        let stats = analyze(&board);

        // PCB plus the receptacle sticking out of the -Y edge
        assert_relative_eq!(stats.bbox[1], -26.27 / 2.0 - 1.73, epsilon = 1e-9);
        assert_relative_eq!(stats.bbox[4], 26.27 / 2.0, epsilon = 1e-9);
        assert_relative_eq!(stats.bbox[5], 1.0 + 3.02, epsilon = 1e-9);
        assert_relative_eq!(stats.size()[0], 18.0, epsilon = 1e-9);
    }

    #[test]
    fn test_radar_without_holes() {
        let params = Parameters::compact();
        let board = radar_board(&params).unwrap();
        let stats = analyze(&board);
        assert_relative_eq!(stats.volume, 22.0 * 15.8 * 3.0, max_relative = 1e-9);
        assert!(stats.is_watertight);
    }
}
