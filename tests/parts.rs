// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Part builders against the derived dimensions

use approx::assert_relative_eq;
use casegen::geometry::analyze;
use casegen::parts::{
    base_shell, build_part, build_parts, lid, mcu_board, mcu_placement, radar_board, PartKind,
};
use casegen::{Mesh, Parameters, Variant};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Area of a rounded rectangle tessellated with `n` segments per corner
fn rounded_rectangle_area(w: f64, h: f64, r: f64, n: u32) -> f64 {
    let n = n as f64;
    w * h - 4.0 * r * r + 2.0 * n * r * r * (PI / (2.0 * n)).sin()
}

/// Area of a circle tessellated with `n` segments
fn polygon_circle_area(r: f64, n: u32) -> f64 {
    let n = n as f64;
    n / 2.0 * r * r * (2.0 * PI / n).sin()
}

/// Distance along `dir` to the nearest triangle the ray meets
fn first_hit(mesh: &Mesh, origin: Point3<f64>, dir: Vector3<f64>) -> Option<f64> {
    mesh.triangles
        .iter()
        .filter_map(|triangle| {
            let [a, b, c] = mesh.triangle_positions(triangle);
            let (e1, e2) = (b - a, c - a);
            let p = dir.cross(&e2);
            let det = e1.dot(&p);
            if det.abs() < 1e-12 {
                return None;
            }
            let s = origin - a;
            let u = s.dot(&p) / det;
            let q = s.cross(&e1);
            let v = dir.dot(&q) / det;
            if u < -1e-9 || v < -1e-9 || u + v > 1.0 + 1e-9 {
                return None;
            }
            let t = e2.dot(&q) / det;
            (t > 0.0).then_some(t)
        })
        .min_by(|a, b| a.total_cmp(b))
}

/// y of the first surface met walking +Y from far in front of the part
fn first_y(mesh: &Mesh, x: f64, z: f64) -> f64 {
    let start = -100.0;
    start + first_hit(mesh, Point3::new(x, start, z), Vector3::y()).unwrap()
}

/// z of the first surface met looking down from above the part
fn first_z(mesh: &Mesh, x: f64, y: f64) -> f64 {
    let start = 100.0;
    start - first_hit(mesh, Point3::new(x, y, start), -Vector3::z()).unwrap()
}

#[test]
fn test_printable_parts_are_closed() {
    for variant in [Variant::Compact, Variant::Standard] {
        let mut params = variant.parameters();
        params.lid.sensor_cuts.enabled = variant == Variant::Standard;
        for kind in PartKind::printable() {
            let stats = analyze(&build_part(&params, kind).unwrap());
            assert!(stats.is_watertight, "{variant} {kind} is open");
            assert!(stats.volume > 0.0);
        }
    }
}

#[test]
fn test_standard_usb_slot_opens_the_front_wall() {
    let params = Parameters::standard();
    let d = params.dimensions();
    let e = &params.enclosure;
    let base = base_shell(&params).unwrap();

    // Through the slot the first wall met is the far side of the cavity
    let slot_z = e.wall_thickness + e.bottom_clearance + params.usb_c.thickness / 2.0;
    assert_relative_eq!(first_y(&base, 0.0123, slot_z), d.inner_length / 2.0, epsilon = 1e-6);

    // Above the slot the front wall is intact
    let above = slot_z + params.usb_c.thickness;
    assert_relative_eq!(first_y(&base, 0.0123, above), -d.outer_length / 2.0, epsilon = 1e-6);
}

#[test]
fn test_compact_board_cut_opens_the_front_wall() {
    let params = Parameters::compact();
    let d = params.dimensions();
    let base = base_shell(&params).unwrap();

    let tolerance = params.enclosure.print_tolerance;
    let channel_z = mcu_placement(&params).z
        + params.mcu.pcb_thickness
        + (params.usb_c.thickness + tolerance) / 2.0;
    assert_relative_eq!(first_y(&base, 0.0123, channel_z), d.inner_length / 2.0, epsilon = 1e-6);

    let beside = params.usb_c.width / 2.0 + tolerance + 1.0;
    assert_relative_eq!(first_y(&base, beside, channel_z), -d.outer_length / 2.0, epsilon = 1e-6);
}

#[test]
fn test_standard_holder_pocket() {
    let params = Parameters::standard();
    let d = params.dimensions();
    let e = &params.enclosure;
    let base = base_shell(&params).unwrap();

    let rail_start = d.inner_length / 2.0 - d.rail_length;
    let pocket_end = rail_start + e.holder_length + e.print_tolerance;
    let rail_top = e.wall_thickness + e.bottom_clearance;

    assert_relative_eq!(first_z(&base, 0.0123, rail_start - 0.2345), e.wall_thickness, epsilon = 1e-6);
    assert_relative_eq!(
        first_z(&base, 0.0123, rail_start + 0.1234),
        rail_top - params.mcu.pcb_thickness,
        epsilon = 1e-6
    );
    assert_relative_eq!(first_z(&base, 0.0123, pocket_end + 0.1234), rail_top, epsilon = 1e-6);
}

#[test]
fn test_compact_rail_and_board_seat() {
    let params = Parameters::compact();
    let d = params.dimensions();
    let e = &params.enclosure;
    let base = base_shell(&params).unwrap();

    let end = d.inner_length / 2.0;
    let rail_start = end - e.side_clearance / 2.0 - d.rail_length / 2.0;
    let rail_top = e.wall_thickness + e.bottom_clearance;
    let board_end = mcu_placement(&params).y + (params.mcu.length + e.print_tolerance) / 2.0;

    // Rail clamped at the wall, the board end sunk into its -Y part
    assert_relative_eq!(first_z(&base, 0.0123, end - 0.5123), rail_top, epsilon = 1e-6);
    assert_relative_eq!(
        first_z(&base, 0.0123, board_end - 0.2345),
        rail_top - params.mcu.pcb_thickness,
        epsilon = 1e-6
    );
    assert!(board_end > rail_start);
    assert_relative_eq!(first_z(&base, 0.0123, rail_start - 0.2345), e.wall_thickness, epsilon = 1e-6);
}

#[test]
fn test_grip_sits_below_a_bridge() {
    let params = Parameters::standard();
    let d = params.dimensions();
    let grip = &params.lid.grip;
    let cover = lid(&params).unwrap();

    let ring_front = -(d.inner_length + params.lid.fit) / 2.0;
    let ring_bottom = params.enclosure.wall_thickness - d.lip_depth;
    let center = ring_bottom / 2.0 - grip.drop;
    let top = center + grip.height / 2.0;

    // Bridge between the plate and the grip
    assert_relative_eq!(first_y(&cover, 0.0123, top + 0.1137), ring_front, epsilon = 1e-6);
    assert_relative_eq!(first_y(&cover, 0.0123, -0.0123), ring_front, epsilon = 1e-6);
    // Inside the grip the front face is cut back by the grip depth
    for z in [top - 0.1363, ring_bottom + 0.0933] {
        assert!(first_y(&cover, 0.0123, z) >= ring_front + grip.depth - 1e-6);
    }
}

#[test]
fn test_base_matches_outer_dimensions() {
    for variant in [Variant::Compact, Variant::Standard] {
        let params = variant.parameters();
        let d = params.dimensions();
        let stats = analyze(&base_shell(&params).unwrap());

        let [sx, sy, sz] = stats.size();
        assert_relative_eq!(sx, d.outer_width, epsilon = 1e-6);
        assert_relative_eq!(sy, d.outer_length, epsilon = 1e-6);
        assert_relative_eq!(sz, d.outer_thickness, epsilon = 1e-6);
        assert_relative_eq!(stats.bbox[2], 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_base_is_mostly_hollow() {
    for variant in [Variant::Compact, Variant::Standard] {
        let params = variant.parameters();
        let d = params.dimensions();
        let stats = analyze(&base_shell(&params).unwrap());

        let solid = d.outer_width * d.outer_length * d.outer_thickness;
        let cavity = d.inner_width * d.inner_length * d.cavity_depth;
        // The rail adds material, the USB opening and board cut remove some
        assert!(stats.volume < solid - cavity + d.inner_width * d.rail_length * 2.0);
        assert!(stats.volume > 0.5 * (solid - cavity));
    }
}

#[test]
fn test_radar_volume_matches_formula() {
    let params = Parameters::standard();
    let radar = &params.radar;
    let res = &params.resolution;
    let stats = analyze(&radar_board(&params).unwrap());

    let hole_radius = radar.mounting_hole_diameter.unwrap() / 2.0;
    let area = rounded_rectangle_area(radar.width, radar.length, radar.corner_radius, res.arc_segments)
        - 2.0 * polygon_circle_area(hole_radius, res.circle_segments);
    assert_relative_eq!(stats.volume, area * radar.thickness, max_relative = 1e-6);
}

#[test]
fn test_mcu_board_tolerance_grows_the_proxy() {
    let params = Parameters::standard();
    let exact = analyze(&mcu_board(&params, 0.0).unwrap());
    let loose = analyze(&mcu_board(&params, 0.35).unwrap());
    assert!(loose.volume > exact.volume);
    assert_relative_eq!(loose.size()[0] - exact.size()[0], 0.35, epsilon = 1e-9);
}

#[test]
fn test_sensor_cuts_remove_plate_material() {
    let plain = Parameters::standard();
    let mut cut = Parameters::standard();
    cut.lid.sensor_cuts.enabled = true;

    let plain_volume = analyze(&lid(&plain).unwrap()).volume;
    let cut_volume = analyze(&lid(&cut).unwrap()).volume;

    let cuts = &cut.lid.sensor_cuts;
    let removed = 2.0 * cuts.width * cuts.length * cut.enclosure.wall_thickness;
    assert_relative_eq!(plain_volume - cut_volume, removed, max_relative = 1e-6);
}

#[test]
fn test_compact_lid_window() {
    let params = Parameters::compact();
    let stats = analyze(&lid(&params).unwrap());
    let d = params.dimensions();

    let plate = rounded_rectangle_area(
        d.outer_width,
        d.outer_length,
        params.enclosure.corner_radius,
        params.resolution.arc_segments,
    ) * params.enclosure.wall_thickness;
    let window = &params.lid.window;
    let window_volume = window.width * window.length * params.enclosure.wall_thickness;
    assert!(stats.volume > plate - window_volume);
}

#[test]
fn test_build_parts_in_order() {
    let params = Parameters::compact();
    let kinds = PartKind::printable();
    let parts = build_parts(&params, &kinds).unwrap();

    assert_eq!(parts.len(), 3);
    for ((kind, mesh), expected) in parts.iter().zip(&kinds) {
        assert_eq!(kind, expected);
        assert!(mesh.triangle_count() > 0);
    }
}
