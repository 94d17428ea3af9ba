// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Derived dimensions and parameter validation

use approx::assert_relative_eq;
use casegen::{ParameterError, Parameters, Variant};

#[test]
fn test_standard_dimensions() {
    let d = Parameters::standard().dimensions();

    assert_relative_eq!(d.inner_width, 28.0, epsilon = 1e-9);
    assert_relative_eq!(d.inner_length, 32.0, epsilon = 1e-9);
    assert_relative_eq!(d.outer_width, 30.0, epsilon = 1e-9);
    assert_relative_eq!(d.outer_length, 34.0, epsilon = 1e-9);
    assert_relative_eq!(d.outer_thickness, 14.0, epsilon = 1e-9);
    assert_relative_eq!(d.cavity_depth, 13.0, epsilon = 1e-9);
    assert_relative_eq!(d.lip_depth, 3.55, epsilon = 1e-9);
    assert_relative_eq!(d.rail_length, 7.0, epsilon = 1e-9);
}

#[test]
fn test_compact_dimensions() {
    let d = Parameters::compact().dimensions();

    assert_relative_eq!(d.outer_width, 27.0, epsilon = 1e-9);
    assert_relative_eq!(d.outer_length, 32.5, epsilon = 1e-9);
    assert_relative_eq!(d.outer_thickness, 14.0, epsilon = 1e-9);
    assert_relative_eq!(d.inner_width, 25.0, epsilon = 1e-9);
    assert_relative_eq!(d.inner_length, 30.5, epsilon = 1e-9);
    assert_relative_eq!(d.lip_depth, 3.0, epsilon = 1e-9);
    assert_relative_eq!(d.rail_length, 5.5, epsilon = 1e-9);
}

#[test]
fn test_dimension_identities_hold_for_both_presets() {
    for variant in [Variant::Compact, Variant::Standard] {
        let p = variant.parameters();
        let e = &p.enclosure;
        let d = p.dimensions();

        assert_relative_eq!(
            d.outer_width,
            p.mcu.width + 2.0 * e.side_clearance + 2.0 * e.wall_thickness,
            epsilon = 1e-9
        );
        assert_relative_eq!(d.outer_width - d.inner_width, 2.0 * e.wall_thickness, epsilon = 1e-9);
        assert_relative_eq!(d.outer_length - d.inner_length, 2.0 * e.wall_thickness, epsilon = 1e-9);
        assert_relative_eq!(
            d.outer_thickness,
            e.wall_thickness + e.bottom_clearance + p.mcu.pcb_thickness + e.top_clearance,
            epsilon = 1e-9
        );
        assert_relative_eq!(d.cavity_depth + e.wall_thickness, d.outer_thickness, epsilon = 1e-9);
    }
}

#[test]
fn test_dimensions_follow_parameter_changes() {
    let mut params = Parameters::standard();
    params.enclosure.wall_thickness = 2.0;
    let d = params.dimensions();
    assert_relative_eq!(d.outer_width, 32.0, epsilon = 1e-9);
    // The USB overhang is absorbed by the wall: thicker walls shorten the cavity
    assert_relative_eq!(d.inner_length, 31.0, epsilon = 1e-9);
    assert_relative_eq!(d.outer_length, 35.0, epsilon = 1e-9);
}

#[test]
fn test_rejects_non_positive_wall() {
    let mut params = Parameters::standard();
    params.enclosure.wall_thickness = 0.0;
    assert!(matches!(
        params.validate(),
        Err(ParameterError::NonPositive {
            name: "enclosure.wall_thickness",
            ..
        })
    ));
}

#[test]
fn test_rejects_negative_clearance() {
    let mut params = Parameters::compact();
    params.enclosure.top_clearance = -1.0;
    assert!(matches!(
        params.validate(),
        Err(ParameterError::Negative {
            name: "enclosure.top_clearance",
            ..
        })
    ));
}

#[test]
fn test_rejects_oversized_corner_radius() {
    let mut params = Parameters::standard();
    params.enclosure.corner_radius = 16.0;
    assert!(matches!(
        params.validate(),
        Err(ParameterError::FilletTooLarge {
            feature: "enclosure.corner_radius",
            ..
        })
    ));
}

#[test]
fn test_rejects_radar_wider_than_lid_ring() {
    let mut params = Parameters::standard();
    params.radar.width = 40.0;
    assert!(matches!(
        params.validate(),
        Err(ParameterError::DoesNotFit {
            feature: "radar board width",
            ..
        })
    ));
}

#[test]
fn test_rejects_lip_deeper_than_cavity() {
    let mut params = Parameters::compact();
    params.radar.thickness = 20.0;
    assert!(matches!(
        params.validate(),
        Err(ParameterError::DoesNotFit {
            feature: "lid lip",
            ..
        })
    ));
}

#[test]
fn test_rejects_overhang_longer_than_connector() {
    let mut params = Parameters::standard();
    params.usb_c.overhang = 8.0;
    assert!(matches!(
        params.validate(),
        Err(ParameterError::DoesNotFit {
            feature: "USB-C overhang",
            ..
        })
    ));
}

#[test]
fn test_rejects_sensor_cuts_that_leave_the_radar() {
    let mut params = Parameters::standard();
    params.lid.sensor_cuts.enabled = true;
    params.lid.sensor_cuts.width = 12.0;
    assert!(matches!(
        params.validate(),
        Err(ParameterError::DoesNotFit {
            feature: "lid sensor cuts",
            ..
        })
    ));
}

#[test]
fn test_rejects_mounting_hole_past_the_edge() {
    let mut params = Parameters::standard();
    params.radar.mounting_hole_diameter = Some(3.0);
    assert!(matches!(
        params.validate(),
        Err(ParameterError::DoesNotFit {
            feature: "radar mounting hole",
            ..
        })
    ));
}

#[test]
fn test_parameters_toml_round_trip() {
    let params = Parameters::compact();
    let text = toml::to_string_pretty(&params).unwrap();
    let parsed: Parameters = toml::from_str(&text).unwrap();
    assert_eq!(parsed, params);
    assert!(!text.contains("mounting_hole_diameter"));
}
