// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sketch, extrusion and CSG behaviour through the public API

use anyhow::Result;
use approx::assert_relative_eq;
use casegen::geometry::{analyze, Align, Primitive, Profile, SketchPlane};
use casegen::GeometryError;
use nalgebra::{Point2, Vector3};

#[test]
fn test_fillet_keeps_profile_inside_original() -> Result<()> {
    let square = Profile::rectangle(10.0, 10.0)?;
    let rounded = square.fillet(2.0, 8)?;

    let (min, max) = rounded.bounds();
    assert_relative_eq!(min.x, -5.0, epsilon = 1e-9);
    assert_relative_eq!(max.y, 5.0, epsilon = 1e-9);
    assert!(rounded.area() < square.area());
    assert!(rounded.is_convex());
    Ok(())
}

#[test]
fn test_fillet_limit_on_a_triangle() -> Result<()> {
    let triangle = Profile::polygon(vec![
        Point2::new(-2.0, 0.0),
        Point2::new(2.0, 0.0),
        Point2::new(0.0, 2.0),
    ])?;
    let err = triangle.fillet(5.0, 8).unwrap_err();
    match err.downcast_ref::<GeometryError>() {
        Some(GeometryError::FilletTooLarge { radius, max }) => {
            assert_eq!(*radius, 5.0);
            assert!(*max < 5.0);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_extrusion_volume_and_closure() -> Result<()> {
    let profile = Profile::rounded_rectangle(20.0, 10.0, 1.5, 6)?;
    let solid = profile.extrude(4.0)?;
    let stats = analyze(&solid);

    assert!(stats.is_watertight);
    assert_relative_eq!(stats.volume, profile.area() * 4.0, max_relative = 1e-9);
    Ok(())
}

#[test]
fn test_xz_extrusion_runs_towards_negative_y() -> Result<()> {
    let solid = Profile::rectangle(2.0, 1.0)?.extrude_on(SketchPlane::Xz, 3.0)?;
    let bbox = solid.bounding_box();
    assert_relative_eq!(bbox.min.y, -3.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max.y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max.z - bbox.min.z, 1.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_difference_cuts_a_slot() -> Result<()> {
    let block = Primitive::cuboid(Vector3::new(10.0, 10.0, 10.0), false).to_mesh()?;
    let slot = Profile::rectangle(2.0, 12.0)?
        .aligned(Align::Center, Align::Min)
        .translate(5.0, -1.0)
        .extrude_between(5.0, 11.0)?;

    let cut = block.difference(&slot)?;
    let stats = analyze(&cut);
    assert_relative_eq!(stats.volume, 1000.0 - 2.0 * 10.0 * 5.0, max_relative = 1e-9);
    assert!(stats.is_watertight);
    Ok(())
}

#[test]
fn test_union_of_stacked_blocks() -> Result<()> {
    let lower = Primitive::cuboid(Vector3::new(10.0, 10.0, 2.0), false).to_mesh()?;
    let upper = Primitive::cuboid(Vector3::new(4.0, 4.0, 2.0), false)
        .to_mesh()?
        .translated(Vector3::new(3.0, 3.0, 2.0));

    let merged = lower.union(&upper)?;
    let stats = analyze(&merged);
    assert_relative_eq!(stats.volume, 200.0 + 32.0, max_relative = 1e-9);
    assert_relative_eq!(stats.bbox[5], 4.0, epsilon = 1e-9);
    // The upper block's footprint splits the top face of the lower one
    assert!(stats.is_watertight);
    Ok(())
}

#[test]
fn test_concave_profile_extrudes() -> Result<()> {
    let l_shape = Profile::polygon(vec![
        Point2::new(0.0, 0.0),
        Point2::new(4.0, 0.0),
        Point2::new(4.0, 1.0),
        Point2::new(1.0, 1.0),
        Point2::new(1.0, 3.0),
        Point2::new(0.0, 3.0),
    ])?;
    assert!(!l_shape.is_convex());
    assert!(l_shape.fillet(0.2, 4).is_err());

    let stats = analyze(&l_shape.extrude(2.0)?);
    assert!(stats.is_watertight);
    assert_relative_eq!(stats.volume, 6.0 * 2.0, max_relative = 1e-9);
    Ok(())
}
