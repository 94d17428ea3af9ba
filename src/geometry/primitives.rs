// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid primitives generator

use super::sketch::Profile;
use super::Mesh;
use anyhow::Result;
use nalgebra::Vector3;

/// Solid primitives. Every variant sits on z = 0 unless `center` is set.
#[derive(Debug, Clone)]
pub enum Primitive {
    Cuboid { size: Vector3<f64>, center: bool },
    Cylinder { radius: f64, height: f64, segments: u32 },
    Prism { profile: Profile, height: f64 },
}

impl Primitive {
    /// Box of `size`; centred on the origin, or with its minimum corner there
    pub fn cuboid(size: Vector3<f64>, center: bool) -> Self {
        Self::Cuboid { size, center }
    }

    pub fn cylinder(radius: f64, height: f64, segments: u32) -> Self {
        let segments = if segments > 0 { segments } else { 32 };
        Self::Cylinder {
            radius,
            height,
            segments,
        }
    }

    pub fn prism(profile: Profile, height: f64) -> Self {
        Self::Prism { profile, height }
    }

    pub fn to_mesh(&self) -> Result<Mesh> {
        match self {
            Self::Cuboid { size, center } => {
                let mesh = Profile::rectangle(size.x, size.y)?.extrude(size.z)?;
                Ok(if *center {
                    mesh.translated(Vector3::new(0.0, 0.0, -size.z / 2.0))
                } else {
                    mesh.translated(Vector3::new(size.x / 2.0, size.y / 2.0, 0.0))
                })
            }
            Self::Cylinder {
                radius,
                height,
                segments,
            } => Profile::circle(*radius, *segments)?.extrude(*height),
            Self::Prism { profile, height } => profile.extrude(*height),
        }
    }
}
