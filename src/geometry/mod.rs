// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, sketches and boolean operations

mod analytics;
mod bbox;
pub mod csg;
mod mesh;
mod primitives;
pub mod sketch;

pub use analytics::{analyze, GeometryStats};
pub use bbox::BoundingBox;
pub use mesh::{Mesh, RepairStats, Triangle, Vertex};
pub use primitives::Primitive;
pub use sketch::{Align, Profile, SketchPlane};

use thiserror::Error;

/// Failures raised by the modelling kernel
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("degenerate profile: {reason}")]
    DegenerateProfile { reason: String },

    #[error("fillet requires a convex profile")]
    NonConvexProfile,

    #[error("fillet radius {radius} exceeds the largest radius the profile allows ({max:.4})")]
    FilletTooLarge { radius: f64, max: f64 },

    #[error("extrusion amount must be non-zero")]
    ZeroExtrusion,

    #[error("{operation} produced an empty solid")]
    EmptyResult { operation: String },
}
