// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::Mesh;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Distance under which positions count as one when checking watertightness
const WELD_EPSILON: f64 = 1e-7;

/// Geometry statistics and analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Total volume in cubic units
    pub volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Centre of mass of the enclosed volume [x, y, z]
    pub centroid: [f64; 3],
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Every edge is shared by exactly two triangles
    pub is_watertight: bool,
}

impl GeometryStats {
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            vertex_count: 0,
            triangle_count: 0,
            is_watertight: false,
        }
    }

    /// Extent along x, y and z
    pub fn size(&self) -> [f64; 3] {
        [
            self.bbox[3] - self.bbox[0],
            self.bbox[4] - self.bbox[1],
            self.bbox[5] - self.bbox[2],
        ]
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    let vertex_count = mesh.vertices.len();
    let triangle_count = mesh.triangles.len();

    if vertex_count == 0 || triangle_count == 0 {
        return GeometryStats::empty();
    }

    let bbox = mesh.bounding_box();
    let (volume, centroid) = calculate_volume_and_centroid(mesh);

    GeometryStats {
        volume,
        surface_area: calculate_surface_area(mesh),
        bbox: [
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z,
        ],
        centroid,
        vertex_count,
        triangle_count,
        is_watertight: check_watertight(mesh),
    }
}

/// Volume and centroid from signed tetrahedra against the origin
fn calculate_volume_and_centroid(mesh: &Mesh) -> (f64, [f64; 3]) {
    let mut volume = 0.0;
    let mut moment = nalgebra::Vector3::zeros();

    for triangle in &mesh.triangles {
        let [v0, v1, v2] = mesh.triangle_positions(triangle);
        let signed = v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0;
        volume += signed;
        moment += (v0.coords + v1.coords + v2.coords) * (signed / 4.0);
    }

    if volume.abs() < f64::EPSILON {
        return (0.0, [0.0; 3]);
    }
    let centroid = moment / volume;
    (volume.abs(), [centroid.x, centroid.y, centroid.z])
}

/// Calculate total surface area
fn calculate_surface_area(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|triangle| {
            let [v0, v1, v2] = mesh.triangle_positions(triangle);
            (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
        })
        .sum()
}

/// Check if mesh is watertight: with coincident positions merged, every
/// edge must be used exactly twice, once in each direction.
fn check_watertight(mesh: &Mesh) -> bool {
    let mut welded = mesh.clone();
    welded.weld_vertices(WELD_EPSILON);

    let mut edge_balance: AHashMap<(usize, usize), (u32, u32)> = AHashMap::new();
    for triangle in &welded.triangles {
        for i in 0..3 {
            let a = triangle.indices[i];
            let b = triangle.indices[(i + 1) % 3];
            let entry = edge_balance.entry((a.min(b), a.max(b))).or_insert((0, 0));
            if a < b {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }

    !edge_balance.is_empty()
        && edge_balance
            .values()
            .all(|&(forward, backward)| forward == 1 && backward == 1)
}
