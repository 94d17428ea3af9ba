// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 2D sketch profiles and extrusion into solids
//!
//! A [`Profile`] is a closed, simple, counter-clockwise polygon. Vertical
//! edge fillets of a prism are expressed as fillets of its profile, which is
//! exact for extrusions and keeps the kernel free of 3D fillet code.

use super::{GeometryError, Mesh};
use anyhow::Result;
use nalgebra::{Matrix4, Point2, Point3, Rotation3, Vector2, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};

/// Points closer than this are treated as the same point
const MERGE_DISTANCE: f64 = 1e-9;

/// Anchor used by [`Profile::aligned`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Min,
    Center,
    Max,
}

impl Align {
    fn shift(self, min: f64, max: f64) -> f64 {
        match self {
            Align::Min => -min,
            Align::Center => -(min + max) / 2.0,
            Align::Max => -max,
        }
    }
}

/// Plane a profile is drawn on.
///
/// `Xy` extrudes along +Z. `Xz` maps the profile's x to X and y to Z and
/// extrudes along -Y, which keeps the resulting solid outward-wound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchPlane {
    Xy,
    Xz,
}

impl SketchPlane {
    fn to_world(self) -> Option<Matrix4<f64>> {
        match self {
            SketchPlane::Xy => None,
            SketchPlane::Xz => Some(
                Rotation3::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2).to_homogeneous(),
            ),
        }
    }
}

/// Closed counter-clockwise polygon
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    points: Vec<Point2<f64>>,
}

impl Profile {
    /// Axis-aligned rectangle centred on the origin
    pub fn rectangle(width: f64, height: f64) -> Result<Self> {
        if width <= 0.0 || height <= 0.0 {
            return Err(GeometryError::DegenerateProfile {
                reason: format!("rectangle {width} x {height}"),
            }
            .into());
        }
        let (hw, hh) = (width / 2.0, height / 2.0);
        Ok(Self {
            points: vec![
                Point2::new(-hw, -hh),
                Point2::new(hw, -hh),
                Point2::new(hw, hh),
                Point2::new(-hw, hh),
            ],
        })
    }

    /// Rectangle with every corner rounded by `radius`
    pub fn rounded_rectangle(width: f64, height: f64, radius: f64, segments: u32) -> Result<Self> {
        Self::rectangle(width, height)?.fillet(radius, segments)
    }

    /// Regular polygon approximating a circle centred on the origin
    pub fn circle(radius: f64, segments: u32) -> Result<Self> {
        let segments = segments.max(3);
        if radius <= 0.0 {
            return Err(GeometryError::DegenerateProfile {
                reason: format!("circle radius {radius}"),
            }
            .into());
        }
        let points = (0..segments)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / segments as f64;
                Point2::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        Ok(Self { points })
    }

    /// Arbitrary simple polygon. A repeated closing point and vertices in
    /// the middle of a straight run are dropped, clockwise input is reversed.
    pub fn polygon(points: Vec<Point2<f64>>) -> Result<Self> {
        let mut points = points;
        points.dedup_by(|a, b| (*a - *b).norm() < MERGE_DISTANCE);
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            if points.len() > 1 && (first - last).norm() < MERGE_DISTANCE {
                points.pop();
            }
        }
        while points.len() >= 3 {
            let n = points.len();
            let straight = (0..n).find(|&i| {
                let u = points[i] - points[(i + n - 1) % n];
                let v = points[(i + 1) % n] - points[i];
                cross(u, v).abs() <= MERGE_DISTANCE * u.norm() * v.norm()
            });
            match straight {
                Some(i) => {
                    points.remove(i);
                }
                None => break,
            }
        }
        if points.len() < 3 {
            return Err(GeometryError::DegenerateProfile {
                reason: format!("{} distinct points", points.len()),
            }
            .into());
        }

        let mut profile = Self { points };
        let area = profile.signed_area();
        if area.abs() < MERGE_DISTANCE {
            return Err(GeometryError::DegenerateProfile {
                reason: "zero area".to_string(),
            }
            .into());
        }
        if area < 0.0 {
            profile.points.reverse();
        }
        Ok(profile)
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    fn signed_area(&self) -> f64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let (a, b) = (self.points[i], self.points[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// (min, max) corners of the profile's bounding rectangle
    pub fn bounds(&self) -> (Point2<f64>, Point2<f64>) {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    pub fn is_convex(&self) -> bool {
        let n = self.points.len();
        (0..n).all(|i| {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let c = self.points[(i + 2) % n];
            cross(b - a, c - b) >= -MERGE_DISTANCE
        })
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        let offset = Vector2::new(dx, dy);
        Self {
            points: self.points.iter().map(|p| p + offset).collect(),
        }
    }

    /// Move the profile so that the chosen bounding-box anchors sit on the origin
    pub fn aligned(&self, x: Align, y: Align) -> Self {
        let (min, max) = self.bounds();
        self.translate(x.shift(min.x, max.x), y.shift(min.y, max.y))
    }

    /// Replace every corner with a tangent arc of `radius`.
    ///
    /// Only convex profiles are supported. The tangent points of two
    /// neighbouring corners may meet but not cross.
    pub fn fillet(&self, radius: f64, segments: u32) -> Result<Self> {
        if radius <= 0.0 {
            return Ok(self.clone());
        }
        if !self.is_convex() {
            return Err(GeometryError::NonConvexProfile.into());
        }

        let n = self.points.len();
        let segments = segments.max(1);

        // Distance from each corner to its tangent points
        let mut trims = Vec::with_capacity(n);
        for i in 0..n {
            let p = self.points[i];
            let to_prev = (self.points[(i + n - 1) % n] - p).normalize();
            let to_next = (self.points[(i + 1) % n] - p).normalize();
            let half_angle = to_prev.dot(&to_next).clamp(-1.0, 1.0).acos() / 2.0;
            trims.push(radius / half_angle.tan());
        }

        let mut max_radius = f64::INFINITY;
        for i in 0..n {
            let j = (i + 1) % n;
            let edge = (self.points[j] - self.points[i]).norm();
            let needed = trims[i] + trims[j];
            max_radius = max_radius.min(radius * edge / needed);
        }
        if max_radius < radius - MERGE_DISTANCE {
            return Err(GeometryError::FilletTooLarge {
                radius,
                max: max_radius,
            }
            .into());
        }

        let mut points = Vec::with_capacity(n * (segments as usize + 1));
        for i in 0..n {
            let p = self.points[i];
            let to_prev = (self.points[(i + n - 1) % n] - p).normalize();
            let to_next = (self.points[(i + 1) % n] - p).normalize();
            let half_angle = to_prev.dot(&to_next).clamp(-1.0, 1.0).acos() / 2.0;

            let bisector = (to_prev + to_next).normalize();
            let center = p + bisector * (radius / half_angle.sin());
            let start = p + to_prev * trims[i];
            let end = p + to_next * trims[i];

            let start_angle = (start.y - center.y).atan2(start.x - center.x);
            let end_angle = (end.y - center.y).atan2(end.x - center.x);
            let mut sweep = end_angle - start_angle;
            while sweep <= 0.0 {
                sweep += 2.0 * PI;
            }

            for k in 0..=segments {
                let angle = start_angle + sweep * k as f64 / segments as f64;
                points.push(Point2::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                ));
            }
        }

        Self::polygon(points)
    }

    /// Triangulate the profile by ear clipping. Indices refer to `points()`.
    pub fn triangulate(&self) -> Result<Vec<[usize; 3]>> {
        let n = self.points.len();
        let mut remaining: Vec<usize> = (0..n).collect();
        let mut triangles = Vec::with_capacity(n - 2);

        while remaining.len() > 3 {
            let m = remaining.len();
            let ear = (0..m).find(|&i| {
                let a = self.points[remaining[(i + m - 1) % m]];
                let b = self.points[remaining[i]];
                let c = self.points[remaining[(i + 1) % m]];
                if cross(b - a, c - b) <= 0.0 {
                    return false;
                }
                remaining.iter().all(|&k| {
                    let q = self.points[k];
                    q == a || q == b || q == c || !point_in_triangle(q, a, b, c)
                })
            });

            let Some(i) = ear else {
                return Err(GeometryError::DegenerateProfile {
                    reason: "profile is self-intersecting".to_string(),
                }
                .into());
            };
            triangles.push([
                remaining[(i + m - 1) % m],
                remaining[i],
                remaining[(i + 1) % m],
            ]);
            remaining.remove(i);
        }
        triangles.push([remaining[0], remaining[1], remaining[2]]);

        Ok(triangles)
    }

    /// Extrude along +Z by `amount`; a negative amount extrudes downward
    /// from z = 0.
    pub fn extrude(&self, amount: f64) -> Result<Mesh> {
        if amount.abs() < MERGE_DISTANCE {
            return Err(GeometryError::ZeroExtrusion.into());
        }
        let (z0, z1) = if amount > 0.0 { (0.0, amount) } else { (amount, 0.0) };
        self.extrude_between(z0, z1)
    }

    /// Extrude between two heights along +Z
    pub fn extrude_between(&self, z0: f64, z1: f64) -> Result<Mesh> {
        if z1 - z0 < MERGE_DISTANCE {
            return Err(GeometryError::ZeroExtrusion.into());
        }

        let caps = self.triangulate()?;
        let n = self.points.len();
        let mut mesh = Mesh::with_capacity(caps.len() * 6 + n * 6, caps.len() * 2 + n * 2);

        let at = |i: usize, z: f64| Point3::new(self.points[i].x, self.points[i].y, z);

        for [a, b, c] in &caps {
            mesh.add_facet(at(*a, z1), at(*b, z1), at(*c, z1));
            mesh.add_facet(at(*a, z0), at(*c, z0), at(*b, z0));
        }

        for i in 0..n {
            let j = (i + 1) % n;
            mesh.add_facet(at(i, z0), at(j, z0), at(j, z1));
            mesh.add_facet(at(i, z0), at(j, z1), at(i, z1));
        }

        Ok(mesh)
    }

    /// Extrude on a sketch plane. On `Xz` a positive amount runs towards -Y.
    pub fn extrude_on(&self, plane: SketchPlane, amount: f64) -> Result<Mesh> {
        let mut mesh = self.extrude(amount)?;
        if let Some(matrix) = plane.to_world() {
            mesh.transform(&matrix);
        }
        Ok(mesh)
    }
}

fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

fn point_in_triangle(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> bool {
    let d1 = cross(b - a, p - a);
    let d2 = cross(c - b, p - b);
    let d3 = cross(a - c, p - c);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}
