// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::{csg, BoundingBox};
use ahash::AHashMap;
use anyhow::Result;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        // Normals go through the inverse transpose
        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        let normal = normal_matrix.transform_vector(&self.normal);
        self.normal = normal.try_normalize(f64::EPSILON).unwrap_or(normal);
    }

    /// Linear interpolation between two vertices
    pub fn interpolate(&self, other: &Vertex, t: f64) -> Vertex {
        Vertex {
            position: self.position + (other.position - self.position) * t,
            normal: self.normal + (other.normal - self.normal) * t,
        }
    }
}

/// What [`Mesh::repair`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    pub welded: usize,
    pub splits: usize,
    pub cancelled: usize,
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Add a flat-shaded triangle from three positions
    pub fn add_facet(&mut self, a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) {
        let normal = (b - a)
            .cross(&(c - a))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::z);
        let v0 = self.add_vertex(Vertex::new(a, normal));
        let v1 = self.add_vertex(Vertex::new(b, normal));
        let v2 = self.add_vertex(Vertex::new(c, normal));
        self.add_triangle(Triangle::new([v0, v1, v2]));
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            vertex.transform(matrix);
        }
    }

    /// Copy of the mesh moved by `offset`
    pub fn translated(&self, offset: Vector3<f64>) -> Mesh {
        let mut moved = self.clone();
        for vertex in &mut moved.vertices {
            vertex.position += offset;
        }
        moved
    }

    /// Positions of the three corners of a triangle
    pub fn triangle_positions(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        [
            self.vertices[triangle.indices[0]].position,
            self.vertices[triangle.indices[1]].position,
            self.vertices[triangle.indices[2]].position,
        ]
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Boolean union with another mesh
    pub fn union(&self, other: &Mesh) -> Result<Mesh> {
        csg::union(self, other)
    }

    /// Boolean difference: `self` minus `other`
    pub fn difference(&self, other: &Mesh) -> Result<Mesh> {
        csg::difference(self, other)
    }

    /// Boolean intersection with another mesh
    pub fn intersection(&self, other: &Mesh) -> Result<Mesh> {
        csg::intersection(self, other)
    }

    /// Merge with another mesh (no CSG, overlapping volumes stay overlapping)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles.push(Triangle::new([
                triangle.indices[0] + offset,
                triangle.indices[1] + offset,
                triangle.indices[2] + offset,
            ]));
        }
    }

    /// Weld vertices closer than `epsilon` to each other.
    ///
    /// Triangles that collapse after welding are dropped. Returns the number
    /// of vertices removed.
    pub fn weld_vertices(&mut self, epsilon: f64) -> usize {
        if self.vertices.is_empty() {
            return 0;
        }

        let original_count = self.vertices.len();
        let epsilon = epsilon.max(f64::EPSILON);
        let cell_of = |p: &Point3<f64>| {
            (
                (p.x / epsilon).floor() as i64,
                (p.y / epsilon).floor() as i64,
                (p.z / epsilon).floor() as i64,
            )
        };
        let mut cells: AHashMap<(i64, i64, i64), Vec<usize>> = AHashMap::new();
        let mut new_vertices: Vec<Vertex> = Vec::with_capacity(original_count);
        let mut remap: Vec<usize> = Vec::with_capacity(original_count);

        for vertex in &self.vertices {
            let (cx, cy, cz) = cell_of(&vertex.position);
            let mut found = None;
            // A match within epsilon can sit in any neighbouring cell
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(bucket) = cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };
                        for &index in bucket {
                            if (new_vertices[index].position - vertex.position).norm() <= epsilon {
                                found = Some(index);
                                break 'search;
                            }
                        }
                    }
                }
            }

            let index = found.unwrap_or_else(|| {
                new_vertices.push(*vertex);
                let index = new_vertices.len() - 1;
                cells.entry((cx, cy, cz)).or_default().push(index);
                index
            });
            remap.push(index);
        }

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                *index = remap[*index];
            }
        }
        self.triangles.retain(|t| {
            let [a, b, c] = t.indices;
            a != b && b != c && a != c
        });
        self.vertices = new_vertices;

        original_count - self.vertices.len()
    }

    /// Split triangles whose edges run through another vertex of the mesh,
    /// so that neighbouring faces share whole edges. Expects welded vertices.
    /// Returns the number of splits.
    pub fn split_t_junctions(&mut self, tolerance: f64) -> usize {
        let mut by_x: Vec<usize> = (0..self.vertices.len()).collect();
        by_x.sort_by(|&a, &b| {
            self.vertices[a]
                .position
                .x
                .total_cmp(&self.vertices[b].position.x)
        });
        let xs: Vec<f64> = by_x.iter().map(|&i| self.vertices[i].position.x).collect();

        let mut pending = std::mem::take(&mut self.triangles);
        let mut done = Vec::with_capacity(pending.len());
        let mut splits = 0;

        while let Some(triangle) = pending.pop() {
            let [a, b, c] = triangle.indices;
            if a == b || b == c || a == c {
                continue;
            }
            match self.find_t_junction(&triangle, &by_x, &xs, tolerance) {
                Some((edge, m)) => {
                    let i = triangle.indices[edge];
                    let j = triangle.indices[(edge + 1) % 3];
                    let k = triangle.indices[(edge + 2) % 3];
                    pending.push(Triangle::new([i, m, k]));
                    pending.push(Triangle::new([m, j, k]));
                    splits += 1;
                }
                None => done.push(triangle),
            }
        }

        self.triangles = done;
        splits
    }

    /// First vertex lying strictly inside one of the triangle's edges, as
    /// (edge number, vertex index)
    fn find_t_junction(
        &self,
        triangle: &Triangle,
        by_x: &[usize],
        xs: &[f64],
        tolerance: f64,
    ) -> Option<(usize, usize)> {
        for edge in 0..3 {
            let a = triangle.indices[edge];
            let b = triangle.indices[(edge + 1) % 3];
            let pa = self.vertices[a].position;
            let pb = self.vertices[b].position;
            let direction = pb - pa;
            let length_sq = direction.norm_squared();
            if length_sq <= tolerance * tolerance {
                continue;
            }

            let span = BoundingBox::new(pa.inf(&pb), pa.sup(&pb));
            let lo = xs.partition_point(|&x| x < span.min.x - tolerance);
            let hi = xs.partition_point(|&x| x <= span.max.x + tolerance);

            for &m in &by_x[lo..hi] {
                if m == a || m == b {
                    continue;
                }
                let pm = self.vertices[m].position;
                if !span.contains(&pm, tolerance) {
                    continue;
                }
                let t = (pm - pa).dot(&direction) / length_sq;
                if t <= 0.0 || t >= 1.0 {
                    continue;
                }
                let off_line = (pm - (pa + direction * t)).norm();
                if off_line <= tolerance
                    && (pm - pa).norm() > tolerance
                    && (pm - pb).norm() > tolerance
                {
                    return Some((edge, m));
                }
            }
        }
        None
    }

    /// Drop pairs of triangles that cover the same corners with opposite
    /// winding. Returns the number of triangles removed.
    fn remove_cancelling_pairs(&mut self) -> usize {
        fn canonical([a, b, c]: [usize; 3]) -> [usize; 3] {
            if a <= b && a <= c {
                [a, b, c]
            } else if b <= a && b <= c {
                [b, c, a]
            } else {
                [c, a, b]
            }
        }

        let mut open: AHashMap<[usize; 3], Vec<usize>> = AHashMap::new();
        let mut removed = vec![false; self.triangles.len()];
        for (index, triangle) in self.triangles.iter().enumerate() {
            let [a, b, c] = triangle.indices;
            match open.get_mut(&canonical([a, c, b])).and_then(Vec::pop) {
                Some(partner) => {
                    removed[index] = true;
                    removed[partner] = true;
                }
                None => open.entry(canonical([a, b, c])).or_default().push(index),
            }
        }

        let before = self.triangles.len();
        let mut flags = removed.into_iter();
        self.triangles.retain(|_| !flags.next().unwrap_or(false));
        before - self.triangles.len()
    }

    /// Turn a triangle soup into a closed, indexed surface: weld coincident
    /// vertices, split T-junctions, drop zero-volume face pairs and rebuild
    /// the vertex normals.
    pub fn repair(&mut self, tolerance: f64) -> RepairStats {
        let welded = self.weld_vertices(tolerance);
        let splits = self.split_t_junctions(tolerance);
        let cancelled = self.remove_cancelling_pairs();
        self.recompute_normals();
        RepairStats {
            welded,
            splits,
            cancelled,
        }
    }

    /// Recompute vertex normals by area-weighted averaging of face normals
    pub fn recompute_normals(&mut self) {
        let mut accumulated = vec![Vector3::zeros(); self.vertices.len()];

        for triangle in &self.triangles {
            let [a, b, c] = self.triangle_positions(triangle);
            let face = (b - a).cross(&(c - a));
            for &index in &triangle.indices {
                accumulated[index] += face;
            }
        }

        for (vertex, normal) in self.vertices.iter_mut().zip(accumulated) {
            if let Some(n) = normal.try_normalize(f64::EPSILON) {
                vertex.normal = n;
            }
        }
    }
}
