// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG (Constructive Solid Geometry) operations using BSP trees
//!
//! Each operand is turned into a BSP tree of convex polygons. Polygons of one
//! tree are clipped against the other tree and the surviving fragments are
//! stitched back into a triangle mesh. Operands must be closed and
//! consistently wound (outward normals); every builder in this crate
//! produces meshes that are.

use super::{Mesh, Triangle, Vertex};
use anyhow::Result;
use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

/// Distance under which a point counts as lying on a plane
const EPSILON: f64 = 1e-5;

/// Distance under which output vertices are merged and T-junctions split
pub const REPAIR_TOLERANCE: f64 = EPSILON;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

#[derive(Debug, Clone)]
struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

impl Plane {
    fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a)).try_normalize(1e-12)?;
        let w = normal.dot(&a.coords);
        Some(Self { normal, w })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    /// Sort `polygon` into the four output buckets, splitting it when it
    /// spans the plane.
    fn split_polygon(&self, polygon: &Polygon, out: &mut Split) {
        let mut polygon_type = COPLANAR;
        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|v| {
                let t = self.distance(&v.position);
                let kind = if t < -EPSILON {
                    BACK
                } else if t > EPSILON {
                    FRONT
                } else {
                    COPLANAR
                };
                polygon_type |= kind;
                kind
            })
            .collect();

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    out.coplanar_front.push(polygon.clone());
                } else {
                    out.coplanar_back.push(polygon.clone());
                }
            }
            FRONT => out.front.push(polygon.clone()),
            BACK => out.back.push(polygon.clone()),
            _ => {
                let count = polygon.vertices.len();
                let mut front = Vec::with_capacity(count + 1);
                let mut back = Vec::with_capacity(count + 1);

                for i in 0..count {
                    let j = (i + 1) % count;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (&polygon.vertices[i], &polygon.vertices[j]);

                    if ti != BACK {
                        front.push(*vi);
                    }
                    if ti != FRONT {
                        back.push(*vi);
                    }
                    if (ti | tj) == SPANNING {
                        let denom = self.normal.dot(&(vj.position - vi.position));
                        let t = (self.w - self.normal.dot(&vi.position.coords)) / denom;
                        let v = vi.interpolate(vj, t);
                        front.push(v);
                        back.push(v);
                    }
                }

                if front.len() >= 3 {
                    out.front.push(Polygon {
                        vertices: front,
                        plane: polygon.plane.clone(),
                    });
                }
                if back.len() >= 3 {
                    out.back.push(Polygon {
                        vertices: back,
                        plane: polygon.plane.clone(),
                    });
                }
            }
        }
    }
}

#[derive(Default)]
struct Split {
    coplanar_front: Vec<Polygon>,
    coplanar_back: Vec<Polygon>,
    front: Vec<Polygon>,
    back: Vec<Polygon>,
}

/// Convex planar polygon
#[derive(Debug, Clone)]
struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane,
}

impl Polygon {
    fn new(vertices: Vec<Vertex>) -> Option<Self> {
        let plane = Plane::from_points(
            &vertices.first()?.position,
            &vertices.get(1)?.position,
            &vertices.get(2)?.position,
        )?;
        Some(Self { vertices, plane })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.normal = -v.normal;
        }
        self.plane.flip();
    }
}

/// BSP tree node
#[derive(Default)]
struct Node {
    plane: Option<Plane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Convert solid space to empty space and empty space to solid space
    fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that lie inside this tree
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };

        let mut split = Split::default();
        for polygon in &polygons {
            plane.split_polygon(polygon, &mut split);
        }
        let mut front = split.front;
        front.append(&mut split.coplanar_front);
        let mut back = split.back;
        back.append(&mut split.coplanar_back);

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back),
            None => Vec::new(),
        };

        front.extend(back);
        front
    }

    /// Remove all polygons in this tree that are inside `other`
    fn clip_to(&mut self, other: &Node) {
        let polygons = std::mem::take(&mut self.polygons);
        self.polygons = other.clip_polygons(polygons);
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = self.polygons.clone();
        if let Some(front) = &self.front {
            result.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            result.extend(back.all_polygons());
        }
        result
    }

    fn build(&mut self, polygons: Vec<Polygon>) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = self.plane.get_or_insert_with(|| first.plane.clone()).clone();

        let mut split = Split::default();
        for polygon in &polygons {
            plane.split_polygon(polygon, &mut split);
        }
        self.polygons.append(&mut split.coplanar_front);
        self.polygons.append(&mut split.coplanar_back);

        if !split.front.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(split.front);
        }
        if !split.back.is_empty() {
            self.back.get_or_insert_with(Box::default).build(split.back);
        }
    }
}

/// Convert mesh to polygons, dropping degenerate triangles
fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    let mut dropped = 0usize;
    let polygons: Vec<Polygon> = mesh
        .triangles
        .iter()
        .filter_map(|tri| {
            let polygon = Polygon::new(tri.indices.iter().map(|&i| mesh.vertices[i]).collect());
            if polygon.is_none() {
                dropped += 1;
            }
            polygon
        })
        .collect();

    if dropped > 0 {
        warn!(dropped, "skipped degenerate triangles during CSG");
    }
    polygons
}

/// Convert polygons back to a closed, indexed triangle mesh
fn polygons_to_mesh(polygons: &[Polygon]) -> Mesh {
    let triangle_count: usize = polygons.iter().map(|p| p.vertices.len() - 2).sum();
    let mut mesh = Mesh::with_capacity(triangle_count * 3, triangle_count);

    for polygon in polygons {
        let normal = polygon.plane.normal;
        let first = mesh.add_vertex(Vertex::new(polygon.vertices[0].position, normal));
        let mut previous = mesh.add_vertex(Vertex::new(polygon.vertices[1].position, normal));
        for vertex in &polygon.vertices[2..] {
            let current = mesh.add_vertex(Vertex::new(vertex.position, normal));
            mesh.add_triangle(Triangle::new([first, previous, current]));
            previous = current;
        }
    }

    // Fragments meet mid-edge where the trees split them differently
    let repaired = mesh.repair(REPAIR_TOLERANCE);
    debug!(
        welded = repaired.welded,
        splits = repaired.splits,
        cancelled = repaired.cancelled,
        "repaired csg output"
    );
    mesh
}

/// A ∪ B
pub fn union(a: &Mesh, b: &Mesh) -> Result<Mesh> {
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }

    let mut tree_a = Node::new(mesh_to_polygons(a));
    let mut tree_b = Node::new(mesh_to_polygons(b));

    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_a.build(tree_b.all_polygons());

    let result = polygons_to_mesh(&tree_a.all_polygons());
    debug!(
        a = a.triangle_count(),
        b = b.triangle_count(),
        result = result.triangle_count(),
        "csg union"
    );
    Ok(result)
}

/// A − B
pub fn difference(a: &Mesh, b: &Mesh) -> Result<Mesh> {
    if a.is_empty() {
        return Ok(Mesh::empty());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }

    let mut tree_a = Node::new(mesh_to_polygons(a));
    let mut tree_b = Node::new(mesh_to_polygons(b));

    tree_a.invert();
    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_a.build(tree_b.all_polygons());
    tree_a.invert();

    let result = polygons_to_mesh(&tree_a.all_polygons());
    debug!(
        a = a.triangle_count(),
        b = b.triangle_count(),
        result = result.triangle_count(),
        "csg difference"
    );
    Ok(result)
}

/// A ∩ B
pub fn intersection(a: &Mesh, b: &Mesh) -> Result<Mesh> {
    if a.is_empty() || b.is_empty() {
        return Ok(Mesh::empty());
    }

    let mut tree_a = Node::new(mesh_to_polygons(a));
    let mut tree_b = Node::new(mesh_to_polygons(b));

    tree_a.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);
    tree_a.build(tree_b.all_polygons());
    tree_a.invert();

    let result = polygons_to_mesh(&tree_a.all_polygons());
    debug!(
        a = a.triangle_count(),
        b = b.triangle_count(),
        result = result.triangle_count(),
        "csg intersection"
    );
    Ok(result)
}
