// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exploded assembly view: parts placed relative to each other with colours

use crate::geometry::{BoundingBox, Mesh};
use crate::params::{Parameters, Variant};
use crate::parts::{build_parts, mcu_placement, PartKind};
use anyhow::{Context, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default vertical distance between the base rim and the lid
pub const DEFAULT_EXPLODE_GAP: f64 = 10.0;

/// Linear RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const GRAY: Color = Color([0.5, 0.5, 0.5, 1.0]);
    pub const LIGHT_BLUE: Color = Color([0.68, 0.85, 0.9, 1.0]);
    pub const GREEN: Color = Color([0.0, 0.5, 0.0, 1.0]);
    pub const RED: Color = Color([1.0, 0.0, 0.0, 1.0]);
    pub const BLUE: Color = Color([0.0, 0.0, 1.0, 1.0]);
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);

    /// Look up a colour by its common name
    pub fn named(name: &str) -> Option<Color> {
        match name.to_lowercase().as_str() {
            "gray" | "grey" => Some(Color::GRAY),
            "lightblue" => Some(Color::LIGHT_BLUE),
            "green" => Some(Color::GREEN),
            "red" => Some(Color::RED),
            "blue" => Some(Color::BLUE),
            "white" => Some(Color::WHITE),
            _ => None,
        }
    }

    /// `#RRGGBBAA` form used by 3MF base materials
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
    }
}

/// A part mesh with its placement in the assembly
#[derive(Debug, Clone)]
pub struct AssemblyPart {
    pub name: String,
    pub kind: PartKind,
    pub color: Color,
    pub offset: Vector3<f64>,
    pub mesh: Mesh,
}

impl AssemblyPart {
    /// Mesh moved to its assembly position
    pub fn placed_mesh(&self) -> Mesh {
        self.mesh.translated(self.offset)
    }
}

/// All parts of one enclosure in exploded view
#[derive(Debug, Clone)]
pub struct Assembly {
    pub variant: Variant,
    pub parts: Vec<AssemblyPart>,
}

impl Assembly {
    /// Build and place the parts of the assembly. The lid floats
    /// `explode_gap` above the base rim.
    pub fn build(params: &Parameters, explode_gap: f64) -> Result<Self> {
        Self::from_parts(params, explode_gap, &[])
    }

    /// Place already built meshes, building only the parts of the layout
    /// that `built` lacks
    pub fn from_parts(
        params: &Parameters,
        explode_gap: f64,
        built: &[(PartKind, Mesh)],
    ) -> Result<Self> {
        let layout = layout(params, explode_gap);

        let missing: Vec<PartKind> = layout
            .iter()
            .map(|(kind, _, _)| *kind)
            .filter(|kind| !built.iter().any(|(done, _)| done == kind))
            .collect();
        let fresh = if missing.is_empty() {
            Vec::new()
        } else {
            build_parts(params, &missing)?
        };

        let parts = layout
            .into_iter()
            .map(|(kind, color, offset)| {
                let mesh = built
                    .iter()
                    .chain(&fresh)
                    .find(|(done, _)| *done == kind)
                    .map(|(_, mesh)| mesh.clone())
                    .with_context(|| format!("no mesh for {kind}"))?;
                Ok(AssemblyPart {
                    name: kind.name().to_string(),
                    kind,
                    color,
                    offset,
                    mesh,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            variant = %params.variant,
            parts = parts.len(),
            reused = parts.len() - missing.len(),
            explode_gap,
            "assembled"
        );
        Ok(Self {
            variant: params.variant,
            parts,
        })
    }

    /// Recolour a part; returns false when the assembly does not contain it
    pub fn set_color(&mut self, kind: PartKind, color: Color) -> bool {
        match self.parts.iter_mut().find(|part| part.kind == kind) {
            Some(part) => {
                part.color = color;
                true
            }
            None => false,
        }
    }

    /// Look up a part by name
    pub fn part(&self, name: &str) -> Option<&AssemblyPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// Merge every placed part into one mesh
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new();
        for part in &self.parts {
            mesh.merge(&part.placed_mesh());
        }
        mesh
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.parts
            .iter()
            .map(|part| part.placed_mesh().bounding_box())
            .filter(|bbox| !bbox.is_empty())
            .fold(BoundingBox::empty(), |acc, bbox| acc.union(&bbox))
    }
}

/// Parts of the assembly with their colour and offset
fn layout(params: &Parameters, explode_gap: f64) -> Vec<(PartKind, Color, Vector3<f64>)> {
    let d = params.dimensions();
    let lid_z = d.outer_thickness + explode_gap;

    match params.variant {
        Variant::Standard => vec![
            (PartKind::Base, Color::GRAY, Vector3::zeros()),
            (PartKind::Lid, Color::LIGHT_BLUE, Vector3::new(0.0, 0.0, lid_z)),
            (PartKind::McuBoard, Color::GREEN, mcu_placement(params)),
            (
                PartKind::RadarBoard,
                Color::RED,
                Vector3::new(
                    0.0,
                    0.0,
                    lid_z - params.enclosure.wall_thickness - params.radar.thickness,
                ),
            ),
        ],
        Variant::Compact => vec![
            (PartKind::Base, Color::BLUE, Vector3::zeros()),
            (PartKind::Lid, Color::RED, Vector3::new(0.0, 0.0, lid_z)),
            (PartKind::McuBoard, Color::GREEN, mcu_placement(params)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::named("LightBlue"), Some(Color::LIGHT_BLUE));
        assert_eq!(Color::named("grey"), Some(Color::GRAY));
        assert_eq!(Color::named("mauve"), None);
    }

    #[test]
    fn test_from_parts_reuses_meshes() {
        let params = Parameters::compact();
        let marker = crate::geometry::Primitive::cuboid(Vector3::new(1.0, 1.0, 1.0), false)
            .to_mesh()
            .unwrap();
        let assembly =
            Assembly::from_parts(&params, 5.0, &[(PartKind::Lid, marker.clone())]).unwrap();

        let lid = assembly.part("lid").unwrap();
        assert_eq!(lid.mesh.triangle_count(), marker.triangle_count());
        assert!(assembly.part("base").unwrap().mesh.triangle_count() > 12);
    }

    #[test]
    fn test_set_color() {
        let mut assembly = Assembly::build(&Parameters::compact(), 5.0).unwrap();
        assert!(assembly.set_color(PartKind::Lid, Color::WHITE));
        assert_eq!(assembly.part("lid").unwrap().color, Color::WHITE);
        assert!(!assembly.set_color(PartKind::RadarBoard, Color::WHITE));
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::RED.to_hex(), "#FF0000FF");
        assert_eq!(Color::GRAY.to_hex(), "#808080FF");
    }
}
