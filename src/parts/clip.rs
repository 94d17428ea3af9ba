// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Corner clip that hooks over the case edge for wall mounting

use crate::geometry::{Align, Mesh, Profile};
use crate::params::Parameters;
use anyhow::{Context, Result};
use nalgebra::Point2;
use tracing::debug;

use super::OVERCUT;

/// Right-angle triangle standing on its hypotenuse, rounded vertical edges
/// and a notch along the base that the case slides into
pub fn corner_clip(params: &Parameters) -> Result<Mesh> {
    let d = params.dimensions();
    let clip = &params.clip;
    let base = d.outer_width + clip.margin;

    let triangle = Profile::polygon(vec![
        Point2::new(-base / 2.0, 0.0),
        Point2::new(base / 2.0, 0.0),
        Point2::new(0.0, base / 2.0),
    ])?
    .fillet(params.enclosure.corner_radius, params.resolution.arc_segments)
    .context("clip corners")?;
    let body = triangle.extrude(clip.depth)?;

    let notch = Profile::rectangle(d.outer_width - clip.fit, clip.notch_depth + OVERCUT)?
        .aligned(Align::Center, Align::Min)
        .translate(0.0, -OVERCUT)
        .extrude_between(-OVERCUT, clip.depth + OVERCUT)?;

    let part = body.difference(&notch).context("clip notch")?;
    debug!(triangles = part.triangle_count(), base, "built corner clip");
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analyze;
    use approx::assert_relative_eq;

    #[test]
    fn test_clip_extent() {
        let params = Parameters::standard();
        let stats = analyze(&corner_clip(&params).unwrap());

        // Fillets pull every extreme in from the sharp triangle
        assert!(stats.size()[0] < 40.0);
        assert!(stats.size()[1] < 20.0);
        assert_relative_eq!(stats.bbox[2], 0.0, epsilon = 1e-9);
        assert_relative_eq!(stats.bbox[5], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_notch_removes_material() {
        let params = Parameters::standard();
        let d = params.dimensions();
        let clip = corner_clip(&params).unwrap();
        let stats = analyze(&clip);

        let base = d.outer_width + params.clip.margin;
        let sharp_volume = base * base / 4.0 * params.clip.depth;
        let notch_volume = (d.outer_width - params.clip.fit) * params.clip.notch_depth * params.clip.depth;
        assert!(stats.volume < sharp_volume - notch_volume + 1e-6);
        assert!(stats.volume > 0.0);
    }
}
