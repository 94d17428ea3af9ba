// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Enclosure parameters, presets and derived dimensions
//!
//! All lengths are millimetres. [`Dimensions`] are recomputed from
//! [`Parameters`] on every call and never stored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Design revision of the enclosure
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Small radar board, board-proxy cut, single sensor window in the lid
    Compact,
    /// Large radar board held in a fitted lid ring, USB-C slot and board holder
    #[default]
    Standard,
}

impl Variant {
    pub fn parameters(self) -> Parameters {
        match self {
            Variant::Compact => Parameters::compact(),
            Variant::Standard => Parameters::standard(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Compact => "compact",
            Variant::Standard => "standard",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "v1" => Ok(Variant::Compact),
            "standard" | "v2" => Ok(Variant::Standard),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

/// Microcontroller board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McuSpec {
    pub width: f64,
    pub length: f64,
    pub pcb_thickness: f64,
}

/// USB-C receptacle mounted on the microcontroller board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsbCSpec {
    pub width: f64,
    pub length: f64,
    pub thickness: f64,
    /// How far the receptacle protrudes past the PCB edge
    pub overhang: f64,
    pub corner_radius: f64,
}

/// Radar / mmWave presence sensor board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSpec {
    pub width: f64,
    pub length: f64,
    pub thickness: f64,
    pub corner_radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mounting_hole_diameter: Option<f64>,
    /// Distance from the board edges to the mounting hole centres
    pub mounting_hole_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnclosureSpec {
    pub wall_thickness: f64,
    pub corner_radius: f64,
    pub side_clearance: f64,
    pub bottom_clearance: f64,
    pub top_clearance: f64,
    pub print_tolerance: f64,
    /// Rail length beyond the side clearance
    pub rail_extra_length: f64,
    /// Length of the pocket in the rail that takes the PCB edge
    pub holder_length: f64,
}

/// Finger grip cut into the -Y side of the lid lip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GripSpec {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub corner_radius: f64,
    /// How far below the middle of the lip face under the plate the grip
    /// is centred
    pub drop: f64,
}

/// Optional pair of cuts through the lid above the radar antennas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorCutSpec {
    pub enabled: bool,
    pub width: f64,
    pub length: f64,
    pub edge_gap: f64,
}

/// Single sensor window of the compact lid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub width: f64,
    pub length: f64,
    /// Distance from the +Y inner lip edge to the window
    pub inset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LidSpec {
    /// Extra size of the lip ring over the case cavity
    pub fit: f64,
    pub lip_corner_radius: f64,
    pub grip: GripSpec,
    pub sensor_cuts: SensorCutSpec,
    pub window: WindowSpec,
}

/// Corner mounting clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Added to the case width to get the clip base width
    pub margin: f64,
    pub depth: f64,
    pub notch_depth: f64,
    /// Interference between the notch and the case
    pub fit: f64,
}

/// Tessellation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Segments per filleted corner
    pub arc_segments: u32,
    /// Segments per full circle
    pub circle_segments: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            arc_segments: 8,
            circle_segments: 32,
        }
    }
}

/// Complete set of enclosure parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub variant: Variant,
    pub mcu: McuSpec,
    pub usb_c: UsbCSpec,
    pub radar: RadarSpec,
    pub enclosure: EnclosureSpec,
    pub lid: LidSpec,
    pub clip: ClipSpec,
    #[serde(default)]
    pub resolution: Resolution,
}

impl Default for Parameters {
    fn default() -> Self {
        Self::standard()
    }
}

impl Parameters {
    /// Current revision: 26 x 30 mm radar board held by the lid
    pub fn standard() -> Self {
        Self {
            variant: Variant::Standard,
            mcu: McuSpec {
                width: 18.0,
                length: 26.27,
                pcb_thickness: 1.0,
            },
            usb_c: UsbCSpec {
                width: 8.77,
                length: 7.23,
                thickness: 3.02,
                overhang: 1.73,
                corner_radius: 0.5,
            },
            radar: RadarSpec {
                width: 26.0,
                length: 30.0,
                thickness: 3.2,
                corner_radius: 0.5,
                mounting_hole_diameter: Some(1.73),
                mounting_hole_offset: 1.10,
            },
            enclosure: EnclosureSpec {
                wall_thickness: 1.0,
                corner_radius: 1.0,
                side_clearance: 5.0,
                bottom_clearance: 2.0,
                top_clearance: 10.0,
                print_tolerance: 0.35,
                rail_extra_length: 2.0,
                holder_length: 1.9,
            },
            lid: LidSpec {
                fit: 0.1,
                lip_corner_radius: 0.5,
                grip: GripSpec {
                    width: 4.0,
                    height: 2.5,
                    depth: 1.5,
                    corner_radius: 0.8,
                    drop: 0.8,
                },
                sensor_cuts: SensorCutSpec {
                    enabled: false,
                    width: 4.30,
                    length: 21.23,
                    edge_gap: 2.0,
                },
                window: WindowSpec {
                    width: 16.84,
                    length: 7.65,
                    inset: 3.92,
                },
            },
            clip: ClipSpec {
                margin: 10.0,
                depth: 10.0,
                notch_depth: 3.0,
                fit: 0.2,
            },
            resolution: Resolution::default(),
        }
    }

    /// First revision: 22 x 15.8 mm radar board under a windowed lid
    pub fn compact() -> Self {
        let mut params = Self::standard();
        params.variant = Variant::Compact;
        params.usb_c.corner_radius = 1.0;
        params.radar = RadarSpec {
            width: 22.0,
            length: 15.80,
            thickness: 3.0,
            corner_radius: 0.0,
            mounting_hole_diameter: None,
            mounting_hole_offset: 1.10,
        };
        params.enclosure.side_clearance = 3.5;
        params
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::from_parameters(self)
    }

    /// Check that every derived feature has room in the design
    pub fn validate(&self) -> Result<(), ParameterError> {
        let e = &self.enclosure;

        let positive = [
            ("mcu.width", self.mcu.width),
            ("mcu.length", self.mcu.length),
            ("mcu.pcb_thickness", self.mcu.pcb_thickness),
            ("usb_c.width", self.usb_c.width),
            ("usb_c.length", self.usb_c.length),
            ("usb_c.thickness", self.usb_c.thickness),
            ("radar.width", self.radar.width),
            ("radar.length", self.radar.length),
            ("radar.thickness", self.radar.thickness),
            ("enclosure.wall_thickness", e.wall_thickness),
            ("enclosure.holder_length", e.holder_length),
            ("lid.grip.width", self.lid.grip.width),
            ("lid.grip.height", self.lid.grip.height),
            ("lid.grip.depth", self.lid.grip.depth),
            ("clip.depth", self.clip.depth),
            ("clip.notch_depth", self.clip.notch_depth),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ParameterError::NonPositive { name, value });
            }
        }

        let non_negative = [
            ("usb_c.overhang", self.usb_c.overhang),
            ("usb_c.corner_radius", self.usb_c.corner_radius),
            ("radar.corner_radius", self.radar.corner_radius),
            ("enclosure.corner_radius", e.corner_radius),
            ("enclosure.side_clearance", e.side_clearance),
            ("enclosure.bottom_clearance", e.bottom_clearance),
            ("enclosure.top_clearance", e.top_clearance),
            ("enclosure.print_tolerance", e.print_tolerance),
            ("enclosure.rail_extra_length", e.rail_extra_length),
            ("lid.fit", self.lid.fit),
            ("lid.lip_corner_radius", self.lid.lip_corner_radius),
            ("lid.grip.corner_radius", self.lid.grip.corner_radius),
            ("clip.margin", self.clip.margin),
            ("clip.fit", self.clip.fit),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ParameterError::Negative { name, value });
            }
        }

        let d = self.dimensions();

        check_fillet(
            "enclosure.corner_radius",
            e.corner_radius,
            d.outer_width.min(d.outer_length) / 2.0,
        )?;
        check_fillet(
            "usb_c.corner_radius",
            self.usb_c.corner_radius,
            self.usb_c.width.min(self.usb_c.thickness) / 2.0,
        )?;
        check_fillet(
            "radar.corner_radius",
            self.radar.corner_radius,
            self.radar.width.min(self.radar.length) / 2.0,
        )?;
        check_fillet(
            "lid.grip.corner_radius",
            self.lid.grip.corner_radius,
            self.lid.grip.width.min(self.lid.grip.height) / 2.0,
        )?;

        if self.usb_c.overhang > self.usb_c.length {
            return Err(ParameterError::DoesNotFit {
                feature: "USB-C overhang",
                size: self.usb_c.overhang,
                available: self.usb_c.length,
            });
        }
        if self.usb_c.width + e.print_tolerance >= d.inner_width {
            return Err(ParameterError::DoesNotFit {
                feature: "USB-C cutout",
                size: self.usb_c.width + e.print_tolerance,
                available: d.inner_width,
            });
        }
        if d.rail_length >= d.inner_length {
            return Err(ParameterError::DoesNotFit {
                feature: "board rail",
                size: d.rail_length,
                available: d.inner_length,
            });
        }
        if d.lip_depth >= d.cavity_depth {
            return Err(ParameterError::DoesNotFit {
                feature: "lid lip",
                size: d.lip_depth,
                available: d.cavity_depth,
            });
        }

        match self.variant {
            Variant::Standard => {
                let ring_width = d.inner_width + self.lid.fit;
                let ring_length = d.inner_length + self.lid.fit;
                check_fillet(
                    "enclosure.corner_radius (lid ring)",
                    e.corner_radius,
                    ring_width.min(ring_length) / 2.0,
                )?;
                if self.radar.width >= ring_width {
                    return Err(ParameterError::DoesNotFit {
                        feature: "radar board width",
                        size: self.radar.width,
                        available: ring_width,
                    });
                }
                if self.radar.length >= ring_length {
                    return Err(ParameterError::DoesNotFit {
                        feature: "radar board length",
                        size: self.radar.length,
                        available: ring_length,
                    });
                }
                let holder = e.holder_length + e.print_tolerance;
                if holder > d.rail_length {
                    return Err(ParameterError::DoesNotFit {
                        feature: "board holder",
                        size: holder,
                        available: d.rail_length,
                    });
                }
            }
            Variant::Compact => {
                let (inner_w, inner_l) = d.compact_lip_inner();
                if inner_w <= 0.0 || inner_l <= 0.0 {
                    return Err(ParameterError::DoesNotFit {
                        feature: "lid lip opening",
                        size: 2.0 * e.wall_thickness + 1.0,
                        available: d.inner_width.min(d.inner_length),
                    });
                }
                check_fillet(
                    "lid.lip_corner_radius",
                    self.lid.lip_corner_radius,
                    d.inner_width.min(d.inner_length) / 2.0,
                )?;
                let window = &self.lid.window;
                if window.width >= inner_w || window.length + window.inset >= inner_l {
                    return Err(ParameterError::DoesNotFit {
                        feature: "lid sensor window",
                        size: window.width,
                        available: inner_w,
                    });
                }
            }
        }

        if let Some(diameter) = self.radar.mounting_hole_diameter {
            if !(diameter > 0.0) {
                return Err(ParameterError::NonPositive {
                    name: "radar.mounting_hole_diameter",
                    value: diameter,
                });
            }
            if self.radar.mounting_hole_offset <= diameter / 2.0 {
                return Err(ParameterError::DoesNotFit {
                    feature: "radar mounting hole",
                    size: diameter / 2.0,
                    available: self.radar.mounting_hole_offset,
                });
            }
        }

        // The notch has to leave material on both sides of the clip
        let clip_base = d.outer_width + self.clip.margin;
        let notch_room = clip_base - 2.0 * self.clip.notch_depth;
        if d.outer_width - self.clip.fit >= notch_room {
            return Err(ParameterError::DoesNotFit {
                feature: "clip notch",
                size: d.outer_width - self.clip.fit,
                available: notch_room,
            });
        }

        if self.lid.sensor_cuts.enabled {
            let cuts = &self.lid.sensor_cuts;
            if cuts.width + cuts.edge_gap > self.radar.width / 2.0
                || cuts.length + cuts.edge_gap > self.radar.length
            {
                return Err(ParameterError::DoesNotFit {
                    feature: "lid sensor cuts",
                    size: cuts.width + cuts.edge_gap,
                    available: self.radar.width / 2.0,
                });
            }
        }

        Ok(())
    }
}

fn check_fillet(feature: &'static str, radius: f64, limit: f64) -> Result<(), ParameterError> {
    if radius > limit {
        Err(ParameterError::FilletTooLarge {
            feature,
            radius,
            limit,
        })
    } else {
        Ok(())
    }
}

/// Parameter combinations that cannot produce a valid enclosure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{feature}: fillet radius {radius} exceeds limit {limit:.3}")]
    FilletTooLarge {
        feature: &'static str,
        radius: f64,
        limit: f64,
    },

    #[error("{feature} does not fit: needs {size:.3} mm, {available:.3} mm available")]
    DoesNotFit {
        feature: &'static str,
        size: f64,
        available: f64,
    },
}

/// Dimensions derived from [`Parameters`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub outer_width: f64,
    pub outer_length: f64,
    pub outer_thickness: f64,
    pub inner_width: f64,
    pub inner_length: f64,
    /// Depth of the cavity from the case rim to the floor
    pub cavity_depth: f64,
    /// How far the lid lip reaches below the plate top
    pub lip_depth: f64,
    pub rail_length: f64,
    pub wall_thickness: f64,
}

impl Dimensions {
    pub fn from_parameters(p: &Parameters) -> Self {
        let e = &p.enclosure;
        let wall = e.wall_thickness;

        let inner_width = p.mcu.width + e.side_clearance * 2.0;
        let inner_length = p.mcu.length + e.side_clearance + (p.usb_c.overhang - wall);
        let outer_thickness = wall + e.bottom_clearance + p.mcu.pcb_thickness + e.top_clearance;

        let lip_depth = match p.variant {
            Variant::Standard => p.radar.thickness + e.print_tolerance,
            Variant::Compact => p.radar.thickness,
        };

        Self {
            outer_width: inner_width + wall * 2.0,
            outer_length: p.mcu.length
                + e.side_clearance
                + wall * 2.0
                + (p.usb_c.overhang - wall),
            outer_thickness,
            inner_width,
            inner_length,
            cavity_depth: outer_thickness - wall,
            lip_depth,
            rail_length: e.side_clearance + e.rail_extra_length,
            wall_thickness: wall,
        }
    }

    /// Opening of the compact lid's lip border
    pub fn compact_lip_inner(&self) -> (f64, f64) {
        (
            self.inner_width - 2.0 * self.wall_thickness - 1.0,
            self.inner_length - 2.0 * self.wall_thickness,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_presets_validate() {
        Parameters::standard().validate().unwrap();
        Parameters::compact().validate().unwrap();
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("v1".parse::<Variant>().unwrap(), Variant::Compact);
        assert_eq!("Standard".parse::<Variant>().unwrap(), Variant::Standard);
        assert!("huge".parse::<Variant>().is_err());
    }

    #[test]
    fn test_compact_lip_inner() {
        let d = Parameters::compact().dimensions();
        let (w, l) = d.compact_lip_inner();
        assert_relative_eq!(w, 22.0, epsilon = 1e-9);
        assert_relative_eq!(l, 28.5, epsilon = 1e-9);
    }

    #[test]
    fn test_nan_is_rejected() {
        let mut params = Parameters::standard();
        params.mcu.width = f64::NAN;
        assert!(matches!(
            params.validate(),
            Err(ParameterError::NonPositive { name: "mcu.width", .. })
        ));
    }
}
