use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Planet;

/// Named angular relationship between two longitudes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AspectKind {
    Conjunction,
    Opposition,
    Trine,
    Square,
    Sextile,
    Quincunx,
    SemiSextile,
    SemiSquare,
    Sesquiquadrate,
    Quintile,
    BiQuintile,
}

impl AspectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conjunction => "Conjunction",
            Self::Opposition => "Opposition",
            Self::Trine => "Trine",
            Self::Square => "Square",
            Self::Sextile => "Sextile",
            Self::Quincunx => "Quincunx",
            Self::SemiSextile => "Semi-sextile",
            Self::SemiSquare => "Semi-square",
            Self::Sesquiquadrate => "Sesquiquadrate",
            Self::Quintile => "Quintile",
            Self::BiQuintile => "Bi-quintile",
        }
    }

    /// Static definition of this aspect.
    pub fn definition(&self) -> &'static AspectDefinition {
        let index = match self {
            Self::Conjunction => 0,
            Self::Opposition => 1,
            Self::Trine => 2,
            Self::Square => 3,
            Self::Sextile => 4,
            Self::Quincunx => 5,
            Self::SemiSextile => 6,
            Self::SemiSquare => 7,
            Self::Sesquiquadrate => 8,
            Self::Quintile => 9,
            Self::BiQuintile => 10,
        };
        &ASPECTS[index]
    }
}

/// Stroke pattern for an aspect line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePattern {
    Solid,
    Dashed,
    Dotted,
}

impl LinePattern {
    /// Value for `stroke-dasharray`, if any.
    pub fn dasharray(&self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,3"),
            Self::Dotted => Some("2,2"),
        }
    }
}

/// An aspect type with its exact angle, allowed orb and line style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectDefinition {
    pub kind: AspectKind,
    pub exact_angle: f64,
    pub max_orb: f64,
    pub color: &'static str,
    pub pattern: LinePattern,
    pub stroke_width: f64,
}

impl AspectDefinition {
    /// Major aspects get a legend entry.
    pub fn is_major(&self) -> bool {
        matches!(
            self.kind,
            AspectKind::Conjunction
                | AspectKind::Opposition
                | AspectKind::Trine
                | AspectKind::Square
                | AspectKind::Sextile
                | AspectKind::Quincunx
        )
    }
}

const fn aspect(
    kind: AspectKind,
    exact_angle: f64,
    max_orb: f64,
    color: &'static str,
    pattern: LinePattern,
    stroke_width: f64,
) -> AspectDefinition {
    AspectDefinition {
        kind,
        exact_angle,
        max_orb,
        color,
        pattern,
        stroke_width,
    }
}

/// The aspect table in match-priority order.
///
/// A natal/transit pair is tested against these entries in order and takes the
/// first one whose orb contains its separation.
pub const ASPECTS: [AspectDefinition; 11] = [
    aspect(AspectKind::Conjunction, 0.0, 8.0, "#FF0000", LinePattern::Solid, 2.0),
    aspect(AspectKind::Opposition, 180.0, 8.0, "#0000FF", LinePattern::Solid, 2.0),
    aspect(AspectKind::Trine, 120.0, 8.0, "#00FF00", LinePattern::Dashed, 1.0),
    aspect(AspectKind::Square, 90.0, 7.0, "#FF00FF", LinePattern::Dotted, 1.0),
    aspect(AspectKind::Sextile, 60.0, 6.0, "#FFFF00", LinePattern::Dashed, 1.0),
    aspect(AspectKind::Quincunx, 150.0, 5.0, "#00FFFF", LinePattern::Dotted, 1.0),
    aspect(AspectKind::SemiSextile, 30.0, 3.0, "#FFA500", LinePattern::Solid, 1.0),
    aspect(AspectKind::SemiSquare, 45.0, 3.0, "#800080", LinePattern::Solid, 1.0),
    aspect(AspectKind::Sesquiquadrate, 135.0, 3.0, "#008080", LinePattern::Solid, 1.0),
    aspect(AspectKind::Quintile, 72.0, 2.0, "#800000", LinePattern::Solid, 1.0),
    aspect(AspectKind::BiQuintile, 144.0, 2.0, "#808000", LinePattern::Solid, 1.0),
];

/// A natal planet and a transit planet forming an aspect.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AspectMatch {
    pub natal_planet: Planet,
    pub transit_planet: Planet,
    pub aspect: AspectKind,
    /// Angular separation in degrees, [0, 180]
    pub separation: f64,
    /// Distance from the exact aspect angle in degrees
    pub orb: f64,
}

impl AspectMatch {
    pub fn definition(&self) -> &'static AspectDefinition {
        self.aspect.definition()
    }
}
