//! Request and response types for MCP tools and the HTTP API.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{AspectMatch, BirthData, ChartSubject};
use crate::render::ThemeName;

// ============================================================
// Request Types
// ============================================================

/// Body of the combined chart endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CombinedChartRequest {
    #[schemars(description = "Birth data for the natal chart")]
    pub natal_chart: BirthData,
    #[schemars(description = "Moment and place for the transits")]
    pub transit_chart: BirthData,
    #[schemars(description = "Visual theme: 'classic' (default) or 'dark'")]
    #[serde(default)]
    pub theme: ThemeName,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateCombinedChartRequest {
    #[schemars(
        description = "Birth data for the natal chart: year, month, day, hour, minute, latitude, longitude, tz_str, optional name and house_system"
    )]
    pub natal_chart: BirthData,
    #[schemars(description = "Moment and place to compute transits for, same fields as natal_chart")]
    pub transit_chart: BirthData,
    #[schemars(description = "Visual theme: 'classic' (default) or 'dark'")]
    #[serde(default)]
    pub theme: ThemeName,
    #[schemars(
        description = "Return the chart as base64 plus a data URI instead of raw SVG. Defaults to false."
    )]
    #[serde(default)]
    pub return_base64: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenderFromPositionsRequest {
    #[schemars(description = "Resolved natal chart with planet longitudes in [0, 360)")]
    pub natal: ChartSubject,
    #[schemars(description = "Resolved transit chart with planet longitudes in [0, 360)")]
    pub transit: ChartSubject,
    #[schemars(description = "Visual theme: 'classic' (default) or 'dark'")]
    #[serde(default)]
    pub theme: ThemeName,
    #[schemars(description = "Return base64 plus a data URI instead of raw SVG")]
    #[serde(default)]
    pub return_base64: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindTransitAspectsRequest {
    #[schemars(description = "Birth data for the natal chart")]
    pub natal_chart: BirthData,
    #[schemars(description = "Moment and place to compute transits for")]
    pub transit_chart: BirthData,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransitsToNatalRequest {
    #[schemars(description = "Birth data for the natal chart")]
    pub natal_data: BirthData,
    #[schemars(description = "Moment and place of the transits, same fields as natal_data")]
    pub transit_data: BirthData,
}

/// Which wheel the calculation API should draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SvgChartType {
    #[default]
    Natal,
    Transit,
    Combined,
}

impl SvgChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Natal => "natal",
            Self::Transit => "transit",
            Self::Combined => "combined",
        }
    }

    pub fn needs_transit(&self) -> bool {
        !matches!(self, Self::Natal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SvgChartRequest {
    #[schemars(description = "Birth data for the natal chart")]
    pub natal_chart: BirthData,
    #[schemars(description = "Moment and place of the transits; required for 'transit' and 'combined'")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_chart: Option<BirthData>,
    #[schemars(description = "Chart to draw: 'natal' (default), 'transit' or 'combined'")]
    #[serde(default)]
    pub chart_type: SvgChartType,
    #[schemars(description = "Theme name understood by the calculation API, e.g. 'Kerykeion' or 'dark'")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[schemars(description = "Return {svg_base64, data_uri} JSON instead of raw SVG")]
    #[serde(default, skip_serializing)]
    pub return_base64: bool,
}

// ============================================================
// Response Types
// ============================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AspectInfo {
    pub natal_planet: String,
    pub transit_planet: String,
    pub aspect: String,
    /// Separation in degrees, rounded to 2 decimals
    pub separation: f64,
    /// Distance from the exact aspect, rounded to 2 decimals
    pub orb: f64,
}

impl From<&AspectMatch> for AspectInfo {
    fn from(m: &AspectMatch) -> Self {
        Self {
            natal_planet: m.natal_planet.as_str().to_string(),
            transit_planet: m.transit_planet.as_str().to_string(),
            aspect: m.aspect.as_str().to_string(),
            separation: round2(m.separation),
            orb: round2(m.orb),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AspectReport {
    pub natal: String,
    pub transit: String,
    pub aspects: Vec<AspectInfo>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
