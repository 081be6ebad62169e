//! Combined natal/transit chart renderer.
//!
//! [`render`] is a pure function of two resolved charts and a theme: it finds
//! every natal-to-transit aspect, lays both planet sets out on one zodiac
//! wheel, and returns the SVG text. No I/O happens here; callers decide where
//! the document goes.

mod geometry;
mod svg;
mod theme;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geometry::{angular_separation, point_on_circle, Point, WheelLayout};
pub use theme::{StyleTheme, ThemeName};

use crate::models::{AspectMatch, ChartSubject, PlanetPosition, ZodiacSign, ASPECTS};
use geometry::is_valid_longitude;
use svg::{Stroke, SvgDocument, TextStyle};

/// Floating point slack on orb boundaries so `exact ± orb` always matches.
const ORB_EPSILON: f64 = 1e-9;
const MARKER_RADIUS: f64 = 12.0;
const LABEL_OFFSET: f64 = 20.0;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid chart '{0}': no planet positions")]
    InvalidChart(String),

    #[error("{planet} in chart '{chart}' has longitude {longitude}, expected [0, 360)")]
    LongitudeOutOfRange {
        chart: String,
        planet: String,
        longitude: f64,
    },

    #[error("Degenerate geometry: canvas size {0} gives no usable radius")]
    DegenerateGeometry(f64),

    #[error("Failed to write SVG: {0}")]
    Format(#[from] std::fmt::Error),
}

/// A rendered chart encoded for embedding.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EncodedChart {
    pub svg_base64: String,
    pub data_uri: String,
}

impl EncodedChart {
    pub fn from_svg(svg: &str) -> Self {
        let svg_base64 = STANDARD.encode(svg.as_bytes());
        let data_uri = format!("data:image/svg+xml;base64,{}", svg_base64);
        Self {
            svg_base64,
            data_uri,
        }
    }
}

/// Find every natal/transit pair that forms an aspect.
///
/// Pairs are visited natal-major. Each pair is tested against [`ASPECTS`] in
/// table order and takes the first definition whose orb contains the
/// separation, so a pair yields at most one match.
pub fn find_aspects(natal: &ChartSubject, transit: &ChartSubject) -> Vec<AspectMatch> {
    aspect_pairs(natal, transit).map(|(_, _, m)| m).collect()
}

fn aspect_pairs<'a>(
    natal: &'a ChartSubject,
    transit: &'a ChartSubject,
) -> impl Iterator<Item = (&'a PlanetPosition, &'a PlanetPosition, AspectMatch)> + 'a {
    natal.planets.iter().flat_map(move |n| {
        transit
            .planets
            .iter()
            .filter_map(move |t| classify(n, t).map(|m| (n, t, m)))
    })
}

fn classify(natal: &PlanetPosition, transit: &PlanetPosition) -> Option<AspectMatch> {
    let separation = angular_separation(natal.longitude, transit.longitude);
    ASPECTS.iter().find_map(|a| {
        let orb = (separation - a.exact_angle).abs();
        (orb <= a.max_orb + ORB_EPSILON).then(|| AspectMatch {
            natal_planet: natal.planet,
            transit_planet: transit.planet,
            aspect: a.kind,
            separation,
            orb,
        })
    })
}

/// Render the combined chart as an SVG document.
pub fn render(
    natal: &ChartSubject,
    transit: &ChartSubject,
    theme: &StyleTheme,
) -> Result<String, RenderError> {
    validate_chart(natal)?;
    validate_chart(transit)?;
    let layout = WheelLayout::for_canvas(theme.canvas_size)
        .ok_or(RenderError::DegenerateGeometry(theme.canvas_size))?;

    let aspects: Vec<_> = aspect_pairs(natal, transit).collect();
    tracing::debug!(
        natal = %natal.name,
        transit = %transit.name,
        aspects = aspects.len(),
        "Rendering combined chart"
    );

    let mut doc = SvgDocument::new(layout.size, &theme.font_family)?;
    doc.rect(
        Point { x: 0.0, y: 0.0 },
        layout.size,
        layout.size,
        &theme.background,
    )?;
    draw_title(&mut doc, &layout, theme, natal, transit)?;
    draw_zodiac_wheel(&mut doc, &layout, theme)?;

    doc.open_group("aspects")?;
    for (n, t, m) in &aspects {
        let def = m.definition();
        doc.line(
            point_on_circle(layout.center, layout.natal_radius, n.longitude),
            point_on_circle(layout.center, layout.transit_radius, t.longitude),
            Stroke {
                color: def.color,
                width: def.stroke_width,
                dasharray: def.pattern.dasharray(),
            },
        )?;
    }
    doc.close_group()?;

    doc.open_group("natal-planets")?;
    for p in &natal.planets {
        draw_marker(
            &mut doc,
            &layout,
            p,
            layout.natal_radius,
            &theme.natal_fill,
            &theme.natal_stroke,
        )?;
    }
    doc.close_group()?;

    doc.open_group("transit-planets")?;
    for p in &transit.planets {
        draw_marker(
            &mut doc,
            &layout,
            p,
            layout.transit_radius,
            &theme.transit_fill,
            &theme.transit_stroke,
        )?;
    }
    doc.close_group()?;

    draw_legend(&mut doc, &layout, theme)?;

    Ok(doc.finish())
}

/// Render and encode as base64 plus a `data:image/svg+xml` URI.
pub fn render_base64(
    natal: &ChartSubject,
    transit: &ChartSubject,
    theme: &StyleTheme,
) -> Result<EncodedChart, RenderError> {
    render(natal, transit, theme).map(|svg| EncodedChart::from_svg(&svg))
}

fn validate_chart(chart: &ChartSubject) -> Result<(), RenderError> {
    if chart.planets.is_empty() {
        return Err(RenderError::InvalidChart(chart.name.clone()));
    }
    for p in &chart.planets {
        if !is_valid_longitude(p.longitude) {
            return Err(RenderError::LongitudeOutOfRange {
                chart: chart.name.clone(),
                planet: p.planet.as_str().to_string(),
                longitude: p.longitude,
            });
        }
    }
    Ok(())
}

fn draw_title(
    doc: &mut SvgDocument,
    layout: &WheelLayout,
    theme: &StyleTheme,
    natal: &ChartSubject,
    transit: &ChartSubject,
) -> Result<(), RenderError> {
    let title = format!(
        "{} - Natal Chart with Transits of {}",
        natal.name, transit.name
    );
    doc.text(
        Point {
            x: layout.center.x,
            y: 30.0,
        },
        &title,
        TextStyle {
            size: 20.0,
            fill: &theme.text_color,
            anchor: "middle",
            bold: true,
            centered: false,
        },
    )?;
    Ok(())
}

fn draw_zodiac_wheel(
    doc: &mut SvgDocument,
    layout: &WheelLayout,
    theme: &StyleTheme,
) -> Result<(), RenderError> {
    doc.open_group("zodiac")?;
    doc.circle(
        layout.center,
        layout.zodiac_radius,
        "none",
        Stroke::solid(&theme.wheel_stroke, 2.0),
    )?;

    for (i, sign) in ZodiacSign::ALL.iter().enumerate() {
        let cusp = i as f64 * 30.0;
        doc.line(
            point_on_circle(layout.center, layout.zodiac_radius, cusp),
            layout.center,
            Stroke {
                color: &theme.wheel_stroke,
                width: 1.0,
                dasharray: Some("5,5"),
            },
        )?;
        doc.text(
            point_on_circle(layout.center, layout.zodiac_radius * 1.1, cusp + 15.0),
            sign.symbol(),
            TextStyle {
                size: 24.0,
                fill: &theme.text_color,
                anchor: "middle",
                bold: false,
                centered: true,
            },
        )?;
    }
    doc.close_group()?;
    Ok(())
}

fn draw_marker(
    doc: &mut SvgDocument,
    layout: &WheelLayout,
    position: &PlanetPosition,
    radius: f64,
    fill: &str,
    stroke: &str,
) -> Result<(), RenderError> {
    let at = point_on_circle(layout.center, radius, position.longitude);
    doc.circle(at, MARKER_RADIUS, fill, Stroke::solid(stroke, 1.0))?;
    doc.text(
        at,
        position.planet.symbol(),
        TextStyle {
            size: 16.0,
            fill: stroke,
            anchor: "middle",
            bold: false,
            centered: true,
        },
    )?;
    doc.text(
        point_on_circle(at, LABEL_OFFSET, position.longitude),
        position.planet.as_str(),
        TextStyle {
            size: 10.0,
            fill: stroke,
            anchor: "middle",
            bold: false,
            centered: true,
        },
    )?;
    Ok(())
}

fn draw_legend(
    doc: &mut SvgDocument,
    layout: &WheelLayout,
    theme: &StyleTheme,
) -> Result<(), RenderError> {
    let top = layout.size - 120.0;
    let heading = |size| TextStyle {
        size,
        fill: &theme.text_color,
        anchor: "start",
        bold: false,
        centered: false,
    };

    doc.open_group("legend")?;
    doc.text(
        Point { x: 50.0, y: top },
        "Legend:",
        TextStyle {
            bold: true,
            ..heading(16.0)
        },
    )?;

    doc.text(Point { x: 50.0, y: top + 25.0 }, "Natal Planets:", heading(14.0))?;
    doc.circle(
        Point { x: 70.0, y: top + 45.0 },
        8.0,
        &theme.natal_fill,
        Stroke::solid(&theme.natal_stroke, 1.0),
    )?;
    doc.text(Point { x: 50.0, y: top + 65.0 }, "Transit Planets:", heading(14.0))?;
    doc.circle(
        Point { x: 70.0, y: top + 85.0 },
        8.0,
        &theme.transit_fill,
        Stroke::solid(&theme.transit_stroke, 1.0),
    )?;

    let x = 250.0;
    doc.text(Point { x, y: top + 25.0 }, "Aspects:", heading(14.0))?;
    let mut y = top + 45.0;
    for def in ASPECTS.iter().filter(|a| a.is_major()) {
        doc.line(
            Point { x, y },
            Point { x: x + 40.0, y },
            Stroke {
                color: def.color,
                width: 2.0,
                dasharray: def.pattern.dasharray(),
            },
        )?;
        doc.text(
            Point {
                x: x + 50.0,
                y: y + 5.0,
            },
            def.kind.as_str(),
            heading(12.0),
        )?;
        y += 20.0;
    }
    doc.close_group()?;
    Ok(())
}
