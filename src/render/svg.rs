//! Minimal SVG document writer.
//!
//! Coordinates are written with two decimals so output is stable across
//! platforms and byte-identical for identical input.

use std::fmt::{self, Write};

use super::geometry::Point;

/// Stroke attributes shared by circles and lines.
#[derive(Debug, Clone, Copy)]
pub struct Stroke<'a> {
    pub color: &'a str,
    pub width: f64,
    pub dasharray: Option<&'a str>,
}

impl<'a> Stroke<'a> {
    pub fn solid(color: &'a str, width: f64) -> Self {
        Self {
            color,
            width,
            dasharray: None,
        }
    }
}

/// Text attributes.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub size: f64,
    pub fill: &'a str,
    pub anchor: &'a str,
    pub bold: bool,
    pub centered: bool,
}

pub struct SvgDocument {
    buf: String,
    font_family: String,
}

impl SvgDocument {
    pub fn new(size: f64, font_family: &str) -> Result<Self, fmt::Error> {
        let mut buf = String::with_capacity(16 * 1024);
        writeln!(buf, r#"<?xml version="1.0" encoding="utf-8" ?>"#)?;
        writeln!(
            buf,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{s:.0}" height="{s:.0}" viewBox="0 0 {s:.0} {s:.0}">"#,
            s = size
        )?;
        Ok(Self {
            buf,
            font_family: font_family.to_string(),
        })
    }

    pub fn rect(&mut self, origin: Point, width: f64, height: f64, fill: &str) -> fmt::Result {
        writeln!(
            self.buf,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" />"#,
            origin.x,
            origin.y,
            width,
            height,
            escape(fill)
        )
    }

    pub fn circle(&mut self, center: Point, r: f64, fill: &str, stroke: Stroke) -> fmt::Result {
        write!(
            self.buf,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}""#,
            center.x,
            center.y,
            r,
            escape(fill)
        )?;
        self.stroke_attrs(stroke)?;
        writeln!(self.buf, " />")
    }

    pub fn line(&mut self, from: Point, to: Point, stroke: Stroke) -> fmt::Result {
        write!(
            self.buf,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}""#,
            from.x, from.y, to.x, to.y
        )?;
        self.stroke_attrs(stroke)?;
        writeln!(self.buf, " />")
    }

    pub fn text(&mut self, at: Point, content: &str, style: TextStyle) -> fmt::Result {
        write!(
            self.buf,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.0}" fill="{}" text-anchor="{}""#,
            at.x,
            at.y,
            escape(&self.font_family),
            style.size,
            escape(style.fill),
            style.anchor
        )?;
        if style.centered {
            self.buf.push_str(r#" dominant-baseline="middle""#);
        }
        if style.bold {
            self.buf.push_str(r#" font-weight="bold""#);
        }
        writeln!(self.buf, ">{}</text>", escape(content))
    }

    pub fn open_group(&mut self, class: &str) -> fmt::Result {
        writeln!(self.buf, r#"<g class="{}">"#, escape(class))
    }

    pub fn close_group(&mut self) -> fmt::Result {
        writeln!(self.buf, "</g>")
    }

    pub fn finish(mut self) -> String {
        self.buf.push_str("</svg>\n");
        self.buf
    }

    fn stroke_attrs(&mut self, stroke: Stroke) -> fmt::Result {
        write!(
            self.buf,
            r#" stroke="{}" stroke-width="{:.0}""#,
            escape(stroke.color),
            stroke.width
        )?;
        if let Some(dash) = stroke.dasharray {
            write!(self.buf, r#" stroke-dasharray="{}""#, dash)?;
        }
        Ok(())
    }
}

/// Escape text for use in XML content and attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
