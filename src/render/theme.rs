use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Named theme presets accepted by the HTTP and MCP surfaces.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    #[default]
    Classic,
    Dark,
}

impl ThemeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "classic" => Some(Self::Classic),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Colors, font and canvas size for a combined chart.
///
/// Aspect line colors are fixed by the aspect table; the theme only styles the
/// wheel, text and planet markers.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTheme {
    pub name: ThemeName,
    pub canvas_size: f64,
    pub background: String,
    pub wheel_stroke: String,
    pub text_color: String,
    pub font_family: String,
    pub natal_fill: String,
    pub natal_stroke: String,
    pub transit_fill: String,
    pub transit_stroke: String,
}

impl StyleTheme {
    /// White canvas, natal markers white on black, transit markers light blue on blue.
    pub fn classic() -> Self {
        Self {
            name: ThemeName::Classic,
            canvas_size: 800.0,
            background: "white".to_string(),
            wheel_stroke: "black".to_string(),
            text_color: "black".to_string(),
            font_family: "sans-serif".to_string(),
            natal_fill: "white".to_string(),
            natal_stroke: "black".to_string(),
            transit_fill: "lightblue".to_string(),
            transit_stroke: "blue".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,
            canvas_size: 800.0,
            background: "#1e1e2e".to_string(),
            wheel_stroke: "#cdd6f4".to_string(),
            text_color: "#cdd6f4".to_string(),
            font_family: "sans-serif".to_string(),
            natal_fill: "#f5f5f5".to_string(),
            natal_stroke: "#11111b".to_string(),
            transit_fill: "#89b4fa".to_string(),
            transit_stroke: "#1e66f5".to_string(),
        }
    }

    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Classic => Self::classic(),
            ThemeName::Dark => Self::dark(),
        }
    }

    pub fn with_canvas_size(mut self, size: f64) -> Self {
        self.canvas_size = size;
        self
    }
}

impl Default for StyleTheme {
    fn default() -> Self {
        Self::classic()
    }
}
