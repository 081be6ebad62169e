//! MCP server exposing combined natal/transit charts as tools.

mod types;

use std::sync::Arc;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};

use serde::Serialize;

use crate::chart::{resolve_pair, ChartError, ChartProvider, Endpoint, UpstreamReply};
use crate::models::{BirthData, ChartSubject};
use crate::render::{self, EncodedChart, RenderError, StyleTheme, ThemeName};

/// Rendered chart in the form the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutput {
    Svg(String),
    Encoded(EncodedChart),
}

impl ChartOutput {
    fn into_content(self) -> Result<Content, McpError> {
        match self {
            Self::Svg(svg) => Ok(Content::text(svg)),
            Self::Encoded(encoded) => {
                let json = serde_json::to_string_pretty(&encoded)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                Ok(Content::text(json))
            }
        }
    }
}

#[derive(Clone)]
pub struct McpServer {
    provider: Arc<dyn ChartProvider>,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(provider: Arc<dyn ChartProvider>) -> Self {
        Self {
            provider,
            tool_router: Self::tool_router(),
        }
    }

    fn chart_err(e: ChartError) -> McpError {
        match e {
            ChartError::InvalidBirthData(msg) | ChartError::Rejected(msg) => {
                McpError::invalid_params(msg, None)
            }
            ChartError::NoPositions(_) => McpError::invalid_params(e.to_string(), None),
            ChartError::Unauthorized => {
                McpError::internal_error("Unauthorized: check ASTRO_API_KEY", None)
            }
            ChartError::Upstream(msg) => McpError::internal_error(msg, None),
            ChartError::Offline(_) => McpError::internal_error(e.to_string(), None),
            ChartError::Http(e) => McpError::internal_error(e.to_string(), None),
        }
    }

    fn render_err(e: RenderError) -> McpError {
        match e {
            RenderError::InvalidChart(_) | RenderError::LongitudeOutOfRange { .. } => {
                McpError::invalid_params(e.to_string(), None)
            }
            _ => McpError::internal_error(e.to_string(), None),
        }
    }

    fn render_output(
        natal: &ChartSubject,
        transit: &ChartSubject,
        theme: ThemeName,
        return_base64: bool,
    ) -> Result<ChartOutput, McpError> {
        let theme = StyleTheme::named(theme);
        if return_base64 {
            render::render_base64(natal, transit, &theme)
                .map(ChartOutput::Encoded)
                .map_err(Self::render_err)
        } else {
            render::render(natal, transit, &theme)
                .map(ChartOutput::Svg)
                .map_err(Self::render_err)
        }
    }

    async fn combined_chart(
        &self,
        req: GenerateCombinedChartRequest,
    ) -> Result<ChartOutput, McpError> {
        let (natal, transit) =
            resolve_pair(self.provider.as_ref(), &req.natal_chart, &req.transit_chart)
                .await
                .map_err(Self::chart_err)?;
        Self::render_output(&natal, &transit, req.theme, req.return_base64)
    }

    async fn transit_aspects(
        &self,
        req: FindTransitAspectsRequest,
    ) -> Result<AspectReport, McpError> {
        let (natal, transit) =
            resolve_pair(self.provider.as_ref(), &req.natal_chart, &req.transit_chart)
                .await
                .map_err(Self::chart_err)?;
        let aspects = render::find_aspects(&natal, &transit);
        Ok(AspectReport {
            natal: natal.name,
            transit: transit.name,
            aspects: aspects.iter().map(AspectInfo::from).collect(),
        })
    }

    fn check_birth_data(data: &BirthData) -> Result<(), McpError> {
        data.validate().map_err(|msg| McpError::invalid_params(msg, None))
    }

    /// Send a body to the calculation API and return its reply as text.
    async fn forward(
        &self,
        endpoint: Endpoint,
        body: &impl Serialize,
    ) -> Result<String, McpError> {
        let body = serde_json::to_value(body)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let reply = self
            .provider
            .forward(endpoint, &body)
            .await
            .map_err(Self::chart_err)?;

        match reply {
            UpstreamReply::Json(value) => serde_json::to_string_pretty(&value)
                .map_err(|e| McpError::internal_error(e.to_string(), None)),
            UpstreamReply::Svg(svg) => Ok(svg),
        }
    }

    async fn natal_chart(&self, data: BirthData) -> Result<String, McpError> {
        Self::check_birth_data(&data)?;
        self.forward(Endpoint::NatalChart, &data).await
    }

    async fn current_transits(&self, data: BirthData) -> Result<String, McpError> {
        Self::check_birth_data(&data)?;
        self.forward(Endpoint::CurrentTransits, &data).await
    }

    async fn transits_to_natal(&self, req: TransitsToNatalRequest) -> Result<String, McpError> {
        Self::check_birth_data(&req.natal_data)?;
        Self::check_birth_data(&req.transit_data)?;
        self.forward(Endpoint::TransitsToNatal, &req).await
    }

    async fn svg_chart(&self, req: SvgChartRequest) -> Result<String, McpError> {
        Self::check_birth_data(&req.natal_chart)?;
        match req.transit_chart {
            Some(ref transit) => Self::check_birth_data(transit)?,
            None if req.chart_type.needs_transit() => {
                return Err(McpError::invalid_params(
                    format!(
                        "transit_chart is required for chart_type '{}'",
                        req.chart_type.as_str()
                    ),
                    None,
                ));
            }
            None => {}
        }

        let endpoint = if req.return_base64 {
            Endpoint::SvgChartBase64
        } else {
            Endpoint::SvgChart
        };
        self.forward(endpoint, &req).await
    }

    // ============================================================
    // Test helpers - expose tool logic for testing
    // ============================================================

    pub async fn test_generate_combined_svg_chart(
        &self,
        req: GenerateCombinedChartRequest,
    ) -> Result<ChartOutput, McpError> {
        self.combined_chart(req).await
    }

    pub fn test_render_combined_chart_from_positions(
        &self,
        req: RenderFromPositionsRequest,
    ) -> Result<ChartOutput, McpError> {
        Self::render_output(&req.natal, &req.transit, req.theme, req.return_base64)
    }

    pub async fn test_find_transit_aspects(
        &self,
        req: FindTransitAspectsRequest,
    ) -> Result<AspectReport, McpError> {
        self.transit_aspects(req).await
    }

    pub async fn test_calculate_natal_chart(&self, data: BirthData) -> Result<String, McpError> {
        self.natal_chart(data).await
    }

    pub async fn test_get_current_transits(&self, data: BirthData) -> Result<String, McpError> {
        self.current_transits(data).await
    }

    pub async fn test_calculate_transits_to_natal(
        &self,
        req: TransitsToNatalRequest,
    ) -> Result<String, McpError> {
        self.transits_to_natal(req).await
    }

    pub async fn test_generate_svg_chart(&self, req: SvgChartRequest) -> Result<String, McpError> {
        self.svg_chart(req).await
    }
}

#[tool_router]
impl McpServer {
    #[tool(
        description = "Generate a combined natal + transit chart as SVG. Computes planet positions for both moments through the calculation API, then draws natal planets on the outer ring, transiting planets on the inner ring, and a colored line for every natal-transit aspect (conjunction red, opposition blue, trine green, square magenta, sextile yellow, quincunx cyan, minor aspects thinner). Set return_base64=true to get {svg_base64, data_uri} JSON instead of raw SVG."
    )]
    async fn generate_combined_svg_chart(
        &self,
        params: Parameters<GenerateCombinedChartRequest>,
    ) -> Result<CallToolResult, McpError> {
        let output = self.combined_chart(params.0).await?;
        Ok(CallToolResult::success(vec![output.into_content()?]))
    }

    #[tool(
        description = "Render a combined natal + transit chart from planet positions you already have, without calling the calculation API. Each chart needs a name, the moment and place, and planets as [{planet, longitude, sign}] with longitude in [0, 360). Fails if either chart has no planets."
    )]
    async fn render_combined_chart_from_positions(
        &self,
        params: Parameters<RenderFromPositionsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let output =
            Self::render_output(&req.natal, &req.transit, req.theme, req.return_base64)?;
        Ok(CallToolResult::success(vec![output.into_content()?]))
    }

    #[tool(
        description = "List the aspects transiting planets make to a natal chart. Returns JSON with one entry per natal/transit pair in aspect: natal_planet, transit_planet, aspect, separation and orb in degrees. Each pair reports at most one aspect, the first that fits in priority order: conjunction, opposition, trine, square, sextile, quincunx, then minor aspects."
    )]
    async fn find_transit_aspects(
        &self,
        params: Parameters<FindTransitAspectsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let report = self.transit_aspects(params.0).await?;

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "Calculate a natal chart through the calculation API: planet positions with signs and houses, house cusps and natal aspects. Returns the API's JSON unchanged."
    )]
    async fn calculate_natal_chart(
        &self,
        params: Parameters<BirthData>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.natal_chart(params.0).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        description = "Get planet positions for a moment and place (for example now, at the user's location). Returns the API's JSON with every body's sign, degree and retrograde flag."
    )]
    async fn get_current_transits(
        &self,
        params: Parameters<BirthData>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.current_transits(params.0).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        description = "Ask the calculation API for the aspects transiting planets make to a natal chart. Takes natal_data and transit_data birth data and returns the API's JSON, including bodies beyond the ten planets."
    )]
    async fn calculate_transits_to_natal(
        &self,
        params: Parameters<TransitsToNatalRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.transits_to_natal(params.0).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        description = "Have the calculation API draw its own chart wheel. chart_type is 'natal' (default), 'transit' or 'combined'; the last two need transit_chart. theme is passed to the API as is. Returns raw SVG, or {svg_base64, data_uri} JSON with return_base64=true."
    )]
    async fn generate_svg_chart(
        &self,
        params: Parameters<SvgChartRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.svg_chart(params.0).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "astro-bridge".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"astro-bridge draws natal charts overlaid with transits.

BIRTH DATA:
Charts are described by year, month, day, hour, minute (local time), latitude,
longitude, tz_str (IANA zone such as "America/Sao_Paulo"), an optional name and
an optional house_system (placidus by default).

TOOLS:
- generate_combined_svg_chart: birth data in, SVG out (or base64 with return_base64=true)
- find_transit_aspects: birth data in, aspect list out
- render_combined_chart_from_positions: draw from longitudes you already have
- calculate_natal_chart: full natal chart JSON from the calculation API
- get_current_transits: planet positions for a moment and place
- calculate_transits_to_natal: the calculation API's own transit aspect list
- generate_svg_chart: the calculation API's natal, transit or combined wheel

READING THE CHART:
- Outer ring: natal planets (white markers)
- Inner ring: transiting planets (blue markers)
- 0° Aries is at the top; the zodiac runs clockwise
- Lines: conjunction red, opposition blue, trine green dashed, square magenta
  dotted, sextile yellow dashed, quincunx cyan dotted"#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(provider: Arc<dyn ChartProvider>) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(provider);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
