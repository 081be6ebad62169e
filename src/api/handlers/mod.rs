use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use super::AppState;
use crate::chart::{resolve_pair, ChartError};
use crate::mcp::CombinedChartRequest;
use crate::render::{self, EncodedChart, RenderError, StyleTheme};

// ============================================================
// Error Handling
// ============================================================

/// Map a chart resolution failure to a response.
///
/// Problems with the caller's input are returned as-is with 422. Upstream
/// failures are logged in full and reported to the client as a generic 502.
fn chart_error(e: ChartError) -> (StatusCode, String) {
    match e {
        ChartError::InvalidBirthData(_) | ChartError::Rejected(_) | ChartError::NoPositions(_) => {
            tracing::warn!("Validation error: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        _ => {
            tracing::error!("Chart calculation failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                "Chart calculation service unavailable".to_string(),
            )
        }
    }
}

fn render_error(e: RenderError) -> (StatusCode, String) {
    match e {
        RenderError::InvalidChart(_) => {
            tracing::warn!("Validation error: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        _ => {
            tracing::error!("Internal error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error while rendering combined chart".to_string(),
            )
        }
    }
}

async fn resolve_and_render(
    state: &AppState,
    input: &CombinedChartRequest,
) -> Result<String, (StatusCode, String)> {
    let (natal, transit) =
        resolve_pair(state.provider.as_ref(), &input.natal_chart, &input.transit_chart)
            .await
            .map_err(chart_error)?;
    render::render(&natal, &transit, &StyleTheme::named(input.theme)).map_err(render_error)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Combined Charts
// ============================================================

pub async fn svg_combined_chart(
    State(state): State<AppState>,
    Json(input): Json<CombinedChartRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let svg = resolve_and_render(&state, &input).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=combined_chart.svg",
            ),
        ],
        svg,
    ))
}

pub async fn svg_combined_chart_base64(
    State(state): State<AppState>,
    Json(input): Json<CombinedChartRequest>,
) -> Result<Json<EncodedChart>, (StatusCode, String)> {
    let svg = resolve_and_render(&state, &input).await?;
    Ok(Json(EncodedChart::from_svg(&svg)))
}
