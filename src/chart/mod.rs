//! Chart resolution: turning [`BirthData`] into a [`ChartSubject`].
//!
//! The astronomy itself lives in an external calculation API. This module is
//! the seam to it: [`ChartProvider`] is what the HTTP and MCP layers depend
//! on, [`HttpChartProvider`] talks to the real service, and
//! [`StaticChartProvider`] serves fixed charts for tests and offline use.
//!
//! Besides resolving positions, a provider can [`forward`](ChartProvider::forward)
//! requests to the rest of the calculation API (natal charts with houses and
//! aspects, transit reports, the upstream's own SVG charts) unchanged.

mod client;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use client::HttpChartProvider;

use crate::models::{BirthData, ChartSubject};

pub const DEFAULT_NATAL_NAME: &str = "Natal Chart";
pub const DEFAULT_TRANSIT_NAME: &str = "Transit Chart";

/// Chart resolution errors.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Invalid birth data: {0}")]
    InvalidBirthData(String),

    #[error("Calculation API rejected the request: {0}")]
    Rejected(String),

    #[error("Unauthorized: calculation API key missing or invalid")]
    Unauthorized,

    #[error("Calculation API error: {0}")]
    Upstream(String),

    #[error("No planet positions resolved for '{0}'")]
    NoPositions(String),

    #[error("No calculation API available for {}", .0.path())]
    Offline(Endpoint),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Calculation API endpoints that are forwarded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    NatalChart,
    CurrentTransits,
    TransitsToNatal,
    SvgChart,
    SvgChartBase64,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::NatalChart => "/api/v1/natal_chart",
            Self::CurrentTransits => "/api/v1/current_transits",
            Self::TransitsToNatal => "/api/v1/transits_to_natal",
            Self::SvgChart => "/api/v1/svg_chart",
            Self::SvgChartBase64 => "/api/v1/svg_chart_base64",
        }
    }
}

/// Body returned by a forwarded call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    Json(Value),
    Svg(String),
}

/// Resolves a moment and place into planetary positions.
#[async_trait]
pub trait ChartProvider: Send + Sync {
    /// Resolve `data` into a chart. `default_name` is used when `data.name` is unset.
    async fn resolve(&self, data: &BirthData, default_name: &str)
        -> Result<ChartSubject, ChartError>;

    /// POST `body` to `endpoint` and return the reply untouched.
    ///
    /// Providers without a calculation API answer [`ChartError::Offline`].
    async fn forward(&self, endpoint: Endpoint, _body: &Value) -> Result<UpstreamReply, ChartError> {
        Err(ChartError::Offline(endpoint))
    }
}

/// Resolve a natal and a transit chart concurrently.
pub async fn resolve_pair(
    provider: &dyn ChartProvider,
    natal: &BirthData,
    transit: &BirthData,
) -> Result<(ChartSubject, ChartSubject), ChartError> {
    tokio::try_join!(
        provider.resolve(natal, DEFAULT_NATAL_NAME),
        provider.resolve(transit, DEFAULT_TRANSIT_NAME),
    )
}

/// Provider that answers from a fixed set of charts, keyed by name.
///
/// The returned subject keeps the stored positions but takes its moment and
/// place from the request.
#[derive(Debug, Clone, Default)]
pub struct StaticChartProvider {
    charts: HashMap<String, ChartSubject>,
}

impl StaticChartProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chart(mut self, chart: ChartSubject) -> Self {
        self.charts.insert(chart.name.clone(), chart);
        self
    }
}

#[async_trait]
impl ChartProvider for StaticChartProvider {
    async fn resolve(
        &self,
        data: &BirthData,
        default_name: &str,
    ) -> Result<ChartSubject, ChartError> {
        data.validate().map_err(ChartError::InvalidBirthData)?;
        let name = data.display_name(default_name);
        let stored = self
            .charts
            .get(name)
            .ok_or_else(|| ChartError::NoPositions(name.to_string()))?;
        Ok(ChartSubject::from_birth_data(
            data,
            default_name,
            stored.planets.clone(),
        ))
    }
}
