//! HTTP client for the upstream astrology calculation API.
//!
//! Positions come from `POST /api/v1/current_transits`, which takes a moment
//! and place and returns every body with its absolute ecliptic longitude
//! (`abs_pos`). The same call serves natal and transit charts. Only the ten
//! classical bodies (Sun through Pluto) are kept for the combined chart.
//!
//! Every other endpoint is forwarded untouched by [`ChartProvider::forward`].

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{ChartError, ChartProvider, Endpoint, UpstreamReply};
use crate::config::UpstreamConfig;
use crate::models::{BirthData, ChartSubject, Planet, PlanetPosition};

/// Body position as reported upstream. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct UpstreamPlanet {
    name: String,
    abs_pos: f64,
    #[serde(default)]
    sign: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamPositions {
    #[serde(default)]
    planets: Vec<UpstreamPlanet>,
}

/// Chart provider backed by the calculation API.
#[derive(Debug, Clone)]
pub struct HttpChartProvider {
    config: UpstreamConfig,
    client: Client,
}

impl HttpChartProvider {
    pub fn new(config: UpstreamConfig) -> Result<Self, ChartError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Build a request with the optional API key header.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.request(method, self.config.endpoint(path));
        if let Some(ref key) = self.config.api_key {
            req = req.header("X-API-Key", key);
        }
        req
    }

    /// POST a JSON body to an endpoint and check the status.
    async fn post(
        &self,
        endpoint: Endpoint,
        body: &(impl serde::Serialize + Sync),
    ) -> Result<reqwest::Response, ChartError> {
        tracing::debug!("POST {}", endpoint.path());
        let response = self
            .request(reqwest::Method::POST, endpoint.path())
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Handle response, converting HTTP errors to ChartError.
    async fn handle_response(response: reqwest::Response) -> Result<reqwest::Response, ChartError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ChartError::Rejected(body))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ChartError::Unauthorized),
            _ => Err(ChartError::Upstream(format!("{}: {}", status, body))),
        }
    }
}

/// Keep the classical bodies; longitudes of exactly 360 wrap to 0.
fn to_positions(planets: Vec<UpstreamPlanet>) -> Vec<PlanetPosition> {
    planets
        .into_iter()
        .filter_map(|p| {
            let planet = Planet::from_api_name(&p.name).filter(Planet::is_classical)?;
            if !(p.abs_pos.is_finite() && (0.0..=360.0).contains(&p.abs_pos)) {
                tracing::warn!("Dropping {} with longitude {}", p.name, p.abs_pos);
                return None;
            }
            let position = PlanetPosition::new(planet, p.abs_pos);
            if let Some(sign) = p.sign.as_deref() {
                if sign != position.sign.abbreviation() {
                    tracing::debug!(
                        "{} reported in {} but longitude {} is in {}",
                        p.name,
                        sign,
                        p.abs_pos,
                        position.sign.abbreviation()
                    );
                }
            }
            Some(position)
        })
        .collect()
}

#[async_trait]
impl ChartProvider for HttpChartProvider {
    async fn resolve(
        &self,
        data: &BirthData,
        default_name: &str,
    ) -> Result<ChartSubject, ChartError> {
        data.validate().map_err(ChartError::InvalidBirthData)?;
        let name = data.display_name(default_name);
        tracing::debug!("Resolving chart '{}'", name);

        let response = self.post(Endpoint::CurrentTransits, data).await?;
        let upstream: UpstreamPositions = response.json().await?;
        let positions = to_positions(upstream.planets);

        if positions.is_empty() {
            return Err(ChartError::NoPositions(name.to_string()));
        }
        Ok(ChartSubject::from_birth_data(data, default_name, positions))
    }

    async fn forward(&self, endpoint: Endpoint, body: &Value) -> Result<UpstreamReply, ChartError> {
        let response = self.post(endpoint, body).await?;
        let is_svg = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("image/svg"));
        if is_svg {
            Ok(UpstreamReply::Svg(response.text().await?))
        } else {
            Ok(UpstreamReply::Json(response.json().await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(name: &str, abs_pos: f64) -> UpstreamPlanet {
        UpstreamPlanet {
            name: name.to_string(),
            abs_pos,
            sign: None,
        }
    }

    #[test]
    fn unknown_bodies_and_bad_longitudes_are_dropped() {
        let positions = to_positions(vec![
            upstream("Sun", 202.0),
            upstream("True_Node", 10.0),
            upstream("Moon", -4.0),
            upstream("Mars", 360.0),
            upstream("Venus", f64::NAN),
        ]);
        assert_eq!(
            positions,
            vec![
                PlanetPosition::new(Planet::Sun, 202.0),
                PlanetPosition::new(Planet::Mars, 0.0),
            ]
        );
    }

    #[test]
    fn only_classical_bodies_reach_the_combined_chart() {
        let positions = to_positions(vec![
            upstream("Sun", 10.0),
            upstream("Chiron", 12.0),
            upstream("Lilith", 190.0),
            upstream("Mean_Node", 100.0),
            upstream("Pluto", 244.8),
        ]);
        let planets: Vec<_> = positions.iter().map(|p| p.planet).collect();
        assert_eq!(planets, vec![Planet::Sun, Planet::Pluto]);
    }

    #[test]
    fn response_ignores_extra_fields() {
        let parsed: UpstreamPositions = serde_json::from_value(serde_json::json!({
            "input_data": {},
            "planets": [{
                "name": "Sun", "sign": "Lib", "sign_num": 6, "position": 22.0,
                "abs_pos": 202.0, "house_name": "Fifth_House", "speed": 0.98,
                "retrograde": false
            }]
        }))
        .unwrap();
        assert_eq!(parsed.planets.len(), 1);
        assert_eq!(parsed.planets[0].abs_pos, 202.0);
        assert_eq!(parsed.planets[0].sign.as_deref(), Some("Lib"));
    }
}
