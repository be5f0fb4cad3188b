use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{QueryError, WeatherSnapshot};

use super::WeatherProvider;

/// Client for the WeatherAPI.com `current.json` endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    base_url: String,
    api_key: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self { base_url, api_key, http })
    }

    fn current_url(&self) -> String {
        format!("{}/current.json", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    region: String,
    country: String,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: f64,
    wind_kph: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl From<WaResponse> for WeatherSnapshot {
    fn from(parsed: WaResponse) -> Self {
        let ts = parsed.current.last_updated_epoch.or(parsed.location.localtime_epoch);
        let observed_at = ts.and_then(unix_to_utc).unwrap_or_else(Utc::now);

        WeatherSnapshot {
            temperature_c: parsed.current.temp_c,
            humidity_pct: parsed.current.humidity,
            wind_kph: parsed.current.wind_kph,
            condition_text: parsed.current.condition.text,
            condition_icon_url: absolute_icon_url(&parsed.current.condition.icon),
            resolved_location_label: format!(
                "{}, {}, {}",
                parsed.location.name, parsed.location.region, parsed.location.country
            ),
            observed_at,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    #[instrument(skip(self))]
    async fn current(&self, location: &str) -> Result<WeatherSnapshot, QueryError> {
        let res = self
            .http
            .get(self.current_url())
            .query(&[("key", self.api_key.as_str()), ("q", location)])
            .send()
            .await?;

        let status = res.status();

        // Any non-success status is a miss, even if the body cannot be read.
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, body = %truncate_body(&body), "WeatherAPI rejected lookup");
            return Err(QueryError::NotFound);
        }

        let body = res.text().await?;

        let parsed: WaResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "WeatherAPI returned an unexpected body");
            QueryError::MalformedResponse(e.to_string())
        })?;

        debug!(location = %parsed.location.name, "WeatherAPI lookup succeeded");
        Ok(parsed.into())
    }
}

/// WeatherAPI hands out protocol-relative icon URLs.
fn absolute_icon_url(icon: &str) -> String {
    if icon.starts_with("//") { format!("https:{icon}") } else { icon.to_string() }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
