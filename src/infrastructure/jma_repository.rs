// JMA nowcast repository implementation
use crate::application::radar_repository::RadarRepository;
use crate::domain::error::NowcastError;
use crate::domain::precipitation::TimestepRef;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;

/// Product drawn by the nowcast tile template
const PRECIPITATION_ELEMENT: &str = "hrpns";

#[derive(Debug, Clone)]
pub struct JmaRepository {
    client: reqwest::Client,
    catalog_url: String,
}

#[derive(Debug, Deserialize)]
struct TargetTime {
    basetime: String,
    validtime: String,
    #[serde(default)]
    elements: Option<Vec<String>>,
}

impl JmaRepository {
    pub fn new(catalog_url: String, request_timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            catalog_url,
        })
    }
}

/// Parse `targetTimes_N2.json` into frames sorted ascending by validtime
pub fn parse_catalog(body: &[u8]) -> Result<Vec<TimestepRef>, NowcastError> {
    let entries: Vec<TargetTime> = serde_json::from_slice(body)
        .map_err(|e| NowcastError::CatalogMalformed(e.to_string()))?;

    let mut timesteps = Vec::with_capacity(entries.len());
    for entry in entries {
        let listed = match &entry.elements {
            Some(elements) => elements.iter().any(|e| e == PRECIPITATION_ELEMENT),
            None => true,
        };
        if !listed {
            continue;
        }
        for token in [&entry.basetime, &entry.validtime] {
            if !is_time_token(token) {
                return Err(NowcastError::CatalogMalformed(format!(
                    "timestamp token {:?} is not a digit string",
                    token
                )));
            }
        }
        timesteps.push(TimestepRef::new(entry.basetime, entry.validtime));
    }

    timesteps.sort_by(|a, b| a.cmp_validtime(b));
    timesteps.dedup();
    Ok(timesteps)
}

/// Tokens end up as tile URL path segments
fn is_time_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

#[async_trait]
impl RadarRepository for JmaRepository {
    async fn fetch_timesteps(&self) -> Result<Vec<TimestepRef>, NowcastError> {
        let response = self
            .client
            .get(&self.catalog_url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| NowcastError::CatalogUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NowcastError::CatalogUnavailable(format!(
                "{} returned status {}",
                self.catalog_url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| NowcastError::CatalogUnavailable(e.to_string()))?;

        let timesteps = parse_catalog(&body)?;
        tracing::debug!("Nowcast catalog lists {} timesteps", timesteps.len());
        Ok(timesteps)
    }

    async fn fetch_tile(&self, url: &str) -> Result<Bytes, NowcastError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NowcastError::TileUnavailable(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(NowcastError::TileUnavailable(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| NowcastError::TileUnavailable(format!("{}: {}", url, e)))
    }
}
