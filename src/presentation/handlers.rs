// HTTP request handlers
use crate::domain::error::NowcastError;
use crate::domain::geo::{GeoPoint, ZoomLevel};
use crate::infrastructure::config::QueryDefaults;
use crate::infrastructure::http_response::ApiError;
use crate::infrastructure::json_mapper::{
    PixelSampleJson, SeriesJson, pixel_sample_to_json, series_to_json,
};
use crate::infrastructure::raster::pixel_data_uri;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct PointQuery {
    pub lat: Option<f64>,
    #[serde(alias = "lon")]
    pub long: Option<f64>,
    pub zoom: Option<u8>,
}

impl PointQuery {
    /// Fill omitted parameters from the configured defaults and validate
    pub fn resolve(&self, defaults: &QueryDefaults) -> Result<(GeoPoint, ZoomLevel), NowcastError> {
        let point = GeoPoint::new(
            self.lat.unwrap_or(defaults.latitude),
            self.long.unwrap_or(defaults.longitude),
        )?;
        let zoom = ZoomLevel::new(self.zoom.unwrap_or(defaults.zoom))?;
        Ok((point, zoom))
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn version() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

/// Base-map color under a point, with the pixel rendered as a PNG data URI
pub async fn sample_point(
    Query(query): Query<PointQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PixelSampleJson>, ApiError> {
    let (point, zoom) = query.resolve(&state.defaults)?;
    let sample = state.series_service.sample_base_map(point, zoom).await?;
    let image = pixel_data_uri(sample.color)?;

    Ok(Json(pixel_sample_to_json(sample, image)))
}

/// Precipitation time series over every nowcast frame
pub async fn nowcast_series(
    Query(query): Query<PointQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SeriesJson>, ApiError> {
    let (point, zoom) = query.resolve(&state.defaults)?;
    let series = state.series_service.build_series(point, zoom).await?;

    Ok(Json(series_to_json(series)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> QueryDefaults {
        QueryDefaults {
            latitude: 35.681236,
            longitude: 139.767125,
            zoom: 10,
        }
    }

    #[test]
    fn test_resolve_uses_defaults() {
        let (point, zoom) = PointQuery::default().resolve(&defaults()).unwrap();
        assert_eq!(point.latitude, 35.681236);
        assert_eq!(point.longitude, 139.767125);
        assert_eq!(zoom.value(), 10);
    }

    #[test]
    fn test_resolve_accepts_lon_alias() {
        let query: PointQuery = serde_json::from_str(r#"{"lat": 1.5, "lon": -2.5}"#).unwrap();
        let (point, _) = query.resolve(&defaults()).unwrap();
        assert_eq!(point.longitude, -2.5);
    }

    #[test]
    fn test_resolve_rejects_out_of_domain() {
        let query = PointQuery {
            lat: Some(89.0),
            ..Default::default()
        };
        assert!(matches!(
            query.resolve(&defaults()),
            Err(NowcastError::InvalidInput(_))
        ));

        let query = PointQuery {
            zoom: Some(30),
            ..Default::default()
        };
        assert!(matches!(
            query.resolve(&defaults()),
            Err(NowcastError::InvalidInput(_))
        ));
    }
}
