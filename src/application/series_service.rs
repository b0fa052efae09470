// Series service - Use case for sampling precipitation at one point
use crate::application::radar_repository::RadarRepository;
use crate::application::tile_sampler::TileSampler;
use crate::domain::error::NowcastError;
use crate::domain::geo::{GeoPoint, PixelOffset, TileAddress, ZoomLevel, locate};
use crate::domain::precipitation::{Color, PrecipitationReading, PrecipitationSeries, TimestepRef};
use crate::infrastructure::config::{EndpointSettings, fill_template};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Which tile pyramid a pixel is read from
#[derive(Debug, Clone, Copy)]
pub enum TileSource<'a> {
    BaseMap,
    Nowcast(&'a TimestepRef),
}

/// Raw pixel of the base map at a point
#[derive(Debug, Clone)]
pub struct PixelSample {
    pub point: GeoPoint,
    pub tile: TileAddress,
    pub pixel: PixelOffset,
    pub color: Color,
}

#[derive(Clone)]
pub struct SeriesService {
    repository: Arc<dyn RadarRepository>,
    sampler: TileSampler,
    endpoints: EndpointSettings,
    max_concurrent_fetches: usize,
    deadline: Duration,
}

impl SeriesService {
    pub fn new(
        repository: Arc<dyn RadarRepository>,
        endpoints: EndpointSettings,
        max_concurrent_fetches: usize,
        deadline: Duration,
    ) -> Self {
        Self {
            sampler: TileSampler::new(repository.clone()),
            repository,
            endpoints,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
            deadline,
        }
    }

    pub fn tile_url(&self, source: TileSource<'_>, tile: TileAddress) -> String {
        let mut vars = HashMap::new();
        vars.insert("zoom", tile.zoom.value().to_string());
        vars.insert("x", tile.x.to_string());
        vars.insert("y", tile.y.to_string());

        match source {
            TileSource::BaseMap => fill_template(&self.endpoints.base_map_tile_template, &vars),
            TileSource::Nowcast(timestep) => {
                vars.insert("basetime", urlencoding::encode(&timestep.basetime).into_owned());
                vars.insert("validtime", urlencoding::encode(&timestep.validtime).into_owned());
                fill_template(&self.endpoints.nowcast_tile_template, &vars)
            }
        }
    }

    async fn sample(
        &self,
        source: TileSource<'_>,
        tile: TileAddress,
        pixel: PixelOffset,
    ) -> Result<Color, NowcastError> {
        let url = self.tile_url(source, tile);
        self.sampler.fetch_pixel(&url, pixel).await
    }

    /// Read the base-map pixel under `point`
    pub async fn sample_base_map(
        &self,
        point: GeoPoint,
        zoom: ZoomLevel,
    ) -> Result<PixelSample, NowcastError> {
        let (tile, pixel) = locate(point, zoom);
        let color = tokio::time::timeout(self.deadline, self.sample(TileSource::BaseMap, tile, pixel))
            .await
            .map_err(|_| NowcastError::DeadlineExceeded(self.deadline))??;

        Ok(PixelSample {
            point,
            tile,
            pixel,
            color,
        })
    }

    /// Sample every nowcast frame at `point`. Dropping the returned future (or
    /// hitting the deadline) cancels all in-flight tile downloads.
    pub async fn build_series(
        &self,
        point: GeoPoint,
        zoom: ZoomLevel,
    ) -> Result<PrecipitationSeries, NowcastError> {
        tokio::time::timeout(self.deadline, self.collect_series(point, zoom))
            .await
            .map_err(|_| NowcastError::DeadlineExceeded(self.deadline))?
    }

    async fn collect_series(
        &self,
        point: GeoPoint,
        zoom: ZoomLevel,
    ) -> Result<PrecipitationSeries, NowcastError> {
        let start_time = Instant::now();
        let timesteps = self.repository.fetch_timesteps().await?;
        let (tile, pixel) = locate(point, zoom);

        tracing::debug!(
            "Sampling {} nowcast frames at tile {}/{}/{} pixel ({}, {})",
            timesteps.len(),
            zoom.value(),
            tile.x,
            tile.y,
            pixel.x,
            pixel.y
        );

        let limiter = Semaphore::new(self.max_concurrent_fetches);
        let fetches = timesteps.into_iter().map(|timestep| {
            let limiter = &limiter;
            async move {
                let result = match limiter.acquire().await {
                    Ok(_permit) => self.sample(TileSource::Nowcast(&timestep), tile, pixel).await,
                    Err(closed) => Err(NowcastError::TileUnavailable(closed.to_string())),
                };

                match result {
                    Ok(color) => PrecipitationReading::classified(timestep, color),
                    Err(e) => {
                        tracing::warn!(
                            validtime = %timestep.validtime,
                            error = %e,
                            "Nowcast frame could not be sampled"
                        );
                        PrecipitationReading::failed(timestep, e.to_string())
                    }
                }
            }
        });

        let mut readings = join_all(fetches).await;
        readings.sort_by(|a, b| a.timestep.cmp_validtime(&b.timestep));

        let failed = readings.iter().filter(|r| r.is_failed()).count();
        tracing::info!(
            frames = readings.len(),
            failed,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Built precipitation series"
        );

        if failed == readings.len() {
            return Err(NowcastError::SeriesUnavailable { failed });
        }

        Ok(PrecipitationSeries {
            point,
            tile,
            pixel,
            readings,
        })
    }
}
