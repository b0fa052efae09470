// Tile sampler - Download one tile and read a single pixel from it
use crate::application::radar_repository::RadarRepository;
use crate::domain::error::NowcastError;
use crate::domain::geo::PixelOffset;
use crate::domain::precipitation::Color;
use crate::infrastructure::raster::sample_pixel;
use std::sync::Arc;

#[derive(Clone)]
pub struct TileSampler {
    repository: Arc<dyn RadarRepository>,
}

impl TileSampler {
    pub fn new(repository: Arc<dyn RadarRepository>) -> Self {
        Self { repository }
    }

    /// The downloaded bytes are dropped after the single read
    pub async fn fetch_pixel(&self, url: &str, offset: PixelOffset) -> Result<Color, NowcastError> {
        tracing::debug!("Fetching tile {}", url);
        let bytes = self.repository.fetch_tile(url).await?;
        sample_pixel(&bytes, offset)
    }
}
