// Error taxonomy shared by every layer
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NowcastError {
    /// Latitude, longitude or zoom outside the supported domain
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("nowcast catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("nowcast catalog malformed: {0}")]
    CatalogMalformed(String),

    #[error("tile unavailable: {0}")]
    TileUnavailable(String),

    /// Bytes are not a raster image, or the requested pixel lies outside it
    #[error("tile decode error: {0}")]
    TileDecode(String),

    /// Every timestep of the series failed (or the catalog listed none)
    #[error("no nowcast timestep could be sampled ({failed} failed)")]
    SeriesUnavailable { failed: usize },

    #[error("request deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}
