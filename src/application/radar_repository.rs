// Repository trait for the remote tile servers
use crate::domain::error::NowcastError;
use crate::domain::precipitation::TimestepRef;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait RadarRepository: Send + Sync {
    /// Available nowcast frames, ascending by validtime
    async fn fetch_timesteps(&self) -> Result<Vec<TimestepRef>, NowcastError>;

    /// Download the raw bytes of one tile image
    async fn fetch_tile(&self, url: &str) -> Result<Bytes, NowcastError>;
}
