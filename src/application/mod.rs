// Application layer - Use cases and repository traits
pub mod radar_repository;
pub mod series_service;
pub mod tile_sampler;
