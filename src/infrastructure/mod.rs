// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_response;
pub mod jma_repository;
pub mod json_mapper;
pub mod raster;
