// Domain layer - Pure types and functions, no I/O
pub mod error;
pub mod geo;
pub mod precipitation;
