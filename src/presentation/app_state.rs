// Application state for HTTP handlers
use crate::application::series_service::SeriesService;
use crate::infrastructure::config::QueryDefaults;

#[derive(Clone)]
pub struct AppState {
    pub series_service: SeriesService,
    pub defaults: QueryDefaults,
}
