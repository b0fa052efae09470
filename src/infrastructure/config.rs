use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str =
    "https://www.jma.go.jp/bosai/jmatile/data/nowc/targetTimes_N2.json";
pub const DEFAULT_NOWCAST_TILE_TEMPLATE: &str = "https://www.jma.go.jp/bosai/jmatile/data/nowc/${basetime}/none/${validtime}/surf/hrpns/${zoom}/${x}/${y}.png";
pub const DEFAULT_BASE_MAP_TILE_TEMPLATE: &str =
    "https://cyberjapandata.gsi.go.jp/xyz/std/${zoom}/${x}/${y}.png";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub endpoints: EndpointSettings,
    pub fetch: FetchSettings,
    pub defaults: QueryDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointSettings {
    pub catalog_url: String,
    /// `${basetime}`, `${validtime}`, `${zoom}`, `${x}` and `${y}` are substituted
    pub nowcast_tile_template: String,
    pub base_map_tile_template: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchSettings {
    /// Upper bound on simultaneous tile downloads per request
    pub max_concurrent_fetches: usize,
    pub request_timeout_secs: u64,
    pub series_deadline_secs: u64,
}

impl FetchSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn series_deadline(&self) -> Duration {
        Duration::from_secs(self.series_deadline_secs)
    }
}

/// Point queried when the caller omits parameters (Tokyo Station)
#[derive(Debug, Deserialize, Clone)]
pub struct QueryDefaults {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("endpoints.catalog_url", DEFAULT_CATALOG_URL)?
        .set_default("endpoints.nowcast_tile_template", DEFAULT_NOWCAST_TILE_TEMPLATE)?
        .set_default("endpoints.base_map_tile_template", DEFAULT_BASE_MAP_TILE_TEMPLATE)?
        .set_default("fetch.max_concurrent_fetches", 8)?
        .set_default("fetch.request_timeout_secs", 10)?
        .set_default("fetch.series_deadline_secs", 20)?
        .set_default("defaults.latitude", 35.681236)?
        .set_default("defaults.longitude", 139.767125)?
        .set_default("defaults.zoom", 10)
}

/// Defaults, then `config/nowcast.*`, then `NOWCAST__*` variables, then `PORT`
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let mut builder = with_defaults(Config::builder())?
        .add_source(File::with_name("config/nowcast").required(false))
        .add_source(
            Environment::with_prefix("NOWCAST")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    if let Ok(port) = std::env::var("PORT") {
        builder = builder.set_override("server.port", port)?;
    }

    validate(builder.build()?.try_deserialize()?)
}

fn validate(settings: AppConfig) -> anyhow::Result<AppConfig> {
    if settings.fetch.max_concurrent_fetches == 0 {
        anyhow::bail!("fetch.max_concurrent_fetches must be at least 1");
    }
    Ok(settings)
}

/// Replace `${name}` placeholders in a URL template in a single left-to-right
/// pass; substituted values are never rescanned. Unknown placeholders are kept.
pub fn fill_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            rest = &rest[start..];
            break;
        };

        let key = &after[..end];
        match vars.get(key) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[start..start + end + 3]),
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_fill_template() {
        let mut vars = HashMap::new();
        vars.insert("basetime", "20231018120000".to_string());
        vars.insert("validtime", "20231018123500".to_string());
        vars.insert("zoom", "10".to_string());
        vars.insert("x", "909".to_string());
        vars.insert("y", "403".to_string());

        let url = fill_template(DEFAULT_NOWCAST_TILE_TEMPLATE, &vars);

        assert_eq!(
            url,
            "https://www.jma.go.jp/bosai/jmatile/data/nowc/20231018120000/none/20231018123500/surf/hrpns/10/909/403.png"
        );
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let mut vars = HashMap::new();
        vars.insert("basetime", "${y}".to_string());
        vars.insert("validtime", "${x}".to_string());
        vars.insert("zoom", "10".to_string());
        vars.insert("x", "909".to_string());
        vars.insert("y", "403".to_string());

        let expected = "https://www.jma.go.jp/bosai/jmatile/data/nowc/${y}/none/${x}/surf/hrpns/10/909/403.png";
        for _ in 0..50 {
            assert_eq!(fill_template(DEFAULT_NOWCAST_TILE_TEMPLATE, &vars), expected);
        }
    }

    #[test]
    fn test_fill_template_keeps_unknown_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("x", "1".to_string());

        assert_eq!(fill_template("a/${x}/${q}/${x", &vars), "a/1/${q}/${x");
    }

    fn settings_from(toml: &str) -> anyhow::Result<AppConfig> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        validate(settings)
    }

    #[test]
    fn test_defaults() {
        let config = settings_from("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.fetch.max_concurrent_fetches, 8);
        assert_eq!(config.endpoints.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.defaults.zoom, 10);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = settings_from("[fetch]\nmax_concurrent_fetches = 3\n[server]\nport = 9000\n").unwrap();
        assert_eq!(config.fetch.max_concurrent_fetches, 3);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.fetch.series_deadline_secs, 20);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(settings_from("[fetch]\nmax_concurrent_fetches = 0\n").is_err());
    }
}
