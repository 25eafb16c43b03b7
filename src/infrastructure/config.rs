use crate::domain::cache::{AssetRequest, BUILD_NUMBER_PLACEHOLDER, RequestDestination, generation_name};
use crate::infrastructure::memory_cache::DEFAULT_MAX_ENTRIES;
use anyhow::Context;
use axum::http::Uri;
use serde::Deserialize;

const FONT_STYLESHEET: &str = "https://fonts.googleapis.com/css2?family=IBM+Plex+Mono:wght@400;600&family=IBM+Plex+Sans:wght@400;600;700&display=swap";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub sun: SunSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    #[serde(default = "default_build_number")]
    pub build_number: String,
    #[serde(default = "default_name_template")]
    pub name_template: String,
    /// Base URL for relative manifest entries and proxied page requests
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,
    #[serde(default = "default_live_hosts")]
    pub live_hosts: Vec<String>,
    /// Entries a generation may grow to through cache-first misses
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            build_number: default_build_number(),
            name_template: default_name_template(),
            origin: default_origin(),
            assets: default_assets(),
            live_hosts: default_live_hosts(),
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SunSettings {
    /// open-meteo daily JSON with sunrise/sunset arrays
    pub table_path: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Standard-time offset when `eu_summer_time` is set, else the fixed offset
    pub utc_offset_hours: Option<f64>,
    /// Add an hour on dates inside EU summer time
    #[serde(default)]
    pub eu_summer_time: bool,
    #[serde(default = "default_sun_days")]
    pub days: u32,
}

impl Default for SunSettings {
    fn default() -> Self {
        Self {
            table_path: None,
            latitude: None,
            longitude: None,
            utc_offset_hours: None,
            eu_summer_time: false,
            days: default_sun_days(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_build_number() -> String {
    "dev".to_string()
}

fn default_name_template() -> String {
    format!("vejr-{}", BUILD_NUMBER_PLACEHOLDER)
}

fn default_origin() -> String {
    "http://localhost:8000".to_string()
}

fn default_assets() -> Vec<String> {
    vec![
        "icon-assets/icon-120.png".to_string(),
        "icon-assets/icon-152.png".to_string(),
        "icon-assets/icon-167.png".to_string(),
        "icon-assets/icon-180.png".to_string(),
        FONT_STYLESHEET.to_string(),
    ]
}

fn default_live_hosts() -> Vec<String> {
    vec![
        "dmi.dk".to_string(),
        "open-meteo.com".to_string(),
        "nominatim".to_string(),
    ]
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_sun_days() -> u32 {
    16
}

impl CacheSettings {
    /// Cache generation name with the build number substituted
    pub fn cache_name(&self) -> String {
        generation_name(&self.name_template, &self.build_number)
    }

    /// Resolve a path or absolute URL against the origin
    pub fn resolve(&self, path_or_url: &str) -> anyhow::Result<Uri> {
        let absolute = if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!(
                "{}/{}",
                self.origin.trim_end_matches('/'),
                path_or_url.trim_start_matches('/')
            )
        };
        absolute
            .parse()
            .with_context(|| format!("Invalid asset URL: {}", absolute))
    }

    /// Host of the app origin
    pub fn origin_host(&self) -> anyhow::Result<String> {
        let origin: Uri = self
            .origin
            .parse()
            .with_context(|| format!("Invalid origin: {}", self.origin))?;
        origin
            .host()
            .map(str::to_string)
            .with_context(|| format!("Origin has no host: {}", self.origin))
    }

    /// Install-time manifest as requests
    pub fn manifest(&self) -> anyhow::Result<Vec<AssetRequest>> {
        self.assets
            .iter()
            .map(|asset| {
                let uri = self.resolve(asset)?;
                Ok(AssetRequest::new(uri, destination_for(asset)))
            })
            .collect()
    }
}

/// Guess the fetch destination of a manifest entry from its path
fn destination_for(asset: &str) -> RequestDestination {
    let path = asset.split('?').next().unwrap_or_default();
    if path.ends_with(".html") || path.ends_with('/') {
        RequestDestination::Document
    } else if path.ends_with(".png") || path.ends_with(".svg") || path.ends_with(".ico") {
        RequestDestination::Image
    } else if path.ends_with(".json") || path.ends_with(".webmanifest") {
        RequestDestination::Manifest
    } else if path.ends_with(".js") {
        RequestDestination::Script
    } else if path.ends_with(".css") || path.contains("/css") {
        RequestDestination::Style
    } else {
        RequestDestination::Other
    }
}

/// Load `config/vejr.toml` (optional) overlaid with `VEJR__SECTION__KEY` variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/vejr").required(false))
        .add_source(
            config::Environment::with_prefix("VEJR")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cache.assets")
                .with_list_parse_key("cache.live_hosts")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
