pub mod alerts;
pub mod cities;
pub mod geocoding;
pub mod geolocation;
pub mod hfc;
pub mod metadata;
pub mod poller;

use crate::error::{ConfigError, InitializationError};
use crate::geolocation::Coordinates;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const ENV_VAR_PREFIX: &str = "PIKUD_HAOREF__";
pub const SETTINGS_FILE: &str = "Settings.toml";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.100 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub alerts: AlertsConfig,
    pub cities: CitiesConfig,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_seconds: Option<u64>,
    pub proxy: Option<ProxyConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_seconds: None,
            proxy: None,
        }
    }
}

/// Outbound proxy, typically an Israeli exit when running abroad.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub url: String,
    pub referer: String,
    pub poll_interval_seconds: u64,
    pub cooldown_seconds: u64,
    pub health_addr: Option<String>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            url: hfc::ALERTS_ENDPOINT.to_string(),
            referer: hfc::ALERTS_REFERER.to_string(),
            poll_interval_seconds: 5,
            cooldown_seconds: 180,
            health_addr: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CitiesConfig {
    pub cities_url: String,
    pub translations: BTreeMap<cities::Language, String>,
    pub notes_url: String,
    pub output_file: PathBuf,
    pub cache_file: Option<PathBuf>,
    pub shelters_file: Option<PathBuf>,
}

impl Default for CitiesConfig {
    fn default() -> Self {
        let translations = [
            cities::Language::En,
            cities::Language::Ru,
            cities::Language::Ar,
        ]
        .into_iter()
        .map(|lang| (lang, hfc::cities_url(lang.code())))
        .collect();

        Self {
            cities_url: hfc::cities_url("he"),
            translations,
            notes_url: hfc::CITY_NOTES_ENDPOINT.to_string(),
            output_file: PathBuf::from("cities.json"),
            cache_file: Some(PathBuf::from("cities.json")),
            shelters_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub api_key: Option<String>,
    pub url: String,
    pub center: Coordinates,
    pub radius_km: f64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: geocoding::GOOGLE_GEOCODE_ENDPOINT.to_string(),
            center: Coordinates {
                lat: 31.411_725_7,
                lng: 35.081_815_5,
            },
            radius_km: 400.0,
        }
    }
}

pub fn load_config() -> Result<Config, ConfigError> {
    Ok(Figment::new()
        .merge(Toml::file(SETTINGS_FILE))
        .merge(Env::prefixed(ENV_VAR_PREFIX).split("__"))
        .extract::<Config>()?)
}

pub fn init_tracing() -> Result<(), InitializationError> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

pub async fn shutdown_listener(token: Option<CancellationToken>) {
    let ctrl_c = signal::ctrl_c();
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = ?e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(name: "signal.ctrlc.received", "received Ctrl+C signal, shutting down"),
        _ = terminate => info!(name: "signal.sigterm.received", "received SIGTERM signal, shutting down"),
    }

    if let Some(token) = token {
        token.cancel();
    }
}

pub mod error {
    use thiserror::Error;
    use tracing::dispatcher::SetGlobalDefaultError;

    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("failed to load configuration: {0}")]
        Figment(#[from] figment::Error),
        #[error("please provide a Google Maps API key and try again")]
        MissingGeocodingKey,
        #[error("invalid proxy configuration: {0}")]
        Proxy(#[source] reqwest::Error),
        #[error("failed to build HTTP client: {0}")]
        HttpClient(#[source] reqwest::Error),
    }

    #[derive(Debug, Error)]
    pub enum InitializationError {
        #[error(transparent)]
        Tracing(#[from] SetGlobalDefaultError),
        #[error(transparent)]
        Config(#[from] ConfigError),
    }

    /// Transport or HTTP status failure talking to an upstream service.
    #[derive(Debug, Error)]
    pub enum FetchError {
        #[error("failed to retrieve {url}: {source}")]
        Request {
            url: String,
            #[source]
            source: reqwest::Error,
        },
        #[error("invalid request header: {0}")]
        InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    }

    #[derive(Debug, Error)]
    pub enum ParseError {
        #[error("failed to parse JSON: {source}, body: {body}")]
        Json {
            #[source]
            source: serde_json::Error,
            body: String,
        },
        #[error("unable to parse JSON: empty response from {url}")]
        EmptyResponse { url: String },
        #[error("unexpected time identifier: {0}")]
        UnknownTimeIdentifier(String),
    }

    #[derive(Debug, Error)]
    #[error("geocoding error: {status}")]
    pub struct GeocodeError {
        pub status: String,
    }

    #[derive(Debug, Error)]
    #[error("failed to extract {field} for city: {label}")]
    pub struct ExtractionError {
        pub label: String,
        pub field: &'static str,
    }

    /// Either half of a single upstream round trip: the request or the decode.
    #[derive(Debug, Error)]
    pub enum UpstreamError {
        #[error(transparent)]
        Fetch(#[from] FetchError),
        #[error(transparent)]
        Parse(#[from] ParseError),
    }

    #[derive(Debug, Error)]
    pub enum BuildError {
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error(transparent)]
        Fetch(#[from] FetchError),
        #[error(transparent)]
        Parse(#[from] ParseError),
        #[error(transparent)]
        Geocode(#[from] GeocodeError),
        #[error(transparent)]
        Extraction(#[from] ExtractionError),
        #[error("failed to read {path}: {source}")]
        ReadFile {
            path: String,
            #[source]
            source: std::io::Error,
        },
        #[error("failed to decode {path}: {source}")]
        DecodeFile {
            path: String,
            #[source]
            source: serde_json::Error,
        },
    }

    impl From<UpstreamError> for BuildError {
        fn from(e: UpstreamError) -> Self {
            match e {
                UpstreamError::Fetch(e) => Self::Fetch(e),
                UpstreamError::Parse(e) => Self::Parse(e),
            }
        }
    }
}
