pub mod alerts;
pub mod cities;

use crate::HttpConfig;
use crate::error::{ConfigError, FetchError, ParseError, UpstreamError};
use reqwest::header::HeaderMap;
use reqwest::{Client, Proxy};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const ALERTS_ENDPOINT: &str = "https://www.oref.org.il/WarningMessages/alert/alerts.json";
pub const ALERTS_REFERER: &str = "https://www.oref.org.il/11226-he/pakar.aspx";
pub const CITY_NOTES_ENDPOINT: &str =
    "https://www.oref.org.il/Shared/Ajax/GetCityNotes.aspx?lang=he&citycode=";

pub fn cities_url(lang: &str) -> String {
    format!("https://alerts-history.oref.org.il/Shared/Ajax/GetCitiesMix.aspx?lang={lang}")
}

#[derive(Clone, Debug)]
pub struct HfcClient {
    client: Client,
}

impl HfcClient {
    pub const fn new_with_client(client: Client) -> Self {
        Self { client }
    }

    /// Builds a reqwest client carrying the browser user agent, the optional proxy
    /// and the optional request timeout.
    pub fn from_config(config: &HttpConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());

        if let Some(proxy_config) = &config.proxy {
            let mut proxy = Proxy::all(proxy_config.url.as_str()).map_err(ConfigError::Proxy)?;
            if let Some(user) = &proxy_config.user {
                proxy = proxy.basic_auth(user, proxy_config.password.as_deref().unwrap_or_default());
            }
            builder = builder.proxy(proxy);
        }

        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(ConfigError::HttpClient)?;
        Ok(Self::new_with_client(client))
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub async fn get_bytes(&self, url: &str, headers: HeaderMap) -> Result<Vec<u8>, FetchError> {
        debug!(url, "fetching bytes");
        let bytes = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| fetch_error(url, source))?
            .bytes()
            .await
            .map_err(|source| fetch_error(url, source))?;
        Ok(bytes.to_vec())
    }

    /// GETs `url` and decodes the body as JSON, keeping the raw body on decode failure.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, UpstreamError> {
        debug!(url, "fetching JSON");
        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| fetch_error(url, source))?
            .text()
            .await
            .map_err(|source| fetch_error(url, source))?;

        let parsed = serde_json::from_str::<T>(strip_utf8_bom(&body));
        Ok(parsed.map_err(|source| ParseError::Json { source, body })?)
    }
}

fn fetch_error(url: &str, source: reqwest::Error) -> FetchError {
    FetchError::Request {
        url: url.to_string(),
        source,
    }
}

fn strip_utf8_bom(body: &str) -> &str {
    body.strip_prefix('\u{FEFF}').unwrap_or(body)
}
