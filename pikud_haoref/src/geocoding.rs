use crate::GeocodingConfig;
use crate::error::{BuildError, ConfigError, FetchError, GeocodeError, ParseError};
use crate::geolocation::{Coordinates, is_within_radius};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

pub const GOOGLE_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: Coordinates,
}

#[derive(Clone, Debug)]
pub struct Geocoder {
    client: Client,
    api_key: String,
    url: String,
    center: Coordinates,
    radius_km: f64,
}

impl Geocoder {
    pub fn new(client: Client, config: &GeocodingConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingGeocodingKey)?;

        Ok(Self {
            client,
            api_key,
            url: config.url.clone(),
            center: config.center,
            radius_km: config.radius_km,
        })
    }

    /// Resolves `city_name` to the first candidate inside the validity radius.
    /// Returns [`Coordinates::ZERO`] when the provider has nothing acceptable.
    pub async fn geocode(&self, city_name: &str) -> Result<Coordinates, BuildError> {
        let address = format!("{city_name}, Israel");
        debug!(city = city_name, "geocoding city");

        let body = self
            .client
            .get(&self.url)
            .query(&[
                ("address", address.as_str()),
                ("region", "il"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| self.fetch_error(source))?
            .text()
            .await
            .map_err(|source| self.fetch_error(source))?;

        let parsed = serde_json::from_str::<GeocodeResponse>(&body);
        let response = parsed.map_err(|source| ParseError::Json { source, body })?;

        Ok(self.select_location(city_name, response)?)
    }

    fn select_location(
        &self,
        city_name: &str,
        response: GeocodeResponse,
    ) -> Result<Coordinates, GeocodeError> {
        if response.status != STATUS_OK && response.status != STATUS_ZERO_RESULTS {
            return Err(GeocodeError {
                status: response.status,
            });
        }

        for result in response.results {
            let location = result.geometry.location;
            if is_within_radius(self.center, self.radius_km, location) {
                return Ok(location);
            }
            warn!(
                city = city_name,
                lat = location.lat,
                lng = location.lng,
                "geocoding result is outside Israel"
            );
        }

        warn!(city = city_name, "geocoding failed");
        Ok(Coordinates::ZERO)
    }

    fn fetch_error(&self, source: reqwest::Error) -> FetchError {
        FetchError::Request {
            url: self.url.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geocoder() -> Geocoder {
        let config = GeocodingConfig {
            api_key: Some("test-key".to_string()),
            ..GeocodingConfig::default()
        };
        Geocoder::new(Client::new(), &config).expect("key is set")
    }

    fn result(lat: f64, lng: f64) -> GeocodeResult {
        GeocodeResult {
            geometry: Geometry {
                location: Coordinates { lat, lng },
            },
        }
    }

    #[test]
    fn missing_or_blank_key_is_config_error() {
        let blank = GeocodingConfig {
            api_key: Some("  ".to_string()),
            ..GeocodingConfig::default()
        };
        assert!(matches!(
            Geocoder::new(Client::new(), &GeocodingConfig::default()),
            Err(ConfigError::MissingGeocodingKey)
        ));
        assert!(matches!(
            Geocoder::new(Client::new(), &blank),
            Err(ConfigError::MissingGeocodingKey)
        ));
    }

    #[test]
    fn skips_candidates_outside_radius() {
        let response = GeocodeResponse {
            status: STATUS_OK.to_string(),
            // Paris, then Haifa
            results: vec![result(48.8566, 2.3522), result(32.794, 34.9896)],
        };
        let location = geocoder().select_location("חיפה", response).unwrap();
        assert_eq!(location, Coordinates { lat: 32.794, lng: 34.9896 });
    }

    #[test]
    fn all_rejected_resolves_to_zero() {
        let response = GeocodeResponse {
            status: STATUS_OK.to_string(),
            results: vec![result(48.8566, 2.3522)],
        };
        let location = geocoder().select_location("פריז", response).unwrap();
        assert_eq!(location, Coordinates::ZERO);

        let empty = GeocodeResponse {
            status: STATUS_ZERO_RESULTS.to_string(),
            results: Vec::new(),
        };
        assert_eq!(
            geocoder().select_location("x", empty).unwrap(),
            Coordinates::ZERO
        );
    }

    #[test]
    fn provider_failure_is_geocode_error() {
        let response = GeocodeResponse {
            status: "REQUEST_DENIED".to_string(),
            results: Vec::new(),
        };
        let err = geocoder().select_location("x", response).unwrap_err();
        assert_eq!(err.status, "REQUEST_DENIED");
    }
}
