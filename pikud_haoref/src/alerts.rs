use crate::AlertsConfig;
use crate::error::{FetchError, ParseError, UpstreamError};
use crate::hfc::HfcClient;
use crate::hfc::alerts::{AlertPayload, CategoryCode};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Marks test and drill entries in the affected cities list.
pub const DRILL_MARKER: &str = "בדיקה";

/// Stray control character the alerts endpoint sometimes embeds in its payload.
const STRAY_CONTROL_CHAR: char = '\u{0A7B}';

const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertType {
    None,
    Missiles,
    General,
    EarthQuake,
    RadiologicalEvent,
    Tsunami,
    HostileAircraftIntrusion,
    HazardousMaterials,
    TerroristInfiltration,
    MissilesDrill,
    GeneralDrill,
    EarthQuakeDrill,
    RadiologicalEventDrill,
    TsunamiDrill,
    HostileAircraftIntrusionDrill,
    HazardousMaterialsDrill,
    TerroristInfiltrationDrill,
    Unknown,
}

impl AlertType {
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => AlertType::Missiles,
            2 => AlertType::General,
            3 => AlertType::EarthQuake,
            4 => AlertType::RadiologicalEvent,
            5 => AlertType::Tsunami,
            6 => AlertType::HostileAircraftIntrusion,
            7 => AlertType::HazardousMaterials,
            13 => AlertType::TerroristInfiltration,
            101 => AlertType::MissilesDrill,
            102 => AlertType::GeneralDrill,
            103 => AlertType::EarthQuakeDrill,
            104 => AlertType::RadiologicalEventDrill,
            105 => AlertType::TsunamiDrill,
            106 => AlertType::HostileAircraftIntrusionDrill,
            107 => AlertType::HazardousMaterialsDrill,
            113 => AlertType::TerroristInfiltrationDrill,
            _ => AlertType::Unknown,
        }
    }

    /// Missing category means missiles, which is what the endpoint omits it for.
    pub fn from_category(category: Option<&CategoryCode>) -> Self {
        match category.and_then(CategoryCode::code) {
            None => AlertType::Missiles,
            Some(Some(code)) => AlertType::from_code(code),
            Some(None) => AlertType::Unknown,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            AlertType::None => "none",
            AlertType::Missiles => "missiles",
            AlertType::General => "general",
            AlertType::EarthQuake => "earthQuake",
            AlertType::RadiologicalEvent => "radiologicalEvent",
            AlertType::Tsunami => "tsunami",
            AlertType::HostileAircraftIntrusion => "hostileAircraftIntrusion",
            AlertType::HazardousMaterials => "hazardousMaterials",
            AlertType::TerroristInfiltration => "terroristInfiltration",
            AlertType::MissilesDrill => "missilesDrill",
            AlertType::GeneralDrill => "generalDrill",
            AlertType::EarthQuakeDrill => "earthQuakeDrill",
            AlertType::RadiologicalEventDrill => "radiologicalEventDrill",
            AlertType::TsunamiDrill => "tsunamiDrill",
            AlertType::HostileAircraftIntrusionDrill => "hostileAircraftIntrusionDrill",
            AlertType::HazardousMaterialsDrill => "hazardousMaterialsDrill",
            AlertType::TerroristInfiltrationDrill => "terroristInfiltrationDrill",
            AlertType::Unknown => "unknown",
        }
    }
}

impl Display for AlertType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub cities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Alert {
    /// Steady state of the endpoint: nothing is active.
    pub const fn none() -> Self {
        Self {
            alert_type: AlertType::None,
            cities: Vec::new(),
            instructions: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cities.is_empty()
    }
}

impl From<AlertPayload> for Alert {
    fn from(payload: AlertPayload) -> Self {
        let mut seen = HashSet::new();
        let cities = payload
            .data
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty() && !is_drill_entry(city))
            .filter(|city| seen.insert(city.clone()))
            .collect();

        Self {
            alert_type: AlertType::from_category(payload.cat.as_ref()),
            cities,
            instructions: payload.desc.filter(|desc| !desc.is_empty()),
        }
    }
}

fn is_drill_entry(city: &str) -> bool {
    city.to_lowercase().contains(&DRILL_MARKER.to_lowercase())
}

/// Decodes the raw alerts body, honoring a UTF-16LE or UTF-8 byte order mark.
pub fn decode_body(bytes: &[u8]) -> String {
    let text = if let Some(rest) = bytes.strip_prefix(&UTF16LE_BOM) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        let rest = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
        String::from_utf8_lossy(rest).into_owned()
    };

    text.replace(STRAY_CONTROL_CHAR, "")
}

/// Parses a decoded body. Blank bodies and JSON that is not an object are the
/// "no alert" state, not an error.
pub fn parse_alert(body: &str) -> Result<Alert, ParseError> {
    if body.trim().is_empty() {
        return Ok(Alert::none());
    }

    let json_error = |source| ParseError::Json {
        source,
        body: body.to_string(),
    };
    let value: serde_json::Value = serde_json::from_str(body).map_err(json_error)?;
    if !value.is_object() {
        debug!(body, "alerts payload is not an object");
        return Ok(Alert::none());
    }

    let payload: AlertPayload = serde_json::from_value(value).map_err(json_error)?;
    Ok(Alert::from(payload))
}

#[derive(Clone, Debug)]
pub struct AlertFetcher {
    client: HfcClient,
    config: AlertsConfig,
}

impl AlertFetcher {
    pub const fn new(client: HfcClient, config: AlertsConfig) -> Self {
        Self { client, config }
    }

    pub async fn get_active_alert(&self) -> Result<Alert, UpstreamError> {
        let url = cache_busted_url(&self.config.url, Utc::now().timestamp());
        let bytes = self.client.get_bytes(&url, self.headers()?).await?;
        debug!(len = bytes.len(), "fetched alerts payload");

        Ok(parse_alert(&decode_body(&bytes))?)
    }

    fn headers(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_str(&self.config.referer)?);
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        Ok(headers)
    }
}

fn cache_busted_url(base: &str, timestamp: i64) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{timestamp}")
}
