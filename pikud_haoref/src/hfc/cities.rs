use serde::Deserialize;
use std::fmt::{Display, Formatter};

/// One row of the `GetCitiesMix` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CityEntry {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub mixname: Option<String>,
    #[serde(default)]
    pub value: Option<Scalar>,
    #[serde(default)]
    pub areaid: Option<Scalar>,
    #[serde(default)]
    pub id: Option<Scalar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityNotes {
    #[serde(default)]
    pub time_notes: String,
}

/// Identifier fields flip between JSON strings and numbers across endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Number(n) => n.as_u64(),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}
