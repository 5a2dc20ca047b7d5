use crate::error::BuildError;
use crate::metadata::read_json_file;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Public shelters keyed by exact Hebrew city name.
#[derive(Default, Debug, Clone)]
pub struct ShelterTable {
    by_city: HashMap<String, Vec<Shelter>>,
}

impl ShelterTable {
    pub fn new(by_city: HashMap<String, Vec<Shelter>>) -> Self {
        Self { by_city }
    }

    pub async fn load(path: &Path) -> Result<Self, BuildError> {
        match read_json_file::<HashMap<String, Vec<Shelter>>>(path).await? {
            Some(by_city) => {
                info!(path = %path.display(), cities = by_city.len(), "loaded shelters table");
                Ok(Self::new(by_city))
            }
            None => {
                warn!(path = %path.display(), "shelters file not found, continuing without shelters");
                Ok(Self::default())
            }
        }
    }

    pub fn for_city(&self, name: &str) -> Option<&[Shelter]> {
        self.by_city
            .get(name)
            .map(Vec::as_slice)
            .filter(|shelters| !shelters.is_empty())
    }
}
