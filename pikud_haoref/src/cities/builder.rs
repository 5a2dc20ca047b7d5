use crate::cities::{CityListing, CityMetadata, CityRecord, Language};
use crate::error::{BuildError, ConfigError, ParseError};
use crate::geocoding::Geocoder;
use crate::geolocation::Coordinates;
use crate::hfc::HfcClient;
use crate::hfc::cities::{CityEntry, CityNotes};
use crate::metadata::read_json_file;
use crate::metadata::shelters::ShelterTable;
use crate::metadata::time_identifiers::{self, Countdown};
use crate::{CitiesConfig, Config, GeocodingConfig};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Upstream aggregate entries carry one of these in their English or Hebrew name.
const ALL_AREAS_MARKER: &str = "All Areas";
const ALL_AREAS_MARKER_HE: &str = "כל האזורים";

/// Cities whose notes endpoint is known to be wrong.
const COUNTDOWN_OVERRIDES: [(&str, &str); 2] = [
    ("גבעת ברנר", time_identifiers::MINUTE_AND_A_HALF),
    ("אשדוד - איזור תעשייה צפוני", time_identifiers::SECONDS_45),
];

pub struct CityMetadataBuilder {
    client: HfcClient,
    geocoder: Geocoder,
    config: CitiesConfig,
    cache: Vec<CityMetadata>,
    shelters: ShelterTable,
}

impl CityMetadataBuilder {
    /// Fails with [`ConfigError::MissingGeocodingKey`] before anything is fetched.
    pub fn new(
        client: HfcClient,
        config: CitiesConfig,
        geocoding: &GeocodingConfig,
    ) -> Result<Self, ConfigError> {
        let geocoder = Geocoder::new(client.http().clone(), geocoding)?;
        Ok(Self {
            client,
            geocoder,
            config,
            cache: Vec::new(),
            shelters: ShelterTable::default(),
        })
    }

    /// Builds the HTTP client from config and loads the cache snapshot and
    /// shelters table files when configured.
    pub async fn from_config(config: &Config) -> Result<Self, BuildError> {
        let client = HfcClient::from_config(&config.http)?;
        let mut builder = Self::new(client, config.cities.clone(), &config.geocoding)?;

        if let Some(path) = &config.cities.cache_file {
            builder = builder.with_cache(load_cache_snapshot(path).await?);
        }
        if let Some(path) = &config.cities.shelters_file {
            builder = builder.with_shelters(ShelterTable::load(path).await?);
        }

        Ok(builder)
    }

    pub fn with_cache(mut self, cache: Vec<CityMetadata>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_shelters(mut self, shelters: ShelterTable) -> Self {
        self.shelters = shelters;
        self
    }

    pub async fn build(&self) -> Result<Vec<CityMetadata>, BuildError> {
        let cities = self.fetch_listing(&self.config.cities_url).await?;
        info!(count = cities.len(), "fetched city list");

        let mut translations = Vec::with_capacity(self.config.translations.len());
        for (&lang, url) in &self.config.translations {
            let listing = self.fetch_listing(url).await?;
            debug!(lang = lang.code(), count = listing.len(), "fetched translated city list");
            translations.push((lang, listing));
        }
        let languages: Vec<Language> = translations.iter().map(|(lang, _)| *lang).collect();

        let mut cache: HashMap<&str, &CityMetadata> = HashMap::new();
        for cached in &self.cache {
            cache.entry(cached.name.as_str()).or_insert(cached);
        }

        let mut metadata = vec![CityMetadata::select_all(&languages)];
        let mut values = HashSet::new();

        for city in cities.iter() {
            let mut id = city.numeric_id.unwrap_or_default();
            let mut location = Coordinates::ZERO;

            if let Some(cached) = cache.get(city.name.as_str()) {
                if cached.id != 0 {
                    id = cached.id;
                }
                if cached.location().is_resolved() {
                    location = cached.location();
                }
            }

            if !location.is_resolved() {
                location = self.geocoder.geocode(&city.name).await?;
            }

            let countdown = self.countdown_for(city).await?;

            let mut result = CityMetadata {
                id,
                name: city.name.clone(),
                zone: city.zone.clone(),
                time: countdown.time.to_string(),
                countdown: countdown.countdown,
                lat: location.lat,
                lng: location.lng,
                value: city.name.clone(),
                shelters: self.shelters.for_city(&city.name).map(<[_]>::to_vec),
                ..CityMetadata::default()
            };

            for (lang, listing) in &translations {
                let translated = listing.get(&city.city_id);
                result.set_translation(
                    *lang,
                    translated.map(|t| t.name.clone()),
                    translated.map(|t| t.zone.clone()),
                    Some(countdown.localized(*lang).to_string()),
                );
            }

            if result.name.contains(ALL_AREAS_MARKER_HE)
                || result
                    .name_en
                    .as_deref()
                    .is_some_and(|name| name.contains(ALL_AREAS_MARKER))
            {
                info!(city = %result.value, "ignoring \"All Areas\" city");
                continue;
            }

            if !values.insert(result.value.clone()) {
                info!(city = %result.value, "duplicate city");
                continue;
            }

            metadata.push(result);
        }

        sort_metadata(&mut metadata);
        Ok(metadata)
    }

    async fn fetch_listing(&self, url: &str) -> Result<CityListing, BuildError> {
        let entries: Vec<CityEntry> = self.client.get_json(url).await?;
        CityListing::from_entries(url, &entries)
    }

    pub async fn countdown_for(&self, city: &CityRecord) -> Result<&'static Countdown, BuildError> {
        if let Some((_, label)) = COUNTDOWN_OVERRIDES
            .iter()
            .find(|(name, _)| *name == city.name)
        {
            return lookup_countdown(label);
        }

        let url = format!("{}{}", self.config.notes_url, city.value);
        info!(city = %city.name, "fetching countdown for city");

        let notes: Vec<CityNotes> = self.client.get_json(&url).await?;
        let first = notes
            .into_iter()
            .next()
            .ok_or(ParseError::EmptyResponse { url })?;

        lookup_countdown(&first.time_notes)
    }
}

fn lookup_countdown(label: &str) -> Result<&'static Countdown, BuildError> {
    time_identifiers::lookup(label).ok_or_else(|| {
        warn!(label, "unexpected time identifier");
        ParseError::UnknownTimeIdentifier(label.to_string()).into()
    })
}

/// "Select all" first, then by Hebrew name.
pub fn sort_metadata(metadata: &mut [CityMetadata]) {
    metadata.sort_by(|a, b| {
        b.is_select_all()
            .cmp(&a.is_select_all())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Reads a previous `cities.json`. A missing file is an empty snapshot.
pub async fn load_cache_snapshot(path: &Path) -> Result<Vec<CityMetadata>, BuildError> {
    match read_json_file::<Vec<CityMetadata>>(path).await? {
        Some(snapshot) => {
            info!(path = %path.display(), count = snapshot.len(), "loaded cache snapshot");
            Ok(snapshot)
        }
        None => {
            warn!(path = %path.display(), "cache snapshot not found, every city will be geocoded");
            Ok(Vec::new())
        }
    }
}
