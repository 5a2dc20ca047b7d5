pub mod builder;
pub mod listing;

use crate::geolocation::Coordinates;
use crate::metadata::shelters::Shelter;
use serde::{Deserialize, Serialize};

pub use builder::{CityMetadataBuilder, load_cache_snapshot, sort_metadata};
pub use listing::{CityListing, CityRecord, clean_label, extract_zone};

/// `value` of the synthetic "select all" entry.
pub const SELECT_ALL_VALUE: &str = "all";

/// Additional display languages the HFC city listing is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
    Ar,
    De,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Ru, Language::Ar, Language::De];

    pub const fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Ar => "ar",
            Language::De => "de",
        }
    }

    const fn select_all_label(&self) -> &'static str {
        match self {
            Language::En => "Select All",
            Language::Ru => "Выбрать все",
            Language::Ar => "اختر الكل",
            Language::De => "Alle auswählen",
        }
    }
}

/// One entry of the generated `cities.json`. Per-language fields are `None`
/// when the language is not configured or the translated listing lacks the city.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityMetadata {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_ru: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_de: Option<String>,
    pub zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_ru: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_ar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_de: Option<String>,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ru: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_de: Option<String>,
    pub countdown: u32,
    pub lat: f64,
    pub lng: f64,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelters: Option<Vec<Shelter>>,
}

impl CityMetadata {
    pub fn select_all(languages: &[Language]) -> Self {
        let mut entry = Self {
            id: 0,
            name: "בחר הכל".to_string(),
            time: SELECT_ALL_VALUE.to_string(),
            value: SELECT_ALL_VALUE.to_string(),
            ..Self::default()
        };
        for &lang in languages {
            entry.set_translation(
                lang,
                Some(lang.select_all_label().to_string()),
                Some(String::new()),
                Some(String::new()),
            );
        }
        entry
    }

    pub fn is_select_all(&self) -> bool {
        self.value == SELECT_ALL_VALUE
    }

    pub fn location(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }

    pub fn name_in(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::En => self.name_en.as_deref(),
            Language::Ru => self.name_ru.as_deref(),
            Language::Ar => self.name_ar.as_deref(),
            Language::De => self.name_de.as_deref(),
        }
    }

    pub fn set_translation(
        &mut self,
        lang: Language,
        name: Option<String>,
        zone: Option<String>,
        time: Option<String>,
    ) {
        let (name_slot, zone_slot, time_slot) = match lang {
            Language::En => (&mut self.name_en, &mut self.zone_en, &mut self.time_en),
            Language::Ru => (&mut self.name_ru, &mut self.zone_ru, &mut self.time_ru),
            Language::Ar => (&mut self.name_ar, &mut self.zone_ar, &mut self.time_ar),
            Language::De => (&mut self.name_de, &mut self.zone_de, &mut self.time_de),
        };
        *name_slot = name;
        *zone_slot = zone;
        *time_slot = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all_only_carries_configured_languages() {
        let entry = CityMetadata::select_all(&[Language::En, Language::Ru]);
        assert!(entry.is_select_all());
        assert_eq!(entry.name_in(Language::En), Some("Select All"));
        assert_eq!(entry.name_in(Language::Ru), Some("Выбрать все"));
        assert_eq!(entry.name_in(Language::Ar), None);
        assert_eq!(entry.zone_en.as_deref(), Some(""));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["time"], "all");
        assert!(json.get("name_ar").is_none());
        assert!(json.get("shelters").is_none());
    }

    #[test]
    fn snapshot_entries_tolerate_missing_fields() {
        let entry: CityMetadata =
            serde_json::from_str(r#"{"name":"חיפה","value":"חיפה","lat":32.79,"lng":34.98}"#)
                .unwrap();
        assert_eq!(entry.id, 0);
        assert!(entry.location().is_resolved());
        assert_eq!(entry.name_en, None);
    }
}
