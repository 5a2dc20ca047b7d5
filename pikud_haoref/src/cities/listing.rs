use crate::error::{BuildError, ExtractionError, ParseError};
use crate::hfc::cities::CityEntry;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static ZONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<span>(.+?)</span>").expect("zone pattern is valid"));

/// A city as published by one listing endpoint, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub city_id: String,
    pub numeric_id: Option<u64>,
    /// Upstream `value`, the key of the per-city notes endpoint.
    pub value: String,
    pub area_id: Option<String>,
    pub name: String,
    pub zone: String,
    pub label: String,
}

impl CityRecord {
    pub fn from_entry(entry: &CityEntry) -> Result<Option<Self>, ExtractionError> {
        let Some(label) = entry.label.as_deref().filter(|l| !l.trim().is_empty()) else {
            return Ok(None);
        };

        let label = clean_label(label);
        let missing = |field| ExtractionError {
            label: label.clone(),
            field,
        };
        let zone = entry
            .mixname
            .as_deref()
            .and_then(extract_zone)
            .ok_or_else(|| missing("zone"))?;
        let id = entry.id.as_ref().ok_or_else(|| missing("id"))?;
        let value = entry.value.as_ref().ok_or_else(|| missing("value"))?;

        Ok(Some(Self {
            city_id: id.to_string(),
            numeric_id: id.as_u64(),
            value: value.to_string(),
            area_id: entry.areaid.as_ref().map(ToString::to_string),
            name: label.clone(),
            zone,
            label,
        }))
    }
}

/// Cities of one listing in upstream order, addressable by source city id.
#[derive(Default, Debug, Clone)]
pub struct CityListing {
    records: Vec<CityRecord>,
    by_id: HashMap<String, usize>,
}

impl CityListing {
    pub fn from_entries(url: &str, entries: &[CityEntry]) -> Result<Self, BuildError> {
        if entries.is_empty() {
            return Err(ParseError::EmptyResponse {
                url: url.to_string(),
            }
            .into());
        }

        let mut listing = Self::default();
        for entry in entries {
            if let Some(record) = CityRecord::from_entry(entry)? {
                listing.insert(record);
            }
        }
        Ok(listing)
    }

    /// A repeated id replaces the earlier record in place.
    fn insert(&mut self, record: CityRecord) {
        match self.by_id.get(&record.city_id) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.by_id.insert(record.city_id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, city_id: &str) -> Option<&CityRecord> {
        self.by_id.get(city_id).map(|&idx| &self.records[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CityRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn extract_zone(mixname: &str) -> Option<String> {
    ZONE_PATTERN
        .captures(mixname)
        .and_then(|captures| captures.get(1))
        .map(|zone| zone.as_str().to_string())
}

/// Normalizes a listing label into the display name.
pub fn clean_label(label: &str) -> String {
    let collapsed = label
        .split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    uppercase_words(collapsed.trim())
        .replace(" Of ", " of ")
        .replace("''", "'")
}

fn uppercase_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        if word_start && (c.is_ascii_alphanumeric() || c == '_') {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        word_start = c == ' ';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hfc::cities::Scalar;

    fn entry(id: &str, label: &str, mixname: &str) -> CityEntry {
        CityEntry {
            label: Some(label.to_string()),
            mixname: Some(mixname.to_string()),
            value: Some(Scalar::Text(format!("V{id}"))),
            areaid: Some(Scalar::Number(7.into())),
            id: Some(Scalar::Text(id.to_string())),
        }
    }

    #[test]
    fn cleans_labels() {
        assert_eq!(clean_label("  tel  aviv - yafo "), "Tel Aviv - Yafo");
        assert_eq!(clean_label("mevo'ot of the hermon"), "Mevo'ot of The Hermon");
        assert_eq!(clean_label("gan ha''darom"), "Gan Ha'darom");
        assert_eq!(clean_label("תל אביב - מרכז העיר"), "תל אביב - מרכז העיר");
    }

    #[test]
    fn extracts_zone_case_insensitively() {
        assert_eq!(
            extract_zone("תל אביב <SPAN>דן</SPAN>").as_deref(),
            Some("דן")
        );
        assert_eq!(extract_zone("no markup"), None);
    }

    #[test]
    fn missing_zone_markup_aborts() {
        let entries = vec![entry("1", "חיפה", "<span>חיפה</span>"), entry("2", "עכו", "עכו")];
        let err = CityListing::from_entries("stub", &entries).unwrap_err();
        assert!(matches!(err, BuildError::Extraction(e) if e.label == "עכו" && e.field == "zone"));
    }

    #[test]
    fn blank_rows_with_null_fields_are_skipped() {
        let body = r#"[
            {"label":"","mixname":null,"value":null,"id":null,"areaid":null},
            {"label":"חיפה","mixname":"חיפה <span>חיפה והקריות</span>","value":"C2","id":"2","areaid":5}
        ]"#;
        let entries: Vec<CityEntry> = serde_json::from_str(body).unwrap();
        let listing = CityListing::from_entries("stub", &entries).unwrap();
        assert_eq!(listing.len(), 1);
        let haifa = listing.get("2").unwrap();
        assert_eq!(haifa.value, "C2");
        assert_eq!(haifa.zone, "חיפה והקריות");
    }

    #[test]
    fn labeled_row_without_id_aborts() {
        let mut orphan = entry("4", "עכו", "<span>גליל מערבי</span>");
        orphan.id = None;
        let err = CityListing::from_entries("stub", &[orphan]).unwrap_err();
        assert!(matches!(err, BuildError::Extraction(e) if e.field == "id"));
    }

    #[test]
    fn empty_listing_is_parse_error() {
        let err = CityListing::from_entries("stub", &[]).unwrap_err();
        assert!(matches!(err, BuildError::Parse(ParseError::EmptyResponse { .. })));
    }

    #[test]
    fn skips_blank_labels_and_keeps_order() {
        let mut blank = entry("3", "", "");
        blank.label = None;
        let entries = vec![
            entry("9", "צפת", "<span>צפון</span>"),
            blank,
            entry("2", "אילת", "<span>אילות</span>"),
        ];
        let listing = CityListing::from_entries("stub", &entries).unwrap();
        let names: Vec<_> = listing.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["צפת", "אילת"]);
        let eilat = listing.get("2").unwrap();
        assert_eq!(eilat.zone, "אילות");
        assert_eq!(eilat.numeric_id, Some(2));
        assert_eq!(eilat.value, "V2");
        assert_eq!(eilat.area_id.as_deref(), Some("7"));
    }
}
