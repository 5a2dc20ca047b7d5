use crate::cities::Language;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Advertised time to reach shelter, keyed by its Hebrew label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub countdown: u32,
    pub time: &'static str,
    pub time_en: &'static str,
    pub time_ru: &'static str,
    pub time_ar: &'static str,
    pub time_de: &'static str,
}

impl Countdown {
    pub const fn localized(&self, lang: Language) -> &'static str {
        match lang {
            Language::En => self.time_en,
            Language::Ru => self.time_ru,
            Language::Ar => self.time_ar,
            Language::De => self.time_de,
        }
    }
}

pub const IMMEDIATELY: &str = "מיידי";
pub const SECONDS_15: &str = "15 שניות";
pub const SECONDS_30: &str = "30 שניות";
pub const SECONDS_45: &str = "45 שניות";
pub const MINUTE: &str = "דקה";
pub const MINUTE_AND_A_HALF: &str = "דקה וחצי";
pub const MINUTES_3: &str = "3 דקות";

pub static TIME_IDENTIFIERS: [Countdown; 7] = [
    Countdown {
        countdown: 0,
        time: IMMEDIATELY,
        time_en: "Immediately",
        time_ru: "Немедленно",
        time_ar: "في الحال",
        time_de: "Sofort",
    },
    Countdown {
        countdown: 15,
        time: SECONDS_15,
        time_en: "15 seconds",
        time_ru: "15 секунд",
        time_ar: "۱٥ ثانية",
        time_de: "15 Sekunden",
    },
    Countdown {
        countdown: 30,
        time: SECONDS_30,
        time_en: "30 seconds",
        time_ru: "30 секунд",
        time_ar: "۳۰ ثانية",
        time_de: "30 Sekunden",
    },
    Countdown {
        countdown: 45,
        time: SECONDS_45,
        time_en: "45 seconds",
        time_ru: "45 секунд",
        time_ar: "٤٥ ثانية",
        time_de: "45 Sekunden",
    },
    Countdown {
        countdown: 60,
        time: MINUTE,
        time_en: "A minute",
        time_ru: "Минута",
        time_ar: "دقيقة",
        time_de: "Eine Minute",
    },
    Countdown {
        countdown: 90,
        time: MINUTE_AND_A_HALF,
        time_en: "A minute and a half",
        time_ru: "Полторы минуты",
        time_ar: "دقيقة ونصف",
        time_de: "Eineinhalb Minuten",
    },
    Countdown {
        countdown: 180,
        time: MINUTES_3,
        time_en: "3 minutes",
        time_ru: "3 минуты",
        time_ar: "۳ دقائق",
        time_de: "3 Minuten",
    },
];

static BY_LABEL: LazyLock<HashMap<&'static str, &'static Countdown>> = LazyLock::new(|| {
    TIME_IDENTIFIERS
        .iter()
        .map(|countdown| (countdown.time, countdown))
        .collect()
});

pub fn lookup(label: &str) -> Option<&'static Countdown> {
    BY_LABEL.get(label.trim()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_is_reachable_and_localized() {
        for entry in &TIME_IDENTIFIERS {
            let found = lookup(entry.time).expect("label present");
            assert_eq!(found, entry);
            for lang in Language::ALL {
                assert!(!found.localized(lang).is_empty());
            }
        }
    }

    #[test]
    fn unknown_label_misses() {
        assert!(lookup("שעה").is_none());
        assert_eq!(lookup(" דקה ").map(|c| c.countdown), Some(60));
    }
}
