use crate::alerts::Alert;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(180);

/// Suppresses repeat notifications for a city that alerted within the cooldown.
#[derive(Debug, Clone)]
pub struct AlertPoller {
    cooldown_secs: i64,
    recently_alerted: HashMap<String, i64>,
}

impl Default for AlertPoller {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl AlertPoller {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown_secs: i64::try_from(cooldown.as_secs()).unwrap_or(i64::MAX),
            recently_alerted: HashMap::new(),
        }
    }

    /// Returns the cities not alerted within the cooldown, stamping each with `now`
    /// (unix seconds).
    pub fn extract_new_cities(&mut self, cities: &[String], now: i64) -> Vec<String> {
        let threshold = now.saturating_sub(self.cooldown_secs);
        let mut new_cities = Vec::new();
        for city in cities {
            let is_new = self
                .recently_alerted
                .get(city)
                .is_none_or(|&last| last < threshold);
            if is_new {
                new_cities.push(city.clone());
                self.recently_alerted.insert(city.clone(), now);
            }
        }
        new_cities
    }

    /// Narrows `alert` to its new cities.
    pub fn filter(&mut self, mut alert: Alert, now: i64) -> Alert {
        alert.cities = self.extract_new_cities(&alert.cities, now);
        alert
    }

    pub fn last_alerted(&self, city: &str) -> Option<i64> {
        self.recently_alerted.get(city).copied()
    }
}
