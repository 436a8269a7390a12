//! Mock forecast source for testing

use super::{condition_label, FetchError, ForecastEntry, ForecastSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

/// Forecast source answering from a fixed table of places.
///
/// Unknown places yield `FetchError::NotFound`, like a geocoder with zero
/// matches.
#[derive(Default)]
pub struct MockForecastSource {
    places: HashMap<String, Vec<ForecastEntry>>,
    /// Places requested, in call order
    pub requests: Mutex<Vec<String>>,
}

impl MockForecastSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, place: &str, entries: Vec<ForecastEntry>) -> Self {
        self.places.insert(place.to_string(), entries);
        self
    }

    pub fn recorded_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForecastSource for MockForecastSource {
    async fn forecast(&self, place: &str) -> Result<Vec<ForecastEntry>, FetchError> {
        self.requests.lock().unwrap().push(place.to_string());
        self.places
            .get(place)
            .cloned()
            .ok_or_else(|| FetchError::not_found(place))
    }
}

/// A few consecutive days of plausible weather for `location`
pub fn sample_forecast(location: &str, codes: &[i64]) -> Vec<ForecastEntry> {
    codes
        .iter()
        .zip(1u32..)
        .map(|(code, day)| ForecastEntry {
            date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            max_temp: 20.0,
            min_temp: 12.0,
            precipitation_chance: 25.0,
            condition: condition_label(*code).to_string(),
            location: location.to_string(),
        })
        .collect()
}
