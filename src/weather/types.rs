//! Forecast data types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast day for a resolved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub max_temp: f64,
    pub min_temp: f64,
    /// Percent; range is enforced by the forecast shape, not here
    pub precipitation_chance: f64,
    pub condition: String,
    /// Canonical place name returned by the geocoder
    pub location: String,
}

/// Result of geocoding a place name
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
}
