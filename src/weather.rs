//! Weather forecast lookup
//!
//! Resolves a place name to coordinates and fetches a daily forecast for it.
//! Callers depend on the [`ForecastSource`] trait; [`OpenMeteoClient`] is the
//! production implementation.

mod client;
mod conditions;
mod error;
mod types;
pub mod workflow;

#[cfg(test)]
pub mod testing;

pub use client::{OpenMeteoClient, OpenMeteoConfig};
pub use conditions::{condition_label, UNKNOWN_CONDITION};
pub use error::FetchError;
pub use types::{ForecastEntry, GeoLocation};

use crate::schema::{Field, Shape};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of daily forecasts for a named place
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Forecast for `place`, one entry per day in provider order
    async fn forecast(&self, place: &str) -> Result<Vec<ForecastEntry>, FetchError>;
}

#[async_trait]
impl<T: ForecastSource + ?Sized> ForecastSource for Arc<T> {
    async fn forecast(&self, place: &str) -> Result<Vec<ForecastEntry>, FetchError> {
        (**self).forecast(place).await
    }
}

/// Shape of a single serialized [`ForecastEntry`]
pub fn forecast_entry_shape() -> Shape {
    Shape::object(vec![
        Field::required("date", Shape::string()).describe("ISO date (YYYY-MM-DD)"),
        Field::required("maxTemp", Shape::number()).describe("Daily maximum in °C"),
        Field::required("minTemp", Shape::number()).describe("Daily minimum in °C"),
        Field::required("precipitationChance", Shape::number_in(0.0, 100.0))
            .describe("Mean precipitation probability in percent"),
        Field::required("condition", Shape::string()),
        Field::required("location", Shape::string()),
    ])
}

/// Shape of a full forecast (ordered list of entries)
pub fn forecast_shape() -> Shape {
    Shape::array(forecast_entry_shape())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate;
    use chrono::NaiveDate;

    #[test]
    fn test_serialized_entry_matches_shape() {
        let entry = ForecastEntry {
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            max_temp: 18.5,
            min_temp: 9.0,
            precipitation_chance: 40.0,
            condition: "Overcast".to_string(),
            location: "Shibuya".to_string(),
        };
        let value = serde_json::to_value(vec![entry]).unwrap();
        assert_eq!(value[0]["date"], "2025-04-01");
        assert_eq!(value[0]["precipitationChance"], serde_json::json!(40.0));
        assert_eq!(validate(&forecast_shape(), &value).unwrap(), value);
    }
}
