//! Open-Meteo geocoding + forecast client

use super::{condition_label, FetchError, ForecastEntry, ForecastSource, GeoLocation};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const GEOCODING: &str = "geocoding";
const FORECAST: &str = "forecast";
const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_probability_mean,weathercode";
const MAX_ERROR_BODY: usize = 200;

/// Endpoints and transport settings for Open-Meteo
#[derive(Debug, Clone)]
pub struct OpenMeteoConfig {
    pub geocoding_base_url: String,
    pub forecast_base_url: String,
    pub timeout: Duration,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            geocoding_base_url: "https://geocoding-api.open-meteo.com".to_string(),
            forecast_base_url: "https://api.open-meteo.com".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Forecast source backed by the public Open-Meteo APIs
pub struct OpenMeteoClient {
    client: Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoClient {
    pub fn new(config: OpenMeteoConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                service: GEOCODING,
                source: e,
            })?;
        Ok(Self { client, config })
    }

    /// Resolve a place name to its best geocoding match
    pub async fn geocode(&self, place: &str) -> Result<GeoLocation, FetchError> {
        let url = format!(
            "{}/v1/search",
            self.config.geocoding_base_url.trim_end_matches('/')
        );
        let response: GeocodingResponse = self
            .get_json(GEOCODING, &url, &[("name", place.to_string()), ("count", "1".to_string())])
            .await?;

        let first = response
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::not_found(place))?;

        let location = GeoLocation {
            name: first.name,
            latitude: first.latitude,
            longitude: first.longitude,
            country: first.country,
        };
        tracing::debug!(
            place = %place,
            resolved = %location.name,
            country = location.country.as_deref().unwrap_or("-"),
            latitude = location.latitude,
            longitude = location.longitude,
            "Geocoded place"
        );

        Ok(location)
    }

    /// Daily forecast for already-resolved coordinates
    pub async fn daily_forecast(
        &self,
        location: &GeoLocation,
    ) -> Result<Vec<ForecastEntry>, FetchError> {
        let url = format!(
            "{}/v1/forecast",
            self.config.forecast_base_url.trim_end_matches('/')
        );
        let response: ForecastResponse = self
            .get_json(
                FORECAST,
                &url,
                &[
                    ("latitude", location.latitude.to_string()),
                    ("longitude", location.longitude.to_string()),
                    ("daily", DAILY_FIELDS.to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        response.daily.into_entries(&location.name)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transport { service, source: e })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport { service, source: e })?;

        if !status.is_success() {
            return Err(FetchError::Upstream {
                service,
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::malformed(service, e.to_string()))
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn forecast(&self, place: &str) -> Result<Vec<ForecastEntry>, FetchError> {
        let location = self.geocode(place).await?;
        self.daily_forecast(&location).await
    }
}

// Open-Meteo wire types

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    /// Absent entirely when nothing matched
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailySeries,
}

/// Parallel per-day arrays
#[derive(Debug, Deserialize)]
struct DailySeries {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_probability_mean: Vec<Option<f64>>,
    weathercode: Vec<Option<i64>>,
}

impl DailySeries {
    fn into_entries(self, location: &str) -> Result<Vec<ForecastEntry>, FetchError> {
        let days = self.time.len();
        let lengths = [
            ("temperature_2m_max", self.temperature_2m_max.len()),
            ("temperature_2m_min", self.temperature_2m_min.len()),
            ("precipitation_probability_mean", self.precipitation_probability_mean.len()),
            ("weathercode", self.weathercode.len()),
        ];
        if let Some((series, len)) = lengths.iter().find(|(_, len)| *len != days) {
            return Err(FetchError::malformed(
                FORECAST,
                format!("daily.{series} has {len} values for {days} days"),
            ));
        }

        self.time
            .into_iter()
            .enumerate()
            .map(|(i, day)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                    FetchError::malformed(FORECAST, format!("invalid date '{day}': {e}"))
                })?;
                let required = |series: &str, value: Option<f64>| {
                    value.ok_or_else(|| {
                        FetchError::malformed(FORECAST, format!("daily.{series} missing for {day}"))
                    })
                };

                Ok(ForecastEntry {
                    date,
                    max_temp: required("temperature_2m_max", self.temperature_2m_max[i])?,
                    min_temp: required("temperature_2m_min", self.temperature_2m_min[i])?,
                    precipitation_chance: required(
                        "precipitation_probability_mean",
                        self.precipitation_probability_mean[i],
                    )?,
                    // A missing code gets the same lenient treatment as an unknown one
                    condition: self.weathercode[i]
                        .map_or(super::UNKNOWN_CONDITION, condition_label)
                        .to_string(),
                    location: location.to_string(),
                })
            })
            .collect()
    }
}
