//! Forecast lookup errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Geocoder returned no match for the place name
    #[error("Location '{place}' not found")]
    NotFound { place: String },

    /// Network failure talking to an upstream service
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status
    #[error("{service} returned HTTP {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Upstream payload did not have the structure we rely on
    #[error("unexpected response from {service}: {detail}")]
    MalformedResponse {
        service: &'static str,
        detail: String,
    },
}

impl FetchError {
    pub fn not_found(place: impl Into<String>) -> Self {
        Self::NotFound {
            place: place.into(),
        }
    }

    pub fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service,
            detail: detail.into(),
        }
    }
}
