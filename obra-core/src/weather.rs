//! Weather-history lookup against a geocoding + archive provider pair.
//!
//! The provider is consumed as a black box: one call resolves a city name to
//! coordinates, a second fetches the daily series for an inclusive date
//! range. [`lookup_history`] chains the two after validating the request.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::fmt::Debug;

use crate::error::WeatherError;

pub mod openmeteo;

pub use openmeteo::OpenMeteoProvider;

/// What the user asked for: a city and an inclusive date range.
#[derive(Debug, Clone)]
pub struct HistoryRequest {
    pub city: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Language tag passed to the geocoder, e.g. "pt" or "en".
    pub language: String,
}

impl HistoryRequest {
    /// Form-level preconditions, checked before any network call.
    ///
    /// The archive only covers dates from 1940 onwards.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.city.trim().is_empty() {
            return Err(WeatherError::InvalidRequest("city name must not be empty"));
        }
        if self.start > self.end {
            return Err(WeatherError::InvalidRequest(
                "start date must not be after end date",
            ));
        }
        if self.start.year() < 1940 {
            return Err(WeatherError::InvalidRequest(
                "the archive only covers dates from 1940-01-01 onwards",
            ));
        }
        Ok(())
    }
}

/// First geocoding match for a city name.
#[derive(Debug, Clone)]
pub struct Geocoded {
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
}

/// One day of the archive series.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub precipitation_mm: f64,
}

/// A resolved lookup: where the data is for, and the series itself.
#[derive(Debug, Clone)]
pub struct HistoryReport {
    pub city: String,
    pub country: String,
    pub days: Vec<DailyWeather>,
}

#[async_trait]
pub trait HistoryProvider: Send + Sync + Debug {
    /// Resolve a city name to coordinates, or `CityNotFound`.
    async fn geocode(&self, city: &str, language: &str) -> Result<Geocoded, WeatherError>;

    /// Fetch the daily series for an inclusive date range, ordered by date.
    async fn daily_history(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>, WeatherError>;
}

/// Two-step lookup: validate, geocode the city, then fetch the series.
pub async fn lookup_history(
    provider: &dyn HistoryProvider,
    request: &HistoryRequest,
) -> Result<HistoryReport, WeatherError> {
    request.validate()?;

    let city = request.city.trim();
    let place = provider.geocode(city, &request.language).await?;
    let days = provider
        .daily_history(place.latitude, place.longitude, request.start, request.end)
        .await?;

    Ok(HistoryReport {
        city: city.to_owned(),
        country: place.country,
        days,
    })
}
