//! Open-Meteo implementation of [`HistoryProvider`].
//!
//! Two public read-only endpoints, no API key. The archive signals upstream
//! validation failures with an `"error"`/`"reason"` JSON body that must be
//! shown to the user verbatim.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{DailyWeather, Geocoded, HistoryProvider};
use crate::error::WeatherError;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum";

#[derive(Debug, Clone, Default)]
pub struct OpenMeteoProvider {
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Vec<GeoResult>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    daily: Option<DailyBlock>,
}

/// Parallel arrays, one entry per day of the requested range.
#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<NaiveDate>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    precipitation_sum: Vec<f64>,
}

#[async_trait]
impl HistoryProvider for OpenMeteoProvider {
    async fn geocode(&self, city: &str, language: &str) -> Result<Geocoded, WeatherError> {
        let res = self
            .http
            .get(GEOCODING_URL)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", language),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%status, city, "geocoding response received");

        let parsed: GeoResponse = serde_json::from_str(&body).map_err(|_| decode_error("geocoding", status, &body))?;
        geocoded_from_response(city, parsed)
    }

    async fn daily_history(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>, WeatherError> {
        let res = self
            .http
            .get(ARCHIVE_URL)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
                ("daily", DAILY_VARIABLES.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        // The archive answers validation failures with a non-2xx status AND
        // an error payload; parse first so the reason wins over the status.
        let status = res.status();
        let body = res.text().await?;
        debug!(%status, %start, %end, "archive response received");

        let parsed: ArchiveResponse = serde_json::from_str(&body).map_err(|_| decode_error("archive", status, &body))?;
        series_from_response(parsed)
    }
}

fn geocoded_from_response(city: &str, response: GeoResponse) -> Result<Geocoded, WeatherError> {
    let first = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::CityNotFound(city.to_owned()))?;

    Ok(Geocoded {
        latitude: first.latitude,
        longitude: first.longitude,
        country: first.country.unwrap_or_default(),
    })
}

fn series_from_response(response: ArchiveResponse) -> Result<Vec<DailyWeather>, WeatherError> {
    if response.error {
        return Err(WeatherError::Upstream(
            response
                .reason
                .unwrap_or_else(|| "unspecified archive error".to_owned()),
        ));
    }

    let daily = response.daily.ok_or_else(|| WeatherError::Decode {
        endpoint: "archive",
        message: "response has neither an error nor a daily block".to_owned(),
    })?;

    let n = daily.time.len();
    if daily.temperature_2m_max.len() != n
        || daily.temperature_2m_min.len() != n
        || daily.precipitation_sum.len() != n
    {
        return Err(WeatherError::Decode {
            endpoint: "archive",
            message: "daily arrays have mismatched lengths".to_owned(),
        });
    }

    let mut days = Vec::with_capacity(n);
    for (((date, max_temp_c), min_temp_c), precipitation_mm) in daily
        .time
        .into_iter()
        .zip(daily.temperature_2m_max)
        .zip(daily.temperature_2m_min)
        .zip(daily.precipitation_sum)
    {
        days.push(DailyWeather {
            date,
            max_temp_c,
            min_temp_c,
            precipitation_mm,
        });
    }
    Ok(days)
}

fn decode_error(endpoint: &'static str, status: reqwest::StatusCode, body: &str) -> WeatherError {
    WeatherError::Decode {
        endpoint,
        message: format!("status {status}: {}", truncate_body(body)),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
