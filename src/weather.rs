//! Open-Meteo weather lookups backing the `fetch_weather_window` tool.
//!
//! Lookups never fail the conversation: network or data problems are
//! reported inside the [`WeatherReport`] handed back to the model.

use crate::config::WeatherConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Smallest forecast window, in hours.
pub const MIN_WINDOW_HOURS: u32 = 1;
/// Largest forecast window, in hours.
pub const MAX_WINDOW_HOURS: u32 = 24;
/// Window used when the model does not ask for one.
pub const DEFAULT_WINDOW_HOURS: u32 = 12;

/// One hourly forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSample {
    pub time: String,
    pub temperature_c: Option<f64>,
    pub precipitation_probability: Option<f64>,
}

/// Tool result for a weather lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WeatherReport {
    Forecast {
        city: String,
        latitude: f64,
        longitude: f64,
        window_hours: usize,
        samples: Vec<WeatherSample>,
    },
    Failed {
        city: String,
        error: String,
    },
}

impl WeatherReport {
    pub fn failed(city: &str, error: impl Into<String>) -> Self {
        WeatherReport::Failed {
            city: city.to_string(),
            error: error.into(),
        }
    }
}

/// Something that can produce a weather window for a city.
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn fetch_weather_window(&self, city: &str, hours: u32) -> WeatherReport;
}

mod openmeteo {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub latitude: f64,
        pub longitude: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub hourly: Option<Hourly>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Hourly {
        #[serde(default)]
        pub time: Vec<String>,
        #[serde(default)]
        pub temperature_2m: Vec<Option<f64>>,
        #[serde(default)]
        pub precipitation_probability: Vec<Option<f64>>,
    }
}

/// Clamp a requested window into the supported range.
pub fn clamp_window(hours: i64) -> u32 {
    hours.clamp(MIN_WINDOW_HOURS as i64, MAX_WINDOW_HOURS as i64) as u32
}

/// Take the first `hours` samples; missing values become `None`.
fn collect_samples(hourly: &openmeteo::Hourly, hours: u32) -> Vec<WeatherSample> {
    hourly
        .time
        .iter()
        .take(hours as usize)
        .enumerate()
        .map(|(idx, time)| WeatherSample {
            time: time.clone(),
            temperature_c: hourly.temperature_2m.get(idx).copied().flatten(),
            precipitation_probability: hourly.precipitation_probability.get(idx).copied().flatten(),
        })
        .collect()
}

/// Open-Meteo HTTP client. No API key required.
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn geocode(&self, city: &str) -> reqwest::Result<Option<openmeteo::GeocodingResult>> {
        let response: openmeteo::GeocodingResponse = self
            .client
            .get(&self.config.geocoding_url)
            .query(&[("name", city), ("count", "1"), ("language", "en"), ("format", "json")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.results.and_then(|r| r.into_iter().next()))
    }

    async fn forecast(&self, latitude: f64, longitude: f64) -> reqwest::Result<openmeteo::Hourly> {
        let latitude = latitude.to_string();
        let longitude = longitude.to_string();
        let response: openmeteo::ForecastResponse = self
            .client
            .get(&self.config.forecast_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("hourly", "temperature_2m,precipitation_probability"),
                ("forecast_days", "1"),
                ("timezone", "auto"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.hourly.unwrap_or_default())
    }
}

#[async_trait]
impl WeatherLookup for WeatherClient {
    async fn fetch_weather_window(&self, city: &str, hours: u32) -> WeatherReport {
        let hours = hours.clamp(MIN_WINDOW_HOURS, MAX_WINDOW_HOURS);
        info!("Fetching {}h weather window for '{}'", hours, city);
        let start = Instant::now();

        let place = match self.geocode(city).await {
            Ok(Some(place)) => place,
            Ok(None) => {
                warn!("No geocoding match for '{}'", city);
                return WeatherReport::failed(city, "No geocoding match");
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", city, e);
                return WeatherReport::failed(city, format!("Geocoding failed: {}", e));
            }
        };

        let hourly = match self.forecast(place.latitude, place.longitude).await {
            Ok(hourly) => hourly,
            Err(e) => {
                warn!("Forecast for '{}' failed: {}", city, e);
                return WeatherReport::failed(city, format!("Forecast fetch failed: {}", e));
            }
        };

        let samples = collect_samples(&hourly, hours);
        debug!(
            "Weather for '{}': {} samples in {:.3}s",
            city,
            samples.len(),
            start.elapsed().as_secs_f64()
        );

        WeatherReport::Forecast {
            city: city.to_string(),
            latitude: place.latitude,
            longitude: place.longitude,
            window_hours: samples.len(),
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_window() {
        assert_eq!(clamp_window(0), 1);
        assert_eq!(clamp_window(-4), 1);
        assert_eq!(clamp_window(6), 6);
        assert_eq!(clamp_window(100), 24);
    }

    #[test]
    fn test_collect_samples_handles_short_series() {
        let hourly: openmeteo::Hourly = serde_json::from_value(json!({
            "time": ["2026-10-16T00:00", "2026-10-16T01:00", "2026-10-16T02:00"],
            "temperature_2m": [14.2, null],
            "precipitation_probability": [5]
        }))
        .unwrap();

        let samples = collect_samples(&hourly, 12);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].temperature_c, Some(14.2));
        assert_eq!(samples[0].precipitation_probability, Some(5.0));
        assert_eq!(samples[1].temperature_c, None);
        assert_eq!(samples[2].precipitation_probability, None);

        assert_eq!(collect_samples(&hourly, 2).len(), 2);
    }

    #[test]
    fn test_report_serialization() {
        let failed = WeatherReport::failed("Atlantis", "No geocoding match");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"city": "Atlantis", "error": "No geocoding match"})
        );

        let forecast = WeatherReport::Forecast {
            city: "Paris".to_string(),
            latitude: 48.85,
            longitude: 2.35,
            window_hours: 1,
            samples: vec![WeatherSample {
                time: "2026-10-16T00:00".to_string(),
                temperature_c: Some(11.0),
                precipitation_probability: None,
            }],
        };
        let value = serde_json::to_value(&forecast).unwrap();
        assert_eq!(value["window_hours"], 1);
        assert_eq!(value["samples"][0]["precipitation_probability"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_is_reported_in_result() {
        let client = WeatherClient::new(WeatherConfig {
            geocoding_url: "http://127.0.0.1:9/v1/search".to_string(),
            forecast_url: "http://127.0.0.1:9/v1/forecast".to_string(),
            timeout_secs: 2,
        })
        .unwrap();

        match client.fetch_weather_window("Lisbon", 6).await {
            WeatherReport::Failed { city, error } => {
                assert_eq!(city, "Lisbon");
                assert!(error.starts_with("Geocoding failed"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
