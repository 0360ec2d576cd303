use super::types::MarineWeatherSnapshot;
use crate::config::Config;
use crate::limits::{FetchLimits, UpstreamClass};
use chrono::{DateTime, Timelike};
use chrono_tz::Tz;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Error, Debug)]
pub enum MarineError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("rate limited after retries")]
    RateLimited,
    #[error("no marine or weather data available")]
    NoData,
}

#[derive(Debug, Deserialize, Default)]
struct MarineResponse {
    hourly: Option<MarineHourly>,
}

#[derive(Debug, Deserialize, Default)]
struct MarineHourly {
    #[serde(default)]
    wave_height: Vec<Option<f64>>,
    #[serde(default)]
    swell_wave_height: Vec<Option<f64>>,
    #[serde(default)]
    wave_period: Vec<Option<f64>>,
    #[serde(default)]
    sea_surface_temperature: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize, Default)]
struct ForecastResponse {
    hourly: Option<ForecastHourly>,
}

#[derive(Debug, Deserialize, Default)]
struct ForecastHourly {
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    uv_index: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
}

pub struct MarineClient {
    client: Client,
    config: Arc<Config>,
    limits: Arc<FetchLimits>,
}

impl MarineClient {
    pub fn new(config: Arc<Config>, limits: Arc<FetchLimits>) -> Self {
        let client = Client::builder()
            .user_agent("Shorecast/1.0")
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            limits,
        }
    }

    /// Marine + atmospheric conditions for the hour containing `target`.
    /// One failed upstream degrades fields to their fallbacks; both failing
    /// is the explicit no-data signal.
    pub async fn snapshot_for(
        &self,
        lat: f64,
        lon: f64,
        target: DateTime<Tz>,
    ) -> Result<MarineWeatherSnapshot, MarineError> {
        let date = target.format("%Y-%m-%d").to_string();
        let hour = target.hour() as usize;
        let lat_s = lat.to_string();
        let lon_s = lon.to_string();

        let marine_url = format!("{}/v1/marine", self.config.marine_base_url);
        let marine_params = [
            ("latitude", lat_s.as_str()),
            ("longitude", lon_s.as_str()),
            (
                "hourly",
                "wave_height,swell_wave_height,wave_period,sea_surface_temperature",
            ),
            ("start_date", date.as_str()),
            ("end_date", date.as_str()),
        ];

        let forecast_url = format!("{}/v1/forecast", self.config.forecast_base_url);
        let forecast_params = [
            ("latitude", lat_s.as_str()),
            ("longitude", lon_s.as_str()),
            (
                "hourly",
                "temperature_2m,apparent_temperature,wind_speed_10m,wind_direction_10m,uv_index,cloud_cover,precipitation,weather_code",
            ),
            ("start_date", date.as_str()),
            ("end_date", date.as_str()),
        ];

        let (marine_res, forecast_res) = tokio::join!(
            self.limits.run(
                UpstreamClass::Weather,
                self.get_with_retry::<MarineResponse>(&marine_url, &marine_params),
            ),
            self.limits.run(
                UpstreamClass::Weather,
                self.get_with_retry::<ForecastResponse>(&forecast_url, &forecast_params),
            ),
        );

        if marine_res.is_err() && forecast_res.is_err() {
            tracing::warn!("All weather upstreams failed for ({}, {})", lat, lon);
            return Err(MarineError::NoData);
        }
        if let Err(e) = &marine_res {
            tracing::warn!("Marine fetch failed for ({}, {}): {}", lat, lon, e);
        }
        if let Err(e) = &forecast_res {
            tracing::warn!("Forecast fetch failed for ({}, {}): {}", lat, lon, e);
        }

        let marine = marine_res.ok().and_then(|r| r.hourly).unwrap_or_default();
        let forecast = forecast_res.ok().and_then(|r| r.hourly).unwrap_or_default();

        Ok(build_snapshot(&marine, &forecast, hour))
    }

    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, MarineError> {
        let mut retry_count = 0;
        let max_retries = 3;
        let mut delay = Duration::from_millis(500);

        loop {
            let response = self.client.get(url).query(params).send().await?;

            match response.status() {
                reqwest::StatusCode::OK => return Ok(response.json().await?),
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if retry_count >= max_retries {
                        return Err(MarineError::RateLimited);
                    }
                    tracing::warn!("Rate limited by Open-Meteo, retrying in {:?}", delay);
                    sleep(delay).await;
                    delay = delay.mul_f32(2.0 + fastrand::f32() * 0.5);
                    retry_count += 1;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(MarineError::ApiError(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }
}

fn at<T: Copy>(series: &[Option<T>], hour: usize) -> Option<T> {
    series.get(hour).copied().flatten()
}

fn build_snapshot(
    marine: &MarineHourly,
    forecast: &ForecastHourly,
    hour: usize,
) -> MarineWeatherSnapshot {
    let air_temp_c = at(&forecast.temperature_2m, hour);
    let wind_speed_kmh = at(&forecast.wind_speed_10m, hour).unwrap_or(0.0);
    let feels_like_c = at(&forecast.apparent_temperature, hour)
        .or_else(|| air_temp_c.map(|t| feels_like(t, wind_speed_kmh)));

    MarineWeatherSnapshot {
        sea_temp_c: at(&marine.sea_surface_temperature, hour),
        wave_height_m: at(&marine.wave_height, hour).unwrap_or(0.0),
        swell_height_m: at(&marine.swell_wave_height, hour).unwrap_or(0.0),
        wave_period_s: at(&marine.wave_period, hour),
        air_temp_c,
        feels_like_c,
        wind_speed_kmh,
        wind_direction_deg: at(&forecast.wind_direction_10m, hour),
        uv_index: at(&forecast.uv_index, hour).unwrap_or(0.0),
        cloud_cover_pct: at(&forecast.cloud_cover, hour).unwrap_or(0.0),
        precipitation_mm: at(&forecast.precipitation, hour).unwrap_or(0.0),
        weather_code: at(&forecast.weather_code, hour),
    }
}

/// Wind-chill apparent temperature. Only meaningful in cold wind: above
/// 10°C or under 5 km/h the air temperature is returned unchanged.
pub fn feels_like(air_temp_c: f64, wind_speed_kmh: f64) -> f64 {
    if air_temp_c > 10.0 || wind_speed_kmh < 5.0 {
        return air_temp_c;
    }
    let v = wind_speed_kmh.powf(0.16);
    (13.12 + 0.6215 * air_temp_c - 11.37 * v + 0.3965 * air_temp_c * v).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feels_like_matches_closed_form() {
        assert_eq!(feels_like(5.0, 20.0), 1.0);
        assert_eq!(feels_like(0.0, 30.0), -6.0);
    }

    #[test]
    fn test_feels_like_is_deterministic() {
        assert_eq!(feels_like(5.0, 20.0), feels_like(5.0, 20.0));
        assert_eq!(feels_like(2.5, 17.3), feels_like(2.5, 17.3));
    }

    #[test]
    fn test_feels_like_passthrough_when_warm_or_still() {
        assert_eq!(feels_like(15.0, 20.0), 15.0);
        assert_eq!(feels_like(5.0, 3.0), 5.0);
        assert_eq!(feels_like(10.5, 40.0), 10.5);
    }

    #[test]
    fn test_snapshot_indexes_by_hour() {
        let marine = MarineHourly {
            wave_height: vec![Some(0.2), Some(0.8), Some(1.4)],
            swell_wave_height: vec![Some(0.1), Some(0.3), Some(0.5)],
            wave_period: vec![None, Some(7.0), None],
            sea_surface_temperature: vec![Some(11.0), Some(11.5), Some(12.0)],
        };
        let forecast = ForecastHourly {
            temperature_2m: vec![Some(14.0), Some(16.0), Some(18.0)],
            apparent_temperature: vec![Some(13.0), Some(15.0), Some(17.0)],
            wind_speed_10m: vec![Some(10.0), Some(12.0), Some(14.0)],
            wind_direction_10m: vec![Some(180.0), Some(190.0), Some(200.0)],
            uv_index: vec![Some(1.0), Some(3.0), Some(5.0)],
            cloud_cover: vec![Some(10.0), Some(20.0), Some(30.0)],
            precipitation: vec![Some(0.0), Some(0.1), Some(0.2)],
            weather_code: vec![Some(0), Some(2), Some(3)],
        };

        let snapshot = build_snapshot(&marine, &forecast, 1);
        assert_eq!(snapshot.wave_height_m, 0.8);
        assert_eq!(snapshot.sea_temp_c, Some(11.5));
        assert_eq!(snapshot.air_temp_c, Some(16.0));
        assert_eq!(snapshot.feels_like_c, Some(15.0));
        assert_eq!(snapshot.wave_period_s, Some(7.0));
        assert_eq!(snapshot.weather_code, Some(2));
    }

    #[test]
    fn test_missing_values_fall_back() {
        let marine = MarineHourly::default();
        let forecast = ForecastHourly {
            temperature_2m: vec![Some(8.0)],
            apparent_temperature: vec![None],
            wind_speed_10m: vec![Some(20.0)],
            ..Default::default()
        };

        let snapshot = build_snapshot(&marine, &forecast, 0);
        assert_eq!(snapshot.wave_height_m, 0.0);
        assert_eq!(snapshot.swell_height_m, 0.0);
        assert_eq!(snapshot.sea_temp_c, None);
        assert_eq!(snapshot.uv_index, 0.0);
        assert_eq!(snapshot.precipitation_mm, 0.0);
        // Apparent temperature absent upstream: computed from air + wind.
        assert_eq!(snapshot.feels_like_c, Some(feels_like(8.0, 20.0)));
    }

    #[test]
    fn test_out_of_range_hour_yields_defaults() {
        let snapshot = build_snapshot(&MarineHourly::default(), &ForecastHourly::default(), 23);
        assert_eq!(snapshot.wave_height_m, 0.0);
        assert_eq!(snapshot.air_temp_c, None);
        assert_eq!(snapshot.feels_like_c, None);
    }
}
