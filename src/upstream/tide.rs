use super::types::{TideKind, TideReading};
use crate::config::Config;
use crate::limits::{FetchLimits, UpstreamClass};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Europe::London;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Events within this forward window are preferred over a nearer past event,
/// so "tonight" never surfaces a tide that has already happened.
const FORWARD_WINDOW_HOURS: i64 = 12;

#[derive(Error, Debug)]
pub enum TideError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("no tide subscription key configured")]
    MissingApiKey,
    #[error("no tidal events returned for station")]
    NoEvents,
}

/// Wire shape of one Admiralty tidal event.
#[derive(Debug, Deserialize)]
struct TidalEventDto {
    #[serde(rename = "EventType")]
    event_type: Option<String>,
    #[serde(rename = "DateTime")]
    date_time: Option<String>,
    #[serde(rename = "Height")]
    height: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TideEvent {
    pub kind: TideKind,
    pub time: DateTime<Utc>,
    pub height: Option<f64>,
}

pub struct TideClient {
    client: Client,
    config: Arc<Config>,
    limits: Arc<FetchLimits>,
}

impl TideClient {
    pub fn new(config: Arc<Config>, limits: Arc<FetchLimits>) -> Self {
        let client = Client::builder()
            .user_agent("Shorecast/1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            limits,
        }
    }

    /// Nearest tide event to `target`, or the unknown sentinel. Upstream
    /// failure never propagates past this boundary.
    pub async fn reading_for(&self, station_id: &str, target: DateTime<Tz>) -> TideReading {
        match self.fetch_events(station_id, target).await {
            Ok(events) => match select_event(&events, target.with_timezone(&Utc)) {
                Some(event) => TideReading {
                    kind: event.kind,
                    time: event
                        .time
                        .with_timezone(&London)
                        .format("%H:%M")
                        .to_string(),
                    height_m: event.height,
                },
                None => {
                    tracing::warn!("No usable tide events for station {}", station_id);
                    TideReading::unknown()
                }
            },
            Err(e) => {
                tracing::warn!("Tide fetch failed for station {}: {}", station_id, e);
                TideReading::unknown()
            }
        }
    }

    async fn fetch_events(
        &self,
        station_id: &str,
        target: DateTime<Tz>,
    ) -> Result<Vec<TideEvent>, TideError> {
        let key = self
            .config
            .admiralty_api_key
            .as_ref()
            .ok_or(TideError::MissingApiKey)?;

        let now = Utc::now().with_timezone(&London);
        let days_ahead = (target.date_naive() - now.date_naive()).num_days();
        let duration = (days_ahead + 2).max(2);

        let url = format!(
            "{}/uktidalapi/api/V1/Stations/{}/TidalEvents",
            self.config.admiralty_base_url, station_id
        );

        let dtos: Vec<TidalEventDto> = self
            .limits
            .run(UpstreamClass::Tide, async {
                let response = self
                    .client
                    .get(&url)
                    .query(&[("duration", duration.to_string())])
                    .header("Ocp-Apim-Subscription-Key", key)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(TideError::ApiError(format!("HTTP {}", response.status())));
                }

                Ok(response.json().await?)
            })
            .await?;

        let events: Vec<TideEvent> = dtos.iter().filter_map(parse_event).collect();
        if events.is_empty() {
            return Err(TideError::NoEvents);
        }
        Ok(events)
    }
}

fn parse_event(dto: &TidalEventDto) -> Option<TideEvent> {
    let kind_text = dto.event_type.as_deref()?.to_lowercase();
    let kind = if kind_text.contains("high") {
        TideKind::High
    } else if kind_text.contains("low") {
        TideKind::Low
    } else {
        return None;
    };

    let time = parse_event_time(dto.date_time.as_deref()?)?;
    Some(TideEvent {
        kind,
        time,
        height: dto.height,
    })
}

fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Admiralty timestamps come without an offset and are UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|n| n.and_utc())
}

/// Prefer the nearest future event within the forward window; fall back to
/// the absolute-nearest event in either direction.
pub(crate) fn select_event(events: &[TideEvent], target: DateTime<Utc>) -> Option<TideEvent> {
    let window = Duration::hours(FORWARD_WINDOW_HOURS);

    let nearest_future = events
        .iter()
        .filter(|e| e.time >= target && e.time - target <= window)
        .min_by_key(|e| (e.time - target).num_seconds());

    nearest_future
        .or_else(|| {
            events
                .iter()
                .min_by_key(|e| (e.time - target).num_seconds().abs())
        })
        .copied()
}
