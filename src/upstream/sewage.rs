use super::types::{SewageState, SewageStatus};
use crate::config::Config;
use crate::limits::{FetchLimits, UpstreamClass};
use crate::locations::{Company, DischargeContext, Location};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Threshold for matching an outfall to a beach, in raw degrees. Roughly
/// 5 km at UK latitudes.
const NEARBY_DEGREES: f64 = 0.05;

/// Clearance window for regulators whose feeds are matched by asset name.
const NAMED_CLEARANCE_HOURS: f64 = 48.0;

#[derive(Error, Debug)]
pub enum SewageError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
}

/// ArcGIS feature feed used by Welsh Water: one record per outfall, located
/// by coordinates.
#[derive(Debug, Deserialize)]
struct SpillFeed {
    features: Option<Vec<SpillFeature>>,
}

#[derive(Debug, Deserialize)]
struct SpillFeature {
    attributes: SpillAttributes,
}

#[derive(Debug, Deserialize, Default)]
struct SpillAttributes {
    status: Option<String>,
    /// Epoch milliseconds of the last discharge stop, when one is recorded.
    stop_date_time_discharge: Option<i64>,
    #[serde(rename = "X")]
    x: Option<f64>,
    #[serde(rename = "Y")]
    y: Option<f64>,
}

/// Discharge feed used by the other regulators: records are identified by
/// free-text asset names, not coordinates.
#[derive(Debug, Deserialize)]
struct DischargeFeed {
    #[serde(default)]
    records: Vec<DischargeRecord>,
}

#[derive(Debug, Deserialize, Default)]
struct DischargeRecord {
    status: Option<String>,
    latest_event_end: Option<String>,
    total_spill_hours_7_days: Option<f64>,
}

/// Beach slug -> regulator asset name, for the feeds that have no
/// coordinates to match against.
static ASSET_NAMES: &[(&str, &str)] = &[
    ("sennen", "Sennen Cove SPS"),
    ("porthcurno", "Porthcurno SPS"),
    ("penzance", "Penzance Promenade CSO"),
    ("kynance", "Lizard West Outfall"),
    ("falmouth-gyllyngvase", "Gyllyngvase CSO"),
    ("mevagissey", "Mevagissey Harbour SPS"),
    ("lyme-regis", "Lyme Regis Church Cliff CSO"),
    ("west-bay", "West Bay East CSO"),
    ("weymouth", "Weymouth Bowleaze CSO"),
    ("lulworth-cove", "Lulworth Cove Outfall"),
    ("swanage", "Swanage STW Outfall"),
    ("milford-on-sea", "Milford on Sea CSO"),
    ("ventnor", "Ventnor Esplanade CSO"),
    ("shanklin", "Shanklin CSO"),
    ("sandown", "Sandown Bay CSO"),
    ("west-wittering", "West Wittering CSO"),
    ("bognor-regis", "Bognor Regis Long Outfall"),
];

fn asset_name(slug: &str) -> Option<&'static str> {
    ASSET_NAMES
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, name)| *name)
}

pub struct SewageClient {
    client: Client,
    config: Arc<Config>,
    limits: Arc<FetchLimits>,
}

impl SewageClient {
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

    /// Discharge status for a beach. Network and parse failures degrade to
    /// the unknown status; nothing propagates.
    pub async fn status_for(&self, beach: &Location) -> SewageStatus {
        let result = match beach.company {
            Company::WelshWater => self.proximity_status(beach).await,
            _ => self.named_status(beach).await,
        };

        match result {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Sewage fetch failed for {}: {}", beach.slug, e);
                SewageStatus::simple(SewageState::Unknown, beach.company.display_name())
            }
        }
    }

    async fn proximity_status(&self, beach: &Location) -> Result<SewageStatus, SewageError> {
        let feed: SpillFeed = self
            .limits
            .run(UpstreamClass::Sewage, async {
                let response = self
                    .client
                    .get(&self.config.welsh_water_spills_url)
                    .query(&[
                        ("where", "1=1"),
                        ("outFields", "*"),
                        ("f", "json"),
                        ("returnGeometry", "false"),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(SewageError::ApiError(format!("HTTP {}", response.status())));
                }
                Ok(response.json().await?)
            })
            .await?;

        let features = feed.features.unwrap_or_default();
        let source = beach.company.display_name();

        Ok(match nearest_outfall(&features, beach.lat, beach.lon) {
            Some(attrs) => classify_outfall(attrs, beach.context, source, Utc::now()),
            None => SewageStatus::simple(SewageState::Clear, source),
        })
    }

    async fn named_status(&self, beach: &Location) -> Result<SewageStatus, SewageError> {
        let source = beach.company.display_name();
        let Some(asset) = asset_name(beach.slug) else {
            return Ok(SewageStatus::simple(SewageState::NoData, source));
        };

        let url = format!(
            "{}?company={}&asset={}",
            self.config.discharge_feed_base_url,
            beach.company.slug(),
            urlencoding::encode(asset)
        );

        let feed: DischargeFeed = self
            .limits
            .run(UpstreamClass::Sewage, async {
                let response = self.client.get(&url).send().await?;
                if !response.status().is_success() {
                    return Err(SewageError::ApiError(format!("HTTP {}", response.status())));
                }
                Ok(response.json().await?)
            })
            .await?;

        Ok(classify_named(&feed.records, source, Utc::now()))
    }
}

/// Nearest outfall within the matching threshold. Distance is planar on raw
/// degrees, matching the regulator's own published tooling.
fn nearest_outfall(features: &[SpillFeature], lat: f64, lon: f64) -> Option<&SpillAttributes> {
    features
        .iter()
        .filter_map(|f| {
            let x = f.attributes.x?;
            let y = f.attributes.y?;
            let dist = ((y - lat).powi(2) + (x - lon).powi(2)).sqrt();
            (dist < NEARBY_DEGREES).then_some((f, dist))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(f, _)| &f.attributes)
}

fn classify_outfall(
    attrs: &SpillAttributes,
    context: DischargeContext,
    source: &str,
    now: DateTime<Utc>,
) -> SewageStatus {
    let status_text = attrs.status.as_deref().unwrap_or("").to_lowercase();

    if status_text.contains("operating")
        || status_text.contains("discharging")
        || status_text.contains("spilling")
    {
        return SewageStatus::simple(SewageState::Active, source);
    }

    if status_text.contains("investigation") {
        return SewageStatus::simple(SewageState::UnderInvestigation, source);
    }

    if let Some(stop_ms) = attrs.stop_date_time_discharge {
        if let Some(stop) = DateTime::from_timestamp_millis(stop_ms) {
            let hours = (now - stop).num_seconds() as f64 / 3600.0;
            if hours >= 0.0 && hours < context.clearance_hours() as f64 {
                let message = if hours < 24.0 {
                    context.amber_message()
                } else {
                    context.green_message()
                };
                return SewageStatus {
                    status: SewageState::Recent,
                    source: source.to_string(),
                    hours_since: Some(hours.round() as i64),
                    message: Some(message.to_string()),
                    recent_spill_hours_7d: None,
                };
            }
        }
    }

    SewageStatus::simple(SewageState::Clear, source)
}

fn classify_named(records: &[DischargeRecord], source: &str, now: DateTime<Utc>) -> SewageStatus {
    if records.is_empty() {
        return SewageStatus::simple(SewageState::NoData, source);
    }

    let spill_hours_7d = records
        .iter()
        .filter_map(|r| r.total_spill_hours_7_days)
        .fold(None, |acc: Option<f64>, h| {
            Some(acc.map_or(h, |a| a.max(h)))
        });

    let active = records.iter().any(|r| {
        let status = r.status.as_deref().unwrap_or("").to_lowercase();
        status.contains("active") || status.contains("activated")
    });
    if active {
        let mut status = SewageStatus::simple(SewageState::Active, source);
        status.recent_spill_hours_7d = spill_hours_7d;
        return status;
    }

    let investigating = records.iter().any(|r| {
        r.status
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .contains("investigation")
    });
    if investigating {
        let mut status = SewageStatus::simple(SewageState::UnderInvestigation, source);
        status.recent_spill_hours_7d = spill_hours_7d;
        return status;
    }

    let most_recent_end = records
        .iter()
        .filter_map(|r| parse_end_time(r.latest_event_end.as_deref()?))
        .max();

    if let Some(end) = most_recent_end {
        let hours = (now - end).num_seconds() as f64 / 3600.0;
        if hours >= 0.0 && hours < NAMED_CLEARANCE_HOURS {
            return SewageStatus {
                status: SewageState::Recent,
                source: source.to_string(),
                hours_since: Some(hours.round() as i64),
                message: None,
                recent_spill_hours_7d: spill_hours_7d,
            };
        }
    }

    let mut status = SewageStatus::simple(SewageState::Clear, source);
    status.recent_spill_hours_7d = spill_hours_7d;
    status
}

fn parse_end_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|n| n.and_utc())
}
