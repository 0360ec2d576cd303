//! Fan-out aggregation: one beach needs three upstream feeds, a dashboard
//! needs them for every beach at once. Tide and sewage degrade in place;
//! marine no-data is what decides whether a location survives.

use crate::cache::{CacheStats, ResponseCache};
use crate::error::ApiError;
use crate::locations::{self, Location};
use crate::recommend::{recommend, Mode, Recommendation, Status, TimeContext};
use crate::sun;
use crate::timeslot::{available_slots, london_now, SlotOption, TimeSlot};
use crate::upstream::types::{Conditions, MarineWeatherSnapshot, SewageStatus, TideReading};
use crate::upstream::ConditionsSource;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

/// Rainfall above this flags the runoff alert on dashboard cards.
const HEAVY_RAINFALL_MM: f64 = 5.0;

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub status: Status,
    pub status_text: &'static str,
    pub recommendation: String,
}

impl From<Recommendation> for RecommendationView {
    fn from(rec: Recommendation) -> Self {
        Self {
            status: rec.status,
            status_text: rec.label,
            recommendation: rec.text(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionsResponse {
    pub beach: String,
    pub slug: String,
    pub area: String,
    pub mode: &'static str,
    pub sea_temp_c: Option<f64>,
    pub wave_height_m: f64,
    pub tide: TideReading,
    pub air_temp_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub wind_speed_kmh: f64,
    pub uv_index: f64,
    pub sewage: SewageStatus,
    pub sunrise: String,
    pub sunset: String,
    pub recommendation: RecommendationView,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub meta: DashboardMeta,
    pub beaches: Vec<BeachCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMeta {
    pub time: &'static str,
    pub time_label: String,
    pub mode: &'static str,
    pub is_forecast: bool,
    pub updated_at: DateTime<Utc>,
    pub available_time_slots: Vec<SlotOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BeachCard {
    pub name: String,
    pub slug: String,
    pub area: String,
    pub facing: &'static str,
    pub sea_temp_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waves: Option<WavesView>,
    pub tide: TideReading,
    pub weather: CardWeather,
    pub sewage: SewageStatus,
    pub sun: CardSun,
    pub alerts: CardAlerts,
    pub recommendation: RecommendationView,
    pub is_forecast: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WavesView {
    pub height_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardWeather {
    pub air_temp_display: String,
    pub feels_like_display: String,
    pub uv_index: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardSun {
    pub sunrise: String,
    pub sunset: String,
    pub show_sunrise_badge: bool,
    pub show_sunset_badge: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardAlerts {
    pub recent_rainfall: bool,
    pub bathing_water_quality: &'static str,
}

/// Operator-only view of what each adapter produced for a beach.
#[derive(Debug, Clone, Serialize)]
pub struct DebugConditions {
    pub beach: String,
    pub slug: String,
    pub time_slot: &'static str,
    pub target: String,
    pub tide: TideReading,
    pub marine: Option<MarineWeatherSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marine_error: Option<String>,
    pub sewage: SewageStatus,
}

pub struct Aggregator {
    source: Arc<dyn ConditionsSource>,
    cache: ResponseCache<DashboardResponse>,
}

impl Aggregator {
    pub fn new(source: Arc<dyn ConditionsSource>) -> Self {
        Self {
            source,
            cache: ResponseCache::new(),
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn clear_cache(&self) -> u64 {
        self.cache.clear().await
    }

    /// All three feeds for one beach, concurrently. `None` marine means the
    /// location produced nothing usable.
    async fn gather(
        &self,
        beach: &Location,
        target: DateTime<Tz>,
    ) -> Option<Conditions> {
        let (tide, marine, sewage) = tokio::join!(
            self.source.tide(beach, target),
            self.source.marine(beach, target),
            self.source.sewage(beach),
        );

        let marine = match marine {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("No usable conditions for {}: {}", beach.slug, e);
                return None;
            }
        };

        Some(Conditions {
            tide,
            marine,
            sewage,
            sun: sun::sun_times(beach.lat, beach.lon, target),
        })
    }

    /// Single-location snapshot. Uncached; marine no-data is fatal here.
    pub async fn single(&self, slug: &str, mode: Mode) -> Result<ConditionsResponse, ApiError> {
        let beach = locations::find(slug).ok_or(ApiError::UnknownBeach)?;
        let now = london_now();

        let conditions = self
            .gather(beach, now)
            .await
            .ok_or(ApiError::UpstreamUnavailable)?;

        let time = TimeContext {
            slot: TimeSlot::Now,
            local_hour: now.hour(),
        };
        let recommendation = recommend(beach.facing, &conditions, mode, &time);

        Ok(ConditionsResponse {
            beach: beach.name.to_string(),
            slug: beach.slug.to_string(),
            area: beach.area.to_string(),
            mode: mode.as_str(),
            sea_temp_c: conditions.marine.sea_temp_c,
            wave_height_m: conditions.marine.wave_height_m,
            tide: conditions.tide.clone(),
            air_temp_c: conditions.marine.air_temp_c,
            feels_like_c: conditions.marine.feels_like_c,
            wind_speed_kmh: conditions.marine.wind_speed_kmh,
            uv_index: conditions.marine.uv_index,
            sewage: conditions.sewage.clone(),
            sunrise: conditions.sun.sunrise.clone(),
            sunset: conditions.sun.sunset.clone(),
            recommendation: recommendation.into(),
        })
    }

    /// Multi-location envelope, cached by (sorted slugs, mode, slot). One
    /// beach failing completely drops that beach, not the request.
    pub async fn dashboard(
        &self,
        slugs: &[String],
        mode: Mode,
        slot: TimeSlot,
    ) -> Result<DashboardResponse, ApiError> {
        let key = ResponseCache::<DashboardResponse>::key(slugs, mode.as_str(), slot.id());
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let now = london_now();
        let target = slot.target_time(now);
        let time = TimeContext {
            slot,
            local_hour: now.hour(),
        };

        let cards = join_all(slugs.iter().map(|slug| self.card_for(slug, mode, target, &time)))
            .await
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        if cards.is_empty() {
            return Err(ApiError::NoBeaches);
        }

        let response = DashboardResponse {
            meta: DashboardMeta {
                time: slot.id(),
                time_label: slot.label(now),
                mode: mode.as_str(),
                is_forecast: slot.is_forecast(),
                updated_at: Utc::now(),
                available_time_slots: available_slots(now),
            },
            beaches: cards,
        };

        self.cache.insert(key, response.clone()).await;
        Ok(response)
    }

    async fn card_for(
        &self,
        slug: &str,
        mode: Mode,
        target: DateTime<Tz>,
        time: &TimeContext,
    ) -> Option<BeachCard> {
        let Some(beach) = locations::find(slug) else {
            tracing::warn!("Unknown beach slug requested: {}", slug);
            return None;
        };

        let conditions = self.gather(beach, target).await?;
        let recommendation = recommend(beach.facing, &conditions, mode, time);
        let marine = &conditions.marine;

        Some(BeachCard {
            name: beach.name.to_string(),
            slug: beach.slug.to_string(),
            area: beach.area.to_string(),
            facing: beach.facing.as_str(),
            sea_temp_display: display_temp(marine.sea_temp_c),
            waves: (mode == Mode::Swimming).then(|| WavesView {
                height_display: format!("{:.1}m", marine.wave_height_m),
            }),
            tide: conditions.tide.clone(),
            weather: CardWeather {
                air_temp_display: display_temp(marine.air_temp_c),
                feels_like_display: display_temp(marine.feels_like_c),
                uv_index: marine.uv_index,
            },
            sewage: conditions.sewage.clone(),
            sun: CardSun {
                sunrise: conditions.sun.sunrise.clone(),
                sunset: conditions.sun.sunset.clone(),
                show_sunrise_badge: sun::show_sunrise_badge(time.slot, target),
                show_sunset_badge: sun::show_sunset_badge(
                    time.slot,
                    beach.facing,
                    marine.cloud_cover_pct,
                ),
            },
            alerts: CardAlerts {
                recent_rainfall: marine.precipitation_mm > HEAVY_RAINFALL_MM,
                bathing_water_quality: "good",
            },
            recommendation: recommendation.into(),
            is_forecast: time.slot.is_forecast(),
        })
    }

    /// Raw adapter outputs for one beach - diagnostics only.
    pub async fn debug(&self, slug: &str, slot: TimeSlot) -> Result<DebugConditions, ApiError> {
        let beach = locations::find(slug).ok_or(ApiError::UnknownBeach)?;
        let now = london_now();
        let target = slot.target_time(now);

        let (tide, marine, sewage) = tokio::join!(
            self.source.tide(beach, target),
            self.source.marine(beach, target),
            self.source.sewage(beach),
        );

        let (marine, marine_error) = match marine {
            Ok(snapshot) => (Some(snapshot), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Ok(DebugConditions {
            beach: beach.name.to_string(),
            slug: beach.slug.to_string(),
            time_slot: slot.id(),
            target: target.to_rfc3339(),
            tide,
            marine,
            marine_error,
            sewage,
        })
    }
}

fn display_temp(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}°C", v.round()),
        None => TideReading::UNKNOWN_TIME.to_string(),
    }
}
