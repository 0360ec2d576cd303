pub mod marine;
pub mod sewage;
pub mod tide;
pub mod types;

use crate::config::Config;
use crate::limits::FetchLimits;
use crate::locations::Location;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;

use marine::{MarineClient, MarineError};
use sewage::SewageClient;
use tide::TideClient;
use types::{MarineWeatherSnapshot, SewageStatus, TideReading};

/// Seam between the orchestrator and the upstream clients. Tide and sewage
/// always produce a value (degraded on failure); marine is the one feed
/// whose total failure is surfaced, so the orchestrator can decide whether
/// the location is usable.
#[async_trait]
pub trait ConditionsSource: Send + Sync {
    async fn tide(&self, beach: &Location, target: DateTime<Tz>) -> TideReading;
    async fn marine(
        &self,
        beach: &Location,
        target: DateTime<Tz>,
    ) -> Result<MarineWeatherSnapshot, MarineError>;
    async fn sewage(&self, beach: &Location) -> SewageStatus;
}

/// The real upstream clients, sharing one config and one rate-limit table.
pub struct LiveConditions {
    tide: TideClient,
    marine: MarineClient,
    sewage: SewageClient,
}

impl LiveConditions {
    pub fn new(config: Arc<Config>, limits: Arc<FetchLimits>) -> Self {
        Self {
            tide: TideClient::new(config.clone(), limits.clone()),
            marine: MarineClient::new(config.clone(), limits.clone()),
            sewage: SewageClient::new(config, limits),
        }
    }
}

#[async_trait]
impl ConditionsSource for LiveConditions {
    async fn tide(&self, beach: &Location, target: DateTime<Tz>) -> TideReading {
        self.tide.reading_for(beach.station_id, target).await
    }

    async fn marine(
        &self,
        beach: &Location,
        target: DateTime<Tz>,
    ) -> Result<MarineWeatherSnapshot, MarineError> {
        self.marine.snapshot_for(beach.lat, beach.lon, target).await
    }

    async fn sewage(&self, beach: &Location) -> SewageStatus {
        self.sewage.status_for(beach).await
    }
}
