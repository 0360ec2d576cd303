use crate::sun::SunTimes;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TideKind::High => "high",
            TideKind::Low => "low",
        }
    }
}

/// Nearest tide event to the requested time. Absence of upstream data is a
/// degraded state, not an error: time shows the em-dash placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct TideReading {
    pub kind: TideKind,
    pub time: String,
    pub height_m: Option<f64>,
}

impl TideReading {
    pub const UNKNOWN_TIME: &'static str = "—";

    pub fn unknown() -> Self {
        Self {
            kind: TideKind::High,
            time: Self::UNKNOWN_TIME.to_string(),
            height_m: None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.time != Self::UNKNOWN_TIME
    }
}

/// Hourly marine + atmospheric conditions at the requested time. Every field
/// is independently nullable; gauge-like fields default to zero instead.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarineWeatherSnapshot {
    pub sea_temp_c: Option<f64>,
    pub wave_height_m: f64,
    pub swell_height_m: f64,
    pub wave_period_s: Option<f64>,
    pub air_temp_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: Option<f64>,
    pub uv_index: f64,
    pub cloud_cover_pct: f64,
    pub precipitation_mm: f64,
    pub weather_code: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SewageState {
    Clear,
    Recent,
    Active,
    UnderInvestigation,
    Unknown,
    NoData,
}

#[derive(Debug, Clone, Serialize)]
pub struct SewageStatus {
    pub status: SewageState,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_since: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_spill_hours_7d: Option<f64>,
}

impl SewageStatus {
    pub fn simple(status: SewageState, source: &str) -> Self {
        Self {
            status,
            source: source.to_string(),
            hours_since: None,
            message: None,
            recent_spill_hours_7d: None,
        }
    }
}

/// Everything the recommendation engine needs for one beach at one time.
#[derive(Debug, Clone)]
pub struct Conditions {
    pub tide: TideReading,
    pub marine: MarineWeatherSnapshot,
    pub sewage: SewageStatus,
    pub sun: SunTimes,
}
