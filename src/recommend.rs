//! The decision engine. Pure: same inputs, same recommendation, no I/O.
//!
//! Output is structured - a status, a short label, and an ordered list of
//! rationale clauses with stable ids. Prose assembly lives in
//! `Recommendation::text`, so wording can change without touching the rules.

use crate::locations::Facing;
use crate::sun::SunTimes;
use crate::timeslot::TimeSlot;
use crate::upstream::types::{Conditions, SewageState};
use serde::Serialize;
use std::str::FromStr;

/// Waves above this are a hard disqualifier for swimming.
const RED_WAVE_M: f64 = 2.0;
/// Waves at or above this turn a swim amber.
const AMBER_WAVE_M: f64 = 1.5;
/// Wind above this turns a swim amber even in small surf.
const AMBER_WIND_KMH: f64 = 40.0;
/// Sea temperature below this earns swimmers a cold-water warning.
const COLD_WATER_C: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Swimming,
    Dipping,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Swimming => "swimming",
            Mode::Dipping => "dipping",
        }
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "swimming" => Ok(Mode::Swimming),
            "dipping" => Ok(Mode::Dipping),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Green,
    Amber,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClauseId {
    ActiveDischarge,
    RoughSeas,
    RecentDischarge,
    SkyState,
    ChoppyWater,
    WindWarning,
    StrongWinds,
    ExperiencedOnly,
    WaveQuality,
    SunVisibility,
    WindComfort,
    SewageClear,
    UvGuidance,
    TideTime,
    ColdWater,
    DischargeWait,
    HypothermiaRisk,
    SeaTempBand,
    NoSeaTempReading,
    FeelsLikeAdvice,
    SafeImmersion,
    StillBracing,
    LongerDip,
}

#[derive(Debug, Clone, Serialize)]
pub struct Clause {
    pub id: ClauseId,
    pub text: String,
}

impl Clause {
    fn new(id: ClauseId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub status: Status,
    pub label: &'static str,
    pub clauses: Vec<Clause>,
}

impl Recommendation {
    fn red(label: &'static str, clause: Clause) -> Self {
        Self {
            status: Status::Red,
            label,
            clauses: vec![clause],
        }
    }

    /// Join clause fragments into one sentence run, tidying the duplicate
    /// punctuation the fragments produce at their seams.
    pub fn text(&self) -> String {
        let mut text = self
            .clauses
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .replace("..", ".")
            .replace(". .", ".");
        if !text.ends_with('.') {
            text.push('.');
        }
        text
    }
}

/// When the request is for, relative to the clock it was made at.
#[derive(Debug, Clone, Copy)]
pub struct TimeContext {
    pub slot: TimeSlot,
    pub local_hour: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sky {
    HeavyRain,
    LightRain,
    Clear,
    PartlyCloudy,
    MostlyCloudy,
    Overcast,
}

impl Sky {
    fn describe(self) -> &'static str {
        match self {
            Sky::HeavyRain => "heavy rain forecast",
            Sky::LightRain => "light rain expected",
            Sky::Clear => "clear skies",
            Sky::PartlyCloudy => "partly cloudy",
            Sky::MostlyCloudy => "mostly cloudy",
            Sky::Overcast => "overcast conditions",
        }
    }
}

fn sky_state(precipitation_mm: f64, cloud_cover_pct: f64) -> Sky {
    if precipitation_mm > 2.0 {
        Sky::HeavyRain
    } else if precipitation_mm > 0.5 {
        Sky::LightRain
    } else if cloud_cover_pct < 20.0 {
        Sky::Clear
    } else if cloud_cover_pct < 50.0 {
        Sky::PartlyCloudy
    } else if cloud_cover_pct < 80.0 {
        Sky::MostlyCloudy
    } else {
        Sky::Overcast
    }
}

/// Sunrise/sunset remark when the slot and the beach's orientation line up:
/// easterly beaches get sunrise in morning slots, westerly beaches get
/// sunset in evening slots.
fn sun_visibility(
    time: &TimeContext,
    facing: Facing,
    cloud_cover_pct: f64,
    sun: &SunTimes,
) -> Option<String> {
    if time.slot.is_morning(time.local_hour) && facing.is_easterly() {
        return Some(if cloud_cover_pct < 20.0 {
            format!("sunrise at {} will be spectacular", sun.sunrise)
        } else if cloud_cover_pct > 70.0 {
            format!("sunrise at {} hidden by cloud", sun.sunrise)
        } else {
            format!("sunrise at {}", sun.sunrise)
        });
    }

    if time.slot.is_evening() && facing.is_westerly() {
        return Some(if cloud_cover_pct < 20.0 {
            format!("sunset at {} looking golden", sun.sunset)
        } else if cloud_cover_pct > 70.0 {
            format!("sunset at {} will be muted", sun.sunset)
        } else {
            format!("sunset at {}", sun.sunset)
        });
    }

    None
}

pub fn recommend(
    facing: Facing,
    conditions: &Conditions,
    mode: Mode,
    time: &TimeContext,
) -> Recommendation {
    match mode {
        Mode::Swimming => swimming(facing, conditions, time),
        Mode::Dipping => dipping(facing, conditions, time),
    }
}

fn swimming(facing: Facing, c: &Conditions, time: &TimeContext) -> Recommendation {
    let marine = &c.marine;
    let sky = sky_state(marine.precipitation_mm, marine.cloud_cover_pct);
    let wind = marine.wind_speed_kmh;

    if c.sewage.status == SewageState::Active {
        return Recommendation::red(
            "avoid",
            Clause::new(
                ClauseId::ActiveDischarge,
                format!(
                    "**active sewage discharge.** swimming not recommended. {}. try a nearby beach instead.",
                    sky.describe()
                ),
            ),
        );
    }

    if marine.wave_height_m > RED_WAVE_M {
        let weather_note = if marine.precipitation_mm > 1.0 {
            format!("{} making conditions worse.", sky.describe())
        } else {
            format!("{}.", sky.describe())
        };
        return Recommendation::red(
            "rough",
            Clause::new(
                ClauseId::RoughSeas,
                format!(
                    "**very rough seas** at {:.1}m waves. {} dangerous conditions.",
                    marine.wave_height_m, weather_note
                ),
            ),
        );
    }

    let mut clauses = Vec::new();
    let sun_remark = sun_visibility(time, facing, marine.cloud_cover_pct, &c.sun);

    let (status, label) = if c.sewage.status == SewageState::Recent {
        clauses.push(Clause::new(
            ClauseId::RecentDischarge,
            match &c.sewage.message {
                Some(message) => format!("**{}**", message),
                None => {
                    "**sewage discharge ended 24-48 hours ago.** water should be clear but some prefer to wait.".to_string()
                }
            },
        ));
        clauses.push(Clause::new(ClauseId::SkyState, sky.describe()));
        if marine.wave_height_m >= 1.0 {
            clauses.push(Clause::new(
                ClauseId::ChoppyWater,
                format!("choppy at {:.1}m", marine.wave_height_m),
            ));
        }
        if wind > 25.0 {
            clauses.push(Clause::new(
                ClauseId::WindWarning,
                format!("wind at {}km/h", wind.round()),
            ));
        }
        (Status::Amber, "check")
    } else if marine.wave_height_m >= AMBER_WAVE_M {
        clauses.push(Clause::new(
            ClauseId::ChoppyWater,
            format!("**choppy conditions** at {:.1}m waves.", marine.wave_height_m),
        ));
        clauses.push(Clause::new(ClauseId::SkyState, sky.describe()));
        if let Some(remark) = sun_remark {
            clauses.push(Clause::new(ClauseId::SunVisibility, remark));
        }
        if wind > 20.0 {
            clauses.push(Clause::new(
                ClauseId::WindWarning,
                format!("wind at {}km/h - find shelter for changing", wind.round()),
            ));
        }
        (Status::Amber, "choppy")
    } else if wind > AMBER_WIND_KMH {
        clauses.push(Clause::new(
            ClauseId::StrongWinds,
            format!("**strong winds** at {}km/h.", wind.round()),
        ));
        clauses.push(Clause::new(ClauseId::SkyState, sky.describe()));
        clauses.push(Clause::new(ClauseId::ExperiencedOnly, "experienced swimmers only"));
        (Status::Amber, "windy")
    } else {
        clauses.push(Clause::new(
            ClauseId::WaveQuality,
            if marine.wave_height_m < 0.5 {
                format!("**perfect conditions.** calm water like glass. {}.", sky.describe())
            } else if marine.wave_height_m < 1.0 {
                format!("**lovely conditions.** gentle rolling waves. {}.", sky.describe())
            } else {
                format!("**good swimming weather.** moderate swell. {}.", sky.describe())
            },
        ));

        if let Some(remark) = sun_remark {
            clauses.push(Clause::new(ClauseId::SunVisibility, remark));
        }

        if wind < 10.0 {
            clauses.push(Clause::new(ClauseId::WindComfort, "barely any breeze"));
        } else if wind < 20.0 {
            clauses.push(Clause::new(ClauseId::WindComfort, "light breeze"));
        } else if wind < 30.0 {
            clauses.push(Clause::new(
                ClauseId::WindComfort,
                "moderate breeze - nothing to worry about",
            ));
        }

        if c.sewage.status == SewageState::Clear {
            clauses.push(Clause::new(ClauseId::SewageClear, "no sewage alerts"));
        }

        if marine.uv_index >= 6.0 {
            clauses.push(Clause::new(
                ClauseId::UvGuidance,
                format!(
                    "UV high ({}) - definitely bring sun cream",
                    marine.uv_index.round()
                ),
            ));
        } else if marine.uv_index >= 3.0 && marine.cloud_cover_pct < 50.0 {
            clauses.push(Clause::new(
                ClauseId::UvGuidance,
                format!(
                    "UV moderate ({}) - sun cream recommended",
                    marine.uv_index.round()
                ),
            ));
        }

        if c.tide.is_known() {
            clauses.push(Clause::new(
                ClauseId::TideTime,
                format!("{} tide at {}", c.tide.kind.as_str(), c.tide.time),
            ));
        }

        if let Some(sea_temp) = marine.sea_temp_c {
            if sea_temp < COLD_WATER_C {
                clauses.push(Clause::new(
                    ClauseId::ColdWater,
                    format!(
                        "water's {}°C - bring warm layers for afterwards",
                        sea_temp.round()
                    ),
                ));
            }
        }

        (Status::Green, "excellent")
    };

    Recommendation {
        status,
        label,
        clauses,
    }
}

fn dipping(facing: Facing, c: &Conditions, time: &TimeContext) -> Recommendation {
    let marine = &c.marine;
    let sky = sky_state(marine.precipitation_mm, marine.cloud_cover_pct);
    let wind = marine.wind_speed_kmh;

    // Dipping is higher-exposure than swimming, so even a recent discharge
    // disqualifies.
    if matches!(c.sewage.status, SewageState::Active | SewageState::Recent) {
        return Recommendation::red(
            "wait",
            Clause::new(
                ClauseId::DischargeWait,
                format!(
                    "**sewage discharge recently.** {}. wait 48 hours for dipping.",
                    sky.describe()
                ),
            ),
        );
    }

    if let Some(feels_like) = marine.feels_like_c {
        if feels_like < 0.0 {
            let weather_note = if marine.precipitation_mm > 1.0 {
                format!("{} adding to the challenge", sky.describe())
            } else {
                sky.describe().to_string()
            };
            return Recommendation::red(
                "dangerous",
                Clause::new(
                    ClauseId::HypothermiaRisk,
                    format!(
                        "**severe hypothermia risk.** feels like {}°C outside. {}. recovery will be brutal.",
                        feels_like.round(),
                        weather_note
                    ),
                ),
            );
        }
    }

    let mut clauses = Vec::new();
    let sun_remark = sun_visibility(time, facing, marine.cloud_cover_pct, &c.sun);

    let Some(sea_temp) = marine.sea_temp_c else {
        // No reading means no banding. Err on the side of caution.
        clauses.push(Clause::new(
            ClauseId::NoSeaTempReading,
            format!(
                "**no sea temperature reading.** assume it's bracing and take it steady. {}.",
                sky.describe()
            ),
        ));
        return Recommendation {
            status: Status::Amber,
            label: "mild",
            clauses,
        };
    };

    let (status, label) = if sea_temp >= 13.0 {
        clauses.push(Clause::new(
            ClauseId::SeaTempBand,
            format!(
                "**{}°C - too mild for cold therapy.** {}.",
                sea_temp.round(),
                sky.describe()
            ),
        ));
        clauses.push(Clause::new(
            ClauseId::LongerDip,
            "better for a longer, gentler dip",
        ));
        (Status::Amber, "mild")
    } else if sea_temp <= 8.0 {
        clauses.push(Clause::new(
            ClauseId::SeaTempBand,
            format!(
                "**pure winter magic.** water at {}°C. {}.",
                sea_temp.round(),
                sky.describe()
            ),
        ));

        if let Some(remark) = sun_remark {
            clauses.push(Clause::new(ClauseId::SunVisibility, remark));
        }

        if wind < 15.0 {
            clauses.push(Clause::new(
                ClauseId::WindComfort,
                "still conditions for getting changed",
            ));
        } else if wind < 25.0 {
            clauses.push(Clause::new(ClauseId::WindComfort, "moderate breeze - find shelter"));
        } else {
            clauses.push(Clause::new(
                ClauseId::WindComfort,
                format!("wind at {}km/h - you'll earn this one", wind.round()),
            ));
        }

        if let Some(feels_like) = marine.feels_like_c {
            if feels_like < 5.0 {
                clauses.push(Clause::new(
                    ClauseId::FeelsLikeAdvice,
                    format!(
                        "feels like {}°C outside - warm layers essential for recovery. hot drink recommended",
                        feels_like.round()
                    ),
                ));
            }
        }

        if c.sewage.status == SewageState::Clear {
            clauses.push(Clause::new(ClauseId::SewageClear, "water quality clear"));
        }

        clauses.push(Clause::new(
            ClauseId::SafeImmersion,
            if sea_temp <= 5.0 {
                "safe time: 2-3 minutes"
            } else {
                "safe time: 3-5 minutes"
            },
        ));
        (Status::Green, "perfect")
    } else if sea_temp <= 10.0 {
        clauses.push(Clause::new(
            ClauseId::SeaTempBand,
            format!(
                "**crisp and clarifying.** {}°C. {}.",
                sea_temp.round(),
                sky.describe()
            ),
        ));

        if let Some(remark) = sun_remark {
            clauses.push(Clause::new(ClauseId::SunVisibility, remark));
        }

        if wind < 15.0 {
            clauses.push(Clause::new(ClauseId::WindComfort, "calm conditions"));
        } else if wind > 30.0 {
            clauses.push(Clause::new(
                ClauseId::WindComfort,
                format!("wind at {}km/h - breezy recovery", wind.round()),
            ));
        }

        if let Some(feels_like) = marine.feels_like_c {
            if feels_like < 8.0 {
                clauses.push(Clause::new(
                    ClauseId::FeelsLikeAdvice,
                    format!("feels like {}°C - bring extra layers", feels_like.round()),
                ));
            }
        }

        if c.sewage.status == SewageState::Clear {
            clauses.push(Clause::new(ClauseId::SewageClear, "water quality clear"));
        }

        clauses.push(Clause::new(
            ClauseId::SafeImmersion,
            "safe time: 5-10 minutes depending on your experience",
        ));
        (Status::Green, "excellent")
    } else {
        clauses.push(Clause::new(
            ClauseId::SeaTempBand,
            format!(
                "**gentle cold therapy.** {}°C. {}.",
                sea_temp.round(),
                sky.describe()
            ),
        ));
        if let Some(remark) = sun_remark {
            clauses.push(Clause::new(ClauseId::SunVisibility, remark));
        }
        clauses.push(Clause::new(ClauseId::StillBracing, "still bracing, still good"));
        (Status::Amber, "mild")
    };

    Recommendation {
        status,
        label,
        clauses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::types::{
        MarineWeatherSnapshot, SewageStatus, TideKind, TideReading,
    };

    fn calm_marine() -> MarineWeatherSnapshot {
        MarineWeatherSnapshot {
            sea_temp_c: Some(15.0),
            wave_height_m: 0.3,
            swell_height_m: 0.2,
            wave_period_s: Some(6.0),
            air_temp_c: Some(18.0),
            feels_like_c: Some(18.0),
            wind_speed_kmh: 8.0,
            wind_direction_deg: Some(200.0),
            uv_index: 2.0,
            cloud_cover_pct: 10.0,
            precipitation_mm: 0.0,
            weather_code: Some(0),
        }
    }

    fn conditions(marine: MarineWeatherSnapshot, sewage: SewageState) -> Conditions {
        Conditions {
            tide: TideReading {
                kind: TideKind::High,
                time: "14:32".to_string(),
                height_m: Some(7.1),
            },
            marine,
            sewage: SewageStatus::simple(sewage, "Welsh Water"),
            sun: SunTimes {
                sunrise: "06:10".to_string(),
                sunset: "21:05".to_string(),
            },
        }
    }

    fn midday() -> TimeContext {
        TimeContext {
            slot: TimeSlot::Now,
            local_hour: 12,
        }
    }

    fn ids(rec: &Recommendation) -> Vec<ClauseId> {
        rec.clauses.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_active_sewage_is_red_in_both_modes() {
        let c = conditions(calm_marine(), SewageState::Active);
        for mode in [Mode::Swimming, Mode::Dipping] {
            let rec = recommend(Facing::South, &c, mode, &midday());
            assert_eq!(rec.status, Status::Red, "mode {:?}", mode);
        }
    }

    #[test]
    fn test_active_sewage_overrides_perfect_weather() {
        let mut marine = calm_marine();
        marine.sea_temp_c = Some(7.0);
        marine.uv_index = 0.0;
        let c = conditions(marine, SewageState::Active);
        let swim = recommend(Facing::South, &c, Mode::Swimming, &midday());
        assert_eq!(swim.status, Status::Red);
        assert_eq!(swim.label, "avoid");
        let dip = recommend(Facing::South, &c, Mode::Dipping, &midday());
        assert_eq!(dip.status, Status::Red);
        assert_eq!(dip.label, "wait");
    }

    #[test]
    fn test_recent_sewage_disqualifies_dipping_but_not_swimming() {
        let c = conditions(calm_marine(), SewageState::Recent);
        let swim = recommend(Facing::South, &c, Mode::Swimming, &midday());
        assert_eq!(swim.status, Status::Amber);
        assert_eq!(swim.label, "check");
        let dip = recommend(Facing::South, &c, Mode::Dipping, &midday());
        assert_eq!(dip.status, Status::Red);
        assert_eq!(dip.label, "wait");
    }

    #[test]
    fn test_recent_sewage_clause_carries_tier_message() {
        let mut c = conditions(calm_marine(), SewageState::Recent);
        c.sewage.message = Some("recent discharge. check again in a few hours if concerned".to_string());
        let rec = recommend(Facing::South, &c, Mode::Swimming, &midday());
        let clause = rec
            .clauses
            .iter()
            .find(|cl| cl.id == ClauseId::RecentDischarge)
            .unwrap();
        assert!(clause.text.contains("check again in a few hours"));
    }

    #[test]
    fn test_rough_seas_are_red() {
        let mut marine = calm_marine();
        marine.wave_height_m = 2.4;
        let rec = recommend(
            Facing::South,
            &conditions(marine, SewageState::Clear),
            Mode::Swimming,
            &midday(),
        );
        assert_eq!(rec.status, Status::Red);
        assert_eq!(rec.label, "rough");
    }

    #[test]
    fn test_wave_thresholds() {
        // Exactly 2.0m is not red; 1.5m and up is amber.
        let mut marine = calm_marine();
        marine.wave_height_m = 2.0;
        let rec = recommend(
            Facing::South,
            &conditions(marine.clone(), SewageState::Clear),
            Mode::Swimming,
            &midday(),
        );
        assert_eq!(rec.status, Status::Amber);
        assert_eq!(rec.label, "choppy");

        marine.wave_height_m = 1.5;
        let rec = recommend(
            Facing::South,
            &conditions(marine.clone(), SewageState::Clear),
            Mode::Swimming,
            &midday(),
        );
        assert_eq!(rec.label, "choppy");

        marine.wave_height_m = 1.4;
        let rec = recommend(
            Facing::South,
            &conditions(marine, SewageState::Clear),
            Mode::Swimming,
            &midday(),
        );
        assert_eq!(rec.status, Status::Green);
    }

    #[test]
    fn test_strong_wind_is_amber() {
        let mut marine = calm_marine();
        marine.wind_speed_kmh = 45.0;
        let rec = recommend(
            Facing::South,
            &conditions(marine, SewageState::Clear),
            Mode::Swimming,
            &midday(),
        );
        assert_eq!(rec.status, Status::Amber);
        assert_eq!(rec.label, "windy");
    }

    #[test]
    fn test_calm_day_is_green_excellent() {
        let rec = recommend(
            Facing::South,
            &conditions(calm_marine(), SewageState::Clear),
            Mode::Swimming,
            &midday(),
        );
        assert_eq!(rec.status, Status::Green);
        assert_eq!(rec.label, "excellent");
        assert!(ids(&rec).contains(&ClauseId::SewageClear));
        assert!(ids(&rec).contains(&ClauseId::TideTime));
    }

    #[test]
    fn test_cold_sea_warns_swimmers_but_delights_dippers() {
        let mut marine = calm_marine();
        marine.sea_temp_c = Some(7.0);
        let c = conditions(marine, SewageState::Clear);

        let swim = recommend(Facing::South, &c, Mode::Swimming, &midday());
        assert_eq!(swim.status, Status::Green);
        assert!(ids(&swim).contains(&ClauseId::ColdWater));

        let dip = recommend(Facing::South, &c, Mode::Dipping, &midday());
        assert_eq!(dip.status, Status::Green);
        assert_eq!(dip.label, "perfect");
    }

    #[test]
    fn test_warm_sea_inverts_across_modes() {
        let mut marine = calm_marine();
        marine.sea_temp_c = Some(14.0);
        let c = conditions(marine, SewageState::Clear);

        let swim = recommend(Facing::South, &c, Mode::Swimming, &midday());
        assert_eq!(swim.status, Status::Green);
        assert!(!ids(&swim).contains(&ClauseId::ColdWater));

        let dip = recommend(Facing::South, &c, Mode::Dipping, &midday());
        assert_eq!(dip.status, Status::Amber);
        assert_eq!(dip.label, "mild");
    }

    #[test]
    fn test_dipping_temperature_bands() {
        let band = |temp: f64| {
            let mut marine = calm_marine();
            marine.sea_temp_c = Some(temp);
            let rec = recommend(
                Facing::South,
                &conditions(marine, SewageState::Clear),
                Mode::Dipping,
                &midday(),
            );
            (rec.status, rec.label)
        };

        assert_eq!(band(4.0), (Status::Green, "perfect"));
        assert_eq!(band(8.0), (Status::Green, "perfect"));
        assert_eq!(band(9.5), (Status::Green, "excellent"));
        assert_eq!(band(11.0), (Status::Amber, "mild"));
        assert_eq!(band(13.0), (Status::Amber, "mild"));
    }

    #[test]
    fn test_safe_immersion_bands() {
        let safe_time = |temp: f64| {
            let mut marine = calm_marine();
            marine.sea_temp_c = Some(temp);
            let rec = recommend(
                Facing::South,
                &conditions(marine, SewageState::Clear),
                Mode::Dipping,
                &midday(),
            );
            rec.clauses
                .iter()
                .find(|c| c.id == ClauseId::SafeImmersion)
                .map(|c| c.text.clone())
                .unwrap()
        };

        assert!(safe_time(4.5).contains("2-3 minutes"));
        assert!(safe_time(7.0).contains("3-5 minutes"));
        assert!(safe_time(9.0).contains("5-10 minutes"));
    }

    #[test]
    fn test_freezing_feels_like_is_dangerous() {
        let mut marine = calm_marine();
        marine.sea_temp_c = Some(6.0);
        marine.feels_like_c = Some(-2.0);
        let rec = recommend(
            Facing::South,
            &conditions(marine, SewageState::Clear),
            Mode::Dipping,
            &midday(),
        );
        assert_eq!(rec.status, Status::Red);
        assert_eq!(rec.label, "dangerous");
    }

    #[test]
    fn test_missing_sea_temp_biases_dipping_to_caution() {
        let mut marine = calm_marine();
        marine.sea_temp_c = None;
        let rec = recommend(
            Facing::South,
            &conditions(marine, SewageState::Clear),
            Mode::Dipping,
            &midday(),
        );
        assert_eq!(rec.status, Status::Amber);
        assert!(ids(&rec).contains(&ClauseId::NoSeaTempReading));
    }

    #[test]
    fn test_null_fields_omit_clauses_without_crashing() {
        let marine = MarineWeatherSnapshot::default();
        let mut c = conditions(marine, SewageState::Clear);
        c.tide = TideReading::unknown();
        let rec = recommend(Facing::South, &c, Mode::Swimming, &midday());
        assert_eq!(rec.status, Status::Green);
        assert!(!ids(&rec).contains(&ClauseId::TideTime));
        assert!(!ids(&rec).contains(&ClauseId::UvGuidance));
        assert!(!ids(&rec).contains(&ClauseId::ColdWater));
    }

    #[test]
    fn test_sunset_remark_needs_westerly_evening() {
        let evening = TimeContext {
            slot: TimeSlot::Tonight,
            local_hour: 15,
        };
        let c = conditions(calm_marine(), SewageState::Clear);

        let west = recommend(Facing::West, &c, Mode::Swimming, &evening);
        assert!(ids(&west).contains(&ClauseId::SunVisibility));

        let south = recommend(Facing::South, &c, Mode::Swimming, &evening);
        assert!(!ids(&south).contains(&ClauseId::SunVisibility));
    }

    #[test]
    fn test_sunrise_remark_needs_easterly_morning() {
        let morning = TimeContext {
            slot: TimeSlot::TomorrowAm,
            local_hour: 12,
        };
        let c = conditions(calm_marine(), SewageState::Clear);

        let east = recommend(Facing::East, &c, Mode::Swimming, &morning);
        let remark = east
            .clauses
            .iter()
            .find(|cl| cl.id == ClauseId::SunVisibility)
            .unwrap();
        assert!(remark.text.contains("sunrise at 06:10"));

        let west = recommend(Facing::West, &c, Mode::Swimming, &morning);
        assert!(!ids(&west).contains(&ClauseId::SunVisibility));
    }

    #[test]
    fn test_text_normalizes_punctuation() {
        let rec = recommend(
            Facing::South,
            &conditions(calm_marine(), SewageState::Clear),
            Mode::Swimming,
            &midday(),
        );
        let text = rec.text();
        assert!(!text.contains(".."));
        assert!(!text.contains(". ."));
        assert!(text.ends_with('.'));
    }
}
