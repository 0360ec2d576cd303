use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Europe::London;
use chrono_tz::Tz;
use serde::Serialize;
use std::str::FromStr;

/// Coarse future-time buckets the UI offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    Now,
    Tonight,
    TomorrowAm,
    TomorrowPm,
    DayAfterAm,
}

/// One entry in the offerable-slot list returned in the dashboard meta block.
#[derive(Debug, Clone, Serialize)]
pub struct SlotOption {
    pub id: &'static str,
    pub label: String,
    pub time: String,
}

pub fn london_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&London)
}

/// Resolve a wall-clock hour on a local date, tolerating DST edges.
fn london_at(date: NaiveDate, hour: u32) -> DateTime<Tz> {
    let naive = date.and_hms_opt(hour, 0, 0).expect("hour is within 0..24");
    match London.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earlier, _) => earlier,
        LocalResult::None => London.from_utc_datetime(&naive),
    }
}

impl TimeSlot {
    pub fn id(self) -> &'static str {
        match self {
            TimeSlot::Now => "now",
            TimeSlot::Tonight => "tonight",
            TimeSlot::TomorrowAm => "tomorrow-am",
            TimeSlot::TomorrowPm => "tomorrow-pm",
            TimeSlot::DayAfterAm => "day-after-am",
        }
    }

    /// Concrete local timestamp the slot refers to. "tonight" rolls to the
    /// next evening once 20:00 has passed.
    pub fn target_time(self, now: DateTime<Tz>) -> DateTime<Tz> {
        let today = now.date_naive();
        match self {
            TimeSlot::Now => now,
            TimeSlot::Tonight => {
                if now.hour() >= 20 {
                    london_at(today + Duration::days(1), 20)
                } else {
                    london_at(today, 20)
                }
            }
            TimeSlot::TomorrowAm => london_at(today + Duration::days(1), 8),
            TimeSlot::TomorrowPm => london_at(today + Duration::days(1), 17),
            TimeSlot::DayAfterAm => london_at(today + Duration::days(2), 8),
        }
    }

    /// Human label for the resolved slot, e.g. "tomorrow morning".
    pub fn label(self, now: DateTime<Tz>) -> String {
        match self {
            TimeSlot::Now => "right now".to_string(),
            TimeSlot::Tonight => "tonight".to_string(),
            TimeSlot::TomorrowAm => "tomorrow morning".to_string(),
            TimeSlot::TomorrowPm => "tomorrow evening".to_string(),
            TimeSlot::DayAfterAm => {
                let target = self.target_time(now);
                format!("{} morning", target.format("%A").to_string().to_lowercase())
            }
        }
    }

    pub fn is_forecast(self) -> bool {
        self != TimeSlot::Now
    }

    /// Whether the slot falls in a sunrise-relevant window.
    pub fn is_morning(self, local_hour: u32) -> bool {
        match self {
            TimeSlot::Now => local_hour < 9,
            TimeSlot::TomorrowAm | TimeSlot::DayAfterAm => true,
            _ => false,
        }
    }

    /// Whether the slot falls in a sunset-relevant window.
    pub fn is_evening(self) -> bool {
        matches!(self, TimeSlot::Tonight | TimeSlot::TomorrowPm)
    }
}

impl FromStr for TimeSlot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "now" => Ok(TimeSlot::Now),
            "tonight" => Ok(TimeSlot::Tonight),
            "tomorrow-am" => Ok(TimeSlot::TomorrowAm),
            "tomorrow-pm" => Ok(TimeSlot::TomorrowPm),
            "day-after-am" => Ok(TimeSlot::DayAfterAm),
            _ => Err(()),
        }
    }
}

/// The slots currently worth offering. From 18:00 "tonight" is dropped
/// because "now" already effectively means tonight.
pub fn available_slots(now: DateTime<Tz>) -> Vec<SlotOption> {
    let day_after = now.date_naive() + Duration::days(2);
    let day_after_label = london_at(day_after, 8)
        .format("%A")
        .to_string()
        .to_lowercase();

    let mut slots = vec![SlotOption {
        id: "now",
        label: "right now".to_string(),
        time: now.format("%H:%M").to_string(),
    }];

    if now.hour() < 18 {
        slots.push(SlotOption {
            id: "tonight",
            label: "tonight".to_string(),
            time: "20:00".to_string(),
        });
    }

    slots.push(SlotOption {
        id: "tomorrow-am",
        label: "tomorrow am".to_string(),
        time: "08:00".to_string(),
    });
    slots.push(SlotOption {
        id: "tomorrow-pm",
        label: "tomorrow pm".to_string(),
        time: "17:00".to_string(),
    });
    slots.push(SlotOption {
        id: "day-after-am",
        label: day_after_label,
        time: "08:00".to_string(),
    });

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london(y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
        London.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_valid_slots() {
        assert_eq!("now".parse::<TimeSlot>().unwrap(), TimeSlot::Now);
        assert_eq!("tonight".parse::<TimeSlot>().unwrap(), TimeSlot::Tonight);
        assert_eq!(
            "day-after-am".parse::<TimeSlot>().unwrap(),
            TimeSlot::DayAfterAm
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("yesterday".parse::<TimeSlot>().is_err());
        assert!("".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn test_tonight_before_8pm_is_today() {
        let now = london(2025, 6, 10, 14);
        let target = TimeSlot::Tonight.target_time(now);
        assert_eq!(target.date_naive(), now.date_naive());
        assert_eq!(target.hour(), 20);
    }

    #[test]
    fn test_tonight_after_8pm_rolls_over() {
        let now = london(2025, 6, 10, 21);
        let target = TimeSlot::Tonight.target_time(now);
        assert_eq!(target.date_naive(), now.date_naive() + Duration::days(1));
        assert_eq!(target.hour(), 20);
    }

    #[test]
    fn test_tomorrow_am_resolves_to_8am() {
        let now = london(2025, 6, 10, 14);
        let target = TimeSlot::TomorrowAm.target_time(now);
        assert_eq!(target.date_naive(), now.date_naive() + Duration::days(1));
        assert_eq!(target.hour(), 8);
    }

    #[test]
    fn test_slots_include_tonight_before_6pm() {
        let slots = available_slots(london(2025, 6, 10, 14));
        let ids: Vec<_> = slots.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec!["now", "tonight", "tomorrow-am", "tomorrow-pm", "day-after-am"]
        );
    }

    #[test]
    fn test_slots_drop_tonight_from_6pm() {
        let slots = available_slots(london(2025, 6, 10, 19));
        let ids: Vec<_> = slots.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["now", "tomorrow-am", "tomorrow-pm", "day-after-am"]);
    }

    #[test]
    fn test_day_after_label_is_weekday() {
        // 2025-06-10 is a Tuesday, so two days ahead is Thursday.
        let label = TimeSlot::DayAfterAm.label(london(2025, 6, 10, 14));
        assert_eq!(label, "thursday morning");
    }

    #[test]
    fn test_morning_evening_windows() {
        assert!(TimeSlot::Now.is_morning(8));
        assert!(!TimeSlot::Now.is_morning(11));
        assert!(TimeSlot::TomorrowAm.is_morning(15));
        assert!(TimeSlot::Tonight.is_evening());
        assert!(TimeSlot::TomorrowPm.is_evening());
        assert!(!TimeSlot::TomorrowAm.is_evening());
    }
}
