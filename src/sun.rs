use crate::locations::Facing;
use crate::timeslot::TimeSlot;
use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use std::f64::consts::PI;

#[derive(Debug, Clone, Serialize)]
pub struct SunTimes {
    pub sunrise: String,
    pub sunset: String,
}

/// Solar-declination approximation, good to a few minutes at UK latitudes.
pub fn sun_times(lat: f64, lon: f64, date: DateTime<Tz>) -> SunTimes {
    let day_of_year = date.ordinal() as f64;
    let lat_rad = lat * PI / 180.0;
    let declination = -23.45 * (2.0 * PI * (day_of_year + 10.0) / 365.0).cos();
    let declination_rad = declination * PI / 180.0;
    let cos_hour_angle = (-lat_rad.tan() * declination_rad.tan()).clamp(-1.0, 1.0);
    let hour_angle = cos_hour_angle.acos() * 180.0 / PI;
    let sunrise_hour = 12.0 - hour_angle / 15.0 - lon / 15.0;
    let sunset_hour = 12.0 + hour_angle / 15.0 - lon / 15.0;

    SunTimes {
        sunrise: format_hour(sunrise_hour),
        sunset: format_hour(sunset_hour),
    }
}

fn format_hour(hour: f64) -> String {
    let hour = hour.rem_euclid(24.0);
    let h = hour.floor();
    let m = ((hour - h) * 60.0).floor();
    format!("{:02}:{:02}", h as u32, m as u32)
}

pub fn show_sunrise_badge(slot: TimeSlot, target: DateTime<Tz>) -> bool {
    slot.is_morning(target.hour())
}

pub fn show_sunset_badge(slot: TimeSlot, facing: Facing, cloud_cover: f64) -> bool {
    facing.is_westerly() && cloud_cover < 30.0 && slot.is_evening()
}
