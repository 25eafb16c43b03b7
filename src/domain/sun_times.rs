// Sun-time domain model and solar position math
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sunrise and sunset for one calendar date, in decimal local-clock hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: f64,
    pub sunset: f64,
}

impl SunTimes {
    /// Day window used when no entry exists for a date
    pub const FALLBACK: SunTimes = SunTimes::new(6.0, 20.0);
    /// The sun never rises
    pub const POLAR_NIGHT: SunTimes = SunTimes::new(12.0, 12.0);
    /// The sun never sets
    pub const MIDNIGHT_SUN: SunTimes = SunTimes::new(0.0, 24.0);

    pub const fn new(sunrise: f64, sunset: f64) -> Self {
        Self { sunrise, sunset }
    }

    pub fn is_night_at(&self, hour: f64) -> bool {
        hour < self.sunrise || hour >= self.sunset
    }
}

/// Per-date sunrise/sunset lookup, keyed by `YYYY-MM-DD`.
///
/// Populated once by a loader before rendering starts and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct SunTimeTable {
    entries: HashMap<String, SunTimes>,
}

impl SunTimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: impl Into<String>, times: SunTimes) {
        self.entries.insert(date.into(), times);
    }

    pub fn get(&self, date: &str) -> Option<&SunTimes> {
        self.entries.get(date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Night iff the timestamp's clock time falls before sunrise or at/after sunset.
    ///
    /// Timestamps look like `2024-06-15T14:30`. A timestamp without a readable
    /// clock time is treated as daytime.
    pub fn is_night(&self, timestamp: &str) -> bool {
        let Some(hour) = decimal_hours(timestamp) else {
            return false;
        };
        let times = timestamp
            .get(..10)
            .and_then(|date| self.get(date))
            .copied()
            .unwrap_or(SunTimes::FALLBACK);
        times.is_night_at(hour)
    }
}

impl FromIterator<(String, SunTimes)> for SunTimeTable {
    fn from_iter<I: IntoIterator<Item = (String, SunTimes)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Extract `HH + MM/60` from a `YYYY-MM-DDTHH:MM` timestamp
pub fn decimal_hours(timestamp: &str) -> Option<f64> {
    let hours: f64 = timestamp.get(11..13)?.parse().ok()?;
    let minutes: f64 = timestamp.get(14..16)?.parse().ok()?;
    Some(hours + minutes / 60.0)
}

/// Where on Earth sun times are computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Real offset of local clock time from UTC, DST included
    pub utc_offset_hours: f64,
}

impl SolarLocation {
    pub fn new(latitude: f64, longitude: f64, utc_offset_hours: f64) -> Self {
        Self {
            latitude,
            longitude,
            utc_offset_hours,
        }
    }

    /// Location on the meridian of its timezone, for callers without a longitude.
    /// Clock time then equals mean solar time.
    pub fn on_zone_meridian(latitude: f64, utc_offset_hours: f64) -> Self {
        Self::new(latitude, utc_offset_hours * 15.0, utc_offset_hours)
    }
}

/// `num_days_from_ce` of 2000-01-01
const J2000_DAYS_FROM_CE: i32 = 730_120;
const OBLIQUITY_DEG: f64 = 23.4397;
/// Apparent altitude of the sun's upper limb at sunrise, refraction included
const SUNRISE_ALTITUDE_DEG: f64 = -0.833;

/// Solar geometry of one date at one place (NOAA simplified algorithm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarDay {
    pub declination_deg: f64,
    /// Cosine of the sunrise hour angle; outside [-1, 1] at polar latitudes
    pub cos_hour_angle: f64,
    /// Delay of solar transit past mean noon, in hours (equation of time, negated)
    pub transit_delay_hours: f64,
}

impl SolarDay {
    pub fn compute(date: NaiveDate, latitude: f64, longitude: f64) -> Self {
        let days = f64::from(date.num_days_from_ce() - J2000_DAYS_FROM_CE);
        let mean_solar_day = days - longitude / 360.0;

        let mean_anomaly = (357.5291 + 0.98560028 * mean_solar_day).rem_euclid(360.0);
        let m = mean_anomaly.to_radians();
        let centre = 1.9148 * m.sin() + 0.0200 * (2.0 * m).sin();
        let ecliptic_longitude = (mean_anomaly + centre + 180.0 + 102.9372).rem_euclid(360.0);
        let lambda = ecliptic_longitude.to_radians();

        let sin_declination = lambda.sin() * OBLIQUITY_DEG.to_radians().sin();
        let declination = sin_declination.asin();
        let phi = latitude.to_radians();

        let cos_hour_angle = (SUNRISE_ALTITUDE_DEG.to_radians().sin() - phi.sin() * sin_declination)
            / (phi.cos() * declination.cos());
        let transit_delay_hours = (0.0053 * m.sin() - 0.0069 * (2.0 * lambda).sin()) * 24.0;

        Self {
            declination_deg: declination.to_degrees(),
            cos_hour_angle,
            transit_delay_hours,
        }
    }

    /// Half the daylight span in hours, or the polar edge case.
    fn half_day_hours(&self) -> Result<f64, SunTimes> {
        if self.cos_hour_angle > 1.0 {
            Err(SunTimes::POLAR_NIGHT)
        } else if self.cos_hour_angle < -1.0 {
            Err(SunTimes::MIDNIGHT_SUN)
        } else {
            Ok(self.cos_hour_angle.acos().to_degrees() / 15.0)
        }
    }

    /// Sunrise and sunset in apparent solar time (solar noon at 12:00)
    pub fn apparent_solar_times(&self) -> SunTimes {
        match self.half_day_hours() {
            Ok(half) => SunTimes::new(12.0 - half, 12.0 + half),
            Err(polar) => polar,
        }
    }
}

/// Sunrise and sunset in local clock hours for a date and location.
///
/// Accurate to a minute or two away from the poles. Polar night yields
/// `(12, 12)` and midnight sun `(0, 24)`.
pub fn sunrise_sunset_hours(date: NaiveDate, location: &SolarLocation) -> SunTimes {
    let day = SolarDay::compute(date, location.latitude, location.longitude);
    match day.half_day_hours() {
        Ok(half) => {
            let noon = 12.0 - location.longitude / 15.0
                + day.transit_delay_hours
                + location.utc_offset_hours;
            SunTimes::new(noon - half, noon + half)
        }
        Err(polar) => polar,
    }
}

/// Last Sunday of a month
fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let last_day = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    let back = i64::from(last_day.weekday().num_days_from_sunday());
    last_day.checked_sub_signed(chrono::Duration::days(back))
}

/// Whether EU summer time is in effect for the daylight hours of `date`.
///
/// Clocks change at 01:00 UTC on the last Sundays of March and October, before
/// sunrise anywhere in Europe, so the changeover dates count as already switched.
pub fn in_eu_summer_time(date: NaiveDate) -> bool {
    match (last_sunday(date.year(), 3), last_sunday(date.year(), 10)) {
        (Some(start), Some(end)) => date >= start && date < end,
        _ => false,
    }
}

/// Format a date the way the table keys it
pub fn date_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}
