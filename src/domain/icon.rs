// Weather icon domain model - WMO code classification
use crate::domain::sun_times::SunTimeTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Precipitation (mm per interval) at which a cloud reaches full storm darkness
pub const RAIN_SATURATION_MM: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconType {
    Sun,
    NightClear,
    SunCloud,
    NightPartly,
    CloudSun,
    Cloud,
    Drizzle,
    Rain,
    Shower,
    Snow,
    Thunder,
    Fog,
}

impl IconType {
    pub const ALL: [IconType; 12] = [
        IconType::Sun,
        IconType::NightClear,
        IconType::SunCloud,
        IconType::NightPartly,
        IconType::CloudSun,
        IconType::Cloud,
        IconType::Drizzle,
        IconType::Rain,
        IconType::Shower,
        IconType::Snow,
        IconType::Thunder,
        IconType::Fog,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IconType::Sun => "sun",
            IconType::NightClear => "night_clear",
            IconType::SunCloud => "sun_cloud",
            IconType::NightPartly => "night_partly",
            IconType::CloudSun => "cloud_sun",
            IconType::Cloud => "cloud",
            IconType::Drizzle => "drizzle",
            IconType::Rain => "rain",
            IconType::Shower => "shower",
            IconType::Snow => "snow",
            IconType::Thunder => "thunder",
            IconType::Fog => "fog",
        }
    }
}

impl fmt::Display for IconType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown icon type: {0}")]
pub struct UnknownIconType(pub String);

impl FromStr for IconType {
    type Err = UnknownIconType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IconType::ALL
            .into_iter()
            .find(|icon| icon.as_str() == s)
            .ok_or_else(|| UnknownIconType(s.to_string()))
    }
}

/// Map a WMO code to an icon type.
///
/// Day/night only matters for codes 0 and 1; without a timestamp it is day.
/// Codes outside every rule render as a plain cloud.
pub fn classify_icon(code: u32, timestamp: Option<&str>, sun_times: &SunTimeTable) -> IconType {
    let night = timestamp.is_some_and(|ts| sun_times.is_night(ts));
    match code {
        0 if night => IconType::NightClear,
        0 => IconType::Sun,
        1 if night => IconType::NightPartly,
        1 => IconType::SunCloud,
        2 => IconType::CloudSun,
        3 => IconType::Cloud,
        45..=48 => IconType::Fog,
        51..=55 => IconType::Drizzle,
        61..=65 => IconType::Rain,
        71..=75 => IconType::Snow,
        80..=82 => IconType::Shower,
        95.. => IconType::Thunder,
        _ => IconType::Cloud,
    }
}

/// Cloud darkness floor in [0, 1] implied by the code alone
pub fn minimum_darkness(code: u32) -> f64 {
    match code {
        95.. => 0.70,
        82 => 0.65,
        81 => 0.50,
        80 => 0.35,
        65 => 0.60,
        63 => 0.45,
        61 => 0.30,
        55 => 0.30,
        53 => 0.20,
        51 => 0.12,
        _ => 0.0,
    }
}

/// Precipitation used for shading: the measured amount, floored by what the code implies.
pub fn effective_rain(precipitation: f64, code: Option<u32>) -> f64 {
    let measured = if precipitation.is_finite() {
        precipitation.max(0.0)
    } else {
        0.0
    };
    let floor = code.map(minimum_darkness).unwrap_or(0.0) * RAIN_SATURATION_MM;
    measured.max(floor)
}

/// Darkness ratio in [0, 1] for a precipitation amount
pub fn darkness_ratio(rain: f64) -> f64 {
    if rain > 0.0 {
        (rain / RAIN_SATURATION_MM).min(1.0)
    } else {
        0.0
    }
}
