// Sun-time table population, run once before the server starts
use crate::domain::sun_times::{
    SolarLocation, SunTimeTable, SunTimes, date_key, decimal_hours, in_eu_summer_time,
    sunrise_sunset_hours,
};
use crate::infrastructure::config::SunSettings;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

/// Daily block of an open-meteo forecast response
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    time: Vec<String>,
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

/// Build the table from settings: a file wins over a computed table;
/// with neither the table stays empty and the fixed day window applies.
pub fn load_sun_table(settings: &SunSettings) -> Result<SunTimeTable> {
    if let Some(path) = &settings.table_path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sun table {}", path))?;
        let table = parse_open_meteo_daily(&raw)
            .with_context(|| format!("Failed to parse sun table {}", path))?;
        if table.is_empty() {
            tracing::warn!("Sun table {} has no usable entries", path);
        } else {
            tracing::info!("Loaded {} sun-time entries from {}", table.len(), path);
        }
        return Ok(table);
    }

    match (settings.latitude, settings.utc_offset_hours) {
        (Some(latitude), Some(offset)) => {
            let location = match settings.longitude {
                Some(longitude) => SolarLocation::new(latitude, longitude, offset),
                None => SolarLocation::on_zone_meridian(latitude, offset),
            };
            let local_now = Utc::now() + Duration::minutes((offset * 60.0).round() as i64);
            let table = compute_table(
                &location,
                local_now.date_naive(),
                settings.days,
                settings.eu_summer_time,
            );
            tracing::info!(
                "Computed {} sun-time entries for lat {:.3}, lon {:.3}",
                table.len(),
                location.latitude,
                location.longitude
            );
            Ok(table)
        }
        _ => {
            tracing::warn!("No sun-time source configured, using 06:00-20:00 day window");
            Ok(SunTimeTable::new())
        }
    }
}

/// Parse `{"daily": {"time": [..], "sunrise": [..], "sunset": [..]}}`.
///
/// Days whose sunrise or sunset is missing or unreadable are skipped.
pub fn parse_open_meteo_daily(raw: &str) -> Result<SunTimeTable> {
    let response: OpenMeteoResponse = serde_json::from_str(raw)?;
    let daily = response.daily;

    Ok(daily
        .time
        .iter()
        .zip(daily.sunrise.iter().zip(daily.sunset.iter()))
        .filter_map(|(date, (sunrise, sunset))| {
            let times = SunTimes::new(decimal_hours(sunrise)?, decimal_hours(sunset)?);
            Some((date.clone(), times))
        })
        .collect())
}

/// Local approximation for `days` consecutive dates starting at `start`.
///
/// With `eu_summer_time` the location's offset is standard time and one hour
/// is added on dates inside EU summer time.
pub fn compute_table(
    location: &SolarLocation,
    start: NaiveDate,
    days: u32,
    eu_summer_time: bool,
) -> SunTimeTable {
    start
        .iter_days()
        .take(days as usize)
        .map(|date| {
            let mut local = *location;
            if eu_summer_time && in_eu_summer_time(date) {
                local.utc_offset_hours += 1.0;
            }
            (date_key(date), sunrise_sunset_hours(date, &local))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_open_meteo_daily() {
        let raw = r#"{
            "latitude": 55.68,
            "daily": {
                "time": ["2024-06-15", "2024-06-16", "2024-06-17"],
                "sunrise": ["2024-06-15T04:30", "2024-06-16T04:25", ""],
                "sunset": ["2024-06-15T21:48", "2024-06-16T21:57", "2024-06-17T21:57"]
            }
        }"#;
        let table = parse_open_meteo_daily(raw).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("2024-06-15").unwrap().sunrise, 4.5);
        assert_eq!(table.get("2024-06-15").unwrap().sunset, 21.8);
        assert!(table.get("2024-06-17").is_none());
    }

    #[test]
    fn test_parse_rejects_missing_daily_block() {
        assert!(parse_open_meteo_daily(r#"{"hourly": {}}"#).is_err());
    }

    #[test]
    fn test_compute_table_covers_requested_days() {
        let aarhus = SolarLocation::new(56.16, 10.2, 2.0);
        let start = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let table = compute_table(&aarhus, start, 3, false);

        assert_eq!(table.len(), 3);
        let first = table.get("2024-06-15").unwrap();
        assert!(first.sunrise > 4.0 && first.sunrise < 5.0);
        assert!(first.sunset > 21.5 && first.sunset < 22.5);
        assert!(table.get("2024-06-17").is_some());
    }

    #[test]
    fn test_compute_table_follows_summer_time_change() {
        // CET standard offset; clocks go forward on 2024-03-31
        let copenhagen = SolarLocation::new(55.676, 12.568, 1.0);
        let start = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();

        let switched = compute_table(&copenhagen, start, 2, true);
        let before = switched.get("2024-03-30").unwrap();
        let after = switched.get("2024-03-31").unwrap();
        // One clock hour later, less about three minutes of lengthening day
        let jump = after.sunrise - before.sunrise;
        assert!(jump > 0.9 && jump < 1.0, "jump {}", jump);

        let fixed = compute_table(&copenhagen, start, 2, false);
        let fixed_jump = fixed.get("2024-03-31").unwrap().sunrise - fixed.get("2024-03-30").unwrap().sunrise;
        assert!(fixed_jump < 0.0, "fixed jump {}", fixed_jump);
    }

    #[test]
    fn test_load_without_source_is_empty() {
        let table = load_sun_table(&SunSettings::default()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let settings = SunSettings {
            table_path: Some("does/not/exist.json".to_string()),
            ..SunSettings::default()
        };
        assert!(load_sun_table(&settings).is_err());
    }
}
