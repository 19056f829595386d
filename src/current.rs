//! Current-conditions record: the provider's instantaneous observation
//! combined with today's hourly and daily rows.

use crate::timeline::is_night;
use crate::weather_codes::{self, WeatherCategory};
use crate::{DailySummary, WeatherSample};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instantaneous observation block of the provider payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentObservation {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub apparent_temperature_c: f64,
    pub relative_humidity_pct: f64,
    pub wind_speed_kmh: f64,
    pub weather_code: i32,
    /// Provider's own day/night flag
    pub is_day: bool,
}

/// Display-ready "right now" record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
    pub weather_code: i32,
    /// Taken from the hourly sample covering `now`
    pub precipitation_probability_pct: f64,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub is_night: bool,
}

impl CurrentConditions {
    pub fn category(&self) -> WeatherCategory {
        weather_codes::classify_code(self.weather_code)
    }

    pub fn description_key(&self) -> &'static str {
        weather_codes::description_key(self.weather_code)
    }
}

/// Hourly sample whose hour contains `now`.
///
/// That is the sample right before the first future one; the first sample
/// when none is past yet and the last one when all are.
pub fn sample_at<'a>(
    hourly: &'a [WeatherSample],
    now: DateTime<Utc>,
) -> Option<&'a WeatherSample> {
    match hourly.iter().position(|sample| sample.timestamp > now) {
        Some(0) => hourly.first(),
        Some(first_future) => hourly.get(first_future - 1),
        None => hourly.last(),
    }
}

/// Build the current-conditions record.
///
/// `today` is the provider's summary row for the local date of `now`, if any.
pub fn current_conditions(
    observation: &CurrentObservation,
    hourly: &[WeatherSample],
    today: Option<&DailySummary>,
    now: DateTime<Utc>,
) -> CurrentConditions {
    let sunrise = today.and_then(|day| day.sunrise);
    let sunset = today.and_then(|day| day.sunset);
    let night = match (sunrise, sunset) {
        (Some(_), Some(_)) => is_night(now, sunrise, sunset),
        _ => !observation.is_day,
    };

    CurrentConditions {
        observed_at: observation.time,
        temperature_c: observation.temperature_c,
        feels_like_c: observation.apparent_temperature_c,
        humidity_pct: observation.relative_humidity_pct,
        wind_speed_kmh: observation.wind_speed_kmh,
        weather_code: observation.weather_code,
        precipitation_probability_pct: sample_at(hourly, now)
            .map(|sample| sample.precipitation_probability_pct)
            .unwrap_or(0.0),
        temp_min: today.map(|day| day.temp_min),
        temp_max: today.map(|day| day.temp_max),
        sunrise,
        sunset,
        is_night: night,
    }
}
