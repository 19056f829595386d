//! # Provider Payload Decoding
//!
//! Turns the forecast provider's columnar JSON response into the engine's
//! value types. Fetching the payload is the caller's business; this module
//! only sees a string that has already been downloaded.
//!
//! ## Payload Shape
//!
//! ```text
//! {
//!   "timezone": "Europe/Berlin", "utc_offset_seconds": 7200,
//!   "current": { "time": "2024-06-16T14:15", "temperature_2m": 19.3, ... },
//!   "hourly":  { "time": [...], "temperature_2m": [...],
//!                "precipitation_probability": [...], "weather_code": [...] },
//!   "daily":   { "time": [...], "temperature_2m_min": [...], "temperature_2m_max": [...],
//!                "precipitation_probability_max": [...], "sunrise": [...], "sunset": [...] }
//! }
//! ```
//!
//! Timestamps are local wall-clock strings in the payload's timezone.
//!
//! ## Degraded Input
//!
//! - **Ragged columns**: truncated to the shortest column
//! - **Null precipitation**: treated as 0 %
//! - **Null temperature or code**: the row is skipped
//! - **Missing sun times**: polar day/night rows keep `None`
//! - **DST gaps**: nonexistent local times use the fixed `utc_offset_seconds`;
//!   an offset too large to apply fails with [`ProviderError::Timestamp`]
//!
//! Every degradation is logged with `warn!`. Malformed JSON, an unknown
//! timezone or an unparsable timestamp fail with [`ProviderError`].

use crate::current::CurrentObservation;
use crate::{DailySummary, WeatherSample};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while decoding a provider payload.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Body is not valid JSON or does not match the payload shape
    #[error("payload JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Timezone name is not in the IANA database
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// A time or date string could not be parsed
    #[error("bad timestamp in {field}: {value:?}")]
    Timestamp { field: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPayload {
    pub timezone: String,
    #[serde(default)]
    pub utc_offset_seconds: i64,
    #[serde(default)]
    pub current: Option<RawCurrent>,
    #[serde(default)]
    pub hourly: RawHourly,
    #[serde(default)]
    pub daily: RawDaily,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrent {
    pub time: String,
    pub temperature_2m: f64,
    #[serde(default)]
    pub relative_humidity_2m: f64,
    pub apparent_temperature: f64,
    #[serde(default = "default_is_day")]
    pub is_day: u8,
    pub weather_code: i32,
    #[serde(default)]
    pub wind_speed_10m: f64,
}

fn default_is_day() -> u8 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDaily {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
}

/// Decoded provider data, ready for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInput {
    pub timezone: Tz,
    pub hourly: Vec<WeatherSample>,
    pub daily: Vec<DailySummary>,
    pub current: Option<CurrentObservation>,
}

impl ForecastInput {
    /// Local calendar date of `now` in the payload timezone.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    /// Provider row for `date`, if the payload covers it.
    pub fn daily_for(&self, date: NaiveDate) -> Option<&DailySummary> {
        self.daily.iter().find(|day| day.date == date)
    }
}

/// Resolves the payload's local wall-clock strings to UTC instants.
struct LocalClock {
    tz: Tz,
    utc_offset_seconds: i64,
}

impl LocalClock {
    fn parse(&self, field: &'static str, value: &str) -> Result<DateTime<Utc>, ProviderError> {
        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
            .map_err(|_| ProviderError::Timestamp {
                field,
                value: value.to_string(),
            })?;
        self.resolve(naive).ok_or_else(|| ProviderError::Timestamp {
            field,
            value: value.to_string(),
        })
    }

    fn parse_optional(
        &self,
        field: &'static str,
        value: Option<&String>,
    ) -> Result<Option<DateTime<Utc>>, ProviderError> {
        match value.map(|v| v.trim()) {
            None | Some("") => Ok(None),
            Some(v) => self.parse(field, v).map(Some),
        }
    }

    /// `None` only when a DST-gap time cannot be shifted by the fixed offset.
    fn resolve(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
            // Fall-back hour: the first occurrence
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => {
                warn!(%naive, tz = %self.tz, "local time falls in a DST gap");
                let offset = Duration::try_seconds(self.utc_offset_seconds)?;
                naive.checked_sub_signed(offset).map(|utc| utc.and_utc())
            }
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ProviderError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ProviderError::Timestamp {
        field: "daily.time",
        value: value.to_string(),
    })
}

/// Shortest column length; warns when the columns disagree.
fn column_len(block: &'static str, lengths: &[usize]) -> usize {
    let shortest = lengths.iter().copied().min().unwrap_or(0);
    if lengths.iter().any(|&len| len != shortest) {
        warn!(block, ?lengths, shortest, "columns differ in length, truncating");
    }
    shortest
}

impl ProviderPayload {
    pub fn from_json(body: &str) -> Result<Self, ProviderError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Decode the columns into engine value types.
    pub fn into_input(self) -> Result<ForecastInput, ProviderError> {
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|_| ProviderError::UnknownTimezone(self.timezone.clone()))?;
        let clock = LocalClock {
            tz,
            utc_offset_seconds: self.utc_offset_seconds,
        };

        let hourly = decode_hourly(&clock, &self.hourly)?;
        let daily = decode_daily(&clock, &self.daily)?;
        let current = self
            .current
            .as_ref()
            .map(|raw| decode_current(&clock, raw))
            .transpose()?;

        debug!(
            %tz,
            hourly = hourly.len(),
            daily = daily.len(),
            has_current = current.is_some(),
            "decoded provider payload"
        );
        Ok(ForecastInput {
            timezone: tz,
            hourly,
            daily,
            current,
        })
    }
}

fn decode_hourly(clock: &LocalClock, raw: &RawHourly) -> Result<Vec<WeatherSample>, ProviderError> {
    let rows = column_len(
        "hourly",
        &[
            raw.time.len(),
            raw.temperature_2m.len(),
            raw.precipitation_probability.len(),
            raw.weather_code.len(),
        ],
    );

    let mut samples = Vec::with_capacity(rows);
    for i in 0..rows {
        let (Some(temperature_c), Some(weather_code)) = (raw.temperature_2m[i], raw.weather_code[i])
        else {
            warn!(time = %raw.time[i], "hourly row without temperature or code, skipping");
            continue;
        };
        samples.push(WeatherSample {
            timestamp: clock.parse("hourly.time", &raw.time[i])?,
            temperature_c,
            precipitation_probability_pct: raw.precipitation_probability[i].unwrap_or(0.0),
            weather_code,
        });
    }
    Ok(samples)
}

fn decode_daily(clock: &LocalClock, raw: &RawDaily) -> Result<Vec<DailySummary>, ProviderError> {
    let rows = column_len(
        "daily",
        &[
            raw.time.len(),
            raw.temperature_2m_max.len(),
            raw.temperature_2m_min.len(),
            raw.precipitation_probability_max.len(),
            raw.sunrise.len(),
            raw.sunset.len(),
        ],
    );

    let mut days = Vec::with_capacity(rows);
    for i in 0..rows {
        let (Some(temp_min), Some(temp_max)) =
            (raw.temperature_2m_min[i], raw.temperature_2m_max[i])
        else {
            warn!(date = %raw.time[i], "daily row without temperatures, skipping");
            continue;
        };
        days.push(DailySummary {
            date: parse_date(&raw.time[i])?,
            temp_min,
            temp_max,
            precipitation_probability_max: raw.precipitation_probability_max[i].unwrap_or(0.0),
            sunrise: clock.parse_optional("daily.sunrise", raw.sunrise[i].as_ref())?,
            sunset: clock.parse_optional("daily.sunset", raw.sunset[i].as_ref())?,
        });
    }
    Ok(days)
}

fn decode_current(
    clock: &LocalClock,
    raw: &RawCurrent,
) -> Result<CurrentObservation, ProviderError> {
    Ok(CurrentObservation {
        time: clock.parse("current.time", &raw.time)?,
        temperature_c: raw.temperature_2m,
        apparent_temperature_c: raw.apparent_temperature,
        relative_humidity_pct: raw.relative_humidity_2m,
        wind_speed_kmh: raw.wind_speed_10m,
        weather_code: raw.weather_code,
        is_day: raw.is_day == 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BERLIN: &str = r#"{
        "timezone": "Europe/Berlin",
        "utc_offset_seconds": 7200,
        "current": {
            "time": "2024-06-16T14:15",
            "temperature_2m": 19.3,
            "relative_humidity_2m": 64,
            "apparent_temperature": 18.1,
            "is_day": 1,
            "weather_code": 63,
            "wind_speed_10m": 11.2
        },
        "hourly": {
            "time": ["2024-06-16T00:00", "2024-06-16T01:00", "2024-06-16T02:00"],
            "temperature_2m": [12.1, null, 11.4],
            "precipitation_probability": [5, 10, null],
            "weather_code": [1, 2, 3]
        },
        "daily": {
            "time": ["2024-06-16", "2024-06-17"],
            "weather_code": [63, 3],
            "temperature_2m_max": [21.2, 23.0],
            "temperature_2m_min": [9.6, 11.0],
            "sunrise": ["2024-06-16T04:43", "2024-06-17T04:43"],
            "sunset": ["2024-06-16T21:31", ""],
            "precipitation_probability_max": [60, null]
        }
    }"#;

    #[test]
    fn test_decode_berlin_payload() {
        let input = ProviderPayload::from_json(BERLIN).unwrap().into_input().unwrap();
        assert_eq!(input.timezone, Tz::Europe__Berlin);

        // Null temperature row is skipped
        assert_eq!(input.hourly.len(), 2);
        assert_eq!(
            input.hourly[0].timestamp,
            Utc.with_ymd_and_hms(2024, 6, 15, 22, 0, 0).unwrap()
        );
        assert_eq!(input.hourly[1].precipitation_probability_pct, 0.0);
        assert_eq!(input.hourly[1].weather_code, 3);

        assert_eq!(input.daily.len(), 2);
        assert_eq!(
            input.daily[0].sunrise,
            Some(Utc.with_ymd_and_hms(2024, 6, 16, 2, 43, 0).unwrap())
        );
        assert_eq!(input.daily[1].sunset, None);
        assert_eq!(input.daily[1].precipitation_probability_max, 0.0);

        let current = input.current.unwrap();
        assert_eq!(current.time, Utc.with_ymd_and_hms(2024, 6, 16, 12, 15, 0).unwrap());
        assert!(current.is_day);
        assert_eq!(current.relative_humidity_pct, 64.0);
    }

    #[test]
    fn test_ragged_columns_are_truncated() {
        let body = r#"{
            "timezone": "UTC",
            "hourly": {
                "time": ["2024-06-16T00:00", "2024-06-16T01:00"],
                "temperature_2m": [1.0],
                "precipitation_probability": [0, 0],
                "weather_code": [0, 0]
            }
        }"#;
        let input = ProviderPayload::from_json(body).unwrap().into_input().unwrap();
        assert_eq!(input.hourly.len(), 1);
        assert!(input.daily.is_empty());
        assert!(input.current.is_none());
    }

    #[test]
    fn test_unknown_timezone() {
        let body = r#"{ "timezone": "Mars/Olympus_Mons" }"#;
        let err = ProviderPayload::from_json(body).unwrap().into_input().unwrap_err();
        assert!(matches!(err, ProviderError::UnknownTimezone(name) if name == "Mars/Olympus_Mons"));
    }

    #[test]
    fn test_bad_timestamp() {
        let body = r#"{
            "timezone": "UTC",
            "hourly": {
                "time": ["yesterday"],
                "temperature_2m": [1.0],
                "precipitation_probability": [0],
                "weather_code": [0]
            }
        }"#;
        let err = ProviderPayload::from_json(body).unwrap().into_input().unwrap_err();
        assert!(matches!(err, ProviderError::Timestamp { field: "hourly.time", .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ProviderPayload::from_json("{ not json"),
            Err(ProviderError::Json(_))
        ));
    }

    #[test]
    fn test_dst_transitions() {
        let clock = LocalClock {
            tz: Tz::Europe__Berlin,
            utc_offset_seconds: 3600,
        };
        // 02:30 does not exist on 2024-03-31 in Berlin
        let gap = clock.parse("hourly.time", "2024-03-31T02:30").unwrap();
        assert_eq!(gap, Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());
        // 02:30 happens twice on 2024-10-27; the first one is still CEST
        let twice = clock.parse("hourly.time", "2024-10-27T02:30").unwrap();
        assert_eq!(twice, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }

    #[test]
    fn test_dst_gap_with_out_of_range_offset() {
        let body = r#"{
            "timezone": "Europe/Berlin",
            "utc_offset_seconds": 9000000000000000000,
            "hourly": {
                "time": ["2024-03-31T01:00", "2024-03-31T02:30"],
                "temperature_2m": [4.0, 4.2],
                "precipitation_probability": [0, 0],
                "weather_code": [0, 0]
            }
        }"#;
        match ProviderPayload::from_json(body).unwrap().into_input() {
            Err(ProviderError::Timestamp { field, value }) => {
                assert_eq!(field, "hourly.time");
                assert_eq!(value, "2024-03-31T02:30");
            }
            other => panic!("expected a timestamp error, got {other:?}"),
        }

        // Times outside the gap never touch the offset
        let clock = LocalClock {
            tz: Tz::Europe__Berlin,
            utc_offset_seconds: i64::MAX,
        };
        assert!(clock.parse("hourly.time", "2024-03-31T01:00").is_ok());
        assert!(clock.parse("hourly.time", "2024-03-31T02:30").is_err());
    }
}
