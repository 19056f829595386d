//! # Forecast Aggregation
//!
//! Reduces a day's hourly samples and the provider's per-day row into one
//! [`DailyForecast`] record.
//!
//! ## Dominant Code Heuristic
//!
//! The day's icon comes from the most frequent weather code within the
//! daytime window (07:00–18:59 by default). Overnight hours are left out of
//! the vote because a user scanning a multi-day outlook cares about the
//! conditions while they are awake and outside.
//!
//! - **Window**: indices `start_hour..=end_hour` of the day's code sequence
//! - **Short days**: if the window is empty, the code at the midpoint of the
//!   whole sequence is used
//! - **Empty days**: code 0 (clear sky)
//! - **Ties**: first-encountered code wins; a later code only takes the lead
//!   with a strictly greater count
//!
//! ## Temperature Approximation
//!
//! The provider has no daily mean or daily feels-like value, so both are
//! `(max + min) / 2` rounded to the nearest integer.
//!
//! ## Day Bucketing
//!
//! Hourly samples are assigned to days by their *local* calendar date in the
//! provider's timezone, never by the UTC date.

use crate::timeline::{build_timeline, TimelineEvent};
use crate::weather_codes::{self, WeatherCategory};
use crate::{DailySummary, WeatherSample};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One calendar day's display-ready aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_min: i32,
    pub temp_max: i32,
    /// `(max + min) / 2`, rounded
    pub temp_mid: i32,
    /// Same approximation as `temp_mid`
    pub feels_like_mid: i32,
    /// Derived from the daytime subset of `hourly` only
    pub dominant_code: i32,
    pub precipitation_probability_pct: f64,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    /// Exactly the samples whose local date equals `date`
    pub hourly: Vec<WeatherSample>,
}

impl DailyForecast {
    pub fn category(&self) -> WeatherCategory {
        weather_codes::classify_code(self.dominant_code)
    }

    pub fn description_key(&self) -> &'static str {
        weather_codes::description_key(self.dominant_code)
    }

    /// Merged hourly + sunrise/sunset timeline for this day.
    pub fn timeline(&self) -> Vec<TimelineEvent> {
        build_timeline(&self.hourly, self.sunrise, self.sunset)
    }
}

/// Inclusive hour-of-day range whose codes vote for a day's icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaytimeWindow {
    pub start_hour: usize,
    pub end_hour: usize,
}

impl Default for DaytimeWindow {
    fn default() -> Self {
        DaytimeWindow {
            start_hour: 7,
            end_hour: 18,
        }
    }
}

impl DaytimeWindow {
    /// Pick the representative code for a day's codes, ordered from hour 0.
    pub fn dominant_code(&self, hourly_codes: &[i32]) -> i32 {
        if hourly_codes.is_empty() {
            return 0;
        }

        let start = self.start_hour.min(hourly_codes.len());
        let end = self.end_hour.saturating_add(1).min(hourly_codes.len());
        if start >= end {
            return hourly_codes[hourly_codes.len() / 2];
        }

        // Vec keeps first-encounter order, which the tie-break depends on
        let mut counts: Vec<(i32, usize)> = Vec::with_capacity(end - start);
        for &code in &hourly_codes[start..end] {
            match counts.iter_mut().find(|(seen, _)| *seen == code) {
                Some((_, count)) => *count += 1,
                None => counts.push((code, 1)),
            }
        }

        let mut leader = counts[0];
        for &candidate in &counts[1..] {
            if candidate.1 > leader.1 {
                leader = candidate;
            }
        }
        leader.0
    }
}

/// [`DaytimeWindow::dominant_code`] with the default 07–18 window.
pub fn dominant_daytime_code(hourly_codes: &[i32]) -> i32 {
    DaytimeWindow::default().dominant_code(hourly_codes)
}

/// Round half-way values towards positive infinity (-2.5 → -2, 2.5 → 3).
pub(crate) fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Combine one day's hourly samples with its provider summary row.
///
/// Never drops a day: an empty `day_hourly` still yields a record, with
/// `hourly = []` and `dominant_code = 0`.
pub fn aggregate_day(day_hourly: &[WeatherSample], summary: &DailySummary) -> DailyForecast {
    aggregate_day_with(&DaytimeWindow::default(), day_hourly, summary)
}

/// [`aggregate_day`] with an explicit daytime window.
pub fn aggregate_day_with(
    window: &DaytimeWindow,
    day_hourly: &[WeatherSample],
    summary: &DailySummary,
) -> DailyForecast {
    let codes: Vec<i32> = day_hourly.iter().map(|s| s.weather_code).collect();
    let mid = round_half_up((summary.temp_max + summary.temp_min) / 2.0);

    DailyForecast {
        date: summary.date,
        temp_min: round_half_up(summary.temp_min),
        temp_max: round_half_up(summary.temp_max),
        temp_mid: mid,
        feels_like_mid: mid,
        dominant_code: window.dominant_code(&codes),
        precipitation_probability_pct: summary.precipitation_probability_max,
        sunrise: summary.sunrise,
        sunset: summary.sunset,
        hourly: day_hourly.to_vec(),
    }
}

/// Samples whose calendar date in `tz` equals `date`, in input order.
pub fn select_hourly_slice_for_date(
    hourly: &[WeatherSample],
    date: NaiveDate,
    tz: Tz,
) -> Vec<WeatherSample> {
    hourly
        .iter()
        .filter(|sample| sample.timestamp.with_timezone(&tz).date_naive() == date)
        .copied()
        .collect()
}

/// Aggregate the provider's day rows that follow `today`.
///
/// Rows dated before `today` are skipped; `today` itself only when
/// `include_today` is set. At most `days` records are produced.
pub fn build_daily_forecasts(
    hourly: &[WeatherSample],
    daily: &[DailySummary],
    tz: Tz,
    today: NaiveDate,
    days: usize,
    include_today: bool,
    window: &DaytimeWindow,
) -> Vec<DailyForecast> {
    let forecasts: Vec<DailyForecast> = daily
        .iter()
        .filter(|summary| summary.date > today || (include_today && summary.date == today))
        .take(days)
        .map(|summary| {
            let day_hourly = select_hourly_slice_for_date(hourly, summary.date, tz);
            if day_hourly.is_empty() {
                warn!(date = %summary.date, "no hourly coverage for forecast day");
            }
            aggregate_day_with(window, &day_hourly, summary)
        })
        .collect();

    debug!(
        days = forecasts.len(),
        hourly = hourly.len(),
        %tz,
        "aggregated daily forecasts"
    );
    forecasts
}
