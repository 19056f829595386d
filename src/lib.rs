//! # Weather Engine Core Library
//!
//! This library turns the raw, columnar arrays a forecast provider hands back
//! (per-hour samples, per-day summaries, sunrise/sunset instants) into
//! normalized, display-ready structures. It never performs I/O: fetching,
//! caching and rendering belong to the callers.
//!
//! ## Design Philosophy
//!
//! ### Pure Transformations
//! - **Stateless**: every operation is a function of its explicit inputs
//! - **Value types**: samples, forecasts and timeline events are plain owned
//!   values; every transformation returns new data
//! - **Graceful degradation**: unknown weather codes fall back to clear sky,
//!   missing hourly coverage yields empty lists, non-finite Julian Days yield
//!   sentinel moon states
//!
//! ### Timezone Correctness
//! Instants are stored as `DateTime<Utc>`. The provider's IANA timezone is
//! only consulted when a *local calendar date* matters, which is when hourly
//! samples are bucketed into days. A sample at 23:30 local time belongs to
//! that local day even when its UTC timestamp has already rolled over.
//!
//! ### Data Flow
//! 1. **Parse**: [`provider::ProviderPayload`] → [`provider::ForecastInput`]
//! 2. **Aggregate**: [`forecast::build_daily_forecasts`] → `Vec<DailyForecast>`
//! 3. **Merge**: [`timeline::build_timeline`] + [`timeline::resolve_current_index`]
//! 4. **Moon**: [`lunar::compute_moon_state`] + [`lunar::next_major_phases`]
//!
//! [`report::normalize`] runs steps 2–3 in one pass.
//!
//! ## Core Types
//!
//! - [`WeatherSample`]: one hour of provider data
//! - [`DailySummary`]: one provider day row (min/max, precipitation, sun times)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod current;
pub mod forecast;
pub mod lunar;
pub mod provider;
pub mod report;
pub mod timeline;
pub mod weather_codes;


pub use forecast::DailyForecast;
pub use timeline::TimelineEvent;
pub use weather_codes::WeatherCategory;

/// One hour of forecast data as delivered by the provider.
///
/// Samples are never mutated by the engine. The weather code is kept as the
/// raw provider integer so unknown codes survive untouched; interpretation
/// happens through [`weather_codes::classify_code`].
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use weather_engine_lib::{WeatherCategory, WeatherSample};
///
/// let sample = WeatherSample {
///     timestamp: Utc.with_ymd_and_hms(2024, 6, 16, 14, 0, 0).unwrap(),
///     temperature_c: 21.4,
///     precipitation_probability_pct: 35.0,
///     weather_code: 61,
/// };
///
/// assert_eq!(sample.category(), WeatherCategory::Rain);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Start of the hour, UTC
    pub timestamp: DateTime<Utc>,
    /// Air temperature at 2 m in °C
    pub temperature_c: f64,
    /// Probability of precipitation (0–100)
    pub precipitation_probability_pct: f64,
    /// WMO present-weather code (0–99)
    pub weather_code: i32,
}

impl WeatherSample {
    /// Weather category of this hour.
    pub fn category(&self) -> WeatherCategory {
        weather_codes::classify_code(self.weather_code)
    }
}

/// One row of the provider's per-day arrays.
///
/// The provider exposes no daily average or daily feels-like temperature;
/// [`forecast::aggregate_day`] approximates both from `temp_min`/`temp_max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Local calendar date the row describes
    pub date: NaiveDate,
    /// Daily minimum temperature in °C
    pub temp_min: f64,
    /// Daily maximum temperature in °C
    pub temp_max: f64,
    /// Highest hourly precipitation probability of the day (0–100)
    pub precipitation_probability_max: f64,
    /// Sunrise instant, absent during polar night/day
    pub sunrise: Option<DateTime<Utc>>,
    /// Sunset instant, absent during polar night/day
    pub sunset: Option<DateTime<Utc>>,
}
