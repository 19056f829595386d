//! One-pass normalization: decoded provider input in, everything the
//! presentation layer needs out.

use crate::config::EngineConfig;
use crate::current::{current_conditions, CurrentConditions};
use crate::forecast::{
    aggregate_day_with, build_daily_forecasts, select_hourly_slice_for_date, DailyForecast,
};
use crate::provider::ForecastInput;
use crate::timeline::DayTimeline;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

/// Normalized forecast for one location.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeatherReport {
    pub timezone: Tz,
    /// Local date of the `now` the report was built for
    pub today_date: NaiveDate,
    pub current: Option<CurrentConditions>,
    /// Today's aggregate, shown separately from the outlook
    pub today: Option<DailyForecast>,
    /// Upcoming days; today only when configured to be included
    pub forecast: Vec<DailyForecast>,
}

impl WeatherReport {
    /// Day record for `date`, from `today` or the outlook.
    pub fn day(&self, date: NaiveDate) -> Option<&DailyForecast> {
        self.today
            .iter()
            .chain(self.forecast.iter())
            .find(|day| day.date == date)
    }

    /// Merged timeline of `date` with the entry for `now` resolved.
    ///
    /// Days the report does not cover yield `None`.
    pub fn timeline_for(&self, date: NaiveDate, now: DateTime<Utc>) -> Option<DayTimeline> {
        self.day(date)
            .map(|day| DayTimeline::new(&day.hourly, day.sunrise, day.sunset, now))
    }
}

/// Build the full report for `now`.
pub fn normalize(
    input: &ForecastInput,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> WeatherReport {
    let window = config.forecast.daytime_window();
    let today_date = input.local_date(now);
    let today_summary = input.daily_for(today_date);

    let today = today_summary.map(|summary| {
        let hourly = select_hourly_slice_for_date(&input.hourly, today_date, input.timezone);
        aggregate_day_with(&window, &hourly, summary)
    });

    let current = input.current.as_ref().map(|observation| {
        let hourly = today
            .as_ref()
            .map(|day| day.hourly.as_slice())
            .unwrap_or(&[]);
        current_conditions(observation, hourly, today_summary, now)
    });

    let forecast = build_daily_forecasts(
        &input.hourly,
        &input.daily,
        input.timezone,
        today_date,
        config.forecast.forecast_days,
        config.forecast.include_today,
        &window,
    );

    debug!(
        %today_date,
        forecast_days = forecast.len(),
        has_today = today.is_some(),
        "normalized weather report"
    );
    WeatherReport {
        timezone: input.timezone,
        today_date,
        current,
        today,
        forecast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DailySummary, WeatherSample};
    use chrono::{Duration, TimeZone};

    fn input() -> ForecastInput {
        let start = Utc.with_ymd_and_hms(2024, 6, 16, 0, 0, 0).unwrap();
        let hourly = (0..72)
            .map(|i| WeatherSample {
                timestamp: start + Duration::hours(i),
                temperature_c: 15.0,
                precipitation_probability_pct: i as f64,
                weather_code: if i < 24 { 3 } else { 61 },
            })
            .collect();
        let daily = (0..3)
            .map(|i| DailySummary {
                date: start.date_naive() + Duration::days(i),
                temp_min: 10.0,
                temp_max: 20.0,
                precipitation_probability_max: 50.0,
                sunrise: Some(start + Duration::days(i) + Duration::hours(5)),
                sunset: Some(start + Duration::days(i) + Duration::hours(21)),
            })
            .collect();
        ForecastInput {
            timezone: Tz::UTC,
            hourly,
            daily,
            current: None,
        }
    }

    #[test]
    fn test_normalize_splits_today_from_outlook() {
        let now = Utc.with_ymd_and_hms(2024, 6, 16, 14, 30, 0).unwrap();
        let report = normalize(&input(), now, &EngineConfig::default());

        let today = report.today.as_ref().unwrap();
        assert_eq!(today.date, now.date_naive());
        assert_eq!(today.dominant_code, 3);
        assert_eq!(report.forecast.len(), 2);
        assert_eq!(report.forecast[0].dominant_code, 61);
        assert!(report.current.is_none());
    }

    #[test]
    fn test_timeline_for_today_and_future_day() {
        let now = Utc.with_ymd_and_hms(2024, 6, 16, 14, 30, 0).unwrap();
        let report = normalize(&input(), now, &EngineConfig::default());

        let today = report.timeline_for(report.today_date, now).unwrap();
        assert_eq!(today.events.len(), 26);
        assert_eq!(today.current().unwrap().instant(), now - Duration::minutes(30));

        let tomorrow = report
            .timeline_for(report.today_date + Duration::days(1), now)
            .unwrap();
        assert_eq!(tomorrow.current_index, None);

        assert!(report
            .timeline_for(report.today_date + Duration::days(10), now)
            .is_none());
    }
}
