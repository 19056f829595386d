//! # Day Timeline
//!
//! Merges a day's hourly samples with its sunrise and sunset instants into a
//! single chronologically ordered sequence, and resolves which entry stands
//! for "now" so the presentation layer can highlight it.
//!
//! The merge uses a stable sort keyed on the instant: when an astronomical
//! event shares its instant with an hourly sample, the sample stays first.
//! The current index is recomputed on every call; there is no cursor state.

use crate::WeatherSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One point-in-time entry of a day's timeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEvent {
    Hourly {
        sample: WeatherSample,
        /// Before sunrise or after sunset; drives night iconography
        is_night: bool,
    },
    Sunrise {
        at: DateTime<Utc>,
    },
    Sunset {
        at: DateTime<Utc>,
    },
}

impl TimelineEvent {
    /// Ordering key of the event.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            TimelineEvent::Hourly { sample, .. } => sample.timestamp,
            TimelineEvent::Sunrise { at } | TimelineEvent::Sunset { at } => *at,
        }
    }

    pub fn is_hourly(&self) -> bool {
        matches!(self, TimelineEvent::Hourly { .. })
    }
}

/// True when `instant` falls strictly outside `[sunrise, sunset]`.
///
/// Without both sun times the instant counts as daytime.
pub fn is_night(
    instant: DateTime<Utc>,
    sunrise: Option<DateTime<Utc>>,
    sunset: Option<DateTime<Utc>>,
) -> bool {
    match (sunrise, sunset) {
        (Some(rise), Some(set)) => instant < rise || instant > set,
        _ => false,
    }
}

/// Fraction of the daylight period elapsed at `now`.
///
/// `Some` only while the sun is up, i.e. strictly between sunrise and sunset.
pub fn daylight_progress(
    now: DateTime<Utc>,
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
) -> Option<f64> {
    if now <= sunrise || now >= sunset {
        return None;
    }
    let total = (sunset - sunrise).num_milliseconds() as f64;
    let elapsed = (now - sunrise).num_milliseconds() as f64;
    Some(elapsed / total)
}

/// Merge hourly samples with the day's sunrise/sunset into one ordered list.
///
/// The result has `day_samples.len()` entries plus one per sun time given.
pub fn build_timeline(
    day_samples: &[WeatherSample],
    sunrise: Option<DateTime<Utc>>,
    sunset: Option<DateTime<Utc>>,
) -> Vec<TimelineEvent> {
    let mut events: Vec<TimelineEvent> = Vec::with_capacity(day_samples.len() + 2);
    events.extend(day_samples.iter().map(|sample| TimelineEvent::Hourly {
        sample: *sample,
        is_night: is_night(sample.timestamp, sunrise, sunset),
    }));
    if let Some(at) = sunrise {
        events.push(TimelineEvent::Sunrise { at });
    }
    if let Some(at) = sunset {
        events.push(TimelineEvent::Sunset { at });
    }

    // sort_by_key is stable
    events.sort_by_key(TimelineEvent::instant);
    debug!(events = events.len(), "built day timeline");
    events
}

/// Index of the event that represents `now`, if the timeline is today's.
///
/// A timeline with no event strictly before `now` is a future day and gets
/// `None`. Otherwise the current entry is the one right before the first
/// future event, or the last entry when every event is past.
pub fn resolve_current_index(timeline: &[TimelineEvent], now: DateTime<Utc>) -> Option<usize> {
    if !timeline.iter().any(|event| event.instant() < now) {
        return None;
    }

    match timeline.iter().position(|event| event.instant() > now) {
        None => Some(timeline.len() - 1),
        Some(0) => Some(0),
        Some(first_future) => Some(first_future - 1),
    }
}

/// A day's timeline together with its highlighted entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayTimeline {
    pub events: Vec<TimelineEvent>,
    pub current_index: Option<usize>,
}

impl DayTimeline {
    pub fn new(
        day_samples: &[WeatherSample],
        sunrise: Option<DateTime<Utc>>,
        sunset: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let events = build_timeline(day_samples, sunrise, sunset);
        let current_index = resolve_current_index(&events, now);
        DayTimeline {
            events,
            current_index,
        }
    }

    pub fn current(&self) -> Option<&TimelineEvent> {
        self.current_index.and_then(|index| self.events.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Timelike};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 16, hour, minute, 0).unwrap()
    }

    fn hours(range: std::ops::Range<u32>) -> Vec<WeatherSample> {
        range
            .map(|hour| WeatherSample {
                timestamp: at(hour, 0),
                temperature_c: 12.0 + hour as f64,
                precipitation_probability_pct: 0.0,
                weather_code: 1,
            })
            .collect()
    }

    #[test]
    fn test_timeline_length_and_order() {
        let samples = hours(0..24);
        let timeline = build_timeline(&samples, Some(at(5, 12)), Some(at(21, 3)));

        assert_eq!(timeline.len(), 26);
        for pair in timeline.windows(2) {
            assert!(pair[0].instant() <= pair[1].instant());
        }
        assert_eq!(timeline[6], TimelineEvent::Sunrise { at: at(5, 12) });
        assert_eq!(timeline[23], TimelineEvent::Sunset { at: at(21, 3) });
    }

    #[test]
    fn test_timeline_sorts_unordered_samples() {
        let mut samples = hours(0..6);
        samples.reverse();
        let timeline = build_timeline(&samples, None, Some(at(2, 30)));
        assert_eq!(timeline.len(), 7);
        for pair in timeline.windows(2) {
            assert!(pair[0].instant() <= pair[1].instant());
        }
    }

    #[test]
    fn test_tied_instants_keep_hourly_first() {
        let samples = hours(5..7);
        let timeline = build_timeline(&samples, Some(at(6, 0)), None);
        assert!(timeline[1].is_hourly());
        assert_eq!(timeline[2], TimelineEvent::Sunrise { at: at(6, 0) });
    }

    #[test]
    fn test_night_flags() {
        let samples = hours(0..24);
        let timeline = build_timeline(&samples, Some(at(5, 12)), Some(at(21, 3)));
        let night_hours: Vec<u32> = timeline
            .iter()
            .filter_map(|event| match event {
                TimelineEvent::Hourly { sample, is_night } if *is_night => {
                    Some(sample.timestamp.hour())
                }
                _ => None,
            })
            .collect();
        assert_eq!(night_hours, vec![0, 1, 2, 3, 4, 5, 22, 23]);
    }

    #[test]
    fn test_missing_sun_times_mean_daytime() {
        assert!(!is_night(at(2, 0), None, Some(at(21, 0))));
        assert!(!is_night(at(2, 0), None, None));
        assert!(is_night(at(2, 0), Some(at(5, 0)), Some(at(21, 0))));
        assert!(!is_night(at(5, 0), Some(at(5, 0)), Some(at(21, 0))));
    }

    #[test]
    fn test_empty_day_gives_empty_timeline() {
        assert!(build_timeline(&[], None, None).is_empty());
        assert_eq!(resolve_current_index(&[], at(12, 0)), None);
    }

    #[test]
    fn test_sun_events_only() {
        let timeline = build_timeline(&[], Some(at(5, 0)), Some(at(20, 0)));
        assert_eq!(
            timeline,
            vec![
                TimelineEvent::Sunrise { at: at(5, 0) },
                TimelineEvent::Sunset { at: at(20, 0) },
            ]
        );
    }

    #[test]
    fn test_current_index_mid_afternoon() {
        let timeline = build_timeline(&hours(0..24), None, None);
        assert_eq!(resolve_current_index(&timeline, at(14, 30)), Some(14));
    }

    #[test]
    fn test_current_index_counts_sun_events() {
        let timeline = build_timeline(&hours(0..24), Some(at(5, 12)), Some(at(21, 3)));
        let index = resolve_current_index(&timeline, at(5, 40)).unwrap();
        assert_eq!(timeline[index], TimelineEvent::Sunrise { at: at(5, 12) });
    }

    #[test]
    fn test_current_index_future_day() {
        let timeline = build_timeline(&hours(0..24), None, None);
        let yesterday = at(12, 0) - Duration::days(1);
        assert_eq!(resolve_current_index(&timeline, yesterday), None);
        // "now" exactly on the first event: nothing is strictly past yet
        assert_eq!(resolve_current_index(&timeline, at(0, 0)), None);
    }

    #[test]
    fn test_current_index_all_past() {
        let timeline = build_timeline(&hours(0..24), None, None);
        let tomorrow = at(12, 0) + Duration::days(1);
        assert_eq!(resolve_current_index(&timeline, tomorrow), Some(23));
    }

    #[test]
    fn test_current_index_exact_hour() {
        let timeline = build_timeline(&hours(0..24), None, None);
        assert_eq!(resolve_current_index(&timeline, at(9, 0)), Some(9));
    }

    #[test]
    fn test_daylight_progress() {
        assert_eq!(daylight_progress(at(12, 0), at(6, 0), at(18, 0)), Some(0.5));
        assert_eq!(daylight_progress(at(6, 0), at(6, 0), at(18, 0)), None);
        assert_eq!(daylight_progress(at(19, 0), at(6, 0), at(18, 0)), None);
    }

    #[test]
    fn test_day_timeline_current_event() {
        let day = DayTimeline::new(&hours(0..24), None, None, at(14, 30));
        match day.current() {
            Some(TimelineEvent::Hourly { sample, .. }) => assert_eq!(sample.timestamp, at(14, 0)),
            other => panic!("unexpected current event: {other:?}"),
        }
    }
}
