//! Moon phase, illumination and upcoming major phases from a mean synodic month.
//!
//! The model anchors a mean synodic cycle at a reference new moon
//! (JD 2451549.5, 2000-01-06 00:00 UT) and treats every later lunation as an
//! exact multiple of the mean month. Accuracy: the phase name is right to
//! within about a day; major-phase instants drift by up to ~14 h from the true
//! (perturbed) events, which is plenty for a calendar-level display.
//!
//! Phase math is latitude-independent. Latitude only matters for drawing:
//! southern-hemisphere observers see the lit side mirrored, see [`MoonDisc`].

use chrono::{DateTime, Utc};
use core::f64::consts::PI;
use serde::{Deserialize, Serialize};

/// Mean synodic month in days.
pub const SYNODIC_MONTH: f64 = 29.530_588_853;
/// Julian Day of the reference new moon.
pub const REFERENCE_NEW_MOON_JD: f64 = 2_451_549.5;
/// Julian Day of 1970-01-01T00:00:00Z.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const MS_PER_DAY: f64 = 86_400_000.0;

/// The eight named phases, in cycle order starting at new moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    #[default]
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    ThirdQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub const ALL: [MoonPhase; 8] = [
        MoonPhase::NewMoon,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::FullMoon,
        MoonPhase::WaningGibbous,
        MoonPhase::ThirdQuarter,
        MoonPhase::WaningCrescent,
    ];

    /// The quarter-cycle phases, at offsets 0, ¼, ½ and ¾ of a lunation.
    pub const MAJOR: [MoonPhase; 4] = [
        MoonPhase::NewMoon,
        MoonPhase::FirstQuarter,
        MoonPhase::FullMoon,
        MoonPhase::ThirdQuarter,
    ];

    /// Translation key, e.g. `"waxing_gibbous"`.
    pub fn key(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "new_moon",
            MoonPhase::WaxingCrescent => "waxing_crescent",
            MoonPhase::FirstQuarter => "first_quarter",
            MoonPhase::WaxingGibbous => "waxing_gibbous",
            MoonPhase::FullMoon => "full_moon",
            MoonPhase::WaningGibbous => "waning_gibbous",
            MoonPhase::ThirdQuarter => "third_quarter",
            MoonPhase::WaningCrescent => "waning_crescent",
        }
    }

    pub fn is_major(&self) -> bool {
        Self::MAJOR.contains(self)
    }

    /// Whether the phase glyph is drawn flipped left-to-right at `latitude`.
    ///
    /// Only half-lit phases change shape; new and full moon look the same
    /// from either hemisphere.
    pub fn mirrored_in(&self, latitude: f64) -> bool {
        latitude < 0.0 && !matches!(self, MoonPhase::NewMoon | MoonPhase::FullMoon)
    }
}

/// Phase, illumination and age of the moon at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MoonState {
    pub phase: MoonPhase,
    /// Illuminated fraction of the disc, 0–100
    pub illumination_pct: u8,
    /// Days since the last mean new moon, in `[0, SYNODIC_MONTH)`
    pub age_days: f64,
}

/// Drawing hint for the current-moon disc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonDisc {
    /// Horizontal semi-axis of the terminator ellipse relative to the disc
    /// radius: 1 at new/full moon, 0 at the quarters, negative past them.
    pub terminator_ratio: f64,
    /// Lit side grows during the first half of the cycle
    pub waxing: bool,
    /// Southern hemisphere: flip the drawing horizontally
    pub mirrored: bool,
}

impl MoonState {
    /// Position within the cycle, `[0, 1)`.
    pub fn phase_fraction(&self) -> f64 {
        self.age_days / SYNODIC_MONTH
    }

    pub fn disc(&self, latitude: f64) -> MoonDisc {
        let fraction = self.phase_fraction();
        MoonDisc {
            terminator_ratio: (2.0 * PI * fraction).cos(),
            waxing: fraction < 0.5,
            mirrored: latitude < 0.0,
        }
    }
}

/// A future occurrence of one of the four major phases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MajorPhaseOccurrence {
    pub phase: MoonPhase,
    pub at: DateTime<Utc>,
}

/// Continuous Julian Day of a UTC instant.
pub fn to_julian_day(date: DateTime<Utc>) -> f64 {
    let ms = date.timestamp() as f64 * 1000.0 + f64::from(date.timestamp_subsec_nanos()) / 1e6;
    ms / MS_PER_DAY + UNIX_EPOCH_JD
}

/// Inverse of [`to_julian_day`], to the nearest millisecond.
///
/// Non-finite or unrepresentable Julian Days map to the Unix epoch.
pub fn from_julian_day(jd: f64) -> DateTime<Utc> {
    if !jd.is_finite() {
        return DateTime::<Utc>::default();
    }
    let ms = ((jd - UNIX_EPOCH_JD) * MS_PER_DAY).round();
    if ms.abs() >= i64::MAX as f64 {
        return DateTime::<Utc>::default();
    }
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}

/// Moon state at `date`.
pub fn compute_moon_state(date: DateTime<Utc>) -> MoonState {
    moon_state_at_julian_day(to_julian_day(date))
}

/// Moon state at a Julian Day; non-finite input gives `MoonState::default()`.
pub fn moon_state_at_julian_day(jd: f64) -> MoonState {
    if !jd.is_finite() {
        return MoonState::default();
    }

    // rem_euclid keeps dates before the reference epoch non-negative
    let mut age = (jd - REFERENCE_NEW_MOON_JD).rem_euclid(SYNODIC_MONTH);
    if age >= SYNODIC_MONTH {
        age = 0.0;
    }
    let fraction = age / SYNODIC_MONTH;

    // +0.5 rounds to the nearest phase instead of truncating
    let phase_index = ((fraction * 8.0) + 0.5).floor() as usize % 8;
    let illumination = 50.0 * (1.0 - (2.0 * PI * fraction).cos());

    MoonState {
        phase: MoonPhase::ALL[phase_index],
        illumination_pct: illumination.round().clamp(0.0, 100.0) as u8,
        age_days: age,
    }
}

/// The next `count` major phases at or after `date`, soonest first.
///
/// Each major phase appears at most once, so at most four entries come back.
pub fn next_major_phases(date: DateTime<Utc>, count: usize) -> Vec<MajorPhaseOccurrence> {
    next_major_phases_from_julian_day(to_julian_day(date), count)
}

/// [`next_major_phases`] from a Julian Day; non-finite input gives no phases.
pub fn next_major_phases_from_julian_day(jd: f64, count: usize) -> Vec<MajorPhaseOccurrence> {
    if !jd.is_finite() {
        return Vec::new();
    }

    let cycle = ((jd - REFERENCE_NEW_MOON_JD) / SYNODIC_MONTH).floor();
    let mut found: Vec<(f64, MoonPhase)> = Vec::with_capacity(MoonPhase::MAJOR.len());

    // Three lunations always hold every major phase at least once
    for cycle_offset in 0..3 {
        if found.len() >= MoonPhase::MAJOR.len() {
            break;
        }
        for (i, phase) in MoonPhase::MAJOR.iter().enumerate() {
            let phase_offset = i as f64 * 0.25;
            let phase_jd = REFERENCE_NEW_MOON_JD
                + (cycle + cycle_offset as f64 + phase_offset) * SYNODIC_MONTH;
            if phase_jd >= jd && !found.iter().any(|(_, seen)| seen == phase) {
                found.push((phase_jd, *phase));
            }
        }
    }

    found.sort_by(|a, b| a.0.total_cmp(&b.0));
    found.truncate(count);
    found
        .into_iter()
        .map(|(phase_jd, phase)| MajorPhaseOccurrence {
            phase,
            at: from_julian_day(phase_jd),
        })
        .collect()
}
