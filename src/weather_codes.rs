//! # WMO Weather Code Table
//!
//! Maps WMO present-weather codes to a coarse display category and a
//! code-specific description. Two codes can share a category while differing
//! in description ("Rain: Slight" vs "Rain: Heavy"), so the description is
//! keyed on the code, never on the category.
//!
//! Categories follow the WMO code ranges, so codes without a table entry
//! (60, 97, ...) still land in their band. Descriptions come from a static
//! table sorted by code and searched with a binary search; nothing is built
//! per call. Codes without an entry describe as code 0.

use serde::{Deserialize, Serialize};

/// Coarse weather category used for iconography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeatherCategory {
    #[default]
    Clear,
    Clouds,
    Fog,
    Rain,
    Snow,
    Thunderstorm,
}

impl WeatherCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Fog => "Fog",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
        }
    }
}

/// One entry of the WMO table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCodeInfo {
    pub code: i32,
    /// Human-readable description, e.g. "Rain: Slight"
    pub description: &'static str,
    /// Translation key: description lower-cased, whitespace runs → `_`
    pub description_key: &'static str,
}

const fn entry(
    code: i32,
    description: &'static str,
    description_key: &'static str,
) -> WeatherCodeInfo {
    WeatherCodeInfo {
        code,
        description,
        description_key,
    }
}

/// Sorted by code; `lookup` relies on that for its binary search.
static WEATHER_CODES: [WeatherCodeInfo; 28] = [
    entry(0, "Clear sky", "clear_sky"),
    entry(1, "Mainly clear", "mainly_clear"),
    entry(2, "Partly cloudy", "partly_cloudy"),
    entry(3, "Overcast", "overcast"),
    entry(45, "Fog", "fog"),
    entry(48, "Depositing rime fog", "depositing_rime_fog"),
    entry(51, "Drizzle: Light", "drizzle:_light"),
    entry(53, "Drizzle: Moderate", "drizzle:_moderate"),
    entry(55, "Drizzle: Dense", "drizzle:_dense"),
    entry(56, "Freezing Drizzle: Light", "freezing_drizzle:_light"),
    entry(57, "Freezing Drizzle: Dense", "freezing_drizzle:_dense"),
    entry(61, "Rain: Slight", "rain:_slight"),
    entry(63, "Rain: Moderate", "rain:_moderate"),
    entry(65, "Rain: Heavy", "rain:_heavy"),
    entry(66, "Freezing Rain: Light", "freezing_rain:_light"),
    entry(67, "Freezing Rain: Heavy", "freezing_rain:_heavy"),
    entry(71, "Snow fall: Slight", "snow_fall:_slight"),
    entry(73, "Snow fall: Moderate", "snow_fall:_moderate"),
    entry(75, "Snow fall: Heavy", "snow_fall:_heavy"),
    entry(77, "Snow grains", "snow_grains"),
    entry(80, "Rain showers: Slight", "rain_showers:_slight"),
    entry(81, "Rain showers: Moderate", "rain_showers:_moderate"),
    entry(82, "Rain showers: Violent", "rain_showers:_violent"),
    entry(85, "Snow showers: Slight", "snow_showers:_slight"),
    entry(86, "Snow showers: Heavy", "snow_showers:_heavy"),
    entry(
        95,
        "Thunderstorm: Slight or moderate",
        "thunderstorm:_slight_or_moderate",
    ),
    entry(96, "Thunderstorm with slight hail", "thunderstorm_with_slight_hail"),
    entry(99, "Thunderstorm with heavy hail", "thunderstorm_with_heavy_hail"),
];

/// Table entry for `code`, or the clear-sky entry when the code is unknown.
pub fn lookup(code: i32) -> &'static WeatherCodeInfo {
    match WEATHER_CODES.binary_search_by_key(&code, |info| info.code) {
        Ok(index) => &WEATHER_CODES[index],
        Err(_) => &WEATHER_CODES[0],
    }
}

/// Convert a WMO weather code to its display category.
///
/// Total over `i32`: anything outside the ranges below is `Clear`, which
/// includes the snow-shower codes 85 and 86.
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn classify_code(code: i32) -> WeatherCategory {
    match code {
        0 | 1 => WeatherCategory::Clear,
        2 | 3 => WeatherCategory::Clouds,
        45 | 48 => WeatherCategory::Fog,
        51..=67 | 80..=82 => WeatherCategory::Rain,
        71..=77 => WeatherCategory::Snow,
        95..=99 => WeatherCategory::Thunderstorm,
        _ => WeatherCategory::Clear,
    }
}

/// Translation key for the code's description ("rain:_slight", ...).
pub fn description_key(code: i32) -> &'static str {
    lookup(code).description_key
}

/// Derive a translation key from a free-form description.
pub fn to_description_key(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
