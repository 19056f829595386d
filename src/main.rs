//! # Weather Engine Developer Binary
//!
//! Reads a saved provider payload, runs it through the engine and prints the
//! normalized result as JSON. Useful for checking real payloads without
//! wiring up a presentation layer.
//!
//! ```text
//! weather-engine payload.json [--config weather-engine.toml]
//!     [--now 2024-06-16T18:30:00Z] [--day 2024-06-17]
//! ```

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use std::{env, fs};
use tracing::info;

use weather_engine_lib::config::EngineConfig;
use weather_engine_lib::lunar;
use weather_engine_lib::provider::ProviderPayload;
use weather_engine_lib::report::normalize;

const USAGE: &str = "usage: weather-engine <payload.json> [--config <path>] \
                     [--now <rfc3339>] [--day <YYYY-MM-DD>]";

/// Parsed command line.
struct Args {
    payload: String,
    config: Option<String>,
    now: Option<DateTime<Utc>>,
    day: Option<NaiveDate>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut payload = None;
    let mut config = None;
    let mut now = None;
    let mut day = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(args.next().context("--config needs a path")?),
            "--now" => {
                let value = args.next().context("--now needs an RFC 3339 instant")?;
                let parsed = DateTime::parse_from_rfc3339(&value)
                    .with_context(|| format!("invalid --now value {value:?}"))?;
                now = Some(parsed.with_timezone(&Utc));
            }
            "--day" => {
                let value = args.next().context("--day needs a YYYY-MM-DD date")?;
                day = Some(
                    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .with_context(|| format!("invalid --day value {value:?}"))?,
                );
            }
            other if other.starts_with("--") => bail!("unknown option {other}"),
            other => payload = Some(other.to_string()),
        }
    }

    Ok(Args {
        payload: payload.context(USAGE)?,
        config,
        now,
        day,
    })
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => EngineConfig::load_from_path(path),
        None => EngineConfig::load(),
    };

    let body = fs::read_to_string(&args.payload)
        .with_context(|| format!("reading payload {}", args.payload))?;
    let input = ProviderPayload::from_json(&body)?.into_input()?;

    let now = args.now.unwrap_or_else(Utc::now);
    let report = normalize(&input, now, &config);
    let selected = args.day.unwrap_or(report.today_date);
    let timeline = report.timeline_for(selected, now);

    // Moon data for local noon of the selected day
    let noon = selected
        .and_hms_opt(12, 0, 0)
        .and_then(|naive| naive.and_local_timezone(input.timezone).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or(now);
    let moon = lunar::compute_moon_state(noon);
    let upcoming = lunar::next_major_phases(noon, config.moon.upcoming_phases);

    let category = report
        .day(selected)
        .map(|day| day.category().as_str())
        .unwrap_or("none");
    info!(
        %selected,
        category,
        days = report.forecast.len(),
        moon = moon.phase.key(),
        "normalized payload"
    );

    let output = json!({
        "report": report,
        "selected_day": selected,
        "timeline": timeline,
        "moon": {
            "state": moon,
            "upcoming": upcoming,
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
