//! `dst-locator`: print the next DST transition for a timezone.
//!
//! The timezone defaults to the host's configured zone and the reference
//! instant to now. Output is a human summary, or a JSON array of reports.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, ValueEnum};
use dst_locator::{
    parse_rfc3339, parse_timezone, LocatorConfig, TransitionLocator, TransitionReport,
    DEFAULT_HORIZON_DAYS, DEFAULT_PROBE_STEP_DAYS,
};
use log::{debug, LevelFilter};
use simple_logger::SimpleLogger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "dst-locator",
    version,
    about = "Find the next DST transition for a timezone"
)]
struct Cli {
    /// IANA timezone, e.g. Europe/London (defaults to the host timezone)
    #[arg(short, long)]
    timezone: Option<String>,

    /// Reference instant as RFC 3339 (defaults to now)
    #[arg(long)]
    at: Option<String>,

    /// Number of successive transitions to list
    #[arg(
        short = 'n',
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    count: u64,

    /// How many days ahead to search before reporting no change
    #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
    horizon_days: i64,

    /// Spacing of the coarse probe, in days
    #[arg(long, default_value_t = DEFAULT_PROBE_STEP_DAYS)]
    probe_step_days: i64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("failed to initialize logger")?;

    let timezone = match cli.timezone {
        Some(tz) => tz,
        None => iana_time_zone::get_timezone().context("failed to read host timezone")?,
    };
    let zone = parse_timezone(&timezone)?;
    let reference = resolve_reference(cli.at.as_deref())?;
    let config = LocatorConfig::new(cli.horizon_days, cli.probe_step_days)?;
    debug!("searching {timezone} from {reference} with {config:?}");

    let events = TransitionLocator::new(config)
        .transitions_after(&zone, reference)
        .take(usize::try_from(cli.count).unwrap_or(usize::MAX))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("transition search failed for '{timezone}'"))?;

    let reports: Vec<TransitionReport> = if events.is_empty() {
        vec![TransitionReport::new(&timezone, &zone, None, reference, None)]
    } else {
        events
            .iter()
            .map(|event| TransitionReport::new(&timezone, &zone, Some(event), reference, None))
            .collect()
    };

    match cli.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&reports).context("failed to encode JSON")?;
            println!("{json}");
        }
        Format::Text => {
            let text: Vec<String> = reports.iter().map(ToString::to_string).collect();
            println!("{}", text.join("\n\n"));
        }
    }
    Ok(())
}

fn resolve_reference(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        Some(s) => Ok(parse_rfc3339(s)?),
        None => Ok(Utc::now()),
    }
}
