//! Display-ready view of a located transition.
//!
//! The locator returns bare instants and offsets. A [`TransitionReport`]
//! derives what a status line or dashboard shows: the local date of the change,
//! a countdown in days, a direction label and a sentence describing the change.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;

use crate::offset::OffsetSource;
use crate::transition::{Direction, TransitionEvent};

/// Whether daylight-saving time is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    SummerTime,
    WinterTime,
}

impl Period {
    /// The period in effect until `event`: a change back to a smaller offset
    /// ends summer time.
    pub fn before(event: &TransitionEvent) -> Self {
        match event.direction {
            Direction::FallBack => Period::SummerTime,
            Direction::SpringForward => Period::WinterTime,
        }
    }

    pub fn at<S: OffsetSource + ?Sized>(zone: &S, at: DateTime<Utc>) -> Self {
        if zone.is_dst(at) {
            Period::SummerTime
        } else {
            Period::WinterTime
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::SummerTime => "Summer Time",
            Period::WinterTime => "Winter Time",
        }
    }
}

/// Everything a presentation layer needs about the next transition.
///
/// Transition fields are `None` when the zone has no upcoming change; the
/// timezone is always echoed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionReport {
    pub timezone: String,
    /// ISO calendar date of the transition in the zone's local time.
    pub date: Option<String>,
    /// RFC 3339 timestamp of the transition in local time (new offset).
    pub moment: Option<String>,
    pub moment_utc: Option<String>,
    pub direction: Option<String>,
    pub direction_key: Option<String>,
    /// Size of the offset change in seconds.
    pub magnitude_seconds: Option<i64>,
    /// Whole days from the reference to the transition, rounded down.
    pub days_to_event: Option<i64>,
    pub message: Option<String>,
    pub current_period: Period,
    pub last_recalculated: Option<String>,
}

impl TransitionReport {
    /// Build a report for `event`, counted from `reference`.
    ///
    /// `computed_at` is when the event was located, if it came from a cache.
    pub fn new<S: OffsetSource + ?Sized>(
        timezone: &str,
        zone: &S,
        event: Option<&TransitionEvent>,
        reference: DateTime<Utc>,
        computed_at: Option<DateTime<Utc>>,
    ) -> Self {
        let current_period = event.map_or_else(|| Period::at(zone, reference), Period::before);
        let last_recalculated =
            computed_at.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true));

        let Some(event) = event else {
            return TransitionReport {
                timezone: timezone.to_string(),
                date: None,
                moment: None,
                moment_utc: None,
                direction: None,
                direction_key: None,
                magnitude_seconds: None,
                days_to_event: None,
                message: None,
                current_period,
                last_recalculated,
            };
        };

        let (date, moment) = match event.new_offset.to_fixed() {
            Some(offset) => {
                let local = event.moment.with_timezone(&offset);
                (
                    local.date_naive().to_string(),
                    local.to_rfc3339_opts(SecondsFormat::Secs, false),
                )
            }
            // Offsets beyond ±24h cannot be represented locally; fall back to UTC.
            None => (
                event.moment.date_naive().to_string(),
                event.moment.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        };

        TransitionReport {
            timezone: timezone.to_string(),
            date: Some(date),
            moment: Some(moment),
            moment_utc: Some(event.moment.to_rfc3339_opts(SecondsFormat::Secs, true)),
            direction: Some(event.direction.label().to_string()),
            direction_key: Some(event.direction.key().to_string()),
            magnitude_seconds: Some(event.magnitude().num_seconds()),
            days_to_event: Some(days_between(reference, event.moment)),
            message: Some(transition_message(event)),
            current_period,
            last_recalculated,
        }
    }

    pub fn has_transition(&self) -> bool {
        self.moment.is_some()
    }
}

impl fmt::Display for TransitionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(date), Some(moment), Some(direction), Some(days), Some(message)) = (
            &self.date,
            &self.moment,
            &self.direction,
            self.days_to_event,
            &self.message,
        ) else {
            return write!(
                f,
                "{}: no upcoming DST change ({})",
                self.timezone,
                self.current_period.label()
            );
        };
        writeln!(
            f,
            "{}: {} on {} ({})",
            self.timezone,
            direction,
            date,
            format_countdown(days)
        )?;
        writeln!(f, "  moment:  {moment}")?;
        writeln!(f, "  period:  {}", self.current_period.label())?;
        write!(f, "  {message}")
    }
}

/// Whole days from `from` to `to`, rounded down.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds().div_euclid(86_400)
}

/// A sentence naming the direction and size of the change, e.g.
/// "Clocks go forward (lose 1 hour)".
pub fn transition_message(event: &TransitionEvent) -> String {
    let amount = format_magnitude(event.magnitude());
    match event.direction {
        Direction::SpringForward => format!("Clocks go forward (lose {amount})"),
        Direction::FallBack => format!("Clocks go back (gain {amount})"),
    }
}

/// Format an offset change in hours, minutes and seconds, omitting zero parts.
fn format_magnitude(magnitude: Duration) -> String {
    let total = magnitude.num_seconds().unsigned_abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{} hour{}", hours, if hours == 1 { "" } else { "s" }));
    }
    if minutes > 0 {
        parts.push(format!(
            "{} minute{}",
            minutes,
            if minutes == 1 { "" } else { "s" }
        ));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!(
            "{} second{}",
            seconds,
            if seconds == 1 { "" } else { "s" }
        ));
    }
    parts.join(" ")
}

fn format_countdown(days: i64) -> String {
    match days {
        0 => "within a day".to_string(),
        1 => "in 1 day".to_string(),
        n => format!("in {n} days"),
    }
}
