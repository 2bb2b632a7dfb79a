//! The transition search.
//!
//! Finds the first instant after a reference at which a timezone's UTC offset
//! changes, to one-second precision, in three tiers that each narrow a
//! [`Bracket`]:
//!
//! 1. **Weekly probe**: sample the offset every `probe_step_days` from the
//!    reference until it differs from the previous sample.
//! 2. **Day bisection**: bisect the bracket on whole days until it is at most
//!    one day wide.
//! 3. **Second bisection**: bisect on seconds until the bracket is one second
//!    wide. Its upper end is the transition moment.
//!
//! A typical search costs 30–40 offset queries, and never more than
//! [`LocatorConfig::max_queries`]. All functions are pure: the reference
//! instant is always an explicit input, never the system clock.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use dst_locator::{locate_next_transition, Direction};
//!
//! let reference = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
//! let event = locate_next_transition("Europe/London", reference)
//!     .unwrap()
//!     .expect("London observes DST");
//! assert_eq!(event.moment, Utc.with_ymd_and_hms(2026, 3, 29, 1, 0, 0).unwrap());
//! assert_eq!(event.direction, Direction::SpringForward);
//! ```

use chrono::{DateTime, Duration, SubsecRound, Utc};
use log::{debug, error, trace};
use serde::Serialize;

use crate::error::{LocatorError, Result};
use crate::offset::{parse_timezone, OffsetSource, UtcOffset};
use crate::transition::TransitionEvent;

/// How far ahead the weekly probe looks before giving up.
pub const DEFAULT_HORIZON_DAYS: i64 = 400;

/// Spacing of the coarse probe.
pub const DEFAULT_PROBE_STEP_DAYS: i64 = 7;

const SECONDS_PER_DAY: i64 = 86_400;

// ── Configuration ───────────────────────────────────────────────────────────

/// Tunables for [`TransitionLocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocatorConfig {
    horizon_days: i64,
    probe_step_days: i64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig {
            horizon_days: DEFAULT_HORIZON_DAYS,
            probe_step_days: DEFAULT_PROBE_STEP_DAYS,
        }
    }
}

impl LocatorConfig {
    /// Build a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::InvalidConfig`] if either value is not positive,
    /// or if the probe step is longer than the horizon.
    pub fn new(horizon_days: i64, probe_step_days: i64) -> Result<Self> {
        if horizon_days <= 0 {
            return Err(LocatorError::InvalidConfig(format!(
                "horizon must be positive, got {horizon_days} days"
            )));
        }
        if probe_step_days <= 0 {
            return Err(LocatorError::InvalidConfig(format!(
                "probe step must be positive, got {probe_step_days} days"
            )));
        }
        if probe_step_days > horizon_days {
            return Err(LocatorError::InvalidConfig(format!(
                "probe step ({probe_step_days} days) exceeds horizon ({horizon_days} days)"
            )));
        }
        // Keep the horizon well inside chrono's representable range.
        if horizon_days > 365 * 1000 {
            return Err(LocatorError::InvalidConfig(format!(
                "horizon of {horizon_days} days is too large"
            )));
        }
        Ok(LocatorConfig {
            horizon_days,
            probe_step_days,
        })
    }

    pub fn horizon_days(&self) -> i64 {
        self.horizon_days
    }

    pub fn probe_step_days(&self) -> i64 {
        self.probe_step_days
    }

    /// Number of coarse probes needed to cover the horizon.
    pub fn max_probes(&self) -> u32 {
        let probes = (self.horizon_days + self.probe_step_days - 1) / self.probe_step_days;
        probes as u32
    }

    /// Hard ceiling on offset queries for a single search.
    ///
    /// Covers the baseline sample, every coarse probe, both bisections and the
    /// final re-verification, with a little slack. A source that forces the
    /// search past this is reported as a [`LocatorError::SearchInvariantViolation`].
    pub fn max_queries(&self) -> u32 {
        let day_steps = (u64::BITS - (self.probe_step_days as u64).leading_zeros()) + 1;
        let second_steps = u64::BITS - (SECONDS_PER_DAY as u64).leading_zeros();
        1 + self.max_probes() + day_steps + second_steps + 2 + 2
    }
}

// ── Bracket and trace ───────────────────────────────────────────────────────

/// Two instants known to straddle a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub low: DateTime<Utc>,
    pub high: DateTime<Utc>,
    pub low_offset: UtcOffset,
    pub high_offset: UtcOffset,
}

impl Bracket {
    pub fn width(&self) -> Duration {
        self.high - self.low
    }

    fn check(&self) -> Result<()> {
        if self.low >= self.high {
            return Err(violation(format!(
                "bracket collapsed: low {} is not before high {}",
                self.low, self.high
            )));
        }
        if self.low_offset == self.high_offset {
            return Err(violation(format!(
                "bracket [{}, {}] has equal offsets {} at both ends",
                self.low, self.high, self.low_offset
            )));
        }
        Ok(())
    }
}

/// The phase of the search that produced a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTier {
    WeeklyProbe,
    DayBisection,
    SecondBisection,
}

/// A bracket held by the search after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub tier: SearchTier,
    pub bracket: Bracket,
}

/// Every bracket the search held, in order, plus the number of offset queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchTrace {
    pub steps: Vec<TraceStep>,
    pub queries: u32,
}

impl SearchTrace {
    fn record(&mut self, tier: SearchTier, bracket: Bracket) {
        trace!(
            "{:?}: [{}, {}] width {}s ({} -> {})",
            tier,
            bracket.low,
            bracket.high,
            bracket.width().num_seconds(),
            bracket.low_offset,
            bracket.high_offset
        );
        self.steps.push(TraceStep { tier, bracket });
    }

    /// Steps of one tier, in order.
    pub fn tier(&self, tier: SearchTier) -> impl Iterator<Item = &Bracket> + '_ {
        self.steps
            .iter()
            .filter(move |step| step.tier == tier)
            .map(|step| &step.bracket)
    }
}

// ── Offset sampling ─────────────────────────────────────────────────────────

/// Counts offset queries and enforces the ceiling.
struct Sampler<'a, S: ?Sized> {
    source: &'a S,
    queries: u32,
    max_queries: u32,
}

impl<'a, S: OffsetSource + ?Sized> Sampler<'a, S> {
    fn new(source: &'a S, max_queries: u32) -> Self {
        Sampler {
            source,
            queries: 0,
            max_queries,
        }
    }

    fn offset(&mut self, at: DateTime<Utc>) -> Result<UtcOffset> {
        if self.queries >= self.max_queries {
            return Err(violation(format!(
                "search exceeded {} offset queries",
                self.max_queries
            )));
        }
        self.queries += 1;
        Ok(self.source.utc_offset(at))
    }
}

fn violation(message: String) -> LocatorError {
    error!("transition search aborted: {message}");
    LocatorError::SearchInvariantViolation(message)
}

// ── Locator ─────────────────────────────────────────────────────────────────

/// A configured transition search. Cheap to copy, holds no state between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionLocator {
    config: LocatorConfig,
}

impl TransitionLocator {
    pub fn new(config: LocatorConfig) -> Self {
        TransitionLocator { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Find the next transition strictly after `reference`.
    ///
    /// Returns `Ok(None)` if the offset does not change within the horizon,
    /// as for UTC or any fixed-offset zone.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::SearchInvariantViolation`] if the source answers
    /// inconsistently.
    pub fn locate<S: OffsetSource + ?Sized>(
        &self,
        zone: &S,
        reference: DateTime<Utc>,
    ) -> Result<Option<TransitionEvent>> {
        self.locate_traced(zone, reference).map(|(event, _)| event)
    }

    /// Like [`locate`](Self::locate), also returning every bracket the search held.
    pub fn locate_traced<S: OffsetSource + ?Sized>(
        &self,
        zone: &S,
        reference: DateTime<Utc>,
    ) -> Result<(Option<TransitionEvent>, SearchTrace)> {
        // Second resolution: a reference inside a transition second already sees
        // the new offset, so flooring never skips a later transition.
        let reference = reference.trunc_subsecs(0);
        let mut sampler = Sampler::new(zone, self.config.max_queries());
        let mut trace = SearchTrace::default();

        let Some(bracket) = self.weekly_probe(&mut sampler, reference, &mut trace)? else {
            trace.queries = sampler.queries;
            debug!(
                "no offset change within {} days of {} ({} queries)",
                self.config.horizon_days, reference, sampler.queries
            );
            return Ok((None, trace));
        };

        let bracket = bisect(
            &mut sampler,
            bracket,
            SECONDS_PER_DAY,
            SearchTier::DayBisection,
            &mut trace,
        )?;
        let bracket = bisect(
            &mut sampler,
            bracket,
            1,
            SearchTier::SecondBisection,
            &mut trace,
        )?;
        let event = verify(&mut sampler, bracket)?;

        trace.queries = sampler.queries;
        debug!(
            "next transition after {}: {} ({} -> {}, {} queries)",
            reference, event.moment, event.previous_offset, event.new_offset, sampler.queries
        );
        Ok((Some(event), trace))
    }

    /// Iterate over successive transitions after `reference`.
    ///
    /// Each search starts at the previous transition's moment. The iterator
    /// ends at the first horizon with no change, or after yielding an error.
    pub fn transitions_after<'a, S: OffsetSource + ?Sized>(
        &self,
        zone: &'a S,
        reference: DateTime<Utc>,
    ) -> Transitions<'a, S> {
        Transitions {
            locator: *self,
            zone,
            cursor: Some(reference),
        }
    }

    /// Tier 1: coarse probe from the reference, clamped to the horizon.
    fn weekly_probe<S: OffsetSource + ?Sized>(
        &self,
        sampler: &mut Sampler<'_, S>,
        reference: DateTime<Utc>,
        trace: &mut SearchTrace,
    ) -> Result<Option<Bracket>> {
        // Near the end of chrono's range the horizon is cut short at MAX_UTC.
        let limit = reference
            .checked_add_signed(Duration::days(self.config.horizon_days))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let step = Duration::days(self.config.probe_step_days);

        let mut low = reference;
        let mut low_offset = sampler.offset(low)?;
        loop {
            let high = low
                .checked_add_signed(step)
                .map_or(limit, |next| std::cmp::min(next, limit));
            let high_offset = sampler.offset(high)?;
            if high_offset != low_offset {
                let bracket = Bracket {
                    low,
                    high,
                    low_offset,
                    high_offset,
                };
                bracket.check()?;
                trace.record(SearchTier::WeeklyProbe, bracket);
                return Ok(Some(bracket));
            }
            if high >= limit {
                return Ok(None);
            }
            low = high;
            low_offset = high_offset;
        }
    }
}

/// Tiers 2 and 3: bisect in multiples of `unit_seconds` until the bracket is at
/// most one unit wide.
///
/// The midpoint is always a whole number of units after `low` and strictly
/// inside the bracket. The half kept is the earliest one whose ends differ.
fn bisect<S: OffsetSource + ?Sized>(
    sampler: &mut Sampler<'_, S>,
    mut bracket: Bracket,
    unit_seconds: i64,
    tier: SearchTier,
    trace: &mut SearchTrace,
) -> Result<Bracket> {
    let mut width = bracket.width().num_seconds();
    while width > unit_seconds {
        let units = width / unit_seconds;
        let mid = bracket.low + Duration::seconds(unit_seconds * std::cmp::max(1, units / 2));
        let mid_offset = sampler.offset(mid)?;

        if mid_offset == bracket.low_offset {
            bracket.low = mid;
        } else {
            bracket.high = mid;
            bracket.high_offset = mid_offset;
        }
        bracket.check()?;

        let narrowed = bracket.width().num_seconds();
        if narrowed >= width {
            return Err(violation(format!(
                "{tier:?} did not narrow the bracket ({width}s -> {narrowed}s)"
            )));
        }
        width = narrowed;
        trace.record(tier, bracket);
    }
    Ok(bracket)
}

/// Re-sample both sides of the final one-second bracket.
fn verify<S: OffsetSource + ?Sized>(
    sampler: &mut Sampler<'_, S>,
    bracket: Bracket,
) -> Result<TransitionEvent> {
    if bracket.width() != Duration::seconds(1) {
        return Err(violation(format!(
            "final bracket is {}s wide, expected 1s",
            bracket.width().num_seconds()
        )));
    }
    let before = sampler.offset(bracket.low)?;
    let after = sampler.offset(bracket.high)?;
    if before != bracket.low_offset || after != bracket.high_offset {
        return Err(violation(format!(
            "offsets around {} changed between queries ({} -> {}, then {} -> {})",
            bracket.high, bracket.low_offset, bracket.high_offset, before, after
        )));
    }
    TransitionEvent::new(bracket.high, before, after).ok_or_else(|| {
        violation(format!(
            "equal offsets {} on both sides of {}",
            before, bracket.high
        ))
    })
}

/// Iterator returned by [`TransitionLocator::transitions_after`].
pub struct Transitions<'a, S: ?Sized> {
    locator: TransitionLocator,
    zone: &'a S,
    cursor: Option<DateTime<Utc>>,
}

impl<S: OffsetSource + ?Sized> Iterator for Transitions<'_, S> {
    type Item = Result<TransitionEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        let reference = self.cursor.take()?;
        match self.locator.locate(self.zone, reference) {
            Ok(Some(event)) => {
                self.cursor = Some(event.moment);
                Some(Ok(event))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

// ── Convenience entry point ─────────────────────────────────────────────────

/// Find the next transition for an IANA timezone identifier, with the default
/// configuration.
///
/// # Errors
///
/// Returns [`LocatorError::InvalidTimezone`] if the identifier is unknown, or
/// any error from [`TransitionLocator::locate`].
pub fn locate_next_transition(
    timezone_id: &str,
    reference: DateTime<Utc>,
) -> Result<Option<TransitionEvent>> {
    let tz = parse_timezone(timezone_id)?;
    TransitionLocator::default().locate(&tz, reference)
}
