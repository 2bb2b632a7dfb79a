//! Caller-owned cache of the last located transition.
//!
//! A dashboard typically refreshes once a day and on start. The search is
//! cheap, but there is no point in repeating it while the cached answer is
//! still good; [`TransitionCache`] decides when it is not.

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::error::Result;
use crate::locator::TransitionLocator;
use crate::offset::OffsetSource;
use crate::report::TransitionReport;
use crate::transition::TransitionEvent;

/// When a cached result must be recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Recompute while the transition is closer than this.
    pub imminent_window: Duration,
    /// Recompute any entry older than this, including a cached "no transition".
    pub max_age: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        RefreshPolicy {
            imminent_window: Duration::days(7),
            max_age: Duration::days(7),
        }
    }
}

/// A located transition (or its absence) and when it was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedTransition {
    pub event: Option<TransitionEvent>,
    pub computed_at: DateTime<Utc>,
}

/// Whether [`TransitionCache::refresh`] ran the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Recomputed,
    Reused,
}

/// Holds the last result for one zone.
#[derive(Debug, Clone, Default)]
pub struct TransitionCache {
    policy: RefreshPolicy,
    entry: Option<CachedTransition>,
}

impl TransitionCache {
    pub fn new(policy: RefreshPolicy) -> Self {
        TransitionCache {
            policy,
            entry: None,
        }
    }

    pub fn entry(&self) -> Option<&CachedTransition> {
        self.entry.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Whether the cached entry can no longer be trusted at `now`.
    pub fn needs_recompute(&self, now: DateTime<Utc>) -> bool {
        let Some(entry) = &self.entry else {
            return true;
        };
        if now - entry.computed_at >= self.policy.max_age {
            return true;
        }
        match &entry.event {
            Some(event) => {
                now >= event.moment || event.moment - now < self.policy.imminent_window
            }
            None => false,
        }
    }

    /// Recompute if needed, then return what the cache holds.
    ///
    /// # Errors
    ///
    /// Propagates any error from the locator; the previous entry is kept.
    pub fn refresh<S: OffsetSource + ?Sized>(
        &mut self,
        locator: &TransitionLocator,
        zone: &S,
        now: DateTime<Utc>,
    ) -> Result<(Refresh, CachedTransition)> {
        if let Some(entry) = self.entry.filter(|_| !self.needs_recompute(now)) {
            debug!("reusing cached transition computed at {}", entry.computed_at);
            return Ok((Refresh::Reused, entry));
        }

        let event = locator.locate(zone, now)?;
        let entry = CachedTransition {
            event,
            computed_at: now,
        };
        match &event {
            Some(e) => debug!("recomputed next transition: {}", e.moment),
            None => debug!("recomputed: no transition within the horizon"),
        }
        self.entry = Some(entry);
        Ok((Refresh::Recomputed, entry))
    }

    /// Refresh and render a report counted from `now`.
    pub fn report<S: OffsetSource + ?Sized>(
        &mut self,
        locator: &TransitionLocator,
        timezone: &str,
        zone: &S,
        now: DateTime<Utc>,
    ) -> Result<TransitionReport> {
        let (_, entry) = self.refresh(locator, zone, now)?;
        Ok(TransitionReport::new(
            timezone,
            zone,
            entry.event.as_ref(),
            now,
            Some(entry.computed_at),
        ))
    }
}
