//! # dst-locator
//!
//! Find the next daylight-saving transition of a timezone, to the second.
//!
//! Given a timezone and a reference instant, the locator returns the first
//! later instant at which the zone's UTC offset changes, together with the
//! offsets on either side and the direction of the change. It does so with a
//! weekly probe followed by a day-level and a second-level binary search,
//! which takes a few dozen offset lookups instead of a scan of every second.
//!
//! ## Modules
//!
//! - [`locator`] — The three-tier search, its configuration and trace
//! - [`offset`] — UTC offsets and the [`OffsetSource`] trait (IANA zones via `chrono-tz`)
//! - [`transition`] — The located [`TransitionEvent`] and its [`Direction`]
//! - [`report`] — Display-ready fields: local date, countdown, message
//! - [`cache`] — Caller-owned cache deciding when to search again
//! - [`error`] — Error types

pub mod cache;
pub mod error;
pub mod locator;
pub mod offset;
pub mod report;
pub mod transition;

pub use cache::{CachedTransition, Refresh, RefreshPolicy, TransitionCache};
pub use error::{LocatorError, Result};
pub use locator::{
    locate_next_transition, Bracket, LocatorConfig, SearchTier, SearchTrace, TraceStep,
    TransitionLocator, Transitions, DEFAULT_HORIZON_DAYS, DEFAULT_PROBE_STEP_DAYS,
};
pub use offset::{parse_rfc3339, parse_timezone, OffsetSource, UtcOffset};
pub use report::{Period, TransitionReport};
pub use transition::{Direction, TransitionEvent};
