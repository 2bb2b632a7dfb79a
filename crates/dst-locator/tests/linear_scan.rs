//! Compare the bisection against a slow second-by-second scan, over random
//! reference instants in zones that observe DST every year.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use dst_locator::{
    LocatorConfig, OffsetSource, SearchTier, TransitionEvent, TransitionLocator,
};
use proptest::prelude::*;

const DST_ZONES: &[&str] = &[
    "Europe/London",
    "Europe/Berlin",
    "America/New_York",
    "America/Chicago",
    "America/Halifax",
    "Australia/Sydney",
    "Australia/Lord_Howe",
    "Pacific/Auckland",
];

// 2000-01-01T00:00:00Z ..= 2035-12-31T23:59:59Z
const EARLIEST: i64 = 946_684_800;
const LATEST: i64 = 2_082_758_399;

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

/// The first second in the day before `moment` (inclusive of `moment`) whose
/// offset differs from the one before it.
fn scan_day_before(zone: &Tz, moment: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let start = moment - Duration::days(1);
    let mut previous = zone.utc_offset(start);
    let mut t = start;
    while t < moment {
        t += Duration::seconds(1);
        let offset = zone.utc_offset(t);
        if offset != previous {
            return Some(t);
        }
        previous = offset;
    }
    None
}

fn locate(zone: &Tz, reference: DateTime<Utc>) -> TransitionEvent {
    TransitionLocator::default()
        .locate(zone, reference)
        .unwrap()
        .expect("zone observes DST every year")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// The located moment is the first change found by a per-second scan of its day.
    #[test]
    fn matches_linear_scan(zone_idx in 0..DST_ZONES.len(), seconds in EARLIEST..LATEST) {
        let zone: Tz = DST_ZONES[zone_idx].parse().unwrap();
        let reference = at(seconds);
        let event = locate(&zone, reference);

        prop_assert!(event.moment > reference);
        let scanned = if event.moment - reference < Duration::days(1) {
            // The day before the moment reaches back past the reference; the
            // scan may find an earlier transition that the reference already saw.
            let mut t = reference;
            let mut previous = zone.utc_offset(t);
            loop {
                t += Duration::seconds(1);
                let offset = zone.utc_offset(t);
                if offset != previous {
                    break t;
                }
                previous = offset;
            }
        } else {
            scan_day_before(&zone, event.moment).unwrap()
        };
        prop_assert_eq!(scanned, event.moment);
    }

    /// Offsets on either side of the moment match the event, and nothing
    /// changes between the reference and the moment at hourly resolution.
    #[test]
    fn offsets_bracket_the_moment(zone_idx in 0..DST_ZONES.len(), seconds in EARLIEST..LATEST) {
        let zone: Tz = DST_ZONES[zone_idx].parse().unwrap();
        let reference = at(seconds);
        let event = locate(&zone, reference);

        prop_assert_ne!(event.previous_offset, event.new_offset);
        prop_assert_eq!(zone.utc_offset(event.last_instant_before()), event.previous_offset);
        prop_assert_eq!(zone.utc_offset(event.moment), event.new_offset);
        prop_assert_eq!(zone.utc_offset(reference), event.previous_offset);

        let mut t = reference;
        while t < event.moment {
            prop_assert_eq!(zone.utc_offset(t), event.previous_offset);
            t += Duration::hours(1);
        }
    }

    /// Searching again from the moment finds the following, opposite transition.
    #[test]
    fn requery_alternates(zone_idx in 0..DST_ZONES.len(), seconds in EARLIEST..LATEST) {
        let zone: Tz = DST_ZONES[zone_idx].parse().unwrap();
        let first = locate(&zone, at(seconds));
        let second = locate(&zone, first.moment + Duration::seconds(1));

        prop_assert!(second.moment > first.moment);
        prop_assert_eq!(second.direction, first.direction.opposite());
        prop_assert_eq!(second.previous_offset, first.new_offset);
    }

    /// Every bracket straddles the moment with differing offsets, and no tier
    /// ever widens its bracket.
    #[test]
    fn brackets_narrow_within_each_tier(zone_idx in 0..DST_ZONES.len(), seconds in EARLIEST..LATEST) {
        let zone: Tz = DST_ZONES[zone_idx].parse().unwrap();
        let (event, trace) = TransitionLocator::default()
            .locate_traced(&zone, at(seconds))
            .unwrap();
        let event = event.expect("zone observes DST every year");

        prop_assert!(trace.queries <= LocatorConfig::default().max_queries());
        for step in &trace.steps {
            let bracket = step.bracket;
            prop_assert!(bracket.low < bracket.high);
            prop_assert_ne!(bracket.low_offset, bracket.high_offset);
            prop_assert!(bracket.low < event.moment && event.moment <= bracket.high);
        }
        let tiers = [
            SearchTier::WeeklyProbe,
            SearchTier::DayBisection,
            SearchTier::SecondBisection,
        ];
        for tier in tiers {
            let widths: Vec<Duration> = trace.tier(tier).map(|b| b.width()).collect();
            prop_assert!(
                widths.windows(2).all(|pair| pair[1] <= pair[0]),
                "{:?} widened: {:?}", tier, widths
            );
        }
        let last = trace.steps.last().unwrap().bracket;
        prop_assert_eq!(last.width(), Duration::seconds(1));
        prop_assert_eq!(last.high, event.moment);
    }

    /// Same inputs, same answer.
    #[test]
    fn deterministic(zone_idx in 0..DST_ZONES.len(), seconds in EARLIEST..LATEST) {
        let zone: Tz = DST_ZONES[zone_idx].parse().unwrap();
        let reference = at(seconds);
        prop_assert_eq!(locate(&zone, reference), locate(&zone, reference));
    }
}
