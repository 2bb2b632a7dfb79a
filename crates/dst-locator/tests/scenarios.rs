use chrono::{DateTime, Duration, TimeZone, Utc};
use dst_locator::{
    locate_next_transition, parse_timezone, Direction, LocatorConfig, LocatorError, Period,
    TransitionCache, TransitionLocator, TransitionReport, UtcOffset,
};

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

// ── London 2026 ─────────────────────────────────────────────────────────────

#[test]
fn london_spring_forward() {
    let event = locate_next_transition("Europe/London", utc(2026, 1, 1, 0, 0, 0))
        .unwrap()
        .unwrap();
    assert_eq!(event.moment, utc(2026, 3, 29, 1, 0, 0));
    assert_eq!(event.previous_offset, UtcOffset::ZERO);
    assert_eq!(event.new_offset, UtcOffset::from_minutes(60));
    assert_eq!(event.direction, Direction::SpringForward);
}

#[test]
fn london_fall_back() {
    let event = locate_next_transition("Europe/London", utc(2026, 9, 1, 0, 0, 0))
        .unwrap()
        .unwrap();
    assert_eq!(event.moment, utc(2026, 10, 25, 1, 0, 0));
    assert_eq!(event.previous_offset, UtcOffset::from_minutes(60));
    assert_eq!(event.new_offset, UtcOffset::ZERO);
    assert_eq!(event.direction, Direction::FallBack);
}

#[test]
fn one_second_before_transition() {
    let event = locate_next_transition("Europe/London", utc(2026, 10, 25, 0, 59, 59))
        .unwrap()
        .unwrap();
    assert_eq!(event.moment, utc(2026, 10, 25, 1, 0, 0));
    assert_eq!(event.direction, Direction::FallBack);
}

#[test]
fn requery_after_moment_finds_next_half_year() {
    let spring = locate_next_transition("Europe/London", utc(2026, 1, 1, 0, 0, 0))
        .unwrap()
        .unwrap();
    let fall = locate_next_transition("Europe/London", spring.moment + Duration::seconds(1))
        .unwrap()
        .unwrap();
    assert_eq!(fall.moment, utc(2026, 10, 25, 1, 0, 0));
    assert_eq!(fall.direction, Direction::FallBack);
    assert!(fall.moment - spring.moment > Duration::days(180));
}

// ── Zones without DST ───────────────────────────────────────────────────────

#[test]
fn fixed_zones_report_not_found_within_bounded_queries() {
    let locator = TransitionLocator::default();
    for id in ["UTC", "Etc/GMT+5", "Asia/Tokyo", "America/Phoenix", "Asia/Kolkata"] {
        let tz = parse_timezone(id).unwrap();
        let (event, trace) = locator.locate_traced(&tz, utc(2026, 1, 1, 0, 0, 0)).unwrap();
        assert!(event.is_none(), "{id} should have no transition");
        assert!(trace.queries <= LocatorConfig::default().max_queries());
    }
}

#[test]
fn zone_that_abolished_dst() {
    // Iran stopped observing DST in 2022; its last transition was September 2022.
    let tz = parse_timezone("Asia/Tehran").unwrap();
    let locator = TransitionLocator::default();
    let last = locator.locate(&tz, utc(2022, 6, 1, 0, 0, 0)).unwrap().unwrap();
    assert_eq!(last.direction, Direction::FallBack);
    assert_eq!(last.new_offset, UtcOffset::from_minutes(210));
    assert!(locator.locate(&tz, last.moment).unwrap().is_none());
}

#[test]
fn invalid_timezone_is_reported() {
    let err = locate_next_transition("Not/AZone", utc(2026, 1, 1, 0, 0, 0)).unwrap_err();
    assert!(matches!(err, LocatorError::InvalidTimezone(_)));
}

// ── Presentation and cache ──────────────────────────────────────────────────

#[test]
fn report_for_located_event() {
    let tz = parse_timezone("America/New_York").unwrap();
    let reference = utc(2026, 10, 1, 12, 0, 0);
    let event = TransitionLocator::default().locate(&tz, reference).unwrap();
    let report = TransitionReport::new("America/New_York", &tz, event.as_ref(), reference, None);

    // November 1, 2026 02:00 EDT = 06:00 UTC, shown as 01:00 EST
    assert_eq!(report.moment_utc.as_deref(), Some("2026-11-01T06:00:00Z"));
    assert_eq!(report.moment.as_deref(), Some("2026-11-01T01:00:00-05:00"));
    assert_eq!(report.date.as_deref(), Some("2026-11-01"));
    assert_eq!(report.direction.as_deref(), Some("Move Backward"));
    assert_eq!(report.days_to_event, Some(30));
    assert_eq!(report.message.as_deref(), Some("Clocks go back (gain 1 hour)"));
}

#[test]
fn dublin_periods_follow_civil_summer() {
    // tzdata gives Ireland negative DST: GMT in winter is the "daylight" period.
    let tz = parse_timezone("Europe/Dublin").unwrap();
    let locator = TransitionLocator::default();
    for (reference, period) in [
        (utc(2026, 1, 15, 0, 0, 0), Period::WinterTime),
        (utc(2026, 7, 15, 0, 0, 0), Period::SummerTime),
    ] {
        let event = locator.locate(&tz, reference).unwrap();
        let report = TransitionReport::new("Europe/Dublin", &tz, event.as_ref(), reference, None);
        assert_eq!(report.current_period, period, "at {reference}");
    }
}

#[test]
fn daily_refresh_over_a_month() {
    let tz = parse_timezone("Europe/London").unwrap();
    let locator = TransitionLocator::default();
    let mut cache = TransitionCache::default();

    let mut previous_days = None;
    let mut day = utc(2026, 3, 1, 0, 1, 0);
    while day < utc(2026, 4, 1, 0, 1, 0) {
        let report = cache.report(&locator, "Europe/London", &tz, day).unwrap();
        let days = report.days_to_event.unwrap();
        if let Some(prev) = previous_days {
            // Counts down by one each day, then jumps to the autumn change.
            assert!(days == prev - 1 || day > utc(2026, 3, 29, 1, 0, 0));
        }
        previous_days = Some(days);
        day += Duration::days(1);
    }

    let entry = cache.entry().unwrap();
    assert_eq!(entry.event.unwrap().moment, utc(2026, 10, 25, 1, 0, 0));
}
