use super::opening_hours::*;
use chrono::Weekday;
use salon_common::HoursSetting;

const DEFAULT: HoursPolicy = HoursPolicy {
    assume_open_when_unknown: true,
    assume_business_hours: true,
};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn open_between(start: u32, end: u32) -> DayHours {
    let mut day = ALL_CLOSED;
    for (i, bucket) in day.iter_mut().enumerate() {
        let hour = FIRST_HOUR + i as u32;
        *bucket = start <= hour && hour < end;
    }
    day
}

#[test]
fn test_weekday_range_opens_only_those_days() {
    let grid = parse("Mon-Fri: 9AM-5PM");
    for day in &WEEK[..5] {
        let hours = grid.day(*day).unwrap();
        let open: Vec<usize> = (0..BUCKETS).filter(|i| hours[*i]).collect();
        assert_eq!(open, (1..9).collect::<Vec<_>>(), "{day}");
    }
    assert!(grid.day(Weekday::Sat).is_none());
    assert!(grid.day(Weekday::Sun).is_none());
}

#[test]
fn test_full_week_round_trip() {
    let text = "Mon: 8AM-12PM, Tue: 9AM-1PM, Wed: 10AM-2PM, Thu: 11AM-3PM, \
                Fri: 12PM-4PM, Sat: 1PM-5PM, Sun: 2PM-9PM";
    let grid = parse(text);
    let expected = [(8, 12), (9, 13), (10, 14), (11, 15), (12, 16), (13, 17), (14, 21)];
    for (day, (start, end)) in WEEK.iter().zip(expected) {
        assert_eq!(grid.day(*day), Some(&open_between(start, end)), "{day}");
    }
}

#[test]
fn test_additional_ranges_only_add_hours() {
    let grid = parse("Sat: 9AM-12PM, 2PM-5PM, Sat: 10AM-11AM");
    assert_eq!(
        grid.day(Weekday::Sat),
        Some(&[false, true, true, true, false, false, true, true, true, false, false, false, false])
    );
}

#[test]
fn test_closed_literal_is_case_insensitive() {
    for text in ["closed", "Closed", "  CLOSED "] {
        let grid = parse(text);
        assert!(grid.is_closed());
        for day in WEEK {
            assert_eq!(grid.day(day), Some(&ALL_CLOSED));
        }
    }
}

#[test]
fn test_twelve_oclock_edges() {
    // 12AM is midnight, 12PM noon
    let grid = parse("Mon: 12AM-12PM");
    assert_eq!(grid.day(Weekday::Mon), Some(&open_between(0, 12)));
    let grid = parse("Tue: 12PM-9PM");
    assert_eq!(grid.day(Weekday::Tue), Some(&open_between(12, 21)));
}

#[test]
fn test_bare_hours_and_mixed_case() {
    let grid = parse("thu: 9-17, FRI: 9am-5Pm");
    assert_eq!(grid.day(Weekday::Thu), Some(&open_between(9, 17)));
    assert_eq!(grid.day(Weekday::Fri), Some(&open_between(9, 17)));
}

#[test]
fn test_malformed_clauses_are_skipped() {
    let grid = parse("Mon-Fri 9AM-5PM, Funday: 9AM-5PM, Sat: nine-five, Sun: 10AM-4PM");
    // no colon: dangling range with no clause yet
    assert!(grid.day(Weekday::Mon).is_none());
    // Sat was named but no hour opened
    assert_eq!(grid.day(Weekday::Sat), Some(&ALL_CLOSED));
    assert_eq!(grid.day(Weekday::Sun), Some(&open_between(10, 16)));
}

#[test]
fn test_reversed_day_range_is_skipped() {
    let grid = parse("Fri-Mon: 9AM-5PM");
    for day in WEEK {
        assert!(grid.day(day).is_none());
    }
}

#[test]
fn test_out_of_range_hours_rejected() {
    let grid = parse("Mon: 13PM-2PM, Tue: 0AM-5PM, Wed: 7-25");
    for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed] {
        assert_eq!(grid.day(day), Some(&ALL_CLOSED));
    }
}

#[test]
fn test_fallback_absent_or_failed_is_all_open() {
    assert_eq!(hours_for_day(&HoursSetting::Absent, Weekday::Wed, &DEFAULT), ALL_OPEN);
    assert_eq!(hours_for_day(&HoursSetting::Failed, Weekday::Sun, &DEFAULT), ALL_OPEN);
}

#[test]
fn test_fallback_closed_literal_has_no_override() {
    let setting = HoursSetting::Present("Closed".to_string());
    for day in WEEK {
        assert_eq!(hours_for_day(&setting, day, &DEFAULT), ALL_CLOSED);
    }
}

#[test]
fn test_fallback_unwritten_day_gets_business_hours() {
    let setting = HoursSetting::Present("Mon-Fri: 9AM-5PM".to_string());
    assert_eq!(hours_for_day(&setting, Weekday::Sat, &DEFAULT), ASSUMED_BUSINESS_HOURS);
    assert_eq!(hours_for_day(&setting, Weekday::Mon, &DEFAULT), open_between(9, 17));

    let garbage = HoursSetting::Present("whenever".to_string());
    assert_eq!(hours_for_day(&garbage, Weekday::Tue, &DEFAULT), ASSUMED_BUSINESS_HOURS);
}

#[test]
fn test_unknown_hours_stay_closed_when_not_assumed_open() {
    let policy = HoursPolicy {
        assume_open_when_unknown: false,
        ..HoursPolicy::default()
    };
    assert_eq!(hours_for_day(&HoursSetting::Absent, Weekday::Wed, &policy), ALL_CLOSED);
    assert_eq!(hours_for_day(&HoursSetting::Failed, Weekday::Sun, &policy), ALL_CLOSED);

    let setting = HoursSetting::Present("Mon-Fri: 9AM-5PM".to_string());
    assert_eq!(hours_for_day(&setting, Weekday::Sat, &policy), ASSUMED_BUSINESS_HOURS);
}

#[test]
fn test_unwritten_day_stays_closed_without_business_hours() {
    let policy = HoursPolicy {
        assume_business_hours: false,
        ..HoursPolicy::default()
    };
    let setting = HoursSetting::Present("Mon-Fri: 9AM-5PM".to_string());
    assert_eq!(hours_for_day(&setting, Weekday::Sat, &policy), ALL_CLOSED);
    assert_eq!(hours_for_day(&setting, Weekday::Mon, &policy), open_between(9, 17));

    let garbage = HoursSetting::Present("whenever".to_string());
    assert_eq!(hours_for_day(&garbage, Weekday::Tue, &policy), ALL_CLOSED);
    assert_eq!(hours_for_day(&HoursSetting::Absent, Weekday::Tue, &policy), ALL_OPEN);
}

#[test]
fn test_default_policy_assumes_both_fallbacks() {
    assert_eq!(HoursPolicy::default(), DEFAULT);
}

#[test]
fn test_assumed_business_hours_are_nine_to_six() {
    assert_eq!(ASSUMED_BUSINESS_HOURS, open_between(9, 18));
}
