use super::availability::*;
use super::opening_hours::{DayHours, BUCKETS};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use salon_common::{Professional, TimeInterval};

const TZ: Tz = Tz::Europe__Zurich;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, 1, 7).unwrap()
}

fn hours_strategy() -> impl Strategy<Value = DayHours> {
    proptest::array::uniform13(any::<bool>())
}

fn busy_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
    // (minutes after 07:00 local, length)
    proptest::collection::vec((0i64..900, 1i64..240), 0..6)
}

fn record(name: &str, busy: &[(i64, i64)]) -> BusyRecord {
    let base = TZ
        .with_ymd_and_hms(2031, 1, 7, 7, 0, 0)
        .unwrap()
        .with_timezone(&Utc);
    BusyRecord {
        professional: Professional::new(name, name),
        busy: busy
            .iter()
            .map(|&(offset, len)| {
                TimeInterval::starting_at(base + Duration::minutes(offset), Duration::minutes(len))
                    .unwrap()
            })
            .collect(),
    }
}

fn minute_of(time: &str) -> i64 {
    let (h, m) = time.split_once(':').unwrap();
    h.parse::<i64>().unwrap() * 60 + m.parse::<i64>().unwrap()
}

proptest! {
    #[test]
    fn prop_slots_are_sorted_and_on_the_half_hour(
        hours in hours_strategy(),
        duration in 1i64..400,
        anna in busy_strategy(),
        ben in busy_strategy(),
    ) {
        let day = compute_slots(date(), duration, &hours, &[record("Anna", &anna), record("Ben", &ben)], &TZ);
        let minutes: Vec<i64> = day.slots.iter().map(|s| minute_of(&s.time)).collect();
        prop_assert!(minutes.windows(2).all(|w| w[0] < w[1]));
        for m in &minutes {
            prop_assert_eq!(m % 30, 0);
            prop_assert!((8 * 60..21 * 60).contains(m));
        }
    }

    #[test]
    fn prop_every_touched_bucket_is_open(
        hours in hours_strategy(),
        duration in 1i64..400,
    ) {
        let day = compute_slots(date(), duration, &hours, &[record("Anna", &[])], &TZ);
        for slot in &day.slots {
            let start = minute_of(&slot.time);
            let end = start + duration;
            for hour in (start / 60)..=((end - 1) / 60) {
                let bucket = hour - 8;
                prop_assert!(bucket >= 0 && (bucket as usize) < BUCKETS);
                prop_assert!(hours[bucket as usize]);
            }
        }
    }

    #[test]
    fn prop_listed_professionals_are_really_free(
        duration in 1i64..300,
        anna in busy_strategy(),
        ben in busy_strategy(),
    ) {
        let records = [record("Anna", &anna), record("Ben", &ben)];
        let day = compute_slots(date(), duration, &[true; BUCKETS], &records, &TZ);
        for slot in &day.slots {
            prop_assert!(!slot.available_professionals.is_empty());
            let start = TZ
                .with_ymd_and_hms(2031, 1, 7, 0, 0, 0)
                .unwrap()
                .with_timezone(&Utc)
                + Duration::minutes(minute_of(&slot.time));
            let window = TimeInterval::starting_at(start, Duration::minutes(duration)).unwrap();
            for record in &records {
                let listed = slot.available_professionals.contains(&record.professional.name);
                let free = !record.busy.iter().any(|b| b.overlaps(&window));
                prop_assert_eq!(listed, free);
            }
        }
    }

    #[test]
    fn prop_closed_iff_no_open_bucket(hours in hours_strategy()) {
        let day = compute_slots(date(), 30, &hours, &[record("Anna", &[])], &TZ);
        prop_assert_eq!(day.closed, !hours.iter().any(|h| *h));
    }
}
