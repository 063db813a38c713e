use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use salon_booking::compute_slots;
use salon_booking::opening_hours::{parse, ALL_OPEN};
use salon_booking::BusyRecord;
use salon_common::{Professional, TimeInterval};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, 3, 4).unwrap()
}

fn day_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 3, 4, 7, 0, 0).unwrap()
}

// `count` professionals, each with `busy_per_professional` one-hour appointments spread over the day
fn create_records(count: usize, busy_per_professional: usize) -> Vec<BusyRecord> {
    (0..count)
        .map(|i| {
            let busy = (0..busy_per_professional)
                .filter_map(|j| {
                    let start = day_start() + Duration::minutes(((i * 37 + j * 90) % 720) as i64);
                    TimeInterval::starting_at(start, Duration::minutes(60)).ok()
                })
                .collect();
            BusyRecord {
                professional: Professional::new(format!("Pro {}", i), format!("pro{}@cal", i)),
                busy,
            }
        })
        .collect()
}

fn benchmark_compute_slots(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_slots");
    let tz = Tz::Europe__Zurich;

    group.bench_function("single_free_professional", |b| {
        let records = create_records(1, 0);
        b.iter(|| {
            compute_slots(
                black_box(day()),
                black_box(60),
                black_box(&ALL_OPEN),
                black_box(&records),
                black_box(&tz),
            )
        })
    });

    group.bench_function("ten_professionals_busy", |b| {
        let records = create_records(10, 6);
        b.iter(|| {
            compute_slots(
                black_box(day()),
                black_box(45),
                black_box(&ALL_OPEN),
                black_box(&records),
                black_box(&tz),
            )
        })
    });

    group.bench_function("fifty_professionals_weekday_hours", |b| {
        let grid = parse("Mon-Fri: 9AM-12PM, 1PM-6PM, Sat: 10AM-4PM");
        let hours = grid.day(chrono::Weekday::Tue).copied().unwrap_or(ALL_OPEN);
        let records = create_records(50, 8);
        b.iter(|| {
            compute_slots(
                black_box(day()),
                black_box(90),
                black_box(&hours),
                black_box(&records),
                black_box(&tz),
            )
        })
    });

    group.finish();
}

fn benchmark_parse_opening_hours(c: &mut Criterion) {
    c.bench_function("parse_opening_hours", |b| {
        b.iter(|| parse(black_box("Mon-Fri: 9AM-12PM, 1PM-6PM, Sat: 10:00-16:00, Sun: closed")))
    });
}

criterion_group!(benches, benchmark_compute_slots, benchmark_parse_opening_hours);
criterion_main!(benches);
