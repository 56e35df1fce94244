use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;

use courtbook::engine::{build_grid, BlockSet};
use courtbook::model::{Court, CourtStatus, CourtType, Reservation, ReservationStatus};

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.1}us, p50={:.1}us, p95={:.1}us, p99={:.1}us, max={:.1}us",
        latencies.len(),
        avg.as_secs_f64() * 1e6,
        percentile(latencies, 50.0).as_secs_f64() * 1e6,
        percentile(latencies, 95.0).as_secs_f64() * 1e6,
        percentile(latencies, 99.0).as_secs_f64() * 1e6,
        latencies[latencies.len() - 1].as_secs_f64() * 1e6,
    );
}

fn courts(n: usize) -> Vec<Court> {
    (0..n)
        .map(|i| Court {
            id: format!("c{i}"),
            name: format!("Court {i}"),
            court_type: if i % 2 == 0 { CourtType::Outdoor } else { CourtType::Indoor },
            seasonal_price_rules: HashMap::from([
                ("summer_outdoor".to_string(), Decimal::from(600)),
                ("summer_indoor".to_string(), Decimal::from(700)),
            ]),
            status: CourtStatus::Available,
        })
        .collect()
}

/// One 90 minute booking every third hour on every court.
fn reservations(courts: &[Court], from: NaiveDate, days: i64) -> Vec<Reservation> {
    let mut out = Vec::new();
    for court in courts {
        for d in 0..days {
            let date = from + TimeDelta::days(d);
            for hour in (7..22).step_by(3) {
                let start: NaiveDateTime = date.and_hms_opt(hour, 0, 0).unwrap_or_default();
                out.push(Reservation {
                    id: format!("{}-{d}-{hour}", court.id),
                    court_id: court.id.clone(),
                    start_time: start,
                    end_time: start + TimeDelta::minutes(90),
                    status: ReservationStatus::Confirmed,
                });
            }
        }
    }
    out
}

fn main() {
    let from = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default();
    let to = from + TimeDelta::days(30);
    let courts = courts(12);
    let reservations = reservations(&courts, from, 31);

    println!("=== courtbook toggle benchmark ===");
    println!("{} courts, {} reservations\n", courts.len(), reservations.len());

    println!("[phase 1] grid build");
    let mut latencies = Vec::new();
    let mut grid = Vec::new();
    for _ in 0..20 {
        let start = Instant::now();
        grid = build_grid(&courts, from, to, &reservations, false).unwrap_or_default();
        latencies.push(start.elapsed());
    }
    println!("  {} slots per grid", grid.len());
    print_latency("build_grid (31 days)", &mut latencies);

    println!("\n[phase 2] select then deselect every free slot of one court-day");
    let day_slots: Vec<_> = grid
        .iter()
        .filter(|s| s.court_id == "c0" && s.date == from && s.is_selectable())
        .cloned()
        .collect();
    let mut selecting = Vec::new();
    let mut deselecting = Vec::new();
    for _ in 0..200 {
        let mut set = BlockSet::new();
        for slot in &day_slots {
            let start = Instant::now();
            let _ = set.toggle(slot, "Court 0");
            selecting.push(start.elapsed());
        }
        // Middle-out deselect forces block splits.
        let mut order: Vec<_> = day_slots.iter().collect();
        order.sort_by_key(|s| (s.starts_at - day_slots[day_slots.len() / 2].starts_at).abs());
        for slot in order {
            let start = Instant::now();
            let _ = set.toggle(slot, "Court 0");
            deselecting.push(start.elapsed());
        }
    }
    print_latency("select", &mut selecting);
    print_latency("deselect", &mut deselecting);

    println!("\n[phase 3] reconcile a 64-slot selection against a fresh grid");
    let picks: Vec<_> = grid.iter().filter(|s| s.is_selectable()).take(64).cloned().collect();
    let mut latencies = Vec::new();
    for _ in 0..200 {
        let mut set = BlockSet::new();
        for slot in &picks {
            let _ = set.toggle(slot, &slot.court_id);
        }
        let start = Instant::now();
        set.reconcile(&grid);
        latencies.push(start.elapsed());
    }
    print_latency("reconcile", &mut latencies);

    println!("\n=== benchmark complete ===");
}
