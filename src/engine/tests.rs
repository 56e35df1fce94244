use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use super::*;
use crate::model::*;

fn summer_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn outdoor_court(id: &str) -> Court {
    Court {
        id: id.into(),
        name: format!("Court {id}"),
        court_type: CourtType::Outdoor,
        seasonal_price_rules: HashMap::from([("summer_outdoor".to_string(), Decimal::from(600))]),
        status: CourtStatus::Available,
    }
}

fn find<'a>(grid: &'a [Slot], court: &str, h: u32, m: u32) -> &'a Slot {
    let key = SlotKey::at(court, summer_day(), at(h, m));
    grid.iter().find(|s| s.has_key(&key)).unwrap()
}

fn reservation(court: &str, from: NaiveTime, to: NaiveTime) -> Reservation {
    Reservation {
        id: format!("{court}-{from}"),
        court_id: court.into(),
        start_time: summer_day().and_time(from),
        end_time: summer_day().and_time(to),
        status: ReservationStatus::Confirmed,
    }
}

#[test]
fn grid_prices_non_member_summer_morning() {
    let courts = vec![outdoor_court("outdoor-1")];
    let grid = build_grid(&courts, summer_day(), summer_day(), &[], false).unwrap();
    assert_eq!(find(&grid, "outdoor-1", 9, 0).price, Some(Decimal::from(360)));
    // 600 * 1.1 * 1.2 / 2
    assert_eq!(find(&grid, "outdoor-1", 16, 0).price, Some(Decimal::from(396)));
}

#[test]
fn member_grid_is_never_dearer() {
    let courts = vec![outdoor_court("outdoor-1")];
    let members = build_grid(&courts, summer_day(), summer_day(), &[], true).unwrap();
    let guests = build_grid(&courts, summer_day(), summer_day(), &[], false).unwrap();
    for (m, g) in members.iter().zip(&guests) {
        assert_eq!(m.key(), g.key());
        assert!(m.price <= g.price);
    }
}

#[test]
fn afternoon_selection_to_single_reservation() {
    let courts = vec![outdoor_court("outdoor-1")];
    let grid = build_grid(&courts, summer_day(), summer_day(), &[], false).unwrap();

    let mut selection = BlockSet::new();
    for (h, m) in [(16, 0), (16, 30), (17, 0)] {
        selection.toggle(find(&grid, "outdoor-1", h, m), "Court outdoor-1").unwrap();
    }
    let blocks = selection.blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].start, at(16, 0));
    assert_eq!(blocks[0].end, at(17, 30));
    assert_eq!(blocks[0].slots.len(), 3);
    assert_eq!(blocks[0].total_price, Decimal::from(396 * 3));

    let contact = ContactInfo {
        name: "Petr".into(),
        email: "petr@example.com".into(),
        phone: "777000111".into(),
        notes: None,
    };
    let rows = assemble(blocks, &contact, None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].begins_at, summer_day().and_time(at(16, 0)));
    assert_eq!(rows[0].ends_at, summer_day().and_time(at(17, 30)));
    assert_eq!(rows[0].price, Decimal::from(1188));
}

#[test]
fn selection_across_price_boundary_sums_each_slot() {
    let courts = vec![outdoor_court("outdoor-1")];
    let grid = build_grid(&courts, summer_day(), summer_day(), &[], true).unwrap();

    let mut selection = BlockSet::new();
    for (h, m) in [(12, 0), (12, 30), (13, 0), (13, 30)] {
        selection.toggle(find(&grid, "outdoor-1", h, m), "Court").unwrap();
    }
    let range = crate::pricing::price_range(&courts[0], summer_day(), at(12, 0), at(14, 0), true);
    assert_eq!(Some(selection.total_price()), range);
    assert_eq!(selection.total_price(), Decimal::from(300 + 300 + 330 + 330));
}

#[test]
fn reserved_slots_cannot_be_selected() {
    let courts = vec![outdoor_court("outdoor-1")];
    let reservations = vec![reservation("outdoor-1", at(8, 0), at(9, 0))];
    let grid = build_grid(&courts, summer_day(), summer_day(), &reservations, true).unwrap();

    let busy = find(&grid, "outdoor-1", 8, 30);
    assert!(busy.is_busy);
    let mut selection = BlockSet::new();
    assert!(matches!(
        selection.toggle(busy, "Court"),
        Err(BookingError::Occupied(_))
    ));
    assert!(selection.is_empty());

    // The reservation ends at 09:00; the 09:00 slot is free.
    let next = find(&grid, "outdoor-1", 9, 0);
    assert!(!next.is_busy);
    selection.toggle(next, "Court").unwrap();
    assert_eq!(selection.slot_count(), 1);
}

#[test]
fn same_time_on_two_courts_stays_independent() {
    let courts = vec![outdoor_court("a"), outdoor_court("b")];
    let grid = build_grid(&courts, summer_day(), summer_day(), &[], true).unwrap();

    let mut selection = BlockSet::new();
    selection.toggle(find(&grid, "a", 10, 0), "A").unwrap();
    selection.toggle(find(&grid, "b", 10, 0), "B").unwrap();
    selection.toggle(find(&grid, "a", 10, 30), "A").unwrap();
    assert_eq!(selection.blocks().len(), 2);

    let b_before = selection.blocks()[1].clone();
    selection.toggle(find(&grid, "a", 10, 0), "A").unwrap();
    assert_eq!(selection.blocks()[1], b_before);
    assert_eq!(selection.blocks()[0].start, at(10, 30));
}
