use chrono::{NaiveDate, NaiveTime, TimeDelta};
use tracing::debug;

use crate::limits::*;
use crate::model::*;
use crate::pricing::resolve_price;

use super::availability::OccupancyIndex;
use super::BookingError;

/// Bookable half-hour starts, 07:00 through 21:30.
pub fn half_hour_starts() -> impl Iterator<Item = NaiveTime> {
    (OPENING_MINUTE..=LAST_SLOT_START_MINUTE)
        .step_by(SLOT_MINUTES as usize)
        .filter_map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0))
}

/// Build the slot calendar for every available court and every day of
/// `[from, to]`, ordered by court, date, then time.
///
/// Slots without a price are still emitted; they are simply not selectable.
pub fn build_grid(
    courts: &[Court],
    from: NaiveDate,
    to: NaiveDate,
    reservations: &[Reservation],
    is_member: bool,
) -> Result<Vec<Slot>, BookingError> {
    if from > to {
        return Ok(Vec::new());
    }
    if (to - from).num_days() + 1 > MAX_GRID_DAYS {
        return Err(BookingError::LimitExceeded("date range too wide"));
    }

    let started = std::time::Instant::now();
    let index = OccupancyIndex::build(reservations);
    let step = TimeDelta::minutes(i64::from(SLOT_MINUTES));

    let mut slots = Vec::new();
    for court in courts.iter().filter(|c| c.is_bookable()) {
        for date in from.iter_days().take_while(|d| *d <= to) {
            for time in half_hour_starts() {
                let starts_at = date.and_time(time);
                let ends_at = starts_at + step;
                slots.push(Slot {
                    court_id: court.id.clone(),
                    date,
                    starts_at,
                    ends_at,
                    price: resolve_price(court, date, time, is_member),
                    is_busy: index.is_occupied(&court.id, &Span::new(starts_at, ends_at)),
                });
            }
        }
    }

    metrics::histogram!(crate::observability::GRID_BUILD_DURATION_SECONDS)
        .record(started.elapsed().as_secs_f64());
    debug!(slots = slots.len(), %from, %to, "built slot grid");
    Ok(slots)
}
