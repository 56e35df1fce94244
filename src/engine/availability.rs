use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::model::*;

/// True if any live reservation on `court_id` overlaps `[slot_start, slot_end)`.
pub fn is_occupied(
    court_id: &str,
    slot_start: NaiveDateTime,
    slot_end: NaiveDateTime,
    reservations: &[Reservation],
) -> bool {
    reservations.iter().any(|r| {
        r.court_id == court_id && r.is_live() && r.start_time < slot_end && r.end_time > slot_start
    })
}

/// Merge sorted overlapping intervals into disjoint intervals. Touching
/// intervals stay separate; they never change an overlap answer.
pub fn merge_overlapping(sorted: &[Span]) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start < last.end
        {
            last.end = last.end.max(span.end);
            continue;
        }
        merged.push(span);
    }
    merged
}

/// Live reservations grouped per court, merged and sorted by start, for
/// answering many slot lookups during one calendar render.
#[derive(Debug, Default)]
pub struct OccupancyIndex {
    by_court: HashMap<String, Vec<Span>>,
}

impl OccupancyIndex {
    pub fn build(reservations: &[Reservation]) -> Self {
        let mut by_court: HashMap<String, Vec<Span>> = HashMap::new();
        for r in reservations.iter().filter(|r| r.is_live() && r.start_time <= r.end_time) {
            by_court.entry(r.court_id.clone()).or_default().push(r.span());
        }
        for spans in by_court.values_mut() {
            spans.sort_by_key(|s| s.start);
            *spans = merge_overlapping(spans);
        }
        Self { by_court }
    }

    pub fn is_occupied(&self, court_id: &str, slot: &Span) -> bool {
        let Some(spans) = self.by_court.get(court_id) else {
            return false;
        };
        // Everything at index >= right_bound starts at or after slot.end.
        let right_bound = spans.partition_point(|s| s.start < slot.end);
        // Merged spans are disjoint, so only the last candidate can reach past slot.start.
        right_bound > 0 && spans[right_bound - 1].end > slot.start
    }
}
