use std::net::SocketAddr;

use crate::engine::BookingError;

// ── Session metrics ─────────────────────────────────────────────

/// Gauge: booking sessions currently held in memory.
pub const SESSIONS_ACTIVE: &str = "courtbook_sessions_active";

/// Counter: sessions discarded by the reaper after sitting idle.
pub const SESSIONS_EXPIRED_TOTAL: &str = "courtbook_sessions_expired_total";

/// Counter: slot toggles. Labels: outcome.
pub const TOGGLES_TOTAL: &str = "courtbook_toggles_total";

/// Counter: reservation rows accepted by the store.
pub const RESERVATIONS_SUBMITTED_TOTAL: &str = "courtbook_reservations_submitted_total";

/// Counter: checkouts that failed. Labels: reason.
pub const CHECKOUT_FAILURES_TOTAL: &str = "courtbook_checkout_failures_total";

// ── Calendar metrics ────────────────────────────────────────────

/// Histogram: time to build one slot calendar, in seconds.
pub const GRID_BUILD_DURATION_SECONDS: &str = "courtbook_grid_build_duration_seconds";

/// Counter: calendar fetches that failed and yielded an empty grid.
pub const CALENDAR_FETCH_FAILURES_TOTAL: &str = "courtbook_calendar_fetch_failures_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a toggle result to a short label for metrics.
pub fn toggle_outcome<T>(result: &Result<T, BookingError>, selected: bool) -> &'static str {
    match result {
        Ok(_) if selected => "selected",
        Ok(_) => "deselected",
        Err(BookingError::Occupied(_)) => "occupied",
        Err(BookingError::Unpriced(_)) => "unpriced",
        Err(BookingError::UnknownSlot(_)) => "unknown_slot",
        Err(BookingError::LimitExceeded(_)) => "limit",
        Err(_) => "error",
    }
}

/// Map a checkout failure to a short label for metrics.
pub fn failure_reason(err: &BookingError) -> &'static str {
    match err {
        BookingError::Validation(_) => "validation",
        BookingError::Store(crate::store::StoreError::Conflict { .. }) => "conflict",
        BookingError::Store(_) => "store",
        BookingError::SessionNotFound(_) => "session",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotKey;
    use crate::store::StoreError;
    use chrono::{NaiveDate, NaiveTime};

    fn key() -> SlotKey {
        SlotKey::at(
            "c1",
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn toggle_labels() {
        assert_eq!(toggle_outcome(&Ok::<(), BookingError>(()), true), "selected");
        assert_eq!(toggle_outcome(&Ok::<(), BookingError>(()), false), "deselected");
        assert_eq!(toggle_outcome::<()>(&Err(BookingError::Occupied(key())), true), "occupied");
        assert_eq!(toggle_outcome::<()>(&Err(BookingError::Unpriced(key())), true), "unpriced");
    }

    #[test]
    fn failure_labels() {
        let conflict = BookingError::Store(StoreError::Conflict {
            court_id: "c1".into(),
            begins_at: key().starts_at,
        });
        assert_eq!(failure_reason(&conflict), "conflict");
        assert_eq!(failure_reason(&BookingError::Validation(vec![])), "validation");
    }
}
