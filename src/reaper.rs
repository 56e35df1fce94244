use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::session::SessionManager;

/// Background task that periodically discards abandoned booking sessions.
pub async fn run_reaper(sessions: Arc<SessionManager>, every: Duration, ttl: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let expired = sessions.expire_idle(Instant::now(), ttl);
        if expired.is_empty() {
            continue;
        }
        metrics::counter!(crate::observability::SESSIONS_EXPIRED_TOTAL).increment(expired.len() as u64);
        for id in expired {
            info!("reaped idle session {id}");
        }
    }
}
