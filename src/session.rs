use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::engine::{assemble, build_grid, BlockSet, BookingError, ContactInfo};
use crate::limits::*;
use crate::model::*;
use crate::observability;
use crate::store::{CourtCatalog, ReservationStore};

/// One visitor's in-progress booking. Nothing here is persisted until
/// checkout succeeds.
pub struct BookingSession {
    pub id: Ulid,
    pub is_member: bool,
    pub user_id: Option<String>,
    selection: BlockSet,
    /// Last calendar rendered for this session; toggles resolve against it.
    calendar: Vec<Slot>,
    court_names: HashMap<String, String>,
    last_active: Instant,
}

impl BookingSession {
    fn new(id: Ulid, is_member: bool, user_id: Option<String>) -> Self {
        Self {
            id,
            is_member,
            user_id,
            selection: BlockSet::new(),
            calendar: Vec::new(),
            court_names: HashMap::new(),
            last_active: Instant::now(),
        }
    }

    /// The slot as last seen: in the current calendar, or for a selected slot
    /// that has paged out of view, as it was when selected.
    fn find_slot(&self, key: &SlotKey) -> Option<Slot> {
        self.calendar
            .iter()
            .chain(self.selection.blocks().iter().flat_map(|b| b.slots.iter()))
            .find(|s| s.has_key(key))
            .cloned()
    }

    fn toggle(&mut self, key: &SlotKey) -> Result<Vec<Block>, BookingError> {
        let slot = self
            .find_slot(key)
            .ok_or_else(|| BookingError::UnknownSlot(key.clone()))?;
        if !self.selection.contains(key) && self.selection.slot_count() >= MAX_SELECTED_SLOTS {
            return Err(BookingError::LimitExceeded("too many selected slots"));
        }
        let court_name = self
            .court_names
            .get(&slot.court_id)
            .cloned()
            .unwrap_or_else(|| slot.court_id.clone());
        self.selection.toggle(&slot, &court_name).map(<[Block]>::to_vec)
    }
}

/// What a successful checkout stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub reservation_ids: Vec<String>,
    pub requests: Vec<ReservationRequest>,
}

/// Holds every live booking session in memory. Sessions share nothing but
/// the store and the court catalog.
pub struct SessionManager {
    sessions: DashMap<Ulid, Arc<Mutex<BookingSession>>>,
    store: Arc<dyn ReservationStore>,
    catalog: CourtCatalog,
}

impl SessionManager {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self {
            sessions: DashMap::new(),
            store,
            catalog: CourtCatalog::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Concurrent opens racing for the last free places may all be refused,
    /// but the registry never stays above `MAX_SESSIONS`.
    pub fn open(&self, is_member: bool, user_id: Option<String>) -> Result<Ulid, BookingError> {
        if self.sessions.len() >= MAX_SESSIONS {
            return Err(BookingError::LimitExceeded("too many sessions"));
        }
        let id = Ulid::new();
        let session = BookingSession::new(id, is_member, user_id);
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        if self.sessions.len() > MAX_SESSIONS {
            self.sessions.remove(&id);
            return Err(BookingError::LimitExceeded("too many sessions"));
        }
        metrics::gauge!(observability::SESSIONS_ACTIVE).set(self.sessions.len() as f64);
        debug!("opened session {id} (member: {is_member})");
        Ok(id)
    }

    fn get(&self, id: Ulid) -> Result<Arc<Mutex<BookingSession>>, BookingError> {
        self.sessions
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or(BookingError::SessionNotFound(id))
    }

    async fn fetch_grid(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        is_member: bool,
    ) -> Result<(Vec<Slot>, Arc<Vec<Court>>), BookingError> {
        let courts = self.catalog.get(self.store.as_ref()).await?;
        let reservations = self.store.reservations(from, to).await?;
        let grid = build_grid(&courts, from, to, &reservations, is_member)?;
        Ok((grid, courts))
    }

    /// Render the calendar for `[from, to]` and remember it for toggles.
    ///
    /// A store failure is logged and yields an empty grid; the session keeps
    /// its previous calendar and the caller is expected to ask again.
    pub async fn calendar(&self, id: Ulid, from: NaiveDate, to: NaiveDate) -> Result<Vec<Slot>, BookingError> {
        let session = self.get(id)?;
        let is_member = session.lock().await.is_member;

        let (grid, courts) = match self.fetch_grid(from, to, is_member).await {
            Ok(fetched) => fetched,
            Err(BookingError::Store(e)) => {
                warn!("calendar fetch for session {id} failed: {e}");
                metrics::counter!(observability::CALENDAR_FETCH_FAILURES_TOTAL).increment(1);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut s = session.lock().await;
        s.court_names = courts.iter().map(|c| (c.id.clone(), c.name.clone())).collect();
        s.calendar = grid.clone();
        let dropped = s.selection.reconcile(&grid);
        if dropped > 0 {
            info!("session {id}: dropped {dropped} selected slots no longer available");
        }
        s.last_active = Instant::now();
        Ok(grid)
    }

    /// Select or deselect one calendar slot. Returns the new block set.
    pub async fn toggle(&self, id: Ulid, key: &SlotKey) -> Result<Vec<Block>, BookingError> {
        let session = self.get(id)?;
        let mut s = session.lock().await;
        s.last_active = Instant::now();

        let selecting = !s.selection.contains(key);
        let result = s.toggle(key);
        metrics::counter!(
            observability::TOGGLES_TOTAL,
            "outcome" => observability::toggle_outcome(&result, selecting)
        )
        .increment(1);
        if let Err(e) = &result {
            debug!("session {id}: toggle {key} rejected: {e}");
        }
        result
    }

    pub async fn blocks(&self, id: Ulid) -> Result<Vec<Block>, BookingError> {
        let session = self.get(id)?;
        let s = session.lock().await;
        Ok(s.selection.blocks().to_vec())
    }

    /// Discard a session and its selection. Returns false if it did not exist.
    pub fn abandon(&self, id: Ulid) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            metrics::gauge!(observability::SESSIONS_ACTIVE).set(self.sessions.len() as f64);
            debug!("abandoned session {id}");
        }
        removed
    }

    /// Assemble the selection and hand it to the store. The session is
    /// closed on success and kept on failure so the visitor can fix it.
    pub async fn checkout(&self, id: Ulid, contact: &ContactInfo) -> Result<Receipt, BookingError> {
        let session = self.get(id)?;
        let result = {
            let s = session.lock().await;
            match assemble(s.selection.blocks(), contact, s.user_id.as_deref()) {
                Ok(requests) => match self.store.insert_reservations(&requests).await {
                    Ok(reservation_ids) => Ok(Receipt {
                        reservation_ids,
                        requests,
                    }),
                    Err(e) => Err(BookingError::from(e)),
                },
                Err(e) => Err(e),
            }
        };

        match result {
            Ok(receipt) => {
                self.sessions.remove(&id);
                metrics::gauge!(observability::SESSIONS_ACTIVE).set(self.sessions.len() as f64);
                metrics::counter!(observability::RESERVATIONS_SUBMITTED_TOTAL)
                    .increment(receipt.requests.len() as u64);
                info!("session {id}: submitted {} reservations", receipt.requests.len());
                Ok(receipt)
            }
            Err(e) => {
                metrics::counter!(
                    observability::CHECKOUT_FAILURES_TOTAL,
                    "reason" => observability::failure_reason(&e)
                )
                .increment(1);
                warn!("session {id}: checkout failed: {e}");
                Err(e)
            }
        }
    }

    /// Drop the cached court list so the next calendar reloads it.
    pub async fn invalidate_courts(&self) {
        self.catalog.invalidate().await;
    }

    /// Remove sessions idle for at least `ttl`. Sessions busy in another call
    /// are skipped. Returns the ids removed.
    pub fn expire_idle(&self, now: Instant, ttl: Duration) -> Vec<Ulid> {
        let is_idle = |s: &Arc<Mutex<BookingSession>>| {
            s.try_lock()
                .map(|g| now.saturating_duration_since(g.last_active) >= ttl)
                .unwrap_or(false)
        };
        let candidates: Vec<Ulid> = self
            .sessions
            .iter()
            .filter(|e| is_idle(e.value()))
            .map(|e| *e.key())
            .collect();

        let expired: Vec<Ulid> = candidates
            .into_iter()
            .filter(|id| self.sessions.remove_if(id, |_, s| is_idle(s)).is_some())
            .collect();
        if !expired.is_empty() {
            metrics::gauge!(observability::SESSIONS_ACTIVE).set(self.sessions.len() as f64);
        }
        expired
    }
}
