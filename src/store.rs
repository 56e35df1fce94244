//! The external persistence seam: court reference data, existing
//! reservations, and the insert of assembled reservation requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::info;
use ulid::Ulid;

use crate::model::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or refused the call.
    Unavailable(String),
    /// An insert overlaps a reservation that is already stored.
    Conflict {
        court_id: String,
        begins_at: NaiveDateTime,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            StoreError::Conflict { court_id, begins_at } => {
                write!(f, "court {court_id} is already reserved at {begins_at}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn courts(&self) -> Result<Vec<Court>, StoreError>;

    /// Reservations touching any day of `[from, to]`.
    async fn reservations(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Reservation>, StoreError>;

    /// Insert all requests or none. Returns the new reservation ids.
    async fn insert_reservations(&self, requests: &[ReservationRequest]) -> Result<Vec<String>, StoreError>;
}

/// In-process store. Inserts are first-write-wins: a request overlapping a
/// live reservation on the same court fails the whole batch.
pub struct InMemoryStore {
    courts: DashMap<String, Court>,
    reservations: RwLock<Vec<Reservation>>,
    online: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            courts: DashMap::new(),
            reservations: RwLock::new(Vec::new()),
            online: AtomicBool::new(true),
        }
    }

    pub fn with_data(courts: Vec<Court>, reservations: Vec<Reservation>) -> Self {
        let store = Self {
            courts: DashMap::new(),
            reservations: RwLock::new(reservations),
            online: AtomicBool::new(true),
        };
        for court in courts {
            store.upsert_court(court);
        }
        store
    }

    pub fn upsert_court(&self, court: Court) {
        self.courts.insert(court.id.clone(), court);
    }

    pub async fn add_reservation(&self, reservation: Reservation) {
        self.reservations.write().await.push(reservation);
    }

    /// Returns false if no reservation has this id.
    pub async fn cancel_reservation(&self, id: &str) -> bool {
        let mut guard = self.reservations.write().await;
        match guard.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.status = ReservationStatus::Cancelled;
                true
            }
            None => false,
        }
    }

    pub async fn reservation_count(&self) -> usize {
        self.reservations.read().await.len()
    }

    /// Simulate an outage: every call fails with `Unavailable` while offline.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store offline".into()))
        }
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn courts(&self) -> Result<Vec<Court>, StoreError> {
        self.ensure_online()?;
        let mut courts: Vec<Court> = self.courts.iter().map(|e| e.value().clone()).collect();
        courts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(courts)
    }

    async fn reservations(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        self.ensure_online()?;
        let Some(after_to) = to.succ_opt() else {
            return Ok(Vec::new());
        };
        let window = Span {
            start: from.and_time(NaiveTime::MIN),
            end: after_to.and_time(NaiveTime::MIN),
        };
        let guard = self.reservations.read().await;
        Ok(guard
            .iter()
            .filter(|r| r.span().overlaps(&window))
            .cloned()
            .collect())
    }

    async fn insert_reservations(&self, requests: &[ReservationRequest]) -> Result<Vec<String>, StoreError> {
        self.ensure_online()?;
        let mut guard = self.reservations.write().await;

        for (i, req) in requests.iter().enumerate() {
            let span = req.span();
            let clashes_stored = guard
                .iter()
                .any(|r| r.is_live() && r.court_id == req.court_id && r.span().overlaps(&span));
            let clashes_batch = requests[..i]
                .iter()
                .any(|other| other.court_id == req.court_id && other.span().overlaps(&span));
            if clashes_stored || clashes_batch {
                return Err(StoreError::Conflict {
                    court_id: req.court_id.clone(),
                    begins_at: req.begins_at,
                });
            }
        }

        let mut ids = Vec::with_capacity(requests.len());
        for req in requests {
            let id = Ulid::new().to_string();
            guard.push(Reservation {
                id: id.clone(),
                court_id: req.court_id.clone(),
                start_time: req.begins_at,
                end_time: req.ends_at,
                status: ReservationStatus::New,
            });
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Court list cache that is passed around explicitly. Loaded from the store
/// on first use and kept until `invalidate` is called.
#[derive(Default)]
pub struct CourtCatalog {
    cached: RwLock<Option<Arc<Vec<Court>>>>,
}

impl CourtCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, store: &dyn ReservationStore) -> Result<Arc<Vec<Court>>, StoreError> {
        if let Some(courts) = self.cached.read().await.as_ref() {
            return Ok(courts.clone());
        }
        let mut guard = self.cached.write().await;
        // Another caller may have loaded it while we waited for the lock.
        if let Some(courts) = guard.as_ref() {
            return Ok(courts.clone());
        }
        let courts = Arc::new(store.courts().await?);
        info!("loaded {} courts into catalog", courts.len());
        *guard = Some(courts.clone());
        Ok(courts)
    }

    /// Drop the cached list; the next `get` reloads from the store.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    pub async fn is_loaded(&self) -> bool {
        self.cached.read().await.is_some()
    }
}
