use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whole currency units (crowns); decimal so surcharges stay exact.
pub type Price = Decimal;

/// Half-open interval `[start, end)` in local club time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    #[serde(with = "iso")]
    pub start: NaiveDateTime,
    #[serde(with = "iso")]
    pub end: NaiveDateTime,
}

impl Span {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when one span ends exactly where the other starts.
    pub fn abuts(&self, other: &Span) -> bool {
        self.end == other.start || other.end == self.start
    }
}

// ── Reference data (read from the external store) ────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtType {
    Indoor,
    Outdoor,
}

impl CourtType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourtType::Indoor => "indoor",
            CourtType::Outdoor => "outdoor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtStatus {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub court_type: CourtType,
    /// Hourly prices keyed `season_period_type_tier` or `season_type`.
    #[serde(default)]
    pub seasonal_price_rules: HashMap<String, Price>,
    pub status: CourtStatus,
}

impl Court {
    pub fn is_bookable(&self) -> bool {
        self.status == CourtStatus::Available
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    New,
    Confirmed,
    Paid,
    Cancelled,
    #[serde(other)]
    Other,
}

/// An existing booking as the store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub court_id: String,
    #[serde(with = "iso")]
    pub start_time: NaiveDateTime,
    #[serde(with = "iso")]
    pub end_time: NaiveDateTime,
    pub status: ReservationStatus,
}

impl Reservation {
    pub fn span(&self) -> Span {
        Span {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Cancelled reservations never occupy a court.
    pub fn is_live(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }
}

// ── Selection model ──────────────────────────────────────────────

/// Natural key of a slot inside one calendar render.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotKey {
    pub court_id: String,
    pub date: NaiveDate,
    #[serde(with = "iso")]
    pub starts_at: NaiveDateTime,
}

impl SlotKey {
    pub fn at(court_id: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            court_id: court_id.into(),
            date,
            starts_at: date.and_time(time),
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.court_id, self.starts_at.format("%Y-%m-%d %H:%M"))
    }
}

/// One bookable half hour on one court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub court_id: String,
    pub date: NaiveDate,
    #[serde(with = "iso")]
    pub starts_at: NaiveDateTime,
    #[serde(with = "iso")]
    pub ends_at: NaiveDateTime,
    /// `None` when no price rule applies; such slots cannot be booked.
    pub price: Option<Price>,
    pub is_busy: bool,
}

impl Slot {
    pub fn key(&self) -> SlotKey {
        SlotKey {
            court_id: self.court_id.clone(),
            date: self.date,
            starts_at: self.starts_at,
        }
    }

    pub fn span(&self) -> Span {
        Span {
            start: self.starts_at,
            end: self.ends_at,
        }
    }

    pub fn has_key(&self, key: &SlotKey) -> bool {
        self.starts_at == key.starts_at && self.date == key.date && self.court_id == key.court_id
    }

    pub fn is_selectable(&self) -> bool {
        self.price.is_some() && !self.is_busy
    }
}

/// Maximal contiguous run of selected slots on one court and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub court_id: String,
    pub court_name: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    /// Chronological, never empty.
    pub slots: Vec<Slot>,
    pub total_price: Price,
}

impl Block {
    pub fn begins_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end)
    }

    pub fn span(&self) -> Span {
        Span::new(self.begins_at(), self.ends_at())
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.slots.iter().any(|s| s.has_key(key))
    }

    pub fn is_on(&self, court_id: &str, date: NaiveDate) -> bool {
        self.date == date && self.court_id == court_id
    }
}

// ── Write side ───────────────────────────────────────────────────

/// Lifecycle state of a reservation written by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    New,
}

/// One reservation row ready for insertion by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub court_id: String,
    #[serde(with = "iso")]
    pub begins_at: NaiveDateTime,
    #[serde(with = "iso")]
    pub ends_at: NaiveDateTime,
    pub price: Price,
    pub user_id: Option<String>,
    pub status: RequestStatus,
    pub notes: Option<String>,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
}

impl ReservationRequest {
    pub fn span(&self) -> Span {
        Span {
            start: self.begins_at,
            end: self.ends_at,
        }
    }
}

// ── Serde helpers ────────────────────────────────────────────────

/// ISO-8601 timestamps. Offsets are accepted on input and dropped, keeping
/// the wall-clock time they were written in.
pub mod iso {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.naive_local());
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }
}

/// Clock times as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&t.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|_| serde::de::Error::custom(format!("invalid time: {raw}")))
    }
}
