use ulid::Ulid;

use crate::model::SlotKey;
use crate::store::StoreError;

/// A single invalid input field, reported by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug)]
pub enum BookingError {
    /// No price rule applies to the slot.
    Unpriced(SlotKey),
    /// An existing reservation overlaps the slot.
    Occupied(SlotKey),
    /// The slot is not part of the session's current calendar.
    UnknownSlot(SlotKey),
    Validation(Vec<FieldError>),
    LimitExceeded(&'static str),
    SessionNotFound(Ulid),
    Store(StoreError),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::Unpriced(key) => write!(f, "slot {key} has no price and cannot be booked"),
            BookingError::Occupied(key) => write!(f, "slot {key} is already reserved"),
            BookingError::UnknownSlot(key) => write!(f, "slot {key} is not in the calendar"),
            BookingError::Validation(errors) => {
                write!(f, "invalid booking:")?;
                for (i, e) in errors.iter().enumerate() {
                    let sep = if i == 0 { " " } else { "; " };
                    write!(f, "{sep}{e}")?;
                }
                Ok(())
            }
            BookingError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            BookingError::SessionNotFound(id) => write!(f, "session not found: {id}"),
            BookingError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for BookingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookingError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        BookingError::Store(e)
    }
}
