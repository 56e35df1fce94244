use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::limits::MAX_NOTES_LEN;
use crate::model::*;

use super::{BookingError, FieldError};

/// Who is booking, as entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid email format")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = MAX_NOTES_LEN, message = "Notes are too long"))]
    pub notes: Option<String>,
}

impl ContactInfo {
    /// Trimmed copy; blank notes become `None`.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }
}

/// One message per invalid field, ordered by field name.
fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Turn the final selection into reservation rows, one per block.
///
/// Every problem is collected before returning so the caller can show all
/// invalid fields at once.
pub fn assemble(
    blocks: &[Block],
    contact: &ContactInfo,
    user_id: Option<&str>,
) -> Result<Vec<ReservationRequest>, BookingError> {
    let contact = contact.normalized();

    let mut errors = Vec::new();
    if blocks.is_empty() {
        errors.push(FieldError {
            field: "blocks".into(),
            message: "At least one time block must be selected".into(),
        });
    }
    if let Err(e) = contact.validate() {
        errors.extend(field_errors(&e));
    }
    if !errors.is_empty() {
        return Err(BookingError::Validation(errors));
    }

    Ok(blocks
        .iter()
        .map(|block| ReservationRequest {
            court_id: block.court_id.clone(),
            begins_at: block.begins_at(),
            ends_at: block.ends_at(),
            price: block.total_price,
            user_id: user_id.map(str::to_string),
            status: RequestStatus::New,
            notes: contact.notes.clone(),
            contact_name: contact.name.clone(),
            contact_email: contact.email.clone(),
            contact_phone: contact.phone.clone(),
        })
        .collect())
}
