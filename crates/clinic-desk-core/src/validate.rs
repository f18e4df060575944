//! Field validators and timestamp normalization.
//!
//! Everything here is pure: predicates over field text, the phone keystroke
//! filter, and the wire encoding for timestamps.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exact number of digits a phone number must have to be accepted.
pub const PHONE_DIGITS: usize = 10;

/// Client-side validation failures, raised before any remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Phone is required")]
    PhoneRequired,

    #[error("Phone number must be 10 digits")]
    PhoneInvalid,

    #[error("Patient ID is required")]
    MissingId,

    #[error("Invalid patient ID: {0}")]
    InvalidId(i64),

    #[error("Follow-up scheduling is disabled")]
    FollowUpDisabled,
}

/// Name is valid when it has at least one non-whitespace character.
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// True when `value` is between zero and ten ASCII digits.
pub fn is_phone_input(value: &str) -> bool {
    value.len() <= PHONE_DIGITS && value.bytes().all(|b| b.is_ascii_digit())
}

/// True when `value` is exactly ten ASCII digits.
pub fn is_valid_phone(value: &str) -> bool {
    value.len() == PHONE_DIGITS && is_phone_input(value)
}

/// User-visible state of a phone field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneStatus {
    /// Nothing typed yet; no error shown, but not submittable.
    Pristine,
    /// Last keystroke produced a non-digit or an over-long value.
    Rejected,
    /// Digits only, fewer than ten.
    Incomplete,
    /// Exactly ten digits.
    Valid,
}

impl PhoneStatus {
    /// Message shown under the field, if any.
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            PhoneStatus::Rejected => Some("Only numeric values allowed (max 10 digits)"),
            PhoneStatus::Incomplete => Some("Phone number must be 10 digits"),
            PhoneStatus::Pristine | PhoneStatus::Valid => None,
        }
    }

    /// Hard errors block input; soft errors only mark it incomplete.
    pub fn is_hard_error(&self) -> bool {
        matches!(self, PhoneStatus::Rejected)
    }
}

/// Phone field with keystroke filtering.
///
/// A candidate value that is not 0-10 digits never replaces the current
/// value; it only flips the status to [`PhoneStatus::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneField {
    value: String,
    status: PhoneStatus,
}

impl Default for PhoneField {
    fn default() -> Self {
        Self {
            value: String::new(),
            status: PhoneStatus::Pristine,
        }
    }
}

impl PhoneField {
    /// Field pre-filled with a stored value (row edits start from the saved number).
    pub fn with_value(value: &str) -> Self {
        let mut field = Self::default();
        if is_phone_input(value) {
            field.value = value.to_string();
            field.status = Self::status_for(value);
        } else {
            // Legacy rows may hold anything; keep it visible but flag it.
            field.value = value.to_string();
            field.status = PhoneStatus::Rejected;
        }
        field
    }

    /// Apply one keystroke's worth of input. Returns the resulting status.
    pub fn input(&mut self, candidate: &str) -> PhoneStatus {
        if is_phone_input(candidate) {
            self.value = candidate.to_string();
            self.status = Self::status_for(candidate);
        } else {
            self.status = PhoneStatus::Rejected;
        }
        self.status
    }

    fn status_for(value: &str) -> PhoneStatus {
        if value.len() == PHONE_DIGITS {
            PhoneStatus::Valid
        } else {
            PhoneStatus::Incomplete
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn status(&self) -> PhoneStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.status.error_message()
    }

    /// Submittable only at exactly ten digits with no outstanding error.
    pub fn is_valid(&self) -> bool {
        self.status == PhoneStatus::Valid && is_valid_phone(&self.value)
    }
}

/// Serialize a timestamp to the wire format (RFC 3339, UTC, millisecond precision).
pub fn serialize_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a wire timestamp. Any RFC 3339 offset is accepted and normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw.trim()).map(|at| at.with_timezone(&Utc))
}

/// Collapse an optional wire timestamp to the canonical absent state.
///
/// `None`, empty and whitespace-only strings all mean "no follow-up".
pub fn normalize_optional_timestamp(
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(value).map(Some),
    }
}

/// Derived follow-up flag for a serialized follow-up date.
pub fn follow_up_required(serialized: Option<&str>) -> bool {
    serialized.is_some_and(|value| !value.trim().is_empty())
}

/// Derived follow-up flag for a typed follow-up date.
pub fn follow_up_required_for(date: Option<&DateTime<Utc>>) -> bool {
    follow_up_required(date.map(serialize_timestamp).as_deref())
}
