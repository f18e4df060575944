//! Patient visit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{
    follow_up_required, follow_up_required_for, normalize_optional_timestamp, parse_timestamp,
    serialize_timestamp,
};

/// One patient visit entry.
///
/// `follow_up_required` is not stored here; it is derived from
/// `follow_up_date` whenever the record crosses the store boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    /// Store-assigned ID - `None` until the record has been saved
    pub id: Option<i64>,
    /// Patient name
    pub name: String,
    /// Phone number, ten digits when valid
    pub phone: String,
    /// Postal address
    pub address: Option<String>,
    /// When the visit took place
    pub visit_date: DateTime<Utc>,
    /// Reason for the visit / presenting issue
    pub reason: Option<String>,
    /// Medical history, medications
    pub clinical_notes: Option<String>,
    /// Scheduled follow-up, if any
    pub follow_up_date: Option<DateTime<Utc>>,
}

impl PatientRecord {
    /// Create a transient record with required fields, visited now.
    pub fn new(name: String, phone: String) -> Self {
        Self {
            id: None,
            name,
            phone,
            address: None,
            visit_date: Utc::now(),
            reason: None,
            clinical_notes: None,
            follow_up_date: None,
        }
    }

    /// Check if this record has been persisted.
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Derived follow-up flag.
    pub fn follow_up_required(&self) -> bool {
        follow_up_required_for(self.follow_up_date.as_ref())
    }

    /// Encode for the store boundary. The follow-up flag is recomputed here.
    pub fn to_payload(&self) -> PatientPayload {
        let follow_up_date = self.follow_up_date.as_ref().map(serialize_timestamp);
        PatientPayload {
            id: self.id,
            name: self.name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            visit_date: serialize_timestamp(&self.visit_date),
            reason: self.reason.clone(),
            clinical_notes: self.clinical_notes.clone(),
            follow_up_required: follow_up_required(follow_up_date.as_deref()),
            follow_up_date,
        }
    }
}

/// Wire shape exchanged with the store: timestamps as RFC 3339 strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    pub visit_date: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub clinical_notes: Option<String>,
    pub follow_up_required: bool,
    #[serde(default)]
    pub follow_up_date: Option<String>,
}

impl TryFrom<PatientPayload> for PatientRecord {
    type Error = chrono::ParseError;

    fn try_from(payload: PatientPayload) -> Result<Self, Self::Error> {
        Ok(PatientRecord {
            id: payload.id,
            name: payload.name,
            phone: payload.phone,
            address: payload.address,
            visit_date: parse_timestamp(&payload.visit_date)?,
            reason: payload.reason,
            clinical_notes: payload.clinical_notes,
            follow_up_date: normalize_optional_timestamp(payload.follow_up_date.as_deref())?,
        })
    }
}
