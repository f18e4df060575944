//! SQLite schema definition.

/// Complete database schema for the clinic desk.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patient visits
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT,
    phone TEXT NOT NULL,
    visit_datetime TEXT NOT NULL,                -- RFC 3339, UTC
    reason TEXT,
    clinical_notes TEXT,
    followup_required INTEGER NOT NULL,          -- 0/1, derived from followup_date
    followup_date TEXT                           -- RFC 3339, UTC; NULL = no follow-up
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);
CREATE INDEX IF NOT EXISTS idx_patients_phone ON patients(phone);
"#;
