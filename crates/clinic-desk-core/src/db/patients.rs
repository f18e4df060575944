//! Patient database operations.
//!
//! Rows are stored in wire form ([`PatientPayload`]); typed conversion happens
//! in the gateway.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::PatientPayload;
use crate::validate::follow_up_required;

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, phone, address, visit_datetime,
           reason, clinical_notes, followup_required, followup_date
    FROM patients
"#;

impl Database {
    /// Insert a new patient. Any `id` on the payload is ignored; returns the assigned one.
    pub fn insert_patient(&self, patient: &PatientPayload) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                name, address, phone, visit_datetime,
                reason, clinical_notes, followup_required, followup_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                patient.name,
                patient.address,
                patient.phone,
                patient.visit_date,
                patient.reason,
                patient.clinical_notes,
                stored_follow_up_flag(patient),
                patient.follow_up_date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replace every column of an existing patient. Returns false if the ID is unknown.
    pub fn update_patient(&self, id: i64, patient: &PatientPayload) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                phone = ?3,
                address = ?4,
                visit_datetime = ?5,
                reason = ?6,
                clinical_notes = ?7,
                followup_required = ?8,
                followup_date = ?9
            WHERE id = ?1
            "#,
            params![
                id,
                patient.name,
                patient.phone,
                patient.address,
                patient.visit_date,
                patient.reason,
                patient.clinical_notes,
                stored_follow_up_flag(patient),
                patient.follow_up_date,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<PatientPayload>> {
        self.conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?"), [id], payload_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// List all patients in insertion order.
    pub fn list_patients(&self) -> DbResult<Vec<PatientPayload>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
        let rows = stmt.query_map([], payload_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a patient. Returns false if the ID is unknown.
    pub fn delete_patient(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Number of stored patients.
    pub fn count_patients(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// The flag column never disagrees with the date column, whatever the caller sent.
fn stored_follow_up_flag(patient: &PatientPayload) -> i32 {
    follow_up_required(patient.follow_up_date.as_deref()) as i32
}

fn payload_from_row(row: &Row<'_>) -> rusqlite::Result<PatientPayload> {
    Ok(PatientPayload {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        address: row.get(3)?,
        visit_date: row.get(4)?,
        reason: row.get(5)?,
        clinical_notes: row.get(6)?,
        follow_up_required: row.get::<_, i32>(7)? == 1,
        follow_up_date: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn payload(name: &str, phone: &str) -> PatientPayload {
        PatientPayload {
            id: None,
            name: name.into(),
            phone: phone.into(),
            address: Some("12 MG Road".into()),
            visit_date: "2024-01-05T10:30:00.000Z".into(),
            reason: Some("Fever".into()),
            clinical_notes: None,
            follow_up_required: false,
            follow_up_date: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let id = db.insert_patient(&payload("Ann", "9999999999")).unwrap();

        let retrieved = db.get_patient(id).unwrap().unwrap();
        assert_eq!(retrieved.id, Some(id));
        assert_eq!(retrieved.name, "Ann");
        assert_eq!(retrieved.address, Some("12 MG Road".into()));
        assert_eq!(retrieved.visit_date, "2024-01-05T10:30:00.000Z");
        assert!(!retrieved.follow_up_required);
    }

    #[test]
    fn test_insert_ignores_payload_id() {
        let db = setup_db();

        let mut first = payload("Ann", "9999999999");
        first.id = Some(42);
        let id = db.insert_patient(&first).unwrap();

        assert_ne!(id, 42);
        assert!(db.get_patient(42).unwrap().is_none());
    }

    #[test]
    fn test_update_patient_is_full_replace() {
        let db = setup_db();
        let id = db.insert_patient(&payload("Ann", "9999999999")).unwrap();

        let mut changed = payload("Ann Marie", "9999999998");
        changed.address = None;
        changed.follow_up_date = Some("2024-02-01T09:00:00.000Z".into());
        assert!(db.update_patient(id, &changed).unwrap());

        let retrieved = db.get_patient(id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Ann Marie");
        assert_eq!(retrieved.address, None);
        assert!(retrieved.follow_up_required);
    }

    #[test]
    fn test_flag_column_follows_date() {
        let db = setup_db();

        let mut lying = payload("Ann", "9999999999");
        lying.follow_up_required = true;
        lying.follow_up_date = Some("  ".into());
        let id = db.insert_patient(&lying).unwrap();

        assert!(!db.get_patient(id).unwrap().unwrap().follow_up_required);
    }

    #[test]
    fn test_update_unknown_id() {
        let db = setup_db();
        assert!(!db.update_patient(99, &payload("Ann", "9999999999")).unwrap());
    }

    #[test]
    fn test_list_and_delete() {
        let db = setup_db();
        let ann = db.insert_patient(&payload("Ann", "9999999999")).unwrap();
        let bob = db.insert_patient(&payload("Bob", "8888888888")).unwrap();

        let all = db.list_patients().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, Some(ann));

        assert!(db.delete_patient(ann).unwrap());
        assert!(!db.delete_patient(ann).unwrap());

        let remaining = db.list_patients().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, Some(bob));
        assert_eq!(db.count_patients().unwrap(), 1);
    }
}
