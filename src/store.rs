use crate::form::ValidStudent;
use crate::rules::{self, Status, Thresholds};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub cedula: String,
    pub first_name: String,
    pub last_name: String,
    pub score1: f64,
    pub score2: f64,
    pub attendance: f64,
    pub average: f64,
    pub status: Status,
    pub registered_at: DateTime<Utc>,
}

impl StudentRecord {
    /// Builds a record from validated input. Average and status are always
    /// derived here, never taken from the caller.
    pub fn derive(input: ValidStudent, thresholds: &Thresholds, now: DateTime<Utc>) -> Self {
        let average = rules::derive_average(input.score1, input.score2);
        let status = rules::classify_with(thresholds, average, input.attendance);
        Self {
            cedula: input.cedula,
            first_name: input.first_name,
            last_name: input.last_name,
            score1: input.score1,
            score2: input.score2,
            attendance: input.attendance,
            average,
            status,
            registered_at: now,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    #[cfg(test)]
    pub fn test_fixture(cedula: &str, average: f64, status: Status) -> Self {
        Self {
            cedula: cedula.to_string(),
            first_name: "Ana".into(),
            last_name: "Mora".into(),
            score1: average,
            score2: average,
            attendance: 100.0,
            average,
            status,
            registered_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("cedula {0} is already registered")]
    DuplicateCedula(String),
}

/// Insertion-ordered student records, unique by cedula.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<StudentRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: StudentRecord) -> Result<(), StoreError> {
        if self.find_by_key(&record.cedula).is_some() {
            return Err(StoreError::DuplicateCedula(record.cedula));
        }
        self.records.push(record);
        Ok(())
    }

    /// Removes the first record with this cedula. Unknown cedulas are a no-op.
    pub fn remove(&mut self, cedula: &str) -> Option<StudentRecord> {
        let idx = self.records.iter().position(|r| r.cedula == cedula)?;
        Some(self.records.remove(idx))
    }

    pub fn find_by_key(&self, cedula: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.cedula == cedula)
    }

    pub fn all(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
