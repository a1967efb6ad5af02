use crate::config::{Config, NotificationConfig};
use crate::form::{self, FieldError, StudentForm};
use crate::rules::{self, StatusCounts, Thresholds};
use crate::store::{RecordStore, StoreError, StudentRecord};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const MSG_DUPLICATE: &str = "Cédula duplicada";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Validating,
    Rejected,
    Accepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// What the UI should pop up after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub action: String,
    pub duration_ms: u64,
}

impl Notification {
    fn new(cfg: &NotificationConfig, kind: NotificationKind, message: String) -> Self {
        Self {
            kind,
            message,
            action: cfg.action.clone(),
            duration_ms: cfg.duration_ms,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<FieldError>),
    #[error("{source}")]
    Duplicate {
        #[source]
        source: StoreError,
        notification: Notification,
    },
}

#[derive(Debug, Clone)]
pub struct Registered {
    pub student: StudentRecord,
    pub global_average: f64,
    pub notification: Notification,
}

#[derive(Debug, Clone)]
pub struct Deleted {
    pub removed: Option<StudentRecord>,
    pub global_average: f64,
}

/// Owns the record store for the session and runs the registration and
/// deletion workflows against it.
#[derive(Debug)]
pub struct Registrar {
    store: RecordStore,
    thresholds: Thresholds,
    notification: NotificationConfig,
    global_average: f64,
    form: Option<StudentForm>,
    phase: Phase,
}

impl Registrar {
    pub fn new(cfg: &Config) -> Self {
        Self {
            store: RecordStore::new(),
            thresholds: cfg.thresholds(),
            notification: cfg.notification.clone(),
            global_average: 0.0,
            form: None,
            phase: Phase::Idle,
        }
    }

    pub fn records(&self) -> &[StudentRecord] {
        self.store.all()
    }

    pub fn find(&self, cedula: &str) -> Option<&StudentRecord> {
        self.store.find_by_key(cedula)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn global_average(&self) -> f64 {
        self.global_average
    }

    pub fn status_counts(&self) -> StatusCounts {
        rules::status_counts(self.store.all())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Input kept from the last submission that did not go through.
    pub fn retained_form(&self) -> Option<&StudentForm> {
        self.form.as_ref()
    }

    pub fn cancel(&mut self) {
        self.form = None;
        self.phase = Phase::Idle;
    }

    pub fn submit(&mut self, input: StudentForm) -> Result<Registered, RegisterError> {
        let valid = match form::validate(&input) {
            Ok(v) => v,
            Err(errors) => {
                debug!(count = errors.len(), "registration form invalid");
                self.form = Some(input);
                self.phase = Phase::Idle;
                return Err(RegisterError::Invalid(errors));
            }
        };

        self.phase = Phase::Validating;
        let record = StudentRecord::derive(valid, &self.thresholds, Utc::now());
        let cedula = record.cedula.clone();
        let student = record.clone();

        if let Err(source) = self.store.insert(record) {
            warn!(%cedula, "duplicate cedula rejected");
            self.phase = Phase::Rejected;
            self.form = Some(input);
            let notification = Notification::new(
                &self.notification,
                NotificationKind::Error,
                MSG_DUPLICATE.to_string(),
            );
            return Err(RegisterError::Duplicate {
                source,
                notification,
            });
        }

        self.phase = Phase::Accepted;
        self.recompute_average();
        self.form = None;
        info!(
            %cedula,
            student = %student.display_name(),
            average = student.average,
            status = student.status.code(),
            global_average = self.global_average,
            "student registered"
        );
        self.phase = Phase::Idle;

        Ok(Registered {
            student,
            global_average: self.global_average,
            notification: Notification::new(
                &self.notification,
                NotificationKind::Success,
                "El alumno fue registrado con exito".to_string(),
            ),
        })
    }

    pub fn delete(&mut self, cedula: &str) -> Deleted {
        let removed = self.store.remove(cedula);
        match &removed {
            Some(r) => {
                self.recompute_average();
                info!(cedula, student = %r.display_name(), "student deleted");
            }
            None => debug!(cedula, "delete for unknown cedula ignored"),
        }
        Deleted {
            removed,
            global_average: self.global_average,
        }
    }

    fn recompute_average(&mut self) {
        self.global_average = rules::cohort_average(self.store.all());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Status;
    use serde_json::json;

    fn form(cedula: &str, s1: f64, s2: f64, attendance: f64) -> StudentForm {
        serde_json::from_value(json!({
            "cedula": cedula,
            "firstName": "Ana",
            "lastName": "Mora",
            "score1": s1.to_string(),
            "score2": s2.to_string(),
            "attendance": attendance.to_string(),
        }))
        .expect("form json")
    }

    #[test]
    fn register_duplicate_then_delete() {
        let mut reg = Registrar::new(&Config::default());

        let ok = reg
            .submit(form("1234567890", 7.0, 9.0, 80.0))
            .expect("first registration");
        assert_eq!(ok.student.average, 8.0);
        assert_eq!(ok.student.status, Status::Passed);
        assert_eq!(ok.global_average, 8.0);
        assert_eq!(ok.notification.kind, NotificationKind::Success);
        assert!(reg.retained_form().is_none());

        let dup = form("1234567890", 1.0, 1.0, 10.0);
        match reg.submit(dup.clone()) {
            Err(RegisterError::Duplicate { notification, .. }) => {
                assert_eq!(notification.message, MSG_DUPLICATE);
                assert_eq!(notification.kind, NotificationKind::Error);
                assert_eq!(notification.duration_ms, 4000);
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.phase(), Phase::Rejected);
        assert_eq!(reg.retained_form(), Some(&dup));
        assert_eq!(reg.records()[0].average, 8.0);

        let d = reg.delete("1234567890");
        assert!(d.removed.is_some());
        assert_eq!(reg.len(), 0);
        assert_eq!(d.global_average, 0.0);
    }

    #[test]
    fn invalid_form_never_touches_store() {
        let mut reg = Registrar::new(&Config::default());
        let bad = form("12345", 7.0, 8.0, 90.0);
        match reg.submit(bad) {
            Err(RegisterError::Invalid(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "cedula");
            }
            other => panic!("expected invalid, got {other:?}"),
        }
        assert_eq!(reg.len(), 0);
        assert!(reg.retained_form().is_some());
        reg.cancel();
        assert!(reg.retained_form().is_none());
        assert_eq!(reg.phase(), Phase::Idle);
    }

    #[test]
    fn global_average_tracks_store() {
        let mut reg = Registrar::new(&Config::default());
        reg.submit(form("0000000001", 8.0, 8.0, 90.0)).expect("a");
        let r = reg.submit(form("0000000002", 6.0, 6.0, 90.0)).expect("b");
        assert_eq!(r.global_average, 7.0);

        let d = reg.delete("0000000001");
        assert_eq!(d.global_average, 6.0);

        let d = reg.delete("0000000001");
        assert!(d.removed.is_none());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.global_average(), 6.0);
    }

    #[test]
    fn thresholds_come_from_config() {
        let cfg = Config {
            pass_attendance: 90.0,
            ..Config::default()
        };
        let mut reg = Registrar::new(&cfg);
        let r = reg.submit(form("0000000001", 8.0, 8.0, 85.0)).expect("a");
        assert_eq!(r.student.status, Status::FailedByAttendance);
        let counts = reg.status_counts();
        assert_eq!(counts.failed_by_attendance, 1);
    }
}
