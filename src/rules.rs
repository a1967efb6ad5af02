use crate::store::StudentRecord;
use serde::{Deserialize, Serialize};

/// Outcome of a student's registration, derived from average and attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Passed,
    FailedByScore,
    FailedByAttendance,
}

impl Status {
    #[allow(dead_code)]
    pub const ALL: [Status; 3] = [
        Status::Passed,
        Status::FailedByScore,
        Status::FailedByAttendance,
    ];

    /// Wire code, matches the serde representation.
    pub fn code(self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::FailedByScore => "failedByScore",
            Status::FailedByAttendance => "failedByAttendance",
        }
    }

    /// Label shown in the table's status column.
    pub fn label(self) -> &'static str {
        match self {
            Status::Passed => "Aprobado",
            Status::FailedByScore => "Reprobado por nota",
            Status::FailedByAttendance => "Reprobado por asistencia",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub pass_average: f64,
    pub pass_attendance: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pass_average: 6.0,
            pass_attendance: 75.0,
        }
    }
}

/// Plain mean of the two scores. No rounding.
pub fn derive_average(score1: f64, score2: f64) -> f64 {
    (score1 + score2) / 2.0
}

#[allow(dead_code)]
pub fn classify(average: f64, attendance: f64) -> Status {
    classify_with(&Thresholds::default(), average, attendance)
}

/// First match wins. A low average is reported as a score failure even when
/// attendance is also below the bar.
pub fn classify_with(t: &Thresholds, average: f64, attendance: f64) -> Status {
    if average >= t.pass_average && attendance >= t.pass_attendance {
        Status::Passed
    } else if average < t.pass_average {
        Status::FailedByScore
    } else {
        Status::FailedByAttendance
    }
}

/// Mean of the per-record averages; 0 when there are none.
pub fn cohort_average(records: &[StudentRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: f64 = records.iter().map(|r| r.average).sum();
    sum / (records.len() as f64)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub passed: usize,
    pub failed_by_score: usize,
    pub failed_by_attendance: usize,
}

pub fn status_counts(records: &[StudentRecord]) -> StatusCounts {
    let mut out = StatusCounts::default();
    for r in records {
        match r.status {
            Status::Passed => out.passed += 1,
            Status::FailedByScore => out.failed_by_score += 1,
            Status::FailedByAttendance => out.failed_by_attendance += 1,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_average(average: f64) -> StudentRecord {
        StudentRecord::test_fixture("0000000000", average, Status::Passed)
    }

    fn with_status(status: Status) -> StudentRecord {
        StudentRecord::test_fixture("0000000000", 7.0, status)
    }

    #[test]
    fn average_is_exact_mean() {
        assert_eq!(derive_average(7.0, 9.0), 8.0);
        assert_eq!(derive_average(5.5, 6.0), 5.75);
        assert_eq!(derive_average(0.1, 0.2), (0.1 + 0.2) / 2.0);
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(5.9, 80.0), Status::FailedByScore);
        assert_eq!(classify(6.0, 74.9), Status::FailedByAttendance);
        assert_eq!(classify(6.0, 75.0), Status::Passed);
    }

    #[test]
    fn low_score_wins_over_low_attendance() {
        assert_eq!(classify(5.9, 50.0), Status::FailedByScore);
        assert_eq!(classify(0.0, 0.0), Status::FailedByScore);
    }

    #[test]
    fn classify_with_custom_thresholds() {
        let t = Thresholds {
            pass_average: 7.0,
            pass_attendance: 90.0,
        };
        assert_eq!(classify_with(&t, 6.5, 95.0), Status::FailedByScore);
        assert_eq!(classify_with(&t, 7.0, 89.0), Status::FailedByAttendance);
        assert_eq!(classify_with(&t, 7.0, 90.0), Status::Passed);
    }

    #[test]
    fn cohort_average_empty_is_zero() {
        assert_eq!(cohort_average(&[]), 0.0);
        assert_eq!(cohort_average(&[with_average(8.0), with_average(6.0)]), 7.0);
    }

    #[test]
    fn counts_per_status() {
        let c = status_counts(&[
            with_status(Status::Passed),
            with_status(Status::FailedByScore),
            with_status(Status::Passed),
            with_status(Status::FailedByAttendance),
        ]);
        assert_eq!(c.passed, 2);
        assert_eq!(c.failed_by_score, 1);
        assert_eq!(c.failed_by_attendance, 1);
    }

    #[test]
    fn status_serializes_as_code() {
        for s in Status::ALL {
            assert_eq!(serde_json::to_value(s).expect("ser"), s.code());
        }
    }
}
