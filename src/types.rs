//! Core types for the Shiftlens analysis pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: attendance snapshots, derived feature vectors, and the final
//! per-worker performance results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical feature ordering shared by the extractor, the scaler, and the
/// classifier. Model bundles that declare a `feature_order` must match it.
pub const FEATURE_ORDER: [&str; 4] = [
    "attendance_rate",
    "avg_work_hours",
    "punctuality_score",
    "consistency_score",
];

/// Approval state of an attendance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Approved,
    Pending,
    Rejected,
    /// Any status value not recognized above
    #[serde(other)]
    Unknown,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Unknown => "unknown",
        }
    }
}

/// Identity fields for one worker, passed through to the result unchanged
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    /// Stable identifier joining profiles to attendance records
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// External payroll/HR worker code
    #[serde(default)]
    pub worker_id: String,
    /// Account role as exported upstream; only "worker" accounts are scored
    #[serde(default)]
    pub role: Option<String>,
}

/// One worker's single attendance event
///
/// Records are immutable once retrieved. Only records whose status is
/// `approved` participate in scoring; that filter lives at the data-source
/// boundary, and the engine tolerates an already-filtered list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(default)]
    pub attendance_id: String,
    /// Worker this record belongs to
    pub user_id: String,
    /// Calendar day of the shift (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Clock-in timestamp as exported upstream; see `features` for the
    /// accepted shapes
    #[serde(default)]
    pub clock_in_time: String,
    #[serde(default)]
    pub clock_out_time: String,
    /// Minutes worked during the shift
    #[serde(default)]
    pub work_minutes: i64,
    #[serde(default)]
    pub overtime_minutes: i64,
    pub status: ApprovalStatus,
}

/// Ordered behavioral features derived for one worker
///
/// Produced fresh per worker per analysis and never mutated, only
/// transformed. Field order matches [`FEATURE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    /// Approved records vs. working days, clamped to 100 (%)
    pub attendance_rate: f64,
    /// Mean worked hours per record
    pub avg_work_hours: f64,
    /// Share of records with a clock-in hour of 7 or earlier (%)
    pub punctuality_score: f64,
    /// Inverse spread of worked hours against a 4h worst case (%)
    pub consistency_score: f64,
}

impl FeatureVector {
    /// Values in canonical feature order
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.attendance_rate,
            self.avg_work_hours,
            self.punctuality_score,
            self.consistency_score,
        ]
    }
}

/// Final labeled and scored record for one worker
///
/// A report value object: created once per worker per analysis run, with no
/// further mutation or deletion semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResult {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub worker_id: String,
    #[serde(flatten)]
    pub features: FeatureVector,
    /// Human-readable label from the model's cluster mapping, or "Unknown"
    pub performance_label: String,
    /// Assigned cluster id; -1 when the id has no entry in the mapping
    pub cluster: i32,
    /// Closeness to the assigned centroid, in (0, 1]; 0 for "Unknown"
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_status_parses_lowercase_and_tolerates_unknown() {
        let s: ApprovalStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(s, ApprovalStatus::Approved);
        let s: ApprovalStatus = serde_json::from_str("\"on_leave\"").unwrap();
        assert_eq!(s, ApprovalStatus::Unknown);
    }

    #[test]
    fn attendance_record_parses_camel_case_export() {
        let json = r#"{
            "attendanceId": "a-1",
            "userId": "u1",
            "date": "2024-12-19",
            "clockInTime": "2024-12-19T06:45:00",
            "clockOutTime": "2024-12-19T15:05:00",
            "workMinutes": 480,
            "overtimeMinutes": 20,
            "status": "approved"
        }"#;

        let rec: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.user_id, "u1");
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 12, 19).unwrap());
        assert_eq!(rec.work_minutes, 480);
        assert_eq!(rec.status, ApprovalStatus::Approved);
    }

    #[test]
    fn feature_vector_flattens_into_result() {
        let result = PerformanceResult {
            user_id: "u1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            worker_id: "W-07".to_string(),
            features: FeatureVector {
                attendance_rate: 95.0,
                avg_work_hours: 8.0,
                punctuality_score: 100.0,
                consistency_score: 100.0,
            },
            performance_label: "High Performer".to_string(),
            cluster: 2,
            confidence: 0.93,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["attendanceRate"], 95.0);
        assert_eq!(value["performanceLabel"], "High Performer");
        assert_eq!(value["cluster"], 2);
    }
}
