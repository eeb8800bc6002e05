//! Attendance data sources
//!
//! The engine consumes already-retrieved data through the
//! [`AttendanceSource`] trait: worker profiles plus approved attendance
//! records inside an analysis window. [`SnapshotSource`] implements it over
//! an exported JSON snapshot; hosts with a live backend implement the trait
//! themselves and decide whether retrieval failures propagate or degrade to
//! an empty list with the failure logged.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calendar::AnalysisWindow;
use crate::error::AnalysisError;
use crate::types::{ApprovalStatus, AttendanceRecord, WorkerProfile};

/// Provider of workers and window-filtered approved attendance
pub trait AttendanceSource {
    fn list_workers(&self) -> Result<Vec<WorkerProfile>, AnalysisError>;

    /// Records with approved status whose date falls inside the window,
    /// inclusive of both ends
    fn list_approved_attendance(
        &self,
        window: &AnalysisWindow,
    ) -> Result<Vec<AttendanceRecord>, AnalysisError>;
}

/// One exported snapshot of the upstream store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<WorkerProfile>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

/// In-memory snapshot source
///
/// Filtering happens here, at the retrieval boundary: the engine itself
/// assumes an already-filtered list.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl AttendanceSource for SnapshotSource {
    /// Profiles with a worker role. Profiles without a role field are kept:
    /// role-filtered exports omit it.
    fn list_workers(&self) -> Result<Vec<WorkerProfile>, AnalysisError> {
        let workers: Vec<WorkerProfile> = self
            .snapshot
            .users
            .iter()
            .filter(|profile| match profile.role.as_deref() {
                None | Some("worker") => true,
                Some(other) => {
                    log::debug!("skipping non-worker profile {} (role {})", profile.user_id, other);
                    false
                }
            })
            .cloned()
            .collect();

        if workers.is_empty() && !self.snapshot.users.is_empty() {
            log::warn!("snapshot has {} users but no worker profiles", self.snapshot.users.len());
        }

        Ok(workers)
    }

    fn list_approved_attendance(
        &self,
        window: &AnalysisWindow,
    ) -> Result<Vec<AttendanceRecord>, AnalysisError> {
        let total = self.snapshot.attendance.len();
        let records: Vec<AttendanceRecord> = self
            .snapshot
            .attendance
            .iter()
            .filter(|r| r.status == ApprovalStatus::Approved)
            .filter(|r| r.date >= window.start && r.date <= window.end)
            .cloned()
            .collect();

        log::debug!(
            "snapshot: {} of {} attendance records approved within {}..{}",
            records.len(),
            total,
            window.start,
            window.end
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT_JSON: &str = r#"{
        "users": [
            {"userId": "u1", "name": "Asha", "email": "asha@example.com", "workerId": "W-01", "role": "worker"},
            {"userId": "u2", "name": "Ben", "email": "ben@example.com", "workerId": "W-02", "role": "manager"},
            {"userId": "u3", "name": "Chao", "email": "chao@example.com", "workerId": "W-03"}
        ],
        "attendance": [
            {"attendanceId": "a1", "userId": "u1", "date": "2024-01-02", "clockInTime": "2024-01-02T06:30:00", "workMinutes": 480, "status": "approved"},
            {"attendanceId": "a2", "userId": "u1", "date": "2024-01-03", "clockInTime": "2024-01-03T06:30:00", "workMinutes": 480, "status": "pending"},
            {"attendanceId": "a3", "userId": "u1", "date": "2024-02-15", "clockInTime": "2024-02-15T06:30:00", "workMinutes": 480, "status": "approved"},
            {"attendanceId": "a4", "userId": "u3", "date": "2024-01-05", "clockInTime": "2024-01-05T08:10:00", "workMinutes": 450, "status": "approved"}
        ]
    }"#;

    fn window() -> AnalysisWindow {
        AnalysisWindow::parse("2024-01-01", "2024-01-31").unwrap()
    }

    #[test]
    fn non_worker_roles_are_excluded() {
        let source = SnapshotSource::from_json(SNAPSHOT_JSON).unwrap();
        let workers = source.list_workers().unwrap();

        let ids: Vec<&str> = workers.iter().map(|w| w.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u3"]);
    }

    #[test]
    fn attendance_is_filtered_to_approved_records_in_window() {
        let source = SnapshotSource::from_json(SNAPSHOT_JSON).unwrap();
        let records = source.list_approved_attendance(&window()).unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.attendance_id.as_str()).collect();
        // a2 is pending, a3 is outside the window
        assert_eq!(ids, vec!["a1", "a4"]);
    }

    #[test]
    fn empty_snapshot_yields_empty_lists() {
        let source = SnapshotSource::from_json("{}").unwrap();
        assert!(source.list_workers().unwrap().is_empty());
        assert!(source.list_approved_attendance(&window()).unwrap().is_empty());
    }

    #[test]
    fn malformed_snapshot_is_a_json_error() {
        let err = SnapshotSource::from_json("{\"users\": 42}").unwrap_err();
        assert!(matches!(err, AnalysisError::JsonError(_)));
    }
}
