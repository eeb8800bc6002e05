//! Shiftlens - Attendance analytics and performance classification engine
//!
//! Shiftlens scores workers' attendance behavior over a date range through a
//! deterministic pipeline: working-day count → feature derivation →
//! standardization → nearest-centroid classification → report assembly.
//!
//! ## Modules
//!
//! - **Engine**: Derive attendance features and classify each worker against
//!   a pre-trained centroid model
//! - **Reporting**: Wrap result batches in a report envelope with summary
//!   statistics

pub mod calendar;
pub mod classifier;
pub mod error;
pub mod features;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use calendar::{working_days_between, AnalysisWindow};
pub use classifier::{CentroidModel, Classifier, ClusterAssignment};
pub use error::AnalysisError;
pub use model::{FileModelProvider, ModelBundle, ModelProvider, StaticModelProvider};
pub use pipeline::{analyze_snapshot, PerformanceAnalyzer};
pub use report::{AnalysisReport, ReportBuilder};
pub use source::{AttendanceSource, Snapshot, SnapshotSource};
pub use types::{
    ApprovalStatus, AttendanceRecord, FeatureVector, PerformanceResult, WorkerProfile,
};

/// Engine version embedded in all reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report envelopes
pub const PRODUCER_NAME: &str = "shiftlens";
