//! Analysis report assembly
//!
//! This module wraps a result batch in a report envelope: producer stamp,
//! the analyzed window with its working-day count, and the aggregate
//! statistics dashboards render (per-label head counts and feature
//! averages).

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::AnalysisWindow;
use crate::types::PerformanceResult;
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Producer metadata stamped on every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// The analyzed window, echoed with the working-day count used for scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub working_days: u32,
}

/// Aggregate statistics over one result batch
///
/// Averages are plain means across workers; an empty batch zeroes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Workers per performance label
    pub label_counts: BTreeMap<String, usize>,
    pub avg_attendance_rate: f64,
    pub avg_work_hours: f64,
    pub avg_punctuality_score: f64,
    pub avg_consistency_score: f64,
    pub avg_confidence: f64,
}

/// Complete analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub window: ReportWindow,
    pub computed_at_utc: String,
    pub summary: ReportSummary,
    pub results: Vec<PerformanceResult>,
}

/// Report builder with a stable per-session instance ID
pub struct ReportBuilder {
    instance_id: String,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    /// Create a builder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a builder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Assemble the report envelope around a result batch
    pub fn build(&self, results: Vec<PerformanceResult>, window: &AnalysisWindow) -> AnalysisReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        AnalysisReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            window: ReportWindow {
                start: window.start,
                end: window.end,
                working_days: window.working_days(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            summary: summarize(&results),
            results,
        }
    }

    /// Assemble and serialize to pretty JSON
    pub fn build_json(
        &self,
        results: Vec<PerformanceResult>,
        window: &AnalysisWindow,
    ) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.build(results, window))
    }
}

fn summarize(results: &[PerformanceResult]) -> ReportSummary {
    let mut label_counts: BTreeMap<String, usize> = BTreeMap::new();
    for result in results {
        *label_counts.entry(result.performance_label.clone()).or_insert(0) += 1;
    }

    if results.is_empty() {
        return ReportSummary {
            label_counts,
            avg_attendance_rate: 0.0,
            avg_work_hours: 0.0,
            avg_punctuality_score: 0.0,
            avg_consistency_score: 0.0,
            avg_confidence: 0.0,
        };
    }

    let n = results.len() as f64;

    ReportSummary {
        label_counts,
        avg_attendance_rate: results.iter().map(|r| r.features.attendance_rate).sum::<f64>() / n,
        avg_work_hours: results.iter().map(|r| r.features.avg_work_hours).sum::<f64>() / n,
        avg_punctuality_score: results
            .iter()
            .map(|r| r.features.punctuality_score)
            .sum::<f64>()
            / n,
        avg_consistency_score: results
            .iter()
            .map(|r| r.features.consistency_score)
            .sum::<f64>()
            / n,
        avg_confidence: results.iter().map(|r| r.confidence).sum::<f64>() / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureVector;

    fn result(user_id: &str, label: &str, rate: f64, confidence: f64) -> PerformanceResult {
        PerformanceResult {
            user_id: user_id.to_string(),
            name: format!("Worker {user_id}"),
            email: format!("{user_id}@example.com"),
            worker_id: format!("W-{user_id}"),
            features: FeatureVector {
                attendance_rate: rate,
                avg_work_hours: 8.0,
                punctuality_score: 80.0,
                consistency_score: 90.0,
            },
            performance_label: label.to_string(),
            cluster: 1,
            confidence,
        }
    }

    fn window() -> AnalysisWindow {
        AnalysisWindow::parse("2024-01-01", "2024-01-29").unwrap()
    }

    #[test]
    fn summary_counts_labels_and_averages_features() {
        let results = vec![
            result("u1", "High Performer", 100.0, 0.9),
            result("u2", "High Performer", 80.0, 0.7),
            result("u3", "Low Performer", 30.0, 0.5),
        ];

        let report = ReportBuilder::with_instance_id("test-instance".to_string())
            .build(results, &window());

        assert_eq!(report.summary.label_counts["High Performer"], 2);
        assert_eq!(report.summary.label_counts["Low Performer"], 1);
        assert!((report.summary.avg_attendance_rate - 70.0).abs() < 1e-9);
        assert!((report.summary.avg_confidence - 0.7).abs() < 1e-9);
        assert_eq!(report.window.working_days, 21);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.results.len(), 3);
    }

    #[test]
    fn empty_batch_produces_a_zeroed_summary() {
        let report = ReportBuilder::new().build(vec![], &window());

        assert!(report.summary.label_counts.is_empty());
        assert_eq!(report.summary.avg_attendance_rate, 0.0);
        assert_eq!(report.summary.avg_confidence, 0.0);
        assert!(report.results.is_empty());
    }

    #[test]
    fn report_serializes_with_envelope_fields() {
        let json = ReportBuilder::new()
            .build_json(vec![result("u1", "Medium Performer", 60.0, 0.8)], &window())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["report_version"], REPORT_VERSION);
        assert_eq!(parsed["producer"]["name"], PRODUCER_NAME);
        assert_eq!(parsed["window"]["start"], "2024-01-01");
        assert_eq!(parsed["window"]["working_days"], 21);
        assert!(parsed.get("computed_at_utc").is_some());
        // Results keep the exporter's camelCase field names
        assert_eq!(parsed["results"][0]["attendanceRate"], 60.0);
    }
}
