//! Pipeline orchestration
//!
//! This module provides the public API for Shiftlens. It orchestrates one
//! analysis run: working-day count, per-worker feature derivation,
//! standardization, classification, and result assembly.

use std::collections::BTreeMap;

use crate::calendar::AnalysisWindow;
use crate::classifier::{
    confidence_from_distance, CentroidModel, Classifier, UNKNOWN_CLUSTER, UNKNOWN_LABEL,
};
use crate::error::AnalysisError;
use crate::features::FeatureExtractor;
use crate::model::{ModelBundle, ModelProvider};
use crate::normalizer::{FeatureNormalizer, ScalerParams};
use crate::source::AttendanceSource;
use crate::types::{AttendanceRecord, PerformanceResult, WorkerProfile};

/// Score every worker in a snapshot against a model bundle.
///
/// # Arguments
/// * `workers` - Worker profiles, already filtered to scoreable accounts
/// * `attendance` - Approved attendance records for the window
/// * `window` - Inclusive analysis date range
/// * `bundle` - Classifier parameters for this run
///
/// # Returns
/// One [`PerformanceResult`] per worker, in input order
///
/// # Example
/// ```ignore
/// let window = AnalysisWindow::parse("2024-01-01", "2024-01-31")?;
/// let results = analyze_snapshot(&workers, &attendance, &window, &ModelBundle::bundled())?;
/// ```
pub fn analyze_snapshot(
    workers: &[WorkerProfile],
    attendance: &[AttendanceRecord],
    window: &AnalysisWindow,
    bundle: &ModelBundle,
) -> Result<Vec<PerformanceResult>, AnalysisError> {
    let analyzer = PerformanceAnalyzer::from_bundle(bundle)?;
    analyzer.analyze(workers, attendance, window)
}

/// Session-scoped analyzer owning a loaded classifier.
///
/// Build one per analysis session: the model is acquired and validated
/// once up front, serves any number of `analyze` calls, and is released
/// when the analyzer drops, whether or not the run succeeded. All methods
/// take `&self`; with the shipped classifier the analyzer is `Send + Sync`
/// and workers may be scored in parallel.
pub struct PerformanceAnalyzer {
    classifier: Box<dyn Classifier>,
    scaler: ScalerParams,
    labels: BTreeMap<u32, String>,
}

impl PerformanceAnalyzer {
    /// Build an analyzer from a validated model bundle
    pub fn from_bundle(bundle: &ModelBundle) -> Result<Self, AnalysisError> {
        bundle.validate()?;

        let classifier = CentroidModel::new(bundle.centroid_rows()?)?;

        Ok(Self {
            classifier: Box::new(classifier),
            scaler: bundle.scaler_params.clone(),
            labels: bundle.performance_mapping.clone(),
        })
    }

    /// Acquire a bundle from a provider and build an analyzer from it
    pub fn from_provider(provider: &dyn ModelProvider) -> Result<Self, AnalysisError> {
        let bundle = provider.load()?;
        Self::from_bundle(&bundle)
    }

    /// Build an analyzer around a custom classifier implementation
    pub fn with_classifier(
        classifier: Box<dyn Classifier>,
        scaler: ScalerParams,
        labels: BTreeMap<u32, String>,
    ) -> Self {
        Self {
            classifier,
            scaler,
            labels,
        }
    }

    /// Score each worker over the window.
    ///
    /// Output order matches `workers` order. An empty `workers` list is a
    /// legitimate outcome and yields an empty result list. A classifier
    /// failure for any worker fails the whole batch.
    pub fn analyze(
        &self,
        workers: &[WorkerProfile],
        attendance: &[AttendanceRecord],
        window: &AnalysisWindow,
    ) -> Result<Vec<PerformanceResult>, AnalysisError> {
        if workers.is_empty() {
            return Ok(Vec::new());
        }

        let working_days = window.working_days();
        log::debug!(
            "analyzing {} workers, {} records, {} working days in {}..{}",
            workers.len(),
            attendance.len(),
            working_days,
            window.start,
            window.end
        );

        let mut results = Vec::with_capacity(workers.len());

        for worker in workers {
            let records: Vec<AttendanceRecord> = attendance
                .iter()
                .filter(|r| r.user_id == worker.user_id)
                .cloned()
                .collect();

            let features = FeatureExtractor::derive(&records, working_days);
            let standardized = FeatureNormalizer::normalize(&features, &self.scaler);
            let assignment = self.classifier.classify(&standardized)?;

            let (performance_label, cluster, confidence) =
                match self.label_for(assignment.cluster) {
                    Some(label) => (
                        label.to_string(),
                        assignment.cluster as i32,
                        confidence_from_distance(assignment.distance),
                    ),
                    None => {
                        log::warn!(
                            "cluster {} has no label mapping, reporting {} for worker {}",
                            assignment.cluster,
                            UNKNOWN_LABEL,
                            worker.user_id
                        );
                        (UNKNOWN_LABEL.to_string(), UNKNOWN_CLUSTER, 0.0)
                    }
                };

            results.push(PerformanceResult {
                user_id: worker.user_id.clone(),
                name: worker.name.clone(),
                email: worker.email.clone(),
                worker_id: worker.worker_id.clone(),
                features,
                performance_label,
                cluster,
                confidence,
            });
        }

        Ok(results)
    }

    /// Pull workers and window-filtered attendance from a source, then
    /// score them
    pub fn analyze_source(
        &self,
        source: &dyn AttendanceSource,
        window: &AnalysisWindow,
    ) -> Result<Vec<PerformanceResult>, AnalysisError> {
        let workers = source.list_workers()?;
        let attendance = source.list_approved_attendance(window)?;
        self.analyze(&workers, &attendance, window)
    }

    fn label_for(&self, cluster: usize) -> Option<&str> {
        u32::try_from(cluster)
            .ok()
            .and_then(|id| self.labels.get(&id))
            .map(String::as_str)
    }
}
