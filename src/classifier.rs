//! Nearest-centroid classification
//!
//! The engine owns the classification *protocol*: standardized input in
//! canonical feature order, squared-distance output semantics, and the
//! distance-to-confidence map. The assignment itself sits behind the
//! [`Classifier`] trait so hosts can substitute the shipped centroid model
//! with a deterministic stub in tests or another implementation entirely.

use crate::error::AnalysisError;

/// Label reported when an assigned cluster id has no mapping entry
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Cluster id reported alongside [`UNKNOWN_LABEL`]
pub const UNKNOWN_CLUSTER: i32 = -1;

/// Output of one classification: nearest cluster and its distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterAssignment {
    /// Index of the nearest centroid
    pub cluster: usize,
    /// Squared Euclidean distance to that centroid, >= 0
    pub distance: f64,
}

/// Assigns a standardized feature vector to a performance cluster
///
/// Implementations must be deterministic and side-effect-free. Distance
/// semantics: non-negative, smaller = more confident.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &[f64; 4]) -> Result<ClusterAssignment, AnalysisError>;
}

/// Pre-trained centroid set in standardized feature space
#[derive(Debug, Clone)]
pub struct CentroidModel {
    centroids: Vec<[f64; 4]>,
}

impl CentroidModel {
    /// Build from a centroid matrix; rejects an empty set
    pub fn new(centroids: Vec<[f64; 4]>) -> Result<Self, AnalysisError> {
        if centroids.is_empty() {
            return Err(AnalysisError::MalformedModel(
                "centroid set is empty".to_string(),
            ));
        }

        Ok(Self { centroids })
    }

    pub fn centroid_count(&self) -> usize {
        self.centroids.len()
    }
}

impl Classifier for CentroidModel {
    fn classify(&self, input: &[f64; 4]) -> Result<ClusterAssignment, AnalysisError> {
        if input.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::ClassificationError(format!(
                "standardized input contains a non-finite value: {:?}",
                input
            )));
        }

        // Ties resolve to the lowest index, matching the trained model's
        // argmin.
        let (cluster, distance) = self
            .centroids
            .iter()
            .enumerate()
            .map(|(idx, centroid)| (idx, squared_distance(input, centroid)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| {
                AnalysisError::ClassificationError("centroid set is empty".to_string())
            })?;

        Ok(ClusterAssignment { cluster, distance })
    }
}

/// Squared Euclidean distance. The trained model's graph computes
/// `sum((x - c)^2)` with no square root; confidence consumes the squared
/// value unchanged.
fn squared_distance(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, c)| (x - c).powi(2)).sum()
}

/// Map a centroid distance to a confidence in (0, 1].
///
/// Distance 0 gives 1.0; confidence decays monotonically toward 0 as
/// distance grows, never reaching 0 and never exceeding 1.
pub fn confidence_from_distance(distance: f64) -> f64 {
    1.0 / (1.0 + distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> CentroidModel {
        CentroidModel::new(vec![
            [-1.0, -1.0, -1.0, -1.0],
            [0.0, 0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn picks_the_nearest_centroid() {
        let assignment = model().classify(&[0.9, 0.9, 1.1, 1.0]).unwrap();
        assert_eq!(assignment.cluster, 2);
    }

    #[test]
    fn distance_is_squared_euclidean() {
        let model = CentroidModel::new(vec![[0.0, 0.0, 0.0, 0.0]]).unwrap();
        let assignment = model.classify(&[3.0, 4.0, 0.0, 0.0]).unwrap();
        // 3^2 + 4^2 = 25, not 5
        assert_eq!(assignment.distance, 25.0);
    }

    #[test]
    fn exact_centroid_hit_has_zero_distance() {
        let assignment = model().classify(&[0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(assignment.cluster, 1);
        assert_eq!(assignment.distance, 0.0);
        assert_eq!(confidence_from_distance(assignment.distance), 1.0);
    }

    #[test]
    fn ties_resolve_to_the_lowest_index() {
        let model = CentroidModel::new(vec![
            [1.0, 0.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();

        let assignment = model.classify(&[0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(assignment.cluster, 0);
    }

    #[test]
    fn empty_centroid_set_is_rejected() {
        assert!(matches!(
            CentroidModel::new(vec![]),
            Err(AnalysisError::MalformedModel(_))
        ));
    }

    #[test]
    fn non_finite_input_is_a_classification_error() {
        let err = model().classify(&[f64::NAN, 0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::ClassificationError(_)));
    }

    #[test]
    fn confidence_decays_monotonically_within_bounds() {
        assert_eq!(confidence_from_distance(0.0), 1.0);

        let mut previous = f64::INFINITY;
        for distance in [0.0, 0.1, 1.0, 4.0, 25.0, 1e6] {
            let c = confidence_from_distance(distance);
            assert!(c > 0.0 && c <= 1.0);
            assert!(c < previous || (distance == 0.0 && c == 1.0));
            previous = c;
        }
    }
}
