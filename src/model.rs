//! Classifier model bundles
//!
//! A [`ModelBundle`] carries everything the engine needs to classify one
//! batch: the trained scaler parameters, the centroid matrix, and the
//! cluster-to-label mapping. Bundles travel as JSON metadata files emitted
//! by the training pipeline; unknown fields are tolerated so a bundle can
//! carry extra deployment metadata.
//!
//! Acquisition sits behind [`ModelProvider`]: a one-time, blocking setup
//! step per analysis session. Hosts back it with whatever distribution
//! mechanism they have; tests substitute [`StaticModelProvider`].

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::normalizer::ScalerParams;
use crate::types::FEATURE_ORDER;

/// Classifier parameters for one analysis session
///
/// Immutable once loaded; the orchestrator owns it for the duration of a
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Declared feature ordering; must match the canonical order when
    /// present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_order: Option<Vec<String>>,
    pub scaler_params: ScalerParams,
    /// Centroid matrix in standardized feature space, one row per cluster
    pub cluster_centers: Vec<Vec<f64>>,
    /// Cluster id to display label (serialized with decimal string keys)
    pub performance_mapping: BTreeMap<u32, String>,
}

impl ModelBundle {
    /// Parse and validate a bundle from JSON
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let bundle: ModelBundle = serde_json::from_str(json)?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Read, parse, and validate a bundle from a metadata file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, AnalysisError> {
        FileModelProvider::new(path).load()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check the bundle is usable: canonical feature order, finite scaler
    /// with non-zero scales, a non-empty rectangular centroid matrix of
    /// width 4, and a non-empty label mapping.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if let Some(order) = &self.feature_order {
            if order.len() != FEATURE_ORDER.len()
                || order.iter().zip(FEATURE_ORDER.iter()).any(|(a, b)| a != b)
            {
                return Err(AnalysisError::MalformedModel(format!(
                    "feature_order {:?} does not match the expected {:?}",
                    order, FEATURE_ORDER
                )));
            }
        }

        if self.scaler_params.mean.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::MalformedModel(
                "scaler mean contains a non-finite value".to_string(),
            ));
        }
        if self
            .scaler_params
            .scale
            .iter()
            .any(|v| !v.is_finite() || *v == 0.0)
        {
            return Err(AnalysisError::MalformedModel(
                "scaler scale entries must be finite and non-zero".to_string(),
            ));
        }

        self.centroid_rows()?;

        if self.performance_mapping.is_empty() {
            return Err(AnalysisError::MalformedModel(
                "performance mapping is empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Centroid matrix as fixed-width rows, rejecting ragged input
    pub fn centroid_rows(&self) -> Result<Vec<[f64; 4]>, AnalysisError> {
        if self.cluster_centers.is_empty() {
            return Err(AnalysisError::MalformedModel(
                "centroid set is empty".to_string(),
            ));
        }

        self.cluster_centers
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != 4 {
                    return Err(AnalysisError::MalformedModel(format!(
                        "centroid {} has {} dimensions, expected 4",
                        i,
                        row.len()
                    )));
                }
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(AnalysisError::MalformedModel(format!(
                        "centroid {} contains a non-finite value",
                        i
                    )));
                }
                Ok([row[0], row[1], row[2], row[3]])
            })
            .collect()
    }

    /// Display label for a cluster id, if the mapping covers it
    pub fn label_for(&self, cluster: usize) -> Option<&str> {
        u32::try_from(cluster)
            .ok()
            .and_then(|id| self.performance_mapping.get(&id))
            .map(String::as_str)
    }

    /// The default bundled model
    ///
    /// Scaler parameters come from the distributed production model; the
    /// centroid rows are the standardized coordinates of the low / medium /
    /// high archetype profiles under that scaler.
    pub fn bundled() -> Self {
        ModelBundle {
            feature_order: Some(FEATURE_ORDER.iter().map(|s| s.to_string()).collect()),
            scaler_params: ScalerParams {
                mean: [0.725_952_8, 2.102_609, 8.102_073, 16.519_678],
                scale: [1.526_985, 3.154_934, 23.178_580, 32.830_153],
            },
            cluster_centers: vec![
                vec![-0.475_416, -0.666_451, -0.349_550, -0.503_186],
                vec![0.834_354, 1.552_296, 0.729_032, 1.019_804],
                vec![2.799_011, 2.186_223, 3.101_912, 2.238_196],
            ],
            performance_mapping: BTreeMap::from([
                (0, "Low Performer".to_string()),
                (1, "Medium Performer".to_string()),
                (2, "High Performer".to_string()),
            ]),
        }
    }
}

/// Source of classifier model bundles
pub trait ModelProvider {
    /// Acquire a ready, validated bundle or fail with
    /// [`AnalysisError::ModelUnavailable`] / [`AnalysisError::MalformedModel`]
    fn load(&self) -> Result<ModelBundle, AnalysisError>;
}

/// Provider reading a bundle from a JSON metadata file on disk
#[derive(Debug, Clone)]
pub struct FileModelProvider {
    path: PathBuf,
}

impl FileModelProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelProvider for FileModelProvider {
    fn load(&self) -> Result<ModelBundle, AnalysisError> {
        let json = fs::read_to_string(&self.path).map_err(|e| {
            AnalysisError::ModelUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        ModelBundle::from_json(&json)
    }
}

/// Provider handing out an already-built bundle
///
/// Useful when the host embeds the bundle or manages distribution itself;
/// also the seam tests use to avoid any file or network dependency.
#[derive(Debug, Clone)]
pub struct StaticModelProvider {
    bundle: ModelBundle,
}

impl StaticModelProvider {
    pub fn new(bundle: ModelBundle) -> Self {
        Self { bundle }
    }
}

impl ModelProvider for StaticModelProvider {
    fn load(&self) -> Result<ModelBundle, AnalysisError> {
        self.bundle.validate()?;
        Ok(self.bundle.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const METADATA_JSON: &str = r#"{
        "model_version": "1.2.0",
        "input_names": ["input_features"],
        "output_names": ["cluster", "distance"],
        "feature_order": ["attendance_rate", "avg_work_hours", "punctuality_score", "consistency_score"],
        "scaler_params": {
            "mean": [0.7259528, 2.102609, 8.102073, 16.519678],
            "scale": [1.526985, 3.154934, 23.17858, 32.830153]
        },
        "cluster_centers": [
            [-0.5, -0.6, -0.3, -0.5],
            [0.8, 1.5, 0.7, 1.0],
            [2.8, 2.2, 3.1, 2.2]
        ],
        "performance_mapping": {
            "0": "Low Performer",
            "1": "Medium Performer",
            "2": "High Performer"
        }
    }"#;

    #[test]
    fn parses_training_metadata_with_extra_fields() {
        let bundle = ModelBundle::from_json(METADATA_JSON).unwrap();
        assert_eq!(bundle.cluster_centers.len(), 3);
        assert_eq!(bundle.label_for(2), Some("High Performer"));
        assert_eq!(bundle.label_for(7), None);
    }

    #[test]
    fn round_trips_through_json() {
        let bundle = ModelBundle::bundled();
        let json = bundle.to_json().unwrap();
        let reparsed = ModelBundle::from_json(&json).unwrap();

        assert_eq!(reparsed.scaler_params, bundle.scaler_params);
        assert_eq!(reparsed.cluster_centers, bundle.cluster_centers);
        assert_eq!(reparsed.performance_mapping, bundle.performance_mapping);
    }

    #[test]
    fn mapping_keys_serialize_as_strings() {
        let json = ModelBundle::bundled().to_json().unwrap();
        assert!(json.contains("\"0\": \"Low Performer\""));
    }

    #[test]
    fn rejects_zero_scale() {
        let mut bundle = ModelBundle::bundled();
        bundle.scaler_params.scale[2] = 0.0;
        assert!(matches!(
            bundle.validate(),
            Err(AnalysisError::MalformedModel(_))
        ));
    }

    #[test]
    fn rejects_ragged_centroid_rows() {
        let mut bundle = ModelBundle::bundled();
        bundle.cluster_centers[1] = vec![0.1, 0.2];
        assert!(matches!(
            bundle.validate(),
            Err(AnalysisError::MalformedModel(_))
        ));
    }

    #[test]
    fn rejects_reordered_feature_names() {
        let mut bundle = ModelBundle::bundled();
        bundle.feature_order = Some(vec![
            "avg_work_hours".to_string(),
            "attendance_rate".to_string(),
            "punctuality_score".to_string(),
            "consistency_score".to_string(),
        ]);
        assert!(matches!(
            bundle.validate(),
            Err(AnalysisError::MalformedModel(_))
        ));
    }

    #[test]
    fn bundled_model_validates() {
        assert!(ModelBundle::bundled().validate().is_ok());
    }

    #[test]
    fn missing_model_file_is_unavailable_not_io() {
        let err = FileModelProvider::new("/nonexistent/model_info.json")
            .load()
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ModelUnavailable(_)));
    }

    #[test]
    fn static_provider_returns_the_bundle() {
        let provider = StaticModelProvider::new(ModelBundle::bundled());
        let bundle = provider.load().unwrap();
        assert_eq!(bundle.label_for(0), Some("Low Performer"));
    }
}
