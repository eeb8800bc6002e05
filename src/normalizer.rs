//! Feature standardization
//!
//! This module applies the trained scaler's affine transform to a raw
//! feature vector, producing the standardized input the classifier expects.
//! The transform is elementwise `(value - mean) / scale` in canonical
//! feature order.

use serde::{Deserialize, Serialize};

use crate::types::FeatureVector;

/// Standardization parameters fitted at training time
///
/// `mean` and `scale` follow the canonical feature order. Validated at
/// model-load time: every scale entry finite and non-zero, every mean
/// entry finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: [f64; 4],
    pub scale: [f64; 4],
}

/// Normalizer applying the scaler transform to derived features
pub struct FeatureNormalizer;

impl FeatureNormalizer {
    /// Standardize a feature vector: `(value[i] - mean[i]) / scale[i]`.
    ///
    /// Pure and total; malformed parameters are rejected when the model
    /// bundle is loaded, not here.
    pub fn normalize(features: &FeatureVector, params: &ScalerParams) -> [f64; 4] {
        let raw = features.as_array();
        let mut out = [0.0; 4];

        for i in 0..4 {
            out[i] = (raw[i] - params.mean[i]) / params.scale[i];
        }

        out
    }
}
