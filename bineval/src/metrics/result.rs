//! Per-image evaluation results.

use super::confusion::ConfusionMatrix;

/// Sentinel stored in a metric that cannot be computed, e.g. because the
/// ground truth has no foreground pixel.
pub const NOT_COMPUTABLE: f64 = -1.0;

/// Metrics only the external DIBCO tool produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalMetrics {
    pub pseudo_f_measure: f64,
    pub pseudo_recall: f64,
    pub pseudo_precision: f64,
    /// Distance-reciprocal distortion.
    pub drd: f64,
    /// Peak signal-to-noise ratio.
    pub psnr: f64,
}

/// The metrics of one candidate image against its ground truth.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    /// File name of the candidate image.
    pub name: String,
    pub recall: f64,
    pub precision: f64,
    pub f_measure: f64,
    /// Present when the external tool scored the image.
    pub external: Option<ExternalMetrics>,
    /// Mean of the normalized false-negative and false-positive rates.
    pub normalized_random_metric: Option<f64>,
    /// Pixel counts, present for local evaluation.
    pub confusion: Option<ConfusionMatrix>,
}

impl EvaluationResult {
    /// A result whose metrics are all [`NOT_COMPUTABLE`].
    #[must_use]
    pub const fn not_computable() -> Self {
        Self {
            name: String::new(),
            recall: NOT_COMPUTABLE,
            precision: NOT_COMPUTABLE,
            f_measure: NOT_COMPUTABLE,
            external: None,
            normalized_random_metric: None,
            confusion: None,
        }
    }

    /// `false` for results that must be left out of aggregation.
    #[must_use]
    pub fn is_computable(&self) -> bool {
        self.f_measure != NOT_COMPUTABLE
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Drops the normalized random metric, which is only meaningful for
    /// regular ground truth.
    #[must_use]
    pub fn without_nrm(mut self) -> Self {
        self.normalized_random_metric = None;
        self
    }
}
