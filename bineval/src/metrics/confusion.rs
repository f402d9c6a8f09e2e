//! Confusion-matrix evaluation of a candidate mask against a ground truth.
//!
//! A zero denominator yields a rate of 0 rather than NaN. NaN only appears at
//! folder level, when no image of a folder was computable.

use burn::prelude::*;

use super::result::EvaluationResult;
use crate::{
    classifier::{count_true, PixelMask},
    error::{BinEvalError, BinEvalResult},
};

/// Pixel counts of the four classification outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub true_negatives: u64,
}

impl ConfusionMatrix {
    /// Counts the outcomes of `candidate` against `ground_truth`.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::InvalidImageShape`] if the masks differ in size.
    pub fn from_masks<B: Backend>(
        candidate: &PixelMask<B>,
        ground_truth: &PixelMask<B>,
    ) -> BinEvalResult<Self> {
        if candidate.dims() != ground_truth.dims() {
            return Err(BinEvalError::InvalidImageShape {
                expected: format!("{:?}", ground_truth.dims()),
                actual: format!("{:?}", candidate.dims()),
            });
        }

        let c = candidate.tensor().clone();
        let gt = ground_truth.tensor().clone();
        let [height, width] = gt.dims();

        let true_positives = count_true(c.clone().bool_and(gt.clone()));
        let false_positives = count_true(c.clone().bool_and(gt.clone().bool_not()));
        let false_negatives = count_true(c.bool_not().bool_and(gt));
        let total = (height * width) as u64;

        Ok(Self {
            true_positives,
            false_positives,
            false_negatives,
            true_negatives: total - true_positives - false_positives - false_negatives,
        })
    }

    /// Foreground pixels of the ground truth.
    #[must_use]
    pub const fn ground_truth_positives(&self) -> u64 {
        self.true_positives + self.false_negatives
    }

    /// `tp / (tp + fn)`, 0 without ground-truth foreground.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// `tp / (tp + fp)`, 0 without candidate foreground.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// Harmonic mean of recall and precision, 0 when both are 0.
    #[must_use]
    pub fn f_measure(&self) -> f64 {
        let recall = self.recall();
        let precision = self.precision();
        if recall + precision > 0.0 {
            2.0 * recall * precision / (recall + precision)
        } else {
            0.0
        }
    }

    /// Mean of `fn / (fn + tp)` and `fp / (fp + tn)`.
    #[must_use]
    pub fn normalized_random_metric(&self) -> f64 {
        let fn_rate = ratio(self.false_negatives, self.false_negatives + self.true_positives);
        let fp_rate = ratio(self.false_positives, self.false_positives + self.true_negatives);
        (fn_rate + fp_rate) / 2.0
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Evaluates a candidate mask against a ground-truth mask.
///
/// A ground truth without foreground gives a not-computable result (all
/// metrics -1) that still carries the pixel counts.
///
/// # Errors
///
/// Returns [`BinEvalError::InvalidImageShape`] if the masks differ in size.
pub fn evaluate<B: Backend>(
    candidate: &PixelMask<B>,
    ground_truth: &PixelMask<B>,
) -> BinEvalResult<EvaluationResult> {
    let confusion = ConfusionMatrix::from_masks(candidate, ground_truth)?;

    if confusion.ground_truth_positives() == 0 {
        return Ok(EvaluationResult {
            confusion: Some(confusion),
            ..EvaluationResult::not_computable()
        });
    }

    Ok(EvaluationResult {
        name: String::new(),
        recall: confusion.recall(),
        precision: confusion.precision(),
        f_measure: confusion.f_measure(),
        external: None,
        normalized_random_metric: Some(confusion.normalized_random_metric()),
        confusion: Some(confusion),
    })
}
