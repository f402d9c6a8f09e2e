//! Enumeration types for evaluation runs.

use burn::prelude::*;

use crate::error::{BinEvalError, BinEvalResult};

/// RGB color marking ground-truth regions that must not count against the
/// candidate in dual-class datasets.
pub const IGNORE_COLOR: [u8; 3] = [0, 0, 255];

/// Defines how foreground pixels are encoded in the ground truth.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum ForegroundType {
    /// Single channel ground truth with dark ink on a light background,
    /// as in DIBCO or MSTEx.
    Regular,
    /// The dominant ink class of a color-coded dual-class ground truth (MSBin).
    DualClassPrimary,
    /// The second ink class of a color-coded dual-class ground truth (MSBin).
    DualClassSecondary,
}

/// Channel layout of one ink class in a color-coded ground truth.
///
/// Channel indices are RGB order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualClassEncoding {
    /// Ground-truth channel holding the class code.
    pub gt_channel: usize,
    /// Exact channel value marking a foreground pixel of this class.
    pub gt_value: u8,
    /// Channel read from a 3-channel candidate image.
    pub candidate_channel: usize,
}

impl ForegroundType {
    /// Maps the numeric command-line selector to a foreground type.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::Configuration`] for anything but 0, 1 or 2.
    pub fn from_index(index: i64) -> BinEvalResult<Self> {
        match index {
            0 => Ok(Self::Regular),
            1 => Ok(Self::DualClassPrimary),
            2 => Ok(Self::DualClassSecondary),
            other => Err(BinEvalError::Configuration {
                reason: format!(
                    "foreground type {other} cannot be mapped (expected 0=regular, 1=dual-class primary, 2=dual-class secondary)"
                ),
            }),
        }
    }

    /// The numeric selector of this foreground type.
    #[must_use]
    pub const fn index(&self) -> i64 {
        match self {
            Self::Regular => 0,
            Self::DualClassPrimary => 1,
            Self::DualClassSecondary => 2,
        }
    }

    /// Channel layout for dual-class types, `None` for [`ForegroundType::Regular`].
    #[must_use]
    pub const fn dual_class_encoding(&self) -> Option<DualClassEncoding> {
        match self {
            Self::Regular => None,
            Self::DualClassPrimary => Some(DualClassEncoding {
                gt_channel: 1,
                gt_value: 255,
                candidate_channel: 1,
            }),
            Self::DualClassSecondary => Some(DualClassEncoding {
                gt_channel: 1,
                gt_value: 122,
                candidate_channel: 0,
            }),
        }
    }

    /// The normalized random metric is only defined for regular ground truth.
    #[must_use]
    pub const fn reports_nrm(&self) -> bool {
        matches!(self, Self::Regular)
    }
}

/// Selects who computes the per-image metrics.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Pixel classifier and confusion-matrix evaluator in this crate.
    Local,
    /// The external DIBCO metrics tool, run once per image.
    ExternalTool,
}

/// What the batch runner does when a single image fails.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run at the first failure.
    Abort,
    /// Record per-image failures on the aggregate and keep going.
    /// Setup errors such as missing artifacts still stop the run.
    Continue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_round_trips_known_types() {
        for index in 0..3 {
            let fg_type = ForegroundType::from_index(index).unwrap();
            assert_eq!(fg_type.index(), index);
        }
    }

    #[test]
    fn unknown_selector_is_a_configuration_error() {
        match ForegroundType::from_index(3) {
            Err(BinEvalError::Configuration { reason }) => assert!(reason.contains('3')),
            other => panic!("Expected Configuration error, got {other:?}"),
        }
        assert!(ForegroundType::from_index(-1).is_err());
    }

    #[test]
    fn dual_class_types_use_distinct_codes() {
        let primary = ForegroundType::DualClassPrimary
            .dual_class_encoding()
            .unwrap();
        let secondary = ForegroundType::DualClassSecondary
            .dual_class_encoding()
            .unwrap();
        assert_ne!(primary.gt_value, secondary.gt_value);
        assert_eq!(primary.candidate_channel, 1);
        assert_eq!(secondary.candidate_channel, 0);
        assert!(ForegroundType::Regular.dual_class_encoding().is_none());
    }
}
