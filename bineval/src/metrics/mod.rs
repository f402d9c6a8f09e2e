//! Metrics for binarization evaluation.
//!
//! - `result`: the per-image [`EvaluationResult`] shared by the local
//!   evaluator and the external tool adapter
//! - `confusion`: confusion-matrix counts and the derived rates
//! - `aggregator`: folding per-image results into per-folder means

pub mod aggregator;
pub mod confusion;
pub mod result;

pub use aggregator::{FolderAggregate, FolderAggregator, ImageFailure, MeanMetrics};
pub use confusion::{evaluate, ConfusionMatrix};
pub use result::{EvaluationResult, ExternalMetrics, NOT_COMPUTABLE};
