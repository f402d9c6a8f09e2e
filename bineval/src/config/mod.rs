//! Run configuration for binarization evaluation.
//!
//! - `core`: the immutable [`EvaluationConfig`] handed to the batch runner
//! - `enums`: foreground types, evaluation modes and failure policies

pub mod core;
pub mod enums;

pub use self::core::EvaluationConfig;
pub use enums::{DualClassEncoding, EvaluationMode, FailurePolicy, ForegroundType, IGNORE_COLOR};
