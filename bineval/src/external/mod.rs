//! Adapter for the external DIBCO metrics tools.
//!
//! - `report`: parsing of the tool's textual report
//! - `process`: running a tool binary with a bounded wait
//! - `tool`: the metrics tool as an evaluator producing [`EvaluationResult`]s
//!
//! [`EvaluationResult`]: crate::metrics::EvaluationResult

pub mod process;
pub mod report;
pub mod tool;

pub use report::{parse_external_report, ReportFormat, ReportParseError};
pub use tool::{binary_path, ExternalMetricsTool, METRICS_BINARY, WEIGHTS_BINARY};
