//! The run-wide configuration of an evaluation.

use std::path::{Path, PathBuf};

use burn::prelude::*;

use super::enums::{EvaluationMode, FailurePolicy, ForegroundType};
use crate::error::{BinEvalError, BinEvalResult};

/// Immutable settings shared by every image of a batch run.
///
/// Built once from the command line (or a JSON file) and passed by reference
/// into the batch runner.
#[derive(Config, Debug)]
pub struct EvaluationConfig {
    /// How foreground is encoded in the ground truth.
    #[config(default = "ForegroundType::Regular")]
    pub foreground_type: ForegroundType,
    /// Local evaluation or the external metrics tool.
    #[config(default = "EvaluationMode::Local")]
    pub mode: EvaluationMode,
    /// Candidates store foreground as dark pixels and must be inverted.
    #[config(default = "false")]
    pub invert_candidate: bool,
    /// Directory holding the external tool binaries. Empty means the
    /// current directory.
    #[config(default = "PathBuf::new()")]
    pub external_tool_dir: PathBuf,
    /// Upper bound for a single external tool call.
    #[config(default = "300")]
    pub tool_timeout_secs: u64,
    /// Behaviour on per-image failures.
    #[config(default = "FailurePolicy::Abort")]
    pub failure_policy: FailurePolicy,
    /// Image file names that are skipped without evaluation.
    #[config(default = "Vec::new()")]
    pub excluded_images: Vec<String>,
    /// Keep per-image results on the folder aggregate.
    #[config(default = "false")]
    pub keep_per_image: bool,
}

impl EvaluationConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::Configuration`] when the tool timeout is zero.
    pub fn validate(&self) -> BinEvalResult<()> {
        if self.tool_timeout_secs == 0 {
            return Err(BinEvalError::Configuration {
                reason: "external tool timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    /// Whether `file_name` is on the configured exclusion list.
    #[must_use]
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.excluded_images.iter().any(|name| name == file_name)
    }

    /// Directory the external binaries are looked up in.
    #[must_use]
    pub fn tool_dir(&self) -> &Path {
        if self.external_tool_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            &self.external_tool_dir
        }
    }
}
