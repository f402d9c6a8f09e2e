//! The DIBCO metrics tool as an evaluator.

use std::{
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use super::{process::run_with_timeout, report::ReportFormat};
use crate::{
    error::{BinEvalError, BinEvalResult},
    metrics::EvaluationResult,
};

/// File stem of the metrics binary.
pub const METRICS_BINARY: &str = "DIBCO_metrics";
/// File stem of the binary computing the pseudo recall/precision weights.
pub const WEIGHTS_BINARY: &str = "BinEvalWeights";

/// Full path of a tool binary in `dir`, with the platform executable suffix.
#[must_use]
pub fn binary_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}{}", std::env::consts::EXE_SUFFIX))
}

/// Runs the external metrics binary once per candidate image.
#[derive(Debug, Clone)]
pub struct ExternalMetricsTool {
    binary: PathBuf,
    timeout: Duration,
    format: ReportFormat,
}

impl ExternalMetricsTool {
    /// Locates the metrics binary in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::Configuration`] if the binary does not exist.
    pub fn new(dir: &Path, timeout: Duration) -> BinEvalResult<Self> {
        Self::with_binary(binary_path(dir, METRICS_BINARY), timeout)
    }

    /// Uses `binary` as the metrics tool.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::Configuration`] if the binary does not exist.
    pub fn with_binary(binary: PathBuf, timeout: Duration) -> BinEvalResult<Self> {
        if !binary.is_file() {
            return Err(BinEvalError::Configuration {
                reason: format!(
                    "external metrics tool not found at {} (the directory must contain {METRICS_BINARY}{})",
                    binary.display(),
                    std::env::consts::EXE_SUFFIX
                ),
            });
        }
        Ok(Self {
            binary,
            timeout,
            format: ReportFormat::default(),
        })
    }

    /// Scores `candidate` against `ground_truth` using the precomputed
    /// weight files.
    ///
    /// # Errors
    ///
    /// - [`BinEvalError::ExternalTool`] if the tool fails or its report cannot
    ///   be parsed.
    /// - [`BinEvalError::Timeout`] if the tool does not finish in time.
    pub fn invoke(
        &self,
        candidate: &Path,
        ground_truth: &Path,
        recall_weights: &Path,
        precision_weights: &Path,
    ) -> BinEvalResult<EvaluationResult> {
        let mut command = Command::new(&self.binary);
        command.args([ground_truth, candidate, recall_weights, precision_weights]);

        let output = run_with_timeout(command, self.timeout, candidate)?;
        if !output.status.success() {
            return Err(BinEvalError::ExternalTool {
                path: candidate.to_path_buf(),
                reason: format!(
                    "tool exited with {}: {}{}",
                    output.status,
                    output.stdout.trim(),
                    output.stderr.trim()
                ),
            });
        }

        let name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.format
            .parse(&output.stdout)
            .map(|result| result.with_name(name))
            .map_err(|e| BinEvalError::ExternalTool {
                path: candidate.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_detected_on_construction() {
        let dir = tempfile::tempdir().unwrap();

        let result = ExternalMetricsTool::new(dir.path(), Duration::from_secs(1));

        match result {
            Err(BinEvalError::Configuration { reason }) => assert!(reason.contains(METRICS_BINARY)),
            other => panic!("Expected Configuration error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    mod fake_tool {
        use std::{fs, os::unix::fs::PermissionsExt};

        use super::*;

        fn install(dir: &Path, script: &str) -> ExternalMetricsTool {
            let binary = binary_path(dir, METRICS_BINARY);
            fs::write(&binary, format!("#!/bin/sh\n{script}\n")).unwrap();
            fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
            ExternalMetricsTool::new(dir, Duration::from_secs(10)).unwrap()
        }

        #[test]
        fn report_is_parsed_into_a_result() {
            let dir = tempfile::tempdir().unwrap();
            let tool = install(
                dir.path(),
                r#"printf 'F-Measure:\t80\r\nFps:\t85\r\nPSNR:\t17.5\r\nDRD:\t3.5\r\nRecall:\t75\r\nPrecision:\t86\r\nRps:\t82\r\nPps:\t88\r\n'"#,
            );

            let result = tool
                .invoke(
                    Path::new("img/1.png"),
                    Path::new("gt/1.png"),
                    Path::new("gt/1_RWeights.dat"),
                    Path::new("gt/1_PWeights.dat"),
                )
                .unwrap();

            assert_eq!(result.name, "1.png");
            assert_eq!(result.f_measure, 80.0);
            assert_eq!(result.external.unwrap().drd, 3.5);
        }

        #[test]
        fn arguments_follow_the_tool_contract() {
            let dir = tempfile::tempdir().unwrap();
            let tool = install(dir.path(), r#"printf '%s\n' "$1" "$2" "$3" "$4" >&2; exit 3"#);

            let err = tool
                .invoke(
                    Path::new("c.png"),
                    Path::new("g.png"),
                    Path::new("r.dat"),
                    Path::new("p.dat"),
                )
                .unwrap_err();

            match err {
                BinEvalError::ExternalTool { reason, .. } => {
                    assert!(reason.contains("g.png\nc.png\nr.dat\np.dat"), "{reason}");
                }
                other => panic!("Expected ExternalTool error, got {other:?}"),
            }
        }

        #[test]
        fn malformed_report_is_a_tool_error() {
            let dir = tempfile::tempdir().unwrap();
            let tool = install(dir.path(), "echo 'F-Measure: 80'");

            let result = tool.invoke(
                Path::new("c.png"),
                Path::new("g.png"),
                Path::new("r.dat"),
                Path::new("p.dat"),
            );

            assert!(matches!(result, Err(BinEvalError::ExternalTool { .. })));
        }

        #[test]
        fn nan_in_the_report_is_a_tool_error() {
            let dir = tempfile::tempdir().unwrap();
            let tool = install(
                dir.path(),
                r#"printf 'F:nan\nFps:85\nPSNR:17.5\nDRD:3.5\nR:75\nP:86\nRps:82\nPps:88\n'"#,
            );

            let result = tool.invoke(
                Path::new("c.png"),
                Path::new("g.png"),
                Path::new("r.dat"),
                Path::new("p.dat"),
            );

            match result {
                Err(BinEvalError::ExternalTool { reason, .. }) => {
                    assert!(reason.contains("finite"), "{reason}");
                }
                other => panic!("Expected ExternalTool error, got {other:?}"),
            }
        }
    }
}
