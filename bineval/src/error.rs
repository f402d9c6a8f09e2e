use std::path::PathBuf;

use thiserror::Error;

/// The error type for `bineval` operations.
///
/// A ground truth without any foreground pixels is not an error: it yields a
/// not-computable [`EvaluationResult`](crate::EvaluationResult) that the
/// aggregator excludes.
#[derive(Error, Debug)]
pub enum BinEvalError {
    /// Bad run configuration: unknown foreground type selector, a ground truth
    /// whose channel layout does not fit the foreground type, or a missing
    /// external tool binary.
    #[error("Configuration error: {reason}")]
    Configuration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// No candidate image was discovered in a folder.
    #[error("No candidate image found in {}", path.display())]
    EmptyInput {
        /// The folder that was searched.
        path: PathBuf,
    },

    /// A ground truth image or weight file the run depends on is absent.
    #[error("Missing {kind}: {}", path.display())]
    MissingArtifact {
        /// The kind of artifact, e.g. "ground truth image".
        kind: &'static str,
        /// The path that was expected to exist.
        path: PathBuf,
    },

    /// The external metrics tool failed or printed an unexpected report.
    #[error("External tool error for {}: {reason}", path.display())]
    ExternalTool {
        /// The candidate image being scored.
        path: PathBuf,
        /// A description of the failure.
        reason: String,
    },

    /// The external metrics tool did not finish in time and was killed.
    #[error("External tool timed out after {seconds}s for {}", path.display())]
    Timeout {
        /// The candidate image being scored.
        path: PathBuf,
        /// The configured limit.
        seconds: u64,
    },

    /// Candidate and ground truth do not have the same dimensions.
    #[error("Invalid image shape: expected {expected}, got {actual}")]
    InvalidImageShape {
        /// The expected shape.
        expected: String,
        /// The actual shape.
        actual: String,
    },

    /// An image could not be decoded or encoded.
    #[error("Failed to process image {}", path.display())]
    ImageLoad {
        /// The image path.
        path: PathBuf,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// A file system operation failed.
    #[error("I/O error on {}", path.display())]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl BinEvalError {
    /// Whether a continue-on-failure run may record this error and move on to
    /// the next image. Setup defects always stop the run.
    #[must_use]
    pub const fn is_per_image(&self) -> bool {
        matches!(
            self,
            Self::ExternalTool { .. }
                | Self::Timeout { .. }
                | Self::ImageLoad { .. }
                | Self::InvalidImageShape { .. }
        )
    }
}

/// A specialized `Result` type for `bineval` operations.
pub type BinEvalResult<T> = Result<T, BinEvalError>;
