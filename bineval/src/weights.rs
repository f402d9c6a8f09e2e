//! Preparation of inputs for the external DIBCO tools.
//!
//! The DIBCO tools read single channel images. Conversion keeps the green
//! channel and inverts it, which turns both regular and dual-class ground
//! truth into the layout the tools expect. [`WeightGenerator`] then runs the
//! offline weight tool on each converted ground truth, producing the
//! `_RWeights.dat` / `_PWeights.dat` files the metrics tool needs.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use crate::{
    dataset::{discover_images, file_name, WeightArtifacts},
    error::{BinEvalError, BinEvalResult},
    external::{binary_path, process::run_with_timeout, WEIGHTS_BINARY},
    raster::RawImage,
};

const CONVERSION_CHANNEL: usize = 1;

/// `255 - green` of an RGB image, `255 - value` of a gray image.
///
/// # Errors
///
/// Never fails for images built through [`RawImage`] constructors.
pub fn invert_green(image: &RawImage) -> BinEvalResult<RawImage> {
    let channel = if image.channels() == 3 {
        image.channel(CONVERSION_CHANNEL)?
    } else {
        image.clone()
    };
    let inverted = channel.data().iter().map(|v| 255 - v).collect();
    RawImage::gray(channel.width(), channel.height(), inverted)
}

/// Converts every image of `input_dir` into `output_dir`, keeping file names.
///
/// Returns the written files in discovery order.
///
/// # Errors
///
/// - [`BinEvalError::EmptyInput`] if `input_dir` holds no image.
/// - [`BinEvalError::Io`] / [`BinEvalError::ImageLoad`] on read or write failures.
pub fn convert_folder(input_dir: &Path, output_dir: &Path) -> BinEvalResult<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).map_err(|source| BinEvalError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    discover_images(input_dir)?
        .iter()
        .map(|input| {
            let output = output_dir.join(file_name(input));
            invert_green(&RawImage::open(input)?)?.save(&output)?;
            tracing::debug!(input = %input.display(), output = %output.display(), "image converted");
            Ok(output)
        })
        .collect()
}

/// Runs the offline `BinEvalWeights` tool.
#[derive(Debug, Clone)]
pub struct WeightGenerator {
    binary: PathBuf,
    timeout: Duration,
}

impl WeightGenerator {
    /// Locates the weight tool in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::Configuration`] if the binary does not exist.
    pub fn new(dir: &Path, timeout: Duration) -> BinEvalResult<Self> {
        let binary = binary_path(dir, WEIGHTS_BINARY);
        if !binary.is_file() {
            return Err(BinEvalError::Configuration {
                reason: format!("weight tool not found at {}", binary.display()),
            });
        }
        Ok(Self { binary, timeout })
    }

    /// Computes the weight files of a converted ground truth. The tool writes
    /// them next to the image.
    ///
    /// # Errors
    ///
    /// - [`BinEvalError::ExternalTool`] / [`BinEvalError::Timeout`] if the run fails.
    /// - [`BinEvalError::MissingArtifact`] if the tool did not produce both files.
    pub fn generate(&self, ground_truth: &Path) -> BinEvalResult<WeightArtifacts> {
        let mut command = Command::new(&self.binary);
        command.arg(ground_truth);
        let output = run_with_timeout(command, self.timeout, ground_truth)?;
        if !output.status.success() {
            return Err(BinEvalError::ExternalTool {
                path: ground_truth.to_path_buf(),
                reason: format!("weight tool exited with {}: {}", output.status, output.stdout.trim()),
            });
        }

        let dir = ground_truth.parent().unwrap_or_else(|| Path::new("."));
        let stem = ground_truth
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let weights = WeightArtifacts::paths_for(dir, &stem);
        for (kind, path) in [
            ("recall weight file", &weights.recall),
            ("precision weight file", &weights.precision),
        ] {
            if !path.is_file() {
                tracing::warn!(output = %output.stdout.trim(), "weight tool output");
                return Err(BinEvalError::MissingArtifact {
                    kind,
                    path: path.clone(),
                });
            }
        }
        Ok(weights)
    }
}

/// Converts the ground truth of `input_dir` into `output_dir` and computes
/// the weight files for every converted image.
///
/// # Errors
///
/// See [`convert_folder`] and [`WeightGenerator::generate`].
pub fn prepare_ground_truth(
    input_dir: &Path,
    output_dir: &Path,
    generator: &WeightGenerator,
) -> BinEvalResult<Vec<WeightArtifacts>> {
    let converted = convert_folder(input_dir, output_dir)?;
    tracing::info!(images = converted.len(), "calculating weights");
    converted
        .iter()
        .map(|ground_truth| generator.generate(ground_truth))
        .collect()
}
