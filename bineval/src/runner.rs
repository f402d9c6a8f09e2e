//! Batch evaluation of result folders.
//!
//! The runner walks a folder of candidate images, evaluates each image
//! against its ground truth and folds the results into a
//! [`FolderAggregate`]. Every image is evaluated independently; the only
//! state shared across images is the immutable [`EvaluationConfig`].

use std::{path::Path, time::Duration};

use burn::prelude::*;

use crate::{
    classifier::classify,
    config::{EvaluationConfig, EvaluationMode, FailurePolicy},
    dataset::{discover_images, discover_result_folders, file_name, resolve_pair, ImagePair},
    error::{BinEvalError, BinEvalResult},
    external::ExternalMetricsTool,
    metrics::{evaluate, EvaluationResult, FolderAggregate, FolderAggregator},
    raster::RawImage,
};

/// Evaluates folders of candidate images under one configuration.
#[derive(Debug, Clone)]
pub struct BatchRunner<B: Backend> {
    config: EvaluationConfig,
    tool: Option<ExternalMetricsTool>,
    device: B::Device,
}

impl<B: Backend> BatchRunner<B> {
    /// Create a runner. In external tool mode the tool binary is located here,
    /// once for the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::Configuration`] if the configuration is invalid
    /// or the external tool binary is missing.
    pub fn new(config: EvaluationConfig, device: &B::Device) -> BinEvalResult<Self> {
        config.validate()?;
        let tool = match config.mode {
            EvaluationMode::Local => None,
            EvaluationMode::ExternalTool => Some(ExternalMetricsTool::new(
                config.tool_dir(),
                Duration::from_secs(config.tool_timeout_secs),
            )?),
        };
        Ok(Self {
            config,
            tool,
            device: device.clone(),
        })
    }

    pub const fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluates every candidate image in `candidate_dir`.
    ///
    /// All ground-truth artifacts are resolved before the first image is
    /// scored, so a setup defect fails the run before any work is done.
    ///
    /// # Errors
    ///
    /// - [`BinEvalError::EmptyInput`] if the folder holds no candidate image.
    /// - [`BinEvalError::MissingArtifact`] if a ground truth or weight file
    ///   is absent.
    /// - Any per-image error unless [`FailurePolicy::Continue`] is configured.
    pub fn run_folder(
        &self,
        candidate_dir: &Path,
        ground_truth_dir: &Path,
    ) -> BinEvalResult<FolderAggregate> {
        tracing::info!(
            folder = %candidate_dir.display(),
            ground_truth = %ground_truth_dir.display(),
            "evaluating folder",
        );

        let mut aggregator = FolderAggregator::new(candidate_dir, self.config.keep_per_image);

        let mut pairs = Vec::new();
        for candidate in discover_images(candidate_dir)? {
            let name = file_name(&candidate);
            if self.config.is_excluded(&name) {
                tracing::info!(image = %name, "skipping excluded image");
                aggregator.skip(name);
                continue;
            }
            pairs.push(resolve_pair(
                &candidate,
                ground_truth_dir,
                &self.config.mode,
            )?);
        }

        for pair in &pairs {
            match self.evaluate_pair(pair) {
                Ok(result) => {
                    tracing::debug!(
                        image = %result.name,
                        f_measure = result.f_measure,
                        precision = result.precision,
                        recall = result.recall,
                        "image evaluated",
                    );
                    if !aggregator.update(result) {
                        tracing::info!(
                            image = %pair.name(),
                            "ground truth has no foreground, image excluded from the means",
                        );
                    }
                }
                Err(err)
                    if self.config.failure_policy == FailurePolicy::Continue
                        && err.is_per_image() =>
                {
                    tracing::warn!(image = %pair.name(), error = %err, "image failed, continuing");
                    aggregator.fail(pair.name(), err.to_string());
                }
                Err(err) => return Err(err),
            }
        }

        let aggregate = aggregator.finish();
        tracing::info!(
            folder = %candidate_dir.display(),
            evaluated = aggregate.evaluated,
            mean_fm = aggregate.means.f_measure,
            "folder evaluated",
        );
        Ok(aggregate)
    }

    /// Evaluates every immediate subfolder of `parent` as a result folder.
    ///
    /// # Errors
    ///
    /// Fails on the first folder that fails, see [`Self::run_folder`].
    pub fn run_subfolders(
        &self,
        parent: &Path,
        ground_truth_dir: &Path,
    ) -> BinEvalResult<Vec<FolderAggregate>> {
        discover_result_folders(parent)?
            .iter()
            .map(|folder| self.run_folder(folder, ground_truth_dir))
            .collect()
    }

    /// Evaluates a single resolved image pair.
    ///
    /// # Errors
    ///
    /// Propagates image loading, classification and external tool errors.
    pub fn evaluate_pair(&self, pair: &ImagePair) -> BinEvalResult<EvaluationResult> {
        match (&self.tool, &pair.weights) {
            (Some(tool), Some(weights)) => tool.invoke(
                &pair.candidate,
                &pair.ground_truth,
                &weights.recall,
                &weights.precision,
            ),
            (Some(_), None) => Err(BinEvalError::MissingArtifact {
                kind: "weight files",
                path: pair.ground_truth.clone(),
            }),
            (None, _) => evaluate_local::<B>(
                &pair.candidate,
                &pair.ground_truth,
                &self.config,
                &self.device,
            ),
        }
    }
}

/// Loads a candidate and its ground truth and evaluates them locally.
///
/// # Errors
///
/// Propagates image loading and classification errors.
pub fn evaluate_local<B: Backend>(
    candidate: &Path,
    ground_truth: &Path,
    config: &EvaluationConfig,
    device: &B::Device,
) -> BinEvalResult<EvaluationResult> {
    let candidate_raw = RawImage::open(candidate)?;
    let ground_truth_raw = RawImage::open(ground_truth)?;

    let (candidate_mask, gt_mask) = classify::<B>(
        &candidate_raw,
        &ground_truth_raw,
        &config.foreground_type,
        config.invert_candidate,
        device,
    )?;

    let result = evaluate(&candidate_mask, &gt_mask)?.with_name(file_name(candidate));
    if config.foreground_type.reports_nrm() {
        Ok(result)
    } else {
        Ok(result.without_nrm())
    }
}

/// Evaluates one folder with a fresh [`BatchRunner`].
///
/// # Errors
///
/// See [`BatchRunner::new`] and [`BatchRunner::run_folder`].
pub fn run_folder<B: Backend>(
    candidate_dir: &Path,
    ground_truth_dir: &Path,
    config: &EvaluationConfig,
    device: &B::Device,
) -> BinEvalResult<FolderAggregate> {
    BatchRunner::<B>::new(config.clone(), device)?.run_folder(candidate_dir, ground_truth_dir)
}
