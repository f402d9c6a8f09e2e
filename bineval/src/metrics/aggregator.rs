//! Folder-level aggregation of per-image results.
//!
//! The aggregator accumulates results while a folder is processed and is
//! turned into an immutable [`FolderAggregate`] once the pass is complete.

use std::path::PathBuf;

use super::result::EvaluationResult;

/// Mean metrics of a folder. NaN marks a metric to which no image contributed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanMetrics {
    pub f_measure: f64,
    pub precision: f64,
    pub recall: f64,
    pub pseudo_f_measure: f64,
    pub pseudo_precision: f64,
    pub pseudo_recall: f64,
    pub drd: f64,
    pub psnr: f64,
    pub normalized_random_metric: f64,
}

/// An image that failed while the run continued past per-image failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFailure {
    pub name: String,
    pub message: String,
}

/// The finished evaluation of one result folder.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderAggregate {
    /// The candidate folder.
    pub path: PathBuf,
    /// Number of images that contributed to the means.
    pub evaluated: usize,
    pub means: MeanMetrics,
    /// Included per-image results in discovery order, if they were kept.
    pub images: Vec<EvaluationResult>,
    /// Images left out because the ground truth had no foreground.
    pub not_computable: Vec<String>,
    /// Images skipped by the configured exclusion list.
    pub skipped: Vec<String>,
    pub failures: Vec<ImageFailure>,
}

impl FolderAggregate {
    /// `true` when no image could be evaluated, so every mean is NaN.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.evaluated == 0
    }
}

/// Values of one metric column.
///
/// Values are sorted before summation so that the mean does not depend on
/// the order in which images were added.
#[derive(Debug, Clone, Default)]
struct Column {
    values: Vec<f64>,
}

impl Column {
    fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted.iter().sum::<f64>() / sorted.len() as f64
    }
}

#[derive(Debug, Clone, Default)]
struct Columns {
    f_measure: Column,
    precision: Column,
    recall: Column,
    pseudo_f_measure: Column,
    pseudo_precision: Column,
    pseudo_recall: Column,
    drd: Column,
    psnr: Column,
    normalized_random_metric: Column,
}

/// Incremental builder of a [`FolderAggregate`].
#[derive(Debug, Clone)]
pub struct FolderAggregator {
    path: PathBuf,
    keep_per_image: bool,
    evaluated: usize,
    columns: Columns,
    images: Vec<EvaluationResult>,
    not_computable: Vec<String>,
    skipped: Vec<String>,
    failures: Vec<ImageFailure>,
}

impl FolderAggregator {
    /// Create an aggregator for the folder at `path`.
    pub fn new(path: impl Into<PathBuf>, keep_per_image: bool) -> Self {
        Self {
            path: path.into(),
            keep_per_image,
            evaluated: 0,
            columns: Columns::default(),
            images: Vec::new(),
            not_computable: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Add a per-image result. Returns `false` if the result was not
    /// computable and therefore left out.
    pub fn update(&mut self, result: EvaluationResult) -> bool {
        if !result.is_computable() {
            self.not_computable.push(result.name);
            return false;
        }

        let columns = &mut self.columns;
        columns.f_measure.push(result.f_measure);
        columns.precision.push(result.precision);
        columns.recall.push(result.recall);
        if let Some(external) = &result.external {
            columns.pseudo_f_measure.push(external.pseudo_f_measure);
            columns.pseudo_precision.push(external.pseudo_precision);
            columns.pseudo_recall.push(external.pseudo_recall);
            columns.drd.push(external.drd);
            columns.psnr.push(external.psnr);
        }
        if let Some(nrm) = result.normalized_random_metric {
            columns.normalized_random_metric.push(nrm);
        }

        self.evaluated += 1;
        if self.keep_per_image {
            self.images.push(result);
        }
        true
    }

    /// Record an image skipped by the exclusion list.
    pub fn skip(&mut self, name: impl Into<String>) {
        self.skipped.push(name.into());
    }

    /// Record an image that failed under the continue policy.
    pub fn fail(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.failures.push(ImageFailure {
            name: name.into(),
            message: message.into(),
        });
    }

    /// Compute the means and freeze the aggregate.
    pub fn finish(self) -> FolderAggregate {
        let c = &self.columns;
        let means = MeanMetrics {
            f_measure: c.f_measure.mean(),
            precision: c.precision.mean(),
            recall: c.recall.mean(),
            pseudo_f_measure: c.pseudo_f_measure.mean(),
            pseudo_precision: c.pseudo_precision.mean(),
            pseudo_recall: c.pseudo_recall.mean(),
            drd: c.drd.mean(),
            psnr: c.psnr.mean(),
            normalized_random_metric: c.normalized_random_metric.mean(),
        };

        FolderAggregate {
            path: self.path,
            evaluated: self.evaluated,
            means,
            images: self.images,
            not_computable: self.not_computable,
            skipped: self.skipped,
            failures: self.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ExternalMetrics;

    fn result(name: &str, f_measure: f64) -> EvaluationResult {
        EvaluationResult {
            name: name.to_string(),
            recall: f_measure,
            precision: f_measure,
            f_measure,
            external: None,
            normalized_random_metric: Some(1.0 - f_measure),
            confusion: None,
        }
    }

    fn aggregate(results: Vec<EvaluationResult>) -> FolderAggregate {
        let mut aggregator = FolderAggregator::new("results", true);
        for r in results {
            aggregator.update(r);
        }
        aggregator.finish()
    }

    #[test]
    fn mean_is_arithmetic_mean_of_included_results() {
        let folder = aggregate(vec![
            result("a.png", 0.5),
            result("b.png", 1.0),
            EvaluationResult::not_computable().with_name("c.png"),
            result("d.png", 0.75),
        ]);

        assert_eq!(folder.evaluated, 3);
        assert_eq!(folder.means.f_measure, 0.75);
        assert_eq!(folder.means.normalized_random_metric, 0.25);
        assert_eq!(folder.not_computable, vec!["c.png".to_string()]);
        let names: Vec<_> = folder.images.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png", "d.png"]);
    }

    #[test]
    fn mean_does_not_depend_on_order() {
        let values = [0.1, 0.7, 0.333, 0.9001, 0.25, 0.6666, 0.01];
        let forward: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| result(&i.to_string(), v))
            .collect();
        let mut shuffled = forward.clone();
        shuffled.swap(0, 5);
        shuffled.swap(2, 6);
        shuffled.reverse();

        let a = aggregate(forward);
        let b = aggregate(shuffled);

        assert_eq!(a.means.f_measure.to_bits(), b.means.f_measure.to_bits());
        assert_eq!(a.means.recall.to_bits(), b.means.recall.to_bits());
    }

    #[test]
    fn folder_without_computable_images_reports_nan() {
        let folder = aggregate(vec![EvaluationResult::not_computable().with_name("blank.png")]);

        assert!(folder.is_empty());
        assert!(folder.means.f_measure.is_nan());
        assert!(folder.means.precision.is_nan());
        assert!(folder.means.recall.is_nan());
        assert!(folder.images.is_empty());
    }

    #[test]
    fn external_columns_average_only_external_results() {
        let mut with_external = result("a.png", 0.8);
        with_external.external = Some(ExternalMetrics {
            pseudo_f_measure: 0.9,
            pseudo_recall: 0.85,
            pseudo_precision: 0.95,
            drd: 2.0,
            psnr: 18.0,
        });
        let folder = aggregate(vec![with_external]);

        assert_eq!(folder.means.psnr, 18.0);
        assert_eq!(folder.means.drd, 2.0);
        assert!(aggregate(vec![result("b.png", 0.8)]).means.psnr.is_nan());
    }

    #[test]
    fn per_image_results_are_dropped_unless_requested() {
        let mut aggregator = FolderAggregator::new("results", false);
        assert!(aggregator.update(result("a.png", 0.5)));
        aggregator.skip("b.png");
        aggregator.fail("c.png", "tool crashed");
        let folder = aggregator.finish();

        assert_eq!(folder.evaluated, 1);
        assert!(folder.images.is_empty());
        assert_eq!(folder.skipped, vec!["b.png".to_string()]);
        assert_eq!(folder.failures[0].name, "c.png");
    }
}
