//! # BinEval
//!
//! Evaluation of document image binarization results against ground truth,
//! implemented in Rust on top of the Burn tensor framework.
//!
//! A binarization method writes one image per document into a result folder.
//! This crate scores each of them against the ground truth with the same file
//! name and summarizes the folder:
//!
//! - [`classifier`]: pixel foreground masks for regular and dual-class ground truth
//! - [`metrics`]: confusion-matrix rates and per-folder means
//! - [`external`]: the DIBCO metrics tool as an alternative evaluator
//! - [`runner`]: batch evaluation of one folder or of every subfolder
//! - [`report`]: the CSV summary
//! - [`weights`]: ground-truth conversion and weight file generation for the DIBCO tools
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bineval::{save_report, BatchRunner, EvaluationConfig, ForegroundType};
//! use burn::backend::NdArray;
//!
//! let config = EvaluationConfig::new().with_foreground_type(ForegroundType::Regular);
//! let runner = BatchRunner::<NdArray>::new(config, &Default::default())?;
//! let aggregate = runner.run_folder("results/otsu".as_ref(), "gt".as_ref())?;
//! save_report("otsu.csv".as_ref(), runner.config(), &[aggregate])?;
//! ```

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod external;
pub mod metrics;
pub mod raster;
pub mod report;
pub mod runner;
pub mod weights;

pub use classifier::{classify, PixelMask};
pub use config::{EvaluationConfig, EvaluationMode, FailurePolicy, ForegroundType};
pub use error::{BinEvalError, BinEvalResult};
pub use external::ExternalMetricsTool;
pub use metrics::{
    evaluate, ConfusionMatrix, EvaluationResult, ExternalMetrics, FolderAggregate, MeanMetrics,
};
pub use raster::RawImage;
pub use report::{save_report, write_report, ReportLayout};
pub use runner::{evaluate_local, run_folder, BatchRunner};
