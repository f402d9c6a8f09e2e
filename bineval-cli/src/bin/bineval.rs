//! Binarization evaluation
//!
//! Scores the images of a result folder against the ground truth and writes
//! the per-folder means to a CSV report.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate one folder locally
//! cargo run --bin bineval -- gt/ results/otsu/ otsu.csv
//!
//! # Every subfolder of results/, one report row per method
//! cargo run --bin bineval -- gt/ results/ methods.csv --subfolders --save-per-image-results
//!
//! # Dual-class ground truth, secondary ink class
//! cargo run --bin bineval -- gt/ results/msi/ msi.csv --foreground-type 2
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use bineval::{
    save_report, BatchRunner, EvaluationConfig, EvaluationMode, FailurePolicy, ForegroundType,
};
use bineval_cli::{create_device, get_backend_name, init_tracing, level_for, SelectedBackend};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ground truth folder
    gt: PathBuf,

    /// Folder with the binarized images, or with one folder per method when
    /// --subfolders is set
    img: PathBuf,

    /// Output CSV report
    csv: PathBuf,

    /// Score with the DIBCO metrics tool instead of locally
    #[arg(long)]
    use_external_tool: bool,

    /// Directory holding the DIBCO metrics tool
    #[arg(long)]
    external_tool_path: Option<PathBuf>,

    /// 0 = regular, 1 = dual-class primary, 2 = dual-class secondary
    #[arg(long)]
    foreground_type: Option<i64>,

    /// Evaluate every subfolder of the image folder
    #[arg(long)]
    subfolders: bool,

    /// Append per-image rows to the report
    #[arg(long)]
    save_per_image_results: bool,

    /// Treat zero-valued candidate pixels as foreground
    #[arg(long)]
    invert_candidate: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record failing images and keep going
    #[arg(long)]
    continue_on_error: bool,

    /// Image file name to leave out, may be repeated
    #[arg(long = "exclude", value_name = "NAME")]
    excluded: Vec<String>,

    /// Seconds to wait for one run of the external tool
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// More output, may be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn evaluation_config(&self) -> Result<EvaluationConfig> {
        let mut config = if let Some(config_path) = &self.config {
            let config_str = std::fs::read_to_string(config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            serde_json::from_str::<EvaluationConfig>(&config_str).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            EvaluationConfig::new()
        };

        // Apply command line overrides
        if self.use_external_tool {
            config.mode = EvaluationMode::ExternalTool;
        }
        if let Some(path) = &self.external_tool_path {
            config.external_tool_dir.clone_from(path);
        }
        if let Some(index) = self.foreground_type {
            config.foreground_type =
                ForegroundType::from_index(index).context("Invalid --foreground-type")?;
        }
        if self.save_per_image_results {
            config.keep_per_image = true;
        }
        if self.invert_candidate {
            config.invert_candidate = true;
        }
        if self.continue_on_error {
            config.failure_policy = FailurePolicy::Continue;
        }
        if let Some(seconds) = self.timeout_secs {
            config.tool_timeout_secs = seconds;
        }
        config.excluded_images.extend(self.excluded.iter().cloned());

        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json, level_for(args.verbose));

    let config = args.evaluation_config()?;
    let device = create_device();
    tracing::info!(backend = get_backend_name(), "starting evaluation");

    let runner = BatchRunner::<SelectedBackend>::new(config, &device)
        .context("Failed to set up the evaluation")?;

    let folders = if args.subfolders {
        runner
            .run_subfolders(&args.img, &args.gt)
            .with_context(|| format!("Failed to evaluate subfolders of {}", args.img.display()))?
    } else {
        vec![runner
            .run_folder(&args.img, &args.gt)
            .with_context(|| format!("Failed to evaluate {}", args.img.display()))?]
    };

    for folder in &folders {
        if !folder.failures.is_empty() {
            tracing::warn!(
                folder = %folder.path.display(),
                failed = folder.failures.len(),
                "some images could not be evaluated",
            );
        }
    }

    save_report(&args.csv, runner.config(), &folders)
        .with_context(|| format!("Failed to write report: {}", args.csv.display()))?;

    println!("Report written to {}", args.csv.display());
    Ok(())
}
