//! Ground truth preparation for the DIBCO metrics tool
//!
//! Converts each image to the single channel layout the DIBCO tools read
//! (`255 - green`) and computes its pseudo recall/precision weight files.
//!
//! ## Usage
//!
//! ```bash
//! # Convert ground truth and compute the weights
//! cargo run --bin bineval-weights -- gt/ gt_dibco/ --tool-path tools/
//!
//! # Only convert, e.g. candidate images
//! cargo run --bin bineval-weights -- results/otsu/ results/otsu_dibco/ --convert-only
//! ```

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use bineval::weights::{convert_folder, prepare_ground_truth, WeightGenerator};
use bineval_cli::{init_tracing, level_for};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder with the images to convert
    input: PathBuf,

    /// Folder receiving the converted images and weight files
    output: PathBuf,

    /// Directory holding the weight tool
    #[arg(long, default_value = ".")]
    tool_path: PathBuf,

    /// Convert the images without computing weights
    #[arg(long)]
    convert_only: bool,

    /// Seconds to wait for one run of the weight tool
    #[arg(long, default_value = "300")]
    timeout_secs: u64,

    /// More output, may be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json, level_for(args.verbose));

    if args.convert_only {
        let converted = convert_folder(&args.input, &args.output)
            .with_context(|| format!("Failed to convert {}", args.input.display()))?;
        println!(
            "Converted {} images into {}",
            converted.len(),
            args.output.display()
        );
        return Ok(());
    }

    let generator = WeightGenerator::new(&args.tool_path, Duration::from_secs(args.timeout_secs))
        .context("Failed to locate the weight tool")?;
    let weights = prepare_ground_truth(&args.input, &args.output, &generator)
        .with_context(|| format!("Failed to prepare ground truth from {}", args.input.display()))?;

    println!(
        "Computed weights for {} images in {}",
        weights.len(),
        args.output.display()
    );
    Ok(())
}
