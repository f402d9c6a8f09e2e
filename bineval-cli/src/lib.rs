//! Command line front ends of `bineval`.
//!
//! - `bineval`: evaluates result folders and writes the CSV report
//! - `bineval-weights`: prepares ground truth for the DIBCO metrics tool
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate one result folder
//! cargo run --bin bineval -- gt/ results/otsu/ otsu.csv
//!
//! # Evaluate every method folder with the DIBCO tool
//! cargo run --bin bineval -- gt/ results/ all.csv --subfolders \
//!     --use-external-tool --external-tool-path tools/
//!
//! # Convert ground truth and compute pseudo weights
//! cargo run --bin bineval-weights -- gt/ gt_dibco/ --tool-path tools/
//! ```

pub mod backend;
pub mod telemetry;

pub use backend::{create_device, get_backend_name, SelectedBackend, SelectedDevice};
pub use telemetry::{init_tracing, level_for};
