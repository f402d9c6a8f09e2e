//! CSV reports of folder aggregates.
//!
//! One row per folder with the mean metrics. With per-image detail, every
//! folder is followed by an empty separator row and one row per included
//! image, the image name taking the place of the folder path.

use std::{
    borrow::Cow,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{
    config::{EvaluationConfig, EvaluationMode},
    error::{BinEvalError, BinEvalResult},
    metrics::{EvaluationResult, FolderAggregate, MeanMetrics},
};

pub const HEADER_PATH_IMG: &str = "path_img";
pub const HEADER_MEAN_FM: &str = "mean_fm";
pub const HEADER_MEAN_PRECISION: &str = "mean_precision";
pub const HEADER_MEAN_RECALL: &str = "mean_recall";
pub const HEADER_MEAN_PSEUDO_FM: &str = "mean_pseudo_fm";
pub const HEADER_MEAN_PSEUDO_PRECISION: &str = "mean_pseudo_precision";
pub const HEADER_MEAN_PSEUDO_RECALL: &str = "mean_pseudo_recall";
pub const HEADER_MEAN_DRD: &str = "mean_drd";
pub const HEADER_MEAN_PSNR: &str = "mean_psnr";
pub const HEADER_MEAN_NRM: &str = "mean_nrm";

/// Which metric columns a report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLayout {
    external: bool,
    nrm: bool,
}

impl ReportLayout {
    #[must_use]
    pub fn for_config(config: &EvaluationConfig) -> Self {
        Self {
            external: config.mode == EvaluationMode::ExternalTool,
            nrm: config.foreground_type.reports_nrm(),
        }
    }

    /// Column names of the report.
    #[must_use]
    pub fn header(&self) -> Vec<&'static str> {
        let mut header = vec![
            HEADER_PATH_IMG,
            HEADER_MEAN_FM,
            HEADER_MEAN_PRECISION,
            HEADER_MEAN_RECALL,
        ];
        if self.external {
            header.extend([
                HEADER_MEAN_PSEUDO_FM,
                HEADER_MEAN_PSEUDO_PRECISION,
                HEADER_MEAN_PSEUDO_RECALL,
                HEADER_MEAN_DRD,
                HEADER_MEAN_PSNR,
            ]);
        } else {
            header.push(HEADER_MEAN_NRM);
        }
        header
    }

    fn folder_row(&self, folder: &FolderAggregate) -> Vec<String> {
        let MeanMetrics {
            f_measure,
            precision,
            recall,
            pseudo_f_measure,
            pseudo_precision,
            pseudo_recall,
            drd,
            psnr,
            normalized_random_metric,
        } = folder.means;

        let mut row = vec![
            folder.path.display().to_string(),
            number(f_measure),
            number(precision),
            number(recall),
        ];
        if self.external {
            row.extend(
                [pseudo_f_measure, pseudo_precision, pseudo_recall, drd, psnr].map(number),
            );
        } else if self.nrm {
            row.push(number(normalized_random_metric));
        } else {
            row.push(String::new());
        }
        row
    }

    fn image_row(&self, result: &EvaluationResult) -> Vec<String> {
        let mut row = vec![
            result.name.clone(),
            number(result.f_measure),
            number(result.precision),
            number(result.recall),
        ];
        if self.external {
            match &result.external {
                Some(e) => row.extend(
                    [
                        e.pseudo_f_measure,
                        e.pseudo_precision,
                        e.pseudo_recall,
                        e.drd,
                        e.psnr,
                    ]
                    .map(number),
                ),
                None => row.extend(std::iter::repeat(String::new()).take(5)),
            }
        } else {
            row.push(result.normalized_random_metric.map(number).unwrap_or_default());
        }
        row
    }
}

fn number(value: f64) -> String {
    format!("{value}")
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn write_row<W: Write, S: AsRef<str>>(writer: &mut W, row: &[S]) -> io::Result<()> {
    let line = row
        .iter()
        .map(|field| escape(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{line}")
}

/// Writes the report for `folders`.
///
/// Per-image rows are written only when `per_image` is set and the
/// aggregates retained their per-image results.
///
/// # Errors
///
/// Propagates write errors of `writer`.
pub fn write_report<W: Write>(
    mut writer: W,
    layout: ReportLayout,
    folders: &[FolderAggregate],
    per_image: bool,
) -> io::Result<()> {
    write_row(&mut writer, &layout.header())?;
    for folder in folders {
        write_row(&mut writer, &layout.folder_row(folder))?;
    }

    if per_image {
        for folder in folders {
            writeln!(writer)?;
            for result in &folder.images {
                write_row(&mut writer, &layout.image_row(result))?;
            }
        }
    }
    writer.flush()
}

/// Writes the report to the file at `path`.
///
/// # Errors
///
/// Returns [`BinEvalError::Io`] if the file cannot be created or written.
pub fn save_report(
    path: &Path,
    config: &EvaluationConfig,
    folders: &[FolderAggregate],
) -> BinEvalResult<()> {
    let io_error = |source| BinEvalError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    write_report(
        BufWriter::new(file),
        ReportLayout::for_config(config),
        folders,
        config.keep_per_image,
    )
    .map_err(io_error)?;
    tracing::info!(path = %path.display(), folders = folders.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ForegroundType,
        metrics::{ExternalMetrics, FolderAggregator},
    };

    fn result(name: &str, f_measure: f64, nrm: Option<f64>) -> EvaluationResult {
        EvaluationResult {
            name: name.to_string(),
            recall: 1.0,
            precision: 0.5,
            f_measure,
            external: None,
            normalized_random_metric: nrm,
            confusion: None,
        }
    }

    fn render(layout: ReportLayout, folders: &[FolderAggregate], per_image: bool) -> String {
        let mut out = Vec::new();
        write_report(&mut out, layout, folders, per_image).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn local_report_has_one_row_per_folder() {
        let mut aggregator = FolderAggregator::new("out/ace", true);
        aggregator.update(result("1.png", 0.5, Some(0.25)));
        aggregator.update(result("2.png", 1.0, Some(0.75)));
        let layout = ReportLayout::for_config(&EvaluationConfig::new());

        let csv = render(layout, &[aggregator.finish()], false);

        assert_eq!(
            csv,
            "path_img,mean_fm,mean_precision,mean_recall,mean_nrm\n\
             out/ace,0.75,0.5,1,0.5\n"
        );
    }

    #[test]
    fn per_image_rows_follow_a_separator() {
        let mut aggregator = FolderAggregator::new("out/ace", true);
        aggregator.update(result("1.png", 0.5, Some(0.25)));
        aggregator.update(EvaluationResult::not_computable().with_name("blank.png"));
        let layout = ReportLayout::for_config(&EvaluationConfig::new());

        let csv = render(layout, &[aggregator.finish()], true);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "1.png,0.5,0.5,1,0.25");
    }

    #[test]
    fn empty_folder_renders_nan() {
        let aggregate = FolderAggregator::new("out/none", false).finish();
        let layout = ReportLayout::for_config(&EvaluationConfig::new());

        let csv = render(layout, &[aggregate], false);

        assert!(csv.ends_with("out/none,NaN,NaN,NaN,NaN\n"), "{csv}");
    }

    #[test]
    fn external_report_carries_tool_columns() {
        let mut aggregator = FolderAggregator::new("out/ace", true);
        let mut r = result("1.png", 90.0, None);
        r.external = Some(ExternalMetrics {
            pseudo_f_measure: 92.0,
            pseudo_recall: 91.0,
            pseudo_precision: 93.0,
            drd: 2.5,
            psnr: 18.0,
        });
        aggregator.update(r);
        let config = EvaluationConfig::new().with_mode(EvaluationMode::ExternalTool);

        let csv = render(ReportLayout::for_config(&config), &[aggregator.finish()], true);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "path_img,mean_fm,mean_precision,mean_recall,mean_pseudo_fm,mean_pseudo_precision,mean_pseudo_recall,mean_drd,mean_psnr"
        );
        assert_eq!(lines[1], "out/ace,90,0.5,1,92,93,91,2.5,18");
        assert_eq!(lines[3], "1.png,90,0.5,1,92,93,91,2.5,18");
    }

    #[test]
    fn dual_class_reports_leave_nrm_empty() {
        let mut aggregator = FolderAggregator::new("out/msbin", false);
        aggregator.update(result("1.png", 0.5, None));
        let config = EvaluationConfig::new().with_foreground_type(ForegroundType::DualClassPrimary);

        let csv = render(ReportLayout::for_config(&config), &[aggregator.finish()], false);

        assert!(csv.ends_with("out/msbin,0.5,0.5,1,\n"), "{csv}");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("plain"), "plain");
    }
}
