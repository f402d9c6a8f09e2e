//! Parsing of the DIBCO metrics report.
//!
//! The tool prints one `label: value` line per metric. Only the position of a
//! value identifies the metric, so a change of the line layout needs a new
//! [`ReportFormat`] variant.

use thiserror::Error;

use crate::metrics::{EvaluationResult, ExternalMetrics};

/// Errors in a report that does not follow the expected layout.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReportParseError {
    #[error("expected {expected} values in the report, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("value {index} ({token:?}) is not a finite number")]
    NotANumber { index: usize, token: String },
}

/// Known report layouts of the external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// F-measure, pseudo F-measure, PSNR, DRD, recall, precision,
    /// pseudo recall, pseudo precision.
    #[default]
    DibcoV1,
}

impl ReportFormat {
    /// Number of values in a report of this layout.
    #[must_use]
    pub const fn field_count(self) -> usize {
        match self {
            Self::DibcoV1 => 8,
        }
    }

    /// Extracts the metrics from a raw report.
    ///
    /// # Errors
    ///
    /// Fails if the report does not hold exactly the expected number of
    /// values or one of them is not a finite number.
    pub fn parse(self, raw: &str) -> Result<EvaluationResult, ReportParseError> {
        let tokens = value_tokens(raw);
        if tokens.len() != self.field_count() {
            return Err(ReportParseError::FieldCount {
                expected: self.field_count(),
                found: tokens.len(),
            });
        }

        let values = tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                token
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| ReportParseError::NotANumber {
                        index,
                        token: token.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        match self {
            Self::DibcoV1 => {
                let &[fm, pseudo_fm, psnr, drd, recall, precision, pseudo_recall, pseudo_precision] =
                    values.as_slice()
                else {
                    unreachable!("field count checked above");
                };
                Ok(EvaluationResult {
                    name: String::new(),
                    recall,
                    precision,
                    f_measure: fm,
                    external: Some(ExternalMetrics {
                        pseudo_f_measure: pseudo_fm,
                        pseudo_recall,
                        pseudo_precision,
                        drd,
                        psnr,
                    }),
                    normalized_random_metric: None,
                    confusion: None,
                })
            }
        }
    }
}

/// Text after the first colon of every newline-terminated line, with tabs
/// and carriage returns removed.
fn value_tokens(raw: &str) -> Vec<String> {
    let clean: String = raw.chars().filter(|c| !matches!(c, '\t' | '\r')).collect();
    clean
        .split_inclusive('\n')
        .filter(|line| line.ends_with('\n'))
        .filter_map(|line| {
            line.split_once(':')
                .map(|(_, value)| value.trim_end_matches('\n').to_string())
        })
        .collect()
}

/// Parses a report in the current [`ReportFormat`].
///
/// # Errors
///
/// See [`ReportFormat::parse`].
pub fn parse_external_report(raw: &str) -> Result<EvaluationResult, ReportParseError> {
    ReportFormat::default().parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "F-Measure\t\t:\t90.5\r\n\
        pseudo F-Measure (Fps)\t:\t93.25\r\n\
        PSNR\t\t\t:\t18.4\r\n\
        DRD\t\t\t:\t2.75\r\n\
        Recall\t\t\t:\t88.0\r\n\
        Precision\t\t:\t93.125\r\n\
        pseudo-Recall (Rps)\t:\t91.5\r\n\
        pseudo-Precision (Pps)\t:\t95.0\r\n";

    #[test]
    fn values_are_read_by_position() {
        let result = parse_external_report(REPORT).unwrap();
        let external = result.external.unwrap();

        assert_eq!(result.f_measure, 90.5);
        assert_eq!(external.pseudo_f_measure, 93.25);
        assert_eq!(external.psnr, 18.4);
        assert_eq!(external.drd, 2.75);
        assert_eq!(result.recall, 88.0);
        assert_eq!(result.precision, 93.125);
        assert_eq!(external.pseudo_recall, 91.5);
        assert_eq!(external.pseudo_precision, 95.0);
        assert!(result.normalized_random_metric.is_none());
    }

    #[test]
    fn missing_lines_are_rejected() {
        let truncated: String = REPORT.lines().take(5).map(|l| format!("{l}\n")).collect();

        assert_eq!(
            parse_external_report(&truncated),
            Err(ReportParseError::FieldCount {
                expected: 8,
                found: 5
            })
        );
    }

    #[test]
    fn unterminated_last_line_does_not_count() {
        let unterminated = REPORT.trim_end();

        assert!(matches!(
            parse_external_report(unterminated),
            Err(ReportParseError::FieldCount { found: 7, .. })
        ));
    }

    #[test]
    fn garbage_values_are_rejected() {
        let garbage = REPORT.replace("2.75", "n/a");

        assert!(matches!(
            parse_external_report(&garbage),
            Err(ReportParseError::NotANumber { index: 3, .. })
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for (token, index) in [("nan", 0), ("NaN", 2), ("inf", 4), ("-inf", 7)] {
            let mut lines: Vec<String> = REPORT.lines().map(ToOwned::to_owned).collect();
            let (label, _) = lines[index].split_once(':').unwrap();
            lines[index] = format!("{label}:{token}");
            let report: String = lines.iter().map(|l| format!("{l}\n")).collect();

            match parse_external_report(&report) {
                Err(ReportParseError::NotANumber { index: found, .. }) => assert_eq!(found, index),
                other => panic!("Expected NotANumber error for {token}, got {other:?}"),
            }
        }
    }
}
