//! Analytics report export.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::model::{Dataset, Record};
use crate::stats::{numeric_columns, CorrelationMatrix, StatisticsSummary};

/// Default number of filtered rows embedded in a report.
pub const DEFAULT_SAMPLE_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub columns: usize,
    pub numeric_columns: usize,
}

/// Snapshot of the current analysis, ready to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: ReportSummary,
    /// Rounded to two decimals, as displayed.
    pub statistics: Option<StatisticsSummary>,
    pub correlation_matrix: Option<CorrelationMatrix>,
    /// The first `sample_limit` filtered rows.
    pub data: Vec<Record>,
}

/// Assemble a report from the full dataset, its filtered/sorted view and the
/// derived statistics. Pure: nothing is written.
pub fn export_report(
    dataset: &Dataset,
    filtered: &Dataset,
    summary: Option<&StatisticsSummary>,
    matrix: Option<&CorrelationMatrix>,
    sample_limit: usize,
) -> AnalyticsReport {
    AnalyticsReport {
        summary: ReportSummary {
            total_rows: dataset.len(),
            filtered_rows: filtered.len(),
            columns: dataset.columns.len(),
            numeric_columns: numeric_columns(dataset).len(),
        },
        statistics: summary.map(StatisticsSummary::rounded),
        correlation_matrix: matrix.cloned(),
        data: filtered.rows.iter().take(sample_limit).cloned().collect(),
    }
}

/// `analytics-report-<unix millis>.json`
pub fn default_report_name(unix_millis: i64) -> String {
    format!("analytics-report-{unix_millis}.json")
}

/// Write the report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &AnalyticsReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing report")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    log::debug!(
        "Wrote report with {} sample rows to {}",
        report.data.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::filter_rows;
    use crate::data::model::text_record;
    use crate::stats::{correlation_matrix, summarize, Alignment};

    fn numbers(n: usize) -> Dataset {
        Dataset::from_records(
            (0..n)
                .map(|i| {
                    text_record(&[
                        ("id", i.to_string().as_str()),
                        ("double", (i * 2).to_string().as_str()),
                        ("tag", if i % 2 == 0 { "even" } else { "odd" }),
                    ])
                })
                .collect(),
        )
    }

    #[test]
    fn report_counts_and_rounded_statistics() {
        let ds = numbers(3);
        let filtered = filter_rows(&ds, "odd");
        let summary = summarize(&ds, "id").unwrap();
        let cols = numeric_columns(&ds);
        let matrix = correlation_matrix(&ds, &cols, Alignment::default());

        let report = export_report(&ds, &filtered, Some(&summary), matrix.as_ref(), 1000);
        assert_eq!(
            report.summary,
            ReportSummary {
                total_rows: 3,
                filtered_rows: 1,
                columns: 3,
                numeric_columns: 2,
            }
        );
        assert_eq!(report.statistics.unwrap().variance, 0.67);
        assert_eq!(report.data.len(), 1);
        assert!(report.correlation_matrix.is_some());
    }

    #[test]
    fn sample_is_capped() {
        let ds = numbers(1500);
        let report = export_report(&ds, &ds, None, None, DEFAULT_SAMPLE_LIMIT);
        assert_eq!(report.data.len(), 1000);
        assert_eq!(report.summary.filtered_rows, 1500);
        assert_eq!(report.data[999].get("id").unwrap().to_string(), "999");
    }

    #[test]
    fn json_shape() {
        let ds = numbers(2);
        let report = export_report(&ds, &ds, None, None, 10);
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["summary"]["totalRows"], 2);
        assert_eq!(v["summary"]["numericColumns"], 2);
        assert!(v["statistics"].is_null());
        assert!(v["correlationMatrix"].is_null());
        assert_eq!(v["data"][1]["tag"], "odd");
    }

    #[test]
    fn write_report_creates_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(default_report_name(1_700_000_000_000));
        let ds = numbers(2);
        write_report(&path, &export_report(&ds, &ds, None, None, 10)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"summary\""));
        assert!(path.ends_with("analytics-report-1700000000000.json"));
    }
}
