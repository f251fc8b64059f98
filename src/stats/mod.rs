//! Descriptive statistics over a [`Dataset`] column.
//!
//! ```text
//!   Dataset ──► numeric_columns ──► summarize(column)        → StatisticsSummary
//!                              └──► correlation_matrix(cols) → CorrelationMatrix
//! ```
//!
//! Everything here is pure and synchronous: callers recompute whenever their
//! inputs change and simply replace the previous result.

pub mod correlation;

use serde::Serialize;

use crate::data::model::Dataset;

pub use correlation::{correlation_matrix, Alignment, CorrelationMatrix, CorrelationStrength};

// ---------------------------------------------------------------------------
// Numeric column detection
// ---------------------------------------------------------------------------

/// Columns of the first record for which at least one row holds a finite
/// number. Partially numeric columns qualify; order follows the first record.
pub fn numeric_columns(dataset: &Dataset) -> Vec<String> {
    dataset
        .columns
        .iter()
        .filter(|col| dataset.rows.iter().any(|r| r.number(col).is_some()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Single-column summary
// ---------------------------------------------------------------------------

/// Summary statistics for one numeric column, at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population variance (divisor `count`).
    pub variance: f64,
    pub std_dev: f64,
}

impl StatisticsSummary {
    /// Compute the summary of a slice of finite values; `None` if empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(StatisticsSummary {
            count,
            sum,
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
            variance,
            std_dev: variance.sqrt(),
        })
    }

    /// The display snapshot: every float rounded to two decimals.
    pub fn rounded(&self) -> Self {
        StatisticsSummary {
            count: self.count,
            sum: round2(self.sum),
            mean: round2(self.mean),
            median: round2(self.median),
            min: round2(self.min),
            max: round2(self.max),
            variance: round2(self.variance),
            std_dev: round2(self.std_dev),
        }
    }

    /// Label / value pairs in display order, formatted to two decimals.
    pub fn display_rows(&self) -> [(&'static str, String); 8] {
        [
            ("Count", self.count.to_string()),
            ("Mean", format!("{:.2}", self.mean)),
            ("Median", format!("{:.2}", self.median)),
            ("Std Dev", format!("{:.2}", self.std_dev)),
            ("Min", format!("{:.2}", self.min)),
            ("Max", format!("{:.2}", self.max)),
            ("Sum", format!("{:.2}", self.sum)),
            ("Variance", format!("{:.2}", self.variance)),
        ]
    }
}

/// Summarise `column`; non-numeric cells are dropped, not zero-filled.
/// Returns `None` when the column has no numeric value at all.
pub fn summarize(dataset: &Dataset, column: &str) -> Option<StatisticsSummary> {
    StatisticsSummary::from_values(&dataset.numeric_values(column))
}

/// Round to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::text_record;

    fn xy() -> Dataset {
        Dataset::from_records(vec![
            text_record(&[("x", "1"), ("y", "2")]),
            text_record(&[("x", "2"), ("y", "4")]),
            text_record(&[("x", "3"), ("y", "6")]),
        ])
    }

    #[test]
    fn summarize_linear_column() {
        let s = summarize(&xy(), "x").unwrap().rounded();
        assert_eq!(s.count, 3);
        assert_eq!(s.sum, 6.0);
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.median, 2.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert_eq!(s.variance, 0.67);
        assert_eq!(s.std_dev, 0.82);
    }

    #[test]
    fn full_precision_is_kept_until_rounding() {
        let s = summarize(&xy(), "x").unwrap();
        assert!((s.variance - 2.0 / 3.0).abs() < 1e-12);
        assert!((s.std_dev - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn unparseable_values_are_dropped() {
        let ds = Dataset::from_records(vec![
            text_record(&[("x", "1"), ("y", "a")]),
            text_record(&[("x", "bad"), ("y", "b")]),
        ]);
        assert_eq!(numeric_columns(&ds), vec!["x"]);
        let s = summarize(&ds, "x").unwrap();
        assert_eq!(
            s,
            StatisticsSummary {
                count: 1,
                sum: 1.0,
                mean: 1.0,
                median: 1.0,
                min: 1.0,
                max: 1.0,
                variance: 0.0,
                std_dev: 0.0,
            }
        );
        assert!(summarize(&ds, "y").is_none());
    }

    #[test]
    fn even_count_median_averages_central_pair() {
        let s = StatisticsSummary::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.median, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn empty_dataset_has_nothing_numeric() {
        let ds = Dataset::default();
        assert!(numeric_columns(&ds).is_empty());
        assert!(summarize(&ds, "x").is_none());
    }

    #[test]
    fn numeric_columns_keep_first_record_order() {
        let ds = Dataset::from_records(vec![
            text_record(&[("b", "1"), ("name", "n"), ("a", "")]),
            text_record(&[("b", "x"), ("name", "m"), ("a", "7")]),
        ]);
        assert_eq!(numeric_columns(&ds), vec!["b", "a"]);
    }

    #[test]
    fn display_rows_use_two_decimals() {
        let s = summarize(&xy(), "x").unwrap();
        let rows = s.display_rows();
        assert_eq!(rows[0], ("Count", "3".to_string()));
        assert_eq!(rows[7], ("Variance", "0.67".to_string()));
    }

    #[test]
    fn summary_serializes_with_camel_case_keys() {
        let s = summarize(&xy(), "x").unwrap().rounded();
        let v = serde_json::to_value(s).unwrap();
        assert_eq!(v["stdDev"], serde_json::json!(0.82));
        assert_eq!(v["count"], serde_json::json!(3));
    }
}
