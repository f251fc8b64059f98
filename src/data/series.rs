use serde::{Deserialize, Serialize};

use super::model::{CellValue, Dataset, Record};

// ---------------------------------------------------------------------------
// Chart configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Area,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Area,
        ChartKind::Scatter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line Chart",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Area => "Area Chart",
            ChartKind::Scatter => "Scatter Plot",
        }
    }
}

/// Columns tried, in order, for a human-readable point label.
const LABEL_COLUMNS: [&str; 4] = ["name", "label", "id", "date"];

// ---------------------------------------------------------------------------
// Series extraction
// ---------------------------------------------------------------------------

/// One plotted column over a window of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub column: String,
    /// One value per row in the window; unparseable cells become `0.0`.
    pub values: Vec<f64>,
}

/// Everything the plot needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Clamp `[start, end)` to the dataset and return the row slice.
pub fn row_window(dataset: &Dataset, window: [usize; 2]) -> &[Record] {
    let end = window[1].min(dataset.len());
    let start = window[0].min(end);
    &dataset.rows[start..end]
}

/// Build chart series for `columns` over the rows in `window`.
///
/// Unlike the statistics, charts need one value per row, so cells that are
/// not numeric are plotted as zero instead of being dropped.
pub fn chart_data(dataset: &Dataset, columns: &[String], window: [usize; 2]) -> ChartData {
    let rows = row_window(dataset, window);
    let labels = rows
        .iter()
        .enumerate()
        .map(|(i, row)| point_label(row, i))
        .collect();
    let series = columns
        .iter()
        .map(|col| ChartSeries {
            column: col.clone(),
            values: rows.iter().map(|r| r.number(col).unwrap_or(0.0)).collect(),
        })
        .collect();
    ChartData { labels, series }
}

/// Label for the `index`-th row of a window.
fn point_label(row: &Record, index: usize) -> String {
    LABEL_COLUMNS
        .iter()
        .filter_map(|col| row.get(col))
        .find(|v| is_truthy(v))
        .map(|v| v.to_string())
        .unwrap_or_else(|| format!("Row {}", index + 1))
}

fn is_truthy(v: &CellValue) -> bool {
    match v {
        CellValue::Text(s) => !s.is_empty(),
        CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
        CellValue::Null => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::text_record;

    fn sales() -> Dataset {
        Dataset::from_records(vec![
            text_record(&[("name", "north"), ("units", "10"), ("price", "2.5")]),
            text_record(&[("name", ""), ("units", "oops"), ("price", "3")]),
            text_record(&[("name", "south"), ("units", "7"), ("price", "")]),
        ])
    }

    #[test]
    fn non_numeric_cells_plot_as_zero() {
        let cols = vec!["units".to_string(), "price".to_string()];
        let data = chart_data(&sales(), &cols, [0, 20]);
        assert_eq!(data.series[0].values, vec![10.0, 0.0, 7.0]);
        assert_eq!(data.series[1].values, vec![2.5, 3.0, 0.0]);
    }

    #[test]
    fn labels_fall_back_to_row_number() {
        let data = chart_data(&sales(), &[], [0, 20]);
        assert_eq!(data.labels, vec!["north", "Row 2", "south"]);
    }

    #[test]
    fn label_prefers_name_then_label_then_id() {
        let row = text_record(&[("id", "7"), ("label", "L")]);
        assert_eq!(point_label(&row, 0), "L");
        let row = text_record(&[("id", "7")]);
        assert_eq!(point_label(&row, 0), "7");
    }

    #[test]
    fn window_is_clamped() {
        let ds = sales();
        assert_eq!(row_window(&ds, [1, 2]).len(), 1);
        assert_eq!(row_window(&ds, [2, 100]).len(), 1);
        assert!(row_window(&ds, [5, 100]).is_empty());
        assert!(row_window(&ds, [2, 1]).is_empty());
        let data = chart_data(&ds, &["units".to_string()], [1, 3]);
        assert_eq!(data.labels, vec!["Row 1", "south"]);
        assert_eq!(data.series[0].values, vec![0.0, 7.0]);
    }
}
