//! Pairwise Pearson correlation between numeric columns.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use crate::data::model::Dataset;

/// How rows are paired up when two columns have gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    /// Use only the rows where both columns are numeric.
    #[default]
    PairwiseComplete,
    /// Filter each column on its own; differing lengths yield 0.
    Independent,
}

// ---------------------------------------------------------------------------
// CorrelationMatrix
// ---------------------------------------------------------------------------

/// Square, symmetric matrix of coefficients indexed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Coefficient for the `(a, b)` pair, `None` if either column is unknown.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Serialized as `{ "a": { "a": 1.0, "b": 0.5 }, "b": { ... } }`.
impl Serialize for CorrelationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Row<'a>(&'a [String], &'a [f64]);

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (name, v) in self.0.iter().zip(self.1) {
                    map.serialize_entry(name, v)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, row) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(name, &Row(&self.columns, row))?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Strength buckets used for colouring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn classify(r: f64) -> Self {
        let a = r.abs();
        if a > 0.7 {
            CorrelationStrength::Strong
        } else if a > 0.3 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Correlation matrix over the `columns` that hold at least one finite value.
///
/// `None` when fewer than two of them qualify, which includes every request
/// against an empty dataset.
pub fn correlation_matrix(
    dataset: &Dataset,
    columns: &[String],
    alignment: Alignment,
) -> Option<CorrelationMatrix> {
    let columns: Vec<String> = columns
        .iter()
        .filter(|c| dataset.column(c).any(|v| v.as_number().is_some()))
        .cloned()
        .collect();
    if columns.len() < 2 {
        return None;
    }
    let n = columns.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pair_coefficient(dataset, &columns[i], &columns[j], alignment);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Some(CorrelationMatrix { columns, values })
}

fn pair_coefficient(dataset: &Dataset, a: &str, b: &str, alignment: Alignment) -> f64 {
    match alignment {
        Alignment::PairwiseComplete => {
            let (xs, ys): (Vec<f64>, Vec<f64>) = dataset
                .rows
                .iter()
                .filter_map(|r| Some((r.number(a)?, r.number(b)?)))
                .unzip();
            pearson(&xs, &ys)
        }
        Alignment::Independent => {
            let xs = dataset.numeric_values(a);
            let ys = dataset.numeric_values(b);
            if xs.len() != ys.len() {
                return 0.0;
            }
            pearson(&xs, &ys)
        }
    }
}

/// Pearson's r for equal-length slices. Zero variance (or no data) gives 0.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.is_empty() {
        return 0.0;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut ss_x = 0.0;
    let mut ss_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        num += dx * dy;
        ss_x += dx * dx;
        ss_y += dy * dy;
    }

    let den = (ss_x * ss_y).sqrt();
    if den == 0.0 || !den.is_finite() {
        return 0.0;
    }
    (num / den).clamp(-1.0, 1.0)
}
