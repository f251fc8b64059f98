use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::model::{CellValue, Dataset, Record};

// ---------------------------------------------------------------------------
// Free-text row filter
// ---------------------------------------------------------------------------

/// Indices of the records where any field's stringified value contains
/// `search` (case-insensitive). An empty search keeps every row.
pub fn filter_indices(dataset: &Dataset, search: &str) -> Vec<usize> {
    if search.is_empty() {
        return (0..dataset.len()).collect();
    }
    let needle = search.to_lowercase();
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// [`filter_indices`] materialised as a dataset. Order is preserved.
pub fn filter_rows(dataset: &Dataset, search: &str) -> Dataset {
    dataset.select(&filter_indices(dataset, search))
}

fn row_matches(row: &Record, needle: &str) -> bool {
    row.values()
        .any(|v| v.to_string().to_lowercase().contains(needle))
}

// ---------------------------------------------------------------------------
// Column sort
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Asc => "Ascending",
            SortDirection::Desc => "Descending",
        }
    }
}

/// A cell prepared for comparison: its number, if any, and its lower-cased
/// text. A missing cell reads as `null`.
#[derive(Debug, Clone, PartialEq)]
struct SortKey {
    number: Option<f64>,
    text: String,
}

impl SortKey {
    fn new(cell: Option<&CellValue>) -> Self {
        match cell {
            Some(v) => SortKey {
                number: v.as_number(),
                text: v.to_string().to_lowercase(),
            },
            None => SortKey {
                number: None,
                text: "null".to_string(),
            },
        }
    }

    /// Numerically when both sides are numbers, otherwise as lower-cased
    /// strings.
    fn compare(&self, other: &Self) -> Ordering {
        match (self.number, other.number) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => self.text.cmp(&other.text),
        }
    }
}

/// Stable sort of `indices` (rows of `dataset`) by `column`.
///
/// Keys are built once per row; equal keys keep their input order in both
/// directions.
pub fn sort_indices(dataset: &Dataset, indices: &mut [usize], column: &str, direction: SortDirection) {
    let keys: Vec<SortKey> = indices
        .iter()
        .map(|&i| SortKey::new(dataset.rows[i].get(column)))
        .collect();
    let mut order: Vec<usize> = (0..indices.len()).collect();
    merge_sort_by(&mut order, |&a, &b| {
        let ord = keys[a].compare(&keys[b]);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    let sorted: Vec<usize> = order.iter().map(|&k| indices[k]).collect();
    indices.copy_from_slice(&sorted);
}

/// Stable sort of the dataset by `column`. Each row is cloned once.
pub fn sort_rows(dataset: &Dataset, column: &str, direction: SortDirection) -> Dataset {
    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    sort_indices(dataset, &mut indices, column, direction);
    dataset.select(&indices)
}

/// Top-down stable merge sort.
///
/// `SortKey::compare` is not transitive on columns mixing numbers and text
/// ("9" < "10" numerically, "10" < "1a" < "9" as text), and `slice::sort_by`
/// may panic on such comparators. This one only ever asks "is right < left".
fn merge_sort_by<T: Copy, F>(items: &mut [T], mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    fn sort<T: Copy, F: FnMut(&T, &T) -> Ordering>(items: &mut [T], buf: &mut Vec<T>, cmp: &mut F) {
        let len = items.len();
        if len <= 1 {
            return;
        }
        let mid = len / 2;
        sort(&mut items[..mid], buf, cmp);
        sort(&mut items[mid..], buf, cmp);

        buf.clear();
        let (mut i, mut j) = (0, mid);
        while i < mid && j < len {
            // Take from the right run only when strictly smaller: stability.
            if cmp(&items[j], &items[i]) == Ordering::Less {
                buf.push(items[j]);
                j += 1;
            } else {
                buf.push(items[i]);
                i += 1;
            }
        }
        buf.extend_from_slice(&items[i..mid]);
        buf.extend_from_slice(&items[j..len]);
        items.copy_from_slice(&buf[..]);
    }

    let mut buf = Vec::with_capacity(items.len());
    sort(items, &mut buf, &mut cmp);
}
