use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a record
// ---------------------------------------------------------------------------

/// A loosely-typed scalar as it arrives from CSV / JSON / Parquet.
///
/// Numeric interpretation happens in exactly one place, [`CellValue::as_number`],
/// so every consumer (statistics, sorting, charts) agrees on what "numeric" means.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Null,
}

impl CellValue {
    /// Coerce the cell to a finite `f64`, if it has one.
    ///
    /// * `Number(v)` → `v` when finite
    /// * `Text(s)`   → `s.trim()` parsed as `f64` when finite
    /// * `Null`, blank text, `NaN`, `inf` → `None`
    pub fn as_number(&self) -> Option<f64> {
        let v = match self {
            CellValue::Number(v) => *v,
            CellValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                s.parse::<f64>().ok()?
            }
            CellValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

// ---------------------------------------------------------------------------
// Record – one row
// ---------------------------------------------------------------------------

/// One row: column name → value, in source key order.
///
/// Column counts are small, so a vector of pairs beats a hash map and keeps
/// the order the file declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field. New keys are appended.
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        match self.fields.iter_mut().find(|(k, _)| *k == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v)
    }

    /// Numeric value of `column`, see [`CellValue::as_number`].
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(CellValue::as_number)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.fields.iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An ordered collection of records sharing the first record's schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// All records, in display order.
    pub rows: Vec<Record>,
    /// Column names taken from the first record's keys (empty if no rows).
    pub columns: Vec<String>,
}

impl Dataset {
    /// Build a dataset, deriving the column list from the first record.
    pub fn from_records(rows: Vec<Record>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.keys().map(str::to_string).collect())
            .unwrap_or_default();
        Dataset { rows, columns }
    }

    /// A dataset with the same schema as `self` but different rows.
    pub fn with_rows(&self, rows: Vec<Record>) -> Self {
        Dataset {
            rows,
            columns: self.columns.clone(),
        }
    }

    /// Clone the rows at `indices`, in that order, into a new dataset.
    pub fn select(&self, indices: &[usize]) -> Self {
        self.with_rows(indices.iter().map(|&i| self.rows[i].clone()).collect())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate the raw cells of one column (missing keys are skipped).
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows.iter().filter_map(move |r| r.get(column))
    }

    /// Finite numeric values of `column`; unparseable cells are dropped.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.column(column).filter_map(CellValue::as_number).collect()
    }
}

/// Build a record from `(column, text)` pairs.
#[cfg(test)]
pub fn text_record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (*k, CellValue::from(*v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_number_coerces_text_and_rejects_non_finite() {
        assert_eq!(CellValue::from(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(CellValue::from("-3").as_number(), Some(-3.0));
        assert_eq!(CellValue::from("12abc").as_number(), None);
        assert_eq!(CellValue::from("").as_number(), None);
        assert_eq!(CellValue::from("inf").as_number(), None);
        assert_eq!(CellValue::from("NaN").as_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
        assert_eq!(CellValue::Number(4.0).as_number(), Some(4.0));
        assert_eq!(CellValue::Null.as_number(), None);
    }

    #[test]
    fn display_matches_plain_stringification() {
        assert_eq!(CellValue::Number(2.0).to_string(), "2");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Null.to_string(), "null");
        assert_eq!(CellValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn record_keeps_insertion_order_and_replaces_in_place() {
        let mut r = Record::new();
        r.insert("b", CellValue::from("1"));
        r.insert("a", CellValue::from("2"));
        r.insert("b", CellValue::from("3"));
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(r.get("b"), Some(&CellValue::from("3")));
        assert_eq!(r.number("a"), Some(2.0));
        assert_eq!(r.get("zzz"), None);
    }

    #[test]
    fn columns_come_from_first_record() {
        let ds = Dataset::from_records(vec![
            text_record(&[("x", "1"), ("y", "2")]),
            text_record(&[("y", "3"), ("z", "4")]),
        ]);
        assert_eq!(ds.columns, vec!["x", "y"]);
        assert_eq!(ds.numeric_values("y"), vec![2.0, 3.0]);
        assert_eq!(ds.numeric_values("x"), vec![1.0]);
        assert!(Dataset::from_records(Vec::new()).columns.is_empty());
    }

    #[test]
    fn select_keeps_schema_and_given_order() {
        let ds = Dataset::from_records(vec![
            text_record(&[("x", "1")]),
            text_record(&[("x", "2")]),
            text_record(&[("x", "3")]),
        ]);
        let picked = ds.select(&[2, 0]);
        assert_eq!(picked.columns, ds.columns);
        assert_eq!(picked.numeric_values("x"), vec![3.0, 1.0]);
        assert!(ds.select(&[]).is_empty());
    }

    #[test]
    fn record_serializes_as_ordered_object() {
        let r: Record = vec![
            ("z", CellValue::from("a")),
            ("a", CellValue::Number(1.5)),
            ("m", CellValue::Null),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"z":"a","a":1.5,"m":null}"#);
    }
}
