/// Data layer: core types, loading, filtering and chart series.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, column order of the first record
///   └──────────┘
///        │
///        ├──► filter  free-text search + stable column sort
///        └──► series  per-column chart values over a row window
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod series;
