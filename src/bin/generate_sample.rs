//! Writes `sample_sales.{csv,json,parquet}` for trying out the dashboard.
//!
//! The table mixes clean numeric columns, a partially numeric column
//! (`discount` has blanks and "n/a") and text columns, so every path through
//! the statistics and chart code gets exercised.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

#[derive(Debug, Serialize)]
struct SaleRow {
    id: i64,
    date: String,
    region: String,
    product: String,
    units: i64,
    price: f64,
    revenue: f64,
    /// Kept as text: some rows are blank or "n/a".
    discount: String,
}

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<SaleRow> {
    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Gizmo"];

    (0..n)
        .map(|i| {
            let units = 5 + (rng.next_f64() * 95.0) as i64;
            let price = ((9.5 + rng.next_f64() * 20.0) * 100.0).round() / 100.0;
            let discount = match rng.next_u64() % 10 {
                0 => String::new(),
                1 => "n/a".to_string(),
                _ => format!("{:.2}", rng.next_f64() * 0.3),
            };
            SaleRow {
                id: i as i64 + 1,
                date: format!("2026-{:02}-{:02}", 1 + (i / 28) % 12, 1 + i % 28),
                region: rng.pick(&regions).to_string(),
                product: rng.pick(&products).to_string(),
                units,
                price,
                revenue: ((units as f64 * price) * 100.0).round() / 100.0,
                discount,
            }
        })
        .collect()
}

fn write_csv(rows: &[SaleRow], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_json(rows: &[SaleRow], path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(rows).context("serializing JSON")?;
    std::fs::write(path, json).with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn write_parquet(rows: &[SaleRow], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("date", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("product", DataType::Utf8, false),
        Field::new("units", DataType::Int64, false),
        Field::new("price", DataType::Float64, false),
        Field::new("revenue", DataType::Float64, false),
        Field::new("discount", DataType::Utf8, true),
    ]));

    let strings = |f: fn(&SaleRow) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(rows.iter().map(|r| r.id).collect::<Vec<_>>())),
        strings(|r| r.date.as_str()),
        strings(|r| r.region.as_str()),
        strings(|r| r.product.as_str()),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.units).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.price).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.revenue).collect::<Vec<_>>())),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| (!r.discount.is_empty()).then_some(r.discount.as_str()))
                .collect::<Vec<_>>(),
        )),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let n = std::env::args()
        .nth(1)
        .map(|s| s.parse::<usize>())
        .transpose()
        .context("row count must be a positive integer")?
        .unwrap_or(200);

    let mut rng = SimpleRng::new(42);
    let rows = generate(n, &mut rng);

    write_csv(&rows, "sample_sales.csv")?;
    write_json(&rows, "sample_sales.json")?;
    write_parquet(&rows, "sample_sales.parquet")?;

    println!("Wrote {n} rows to sample_sales.csv, sample_sales.json and sample_sales.parquet");
    Ok(())
}
