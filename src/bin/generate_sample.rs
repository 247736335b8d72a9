use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const CITIES: [&str; 5] = ["Lahore", "Karachi", "Islamabad", "Peshawar", "Quetta"];
const GENDERS: [&str; 2] = ["Male", "Female"];
const CATEGORIES: [(&str, f64); 5] = [
    ("Electronics", 450.0),
    ("Clothing", 120.0),
    ("Groceries", 60.0),
    ("Books", 35.0),
    ("Beauty", 80.0),
];

#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "Customer_ID")]
    customer_id: i64,
    #[serde(rename = "Age")]
    age: i64,
    #[serde(rename = "Gender")]
    gender: &'static str,
    #[serde(rename = "City")]
    city: &'static str,
    #[serde(rename = "Product_Category")]
    product_category: &'static str,
    #[serde(rename = "Purchase_Amount")]
    purchase_amount: f64,
}

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn generate(rows: usize, seed: u64) -> Vec<Row> {
    let mut rng = SimpleRng::new(seed);
    (0..rows)
        .map(|i| {
            let (product_category, base) = rng.pick(&CATEGORIES);
            // Older customers spend a little more.
            let age = (rng.gauss(38.0, 11.0).round() as i64).clamp(18, 75);
            let spend = rng.gauss(base, base * 0.35) * (1.0 + (age - 18) as f64 / 200.0);
            Row {
                customer_id: 1000 + i as i64,
                age,
                gender: rng.pick(&GENDERS),
                city: rng.pick(&CITIES),
                product_category,
                purchase_amount: (spend.max(1.0) * 100.0).round() / 100.0,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Customer_ID", DataType::Int64, false),
        Field::new("Age", DataType::Int64, false),
        Field::new("Gender", DataType::Utf8, false),
        Field::new("City", DataType::Utf8, false),
        Field::new("Product_Category", DataType::Utf8, false),
        Field::new("Purchase_Amount", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.customer_id))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.age))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.gender))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.city))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.product_category))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.purchase_amount))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Usage: `generate_sample [OUTPUT] [ROWS]`; the extension picks the format.
fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .unwrap_or_else(|| "simple_customer_data.csv".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("'{n}' is not a row count"))?,
        None => 500,
    };

    let path = Path::new(&output);
    let data = generate(rows, 42);

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(path, &data)?,
        Some("parquet") | Some("pq") => write_parquet(path, &data)?,
        other => bail!("Unsupported output extension: {other:?}"),
    }

    println!("Wrote {} purchases to {output}", data.len());
    Ok(())
}
