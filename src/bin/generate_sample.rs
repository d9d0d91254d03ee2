use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

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

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64() as usize % items.len()]
    }
}

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const REPS: [&str; 3] = ["Kim", "Lopez", "Nakamura"];
const CUSTOMERS: [&str; 12] = [
    "Acme Corp",
    "Blue Harbor",
    "Cobalt Labs",
    "Delta Foods",
    "Evergreen Ltd",
    "Falcon Retail",
    "Granite & Co",
    "Helix Health",
    "Iris Studio",
    "Juniper Farms",
    "Keystone Build",
    "Lumen Energy",
];

/// (category, base unit price)
const CATEGORIES: [(&str, f64); 4] = [
    ("Electronics", 240.0),
    ("Furniture", 180.0),
    ("Office Supplies", 12.5),
    ("Software", 95.0),
];

fn main() -> Result<()> {
    let output_path = std::env::args().nth(1).unwrap_or_else(|| "sample_sales.csv".to_string());
    let mut rng = SimpleRng::new(42);

    let first_day = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;
    let days = 547;
    let orders = 600;

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "Order_ID",
        "Order_Date",
        "Region",
        "Category",
        "Customer_Name",
        "Quantity",
        "Price",
        "Sales_Rep",
    ])?;

    for i in 0..orders {
        let date = first_day + Duration::days(rng.range(0, days - 1) as i64);
        let (category, base_price) = *rng.pick(&CATEGORIES);
        // ±20 % price jitter, rounded to cents
        let price = (base_price * (0.8 + 0.4 * rng.next_f64()) * 100.0).round() / 100.0;

        writer.write_record([
            format!("ORD-{:05}", i + 1),
            date.format("%Y-%m-%d").to_string(),
            rng.pick(&REGIONS).to_string(),
            category.to_string(),
            rng.pick(&CUSTOMERS).to_string(),
            rng.range(1, 12).to_string(),
            price.to_string(),
            rng.pick(&REPS).to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {orders} orders spanning {days} days to {output_path}");
    Ok(())
}
