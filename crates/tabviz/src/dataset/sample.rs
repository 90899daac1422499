//! Deterministic demo dataset used when nothing has been uploaded.

use chrono::NaiveDate;
use polars::prelude::*;
use rand::prelude::*;
use rand_distr::{Distribution, Normal, Poisson};
use tracing::debug;

use super::Dataset;
use crate::error::{DashboardError, Result};
use crate::utils::round_to;

/// Number of rows in the sample dataset.
pub const SAMPLE_ROWS: usize = 100;

/// Fixed seed so every call yields the same rows.
pub const SAMPLE_SEED: u64 = 42;

const CATEGORIES: [&str; 3] = ["A", "B", "C"];
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const MS_PER_DAY: i64 = 86_400_000;

/// Synthesize the 100-row sales demo dataset.
///
/// `profit` is correlated with `sales` by construction and `satisfaction`
/// is derived from the profit margin. The random stream is seeded, so two
/// calls produce identical datasets.
pub fn generate_sample_dataset() -> Result<Dataset> {
    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let n = SAMPLE_ROWS;

    let sales_dist = Normal::new(1000.0, 200.0).map_err(distribution_error)?;
    let profit_noise = Normal::new(0.0, 30.0).map_err(distribution_error)?;
    let satisfaction_noise = Normal::new(0.0, 0.5).map_err(distribution_error)?;
    let customers_dist = Poisson::new(50.0).map_err(distribution_error)?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| DashboardError::InvalidConfig("invalid sample start date".into()))?
        .and_utc()
        .timestamp_millis();
    let dates: Vec<i64> = (0..n as i64).map(|day| start + day * MS_PER_DAY).collect();

    let sales: Vec<i64> = (0..n)
        .map(|_| (sales_dist.sample(&mut rng) as i64).max(1))
        .collect();
    let category: Vec<&str> = (0..n)
        .map(|_| CATEGORIES[rng.gen_range(0..CATEGORIES.len())])
        .collect();
    let region: Vec<&str> = (0..n)
        .map(|_| REGIONS[rng.gen_range(0..REGIONS.len())])
        .collect();
    let customer_count: Vec<i64> = (0..n)
        .map(|_| customers_dist.sample(&mut rng) as i64)
        .collect();
    let profit: Vec<i64> = sales
        .iter()
        .map(|&s| (s as f64 * 0.15 + profit_noise.sample(&mut rng)) as i64)
        .collect();
    let satisfaction: Vec<f64> = sales
        .iter()
        .zip(&profit)
        .map(|(&s, &p)| {
            let raw = p as f64 / s as f64 * 100.0 * 5.0 + satisfaction_noise.sample(&mut rng);
            round_to(raw.clamp(1.0, 5.0), 1)
        })
        .collect();

    let date = Series::new("date".into(), dates)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let frame = DataFrame::new(vec![
        date.into(),
        Series::new("sales".into(), sales).into(),
        Series::new("profit".into(), profit).into(),
        Series::new("category".into(), category).into(),
        Series::new("region".into(), region).into(),
        Series::new("customer_count".into(), customer_count).into(),
        Series::new("satisfaction".into(), satisfaction).into(),
    ])?;

    debug!("Sample data generated: {:?}", frame.shape());
    Ok(Dataset::new(frame))
}

fn distribution_error(e: impl std::fmt::Display) -> DashboardError {
    DashboardError::InvalidConfig(format!("invalid sample distribution: {}", e))
}
