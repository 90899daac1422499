//! Statistical functions for column summaries.

use std::collections::HashMap;

use polars::prelude::*;

use crate::error::Result;
use crate::types::{CategoricalColumnStats, NumericColumnStats};
use crate::utils::{any_value_label, numeric_values};

/// Descriptive statistics of a numeric column (nulls ignored).
pub(crate) fn describe_numeric(series: &Series) -> Result<NumericColumnStats> {
    let mut values = numeric_values(series)?;
    values.retain(|v| !v.is_nan());
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);

    Ok(NumericColumnStats {
        column: series.name().to_string(),
        count,
        mean,
        std: calculate_std(&values),
        min: values.first().copied(),
        q25: percentile(&values, 0.25),
        median: percentile(&values, 0.50),
        q75: percentile(&values, 0.75),
        max: values.last().copied(),
    })
}

/// Unique count and mode of a categorical column (nulls ignored).
pub(crate) fn describe_categorical(series: &Series) -> Result<CategoricalColumnStats> {
    let non_null = series.drop_nulls();

    // first-seen position breaks ties between equally frequent values
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, value) in non_null.rechunk().iter().enumerate() {
        let entry = counts.entry(any_value_label(&value)).or_insert((0, position));
        entry.0 += 1;
    }

    let mode = counts
        .iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, (count, _))| (value.clone(), *count));

    Ok(CategoricalColumnStats {
        column: series.name().to_string(),
        unique_values: counts.len(),
        most_frequent: mode.as_ref().map(|(value, _)| value.clone()),
        frequency: mode.map(|(_, count)| count).unwrap_or(0),
    })
}

/// Sample standard deviation (n - 1). `None` below two values.
pub(crate) fn calculate_std(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    if values.len() < 2 {
        return None;
    }

    let mean = values.iter().sum::<f64>() / n;
    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt())
}

/// Linearly interpolated percentile of sorted values.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let rank = q * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== calculate_std tests ====================

    #[test]
    fn test_calculate_std_basic() {
        // Mean = 3, Variance = 10 / 4 = 2.5
        let std = calculate_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_calculate_std_single_value() {
        assert_eq!(calculate_std(&[5.0]), None);
        assert_eq!(calculate_std(&[]), None);
    }

    #[test]
    fn test_calculate_std_identical_values() {
        assert_eq!(calculate_std(&[5.0, 5.0, 5.0, 5.0]), Some(0.0));
    }

    // ==================== percentile tests ====================

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.25), Some(1.75));
        assert_eq!(percentile(&values, 0.50), Some(2.5));
        assert_eq!(percentile(&values, 0.75), Some(3.25));
    }

    #[test]
    fn test_percentile_edges() {
        assert_eq!(percentile(&[], 0.5), None);
        assert_eq!(percentile(&[7.0], 0.25), Some(7.0));
        assert_eq!(percentile(&[1.0, 9.0], 0.0), Some(1.0));
        assert_eq!(percentile(&[1.0, 9.0], 1.0), Some(9.0));
    }

    // ==================== describe tests ====================

    #[test]
    fn test_describe_numeric() {
        let series = Series::new("price".into(), &[Some(10.0f64), None, Some(30.0), Some(20.0)]);
        let stats = describe_numeric(&series).unwrap();

        assert_eq!(stats.column, "price");
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, Some(20.0));
        assert_eq!(stats.std, Some(10.0));
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.q25, Some(15.0));
        assert_eq!(stats.median, Some(20.0));
        assert_eq!(stats.q75, Some(25.0));
        assert_eq!(stats.max, Some(30.0));
    }

    #[test]
    fn test_describe_numeric_all_null() {
        let series = Series::new("v".into(), &[None::<i64>, None]);
        let stats = describe_numeric(&series).unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.max, None);
    }

    #[test]
    fn test_describe_categorical_mode() {
        let series = Series::new("category".into(), &["a", "b", "a", "b", "a"]);
        let stats = describe_categorical(&series).unwrap();

        assert_eq!(stats.unique_values, 2);
        assert_eq!(stats.most_frequent.as_deref(), Some("a"));
        assert_eq!(stats.frequency, 3);
    }

    #[test]
    fn test_describe_categorical_tie_prefers_first_seen() {
        let series = Series::new("region".into(), &["West", "East", "East", "West", "North"]);
        let stats = describe_categorical(&series).unwrap();
        assert_eq!(stats.most_frequent.as_deref(), Some("West"));
        assert_eq!(stats.frequency, 2);
    }

    #[test]
    fn test_describe_categorical_all_null() {
        let series = Series::new("empty".into(), &[None::<&str>, None]);
        let stats = describe_categorical(&series).unwrap();
        assert_eq!(stats.unique_values, 0);
        assert_eq!(stats.most_frequent, None);
        assert_eq!(stats.frequency, 0);
    }
}
