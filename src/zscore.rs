//! Z-scores of a value column within groups of rows.

use std::collections::HashMap;

use crate::dataset::{Cell, Row, Table};
use crate::error::DatasetError;

/// Below this the group is treated as having no spread.
const STDEV_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Mean and population standard deviation; zeros for an empty slice.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// 0.0 when the pool has no spread.
pub fn compute_zscore(value: f64, stats: &PoolStats) -> f64 {
    if stats.stdev < STDEV_EPSILON {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}

/// Appends `out_column`: the z-score of `value_column` among rows sharing
/// the same values in `group_by`. Rows with a missing value get a missing
/// score and do not count toward their group's statistics.
pub fn with_group_zscores(
    table: Table,
    value_column: &str,
    group_by: &[&str],
    out_column: &str,
) -> Result<Table, DatasetError> {
    let mut required = vec![value_column];
    required.extend_from_slice(group_by);
    table.require_columns(&required)?;

    let group_key = |row: &Row<'_>| -> Vec<String> {
        group_by
            .iter()
            .map(|col| row.text(col).unwrap_or_default())
            .collect()
    };

    let mut pools: HashMap<Vec<String>, Vec<f64>> = HashMap::new();
    for row in table.rows() {
        if let Some(v) = row.number(value_column) {
            pools.entry(group_key(&row)).or_default().push(v);
        }
    }
    let stats: HashMap<Vec<String>, PoolStats> = pools
        .into_iter()
        .map(|(key, values)| (key, compute_pool_stats(&values)))
        .collect();

    let values: Vec<Cell> = table
        .rows()
        .map(|row| {
            let value = row.number(value_column)?;
            let pool = stats.get(&group_key(&row))?;
            Some(compute_zscore(value, pool))
        })
        .map(Cell::number)
        .collect();
    table.with_column(out_column, values)
}

/// `z_score` of `total_points` within each (year, position).
pub fn with_position_zscores(table: Table) -> Result<Table, DatasetError> {
    with_group_zscores(table, "total_points", &["year", "position"], "z_score")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_stats_population() {
        let s = compute_pool_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.stdev - 2.0).abs() < 1e-12);
        assert_eq!(compute_zscore(9.0, &s), 2.0);
    }

    #[test]
    fn flat_pool_scores_zero() {
        let s = compute_pool_stats(&[3.0, 3.0]);
        assert_eq!(compute_zscore(3.0, &s), 0.0);
        assert_eq!(compute_pool_stats(&[]).stdev, 0.0);
    }

    #[test]
    fn scores_are_scaled_within_position_and_year() {
        let csv = "\
player_name,position,year,total_points
a,QB,2020,100
b,QB,2020,300
c,RB,2020,50
d,QB,2019,10
e,QB,2020,
";
        let t = Table::from_csv_reader(csv.as_bytes(), "t").unwrap();
        let out = with_position_zscores(t).unwrap();
        let z: Vec<Option<f64>> = out.rows().map(|r| r.number("z_score")).collect();
        assert_eq!(z, vec![Some(-1.0), Some(1.0), Some(0.0), Some(0.0), None]);
    }
}
