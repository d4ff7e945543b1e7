//! Row-wise derived metrics.
//!
//! A metric is a named pure function from a table row to an optional float.
//! The registry is ordered; applying it appends one column per metric in
//! registration order. New metrics are added with [`MetricRegistry::register`].

use tracing::debug;

use crate::dataset::{Cell, Row, Table};
use crate::error::DatasetError;

pub type MetricFn = fn(&Row<'_>) -> Option<f64>;

/// Pounds-per-square-inch to kg/m².
const BMI_FACTOR: f64 = 703.0;

#[derive(Clone)]
pub struct Metric {
    pub name: String,
    pub formula: MetricFn,
}

#[derive(Clone, Default)]
pub struct MetricRegistry {
    metrics: Vec<Metric>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register("average_cost_per_point", average_cost_per_point)
            .register("bmi", bmi);
        registry
    }

    /// Adds a metric. Re-registering a name swaps its formula in place.
    pub fn register(&mut self, name: &str, formula: MetricFn) -> &mut Self {
        if let Some(existing) = self.metrics.iter_mut().find(|m| m.name == name) {
            existing.formula = formula;
        } else {
            self.metrics.push(Metric {
                name: name.to_string(),
                formula,
            });
        }
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Computes every registered metric and appends it as a column.
    /// Fails if a metric name already names a column.
    pub fn apply(&self, table: Table) -> Result<Table, DatasetError> {
        let mut table = table;
        for metric in &self.metrics {
            let values: Vec<Cell> = table
                .rows()
                .map(|row| Cell::number((metric.formula)(&row)))
                .collect();
            let present = values.iter().filter(|c| !c.is_missing()).count();
            debug!(metric = %metric.name, rows = values.len(), present, "metric derived");
            table = table.with_column(&metric.name, values)?;
        }
        Ok(table)
    }
}

/// `numerator / denominator`, absent when either side is absent, the
/// denominator is zero, or the result is not finite.
pub fn guarded_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    let out = n / d;
    out.is_finite().then_some(out)
}

pub fn average_cost_per_point(row: &Row<'_>) -> Option<f64> {
    guarded_div(row.number("salary"), row.number("total_points"))
}

pub fn bmi(row: &Row<'_>) -> Option<f64> {
    let height = row.number("height_inches");
    let per_inch = guarded_div(row.number("weight_lbs"), height)?;
    guarded_div(Some(per_inch), height).map(|v| v * BMI_FACTOR)
}
