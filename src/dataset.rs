//! The assembled player table: what the ingest writes and the dashboard loads.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::DatasetError;

/// Columns the dashboard reads. A file lacking any of them is rejected at
/// load time.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "position",
    "year",
    "z_score",
    "total_points",
    "average_points",
    "salary",
    "height_inches",
    "weight_lbs",
    "player_name",
    "age",
    "experience_years",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numbers where the text reads as a finite float, `Missing` for blanks
    /// and `nan`, text otherwise.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    /// Non-finite numbers are stored as `Missing`.
    pub fn number(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Missing,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// CSV rendering. Whole numbers print without a fraction.
    pub fn render(&self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Borrowed view of one table row, addressed by column name.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        let col = self.table.column_index(column)?;
        self.table.rows[self.index].get(col)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Cell::as_f64)
    }

    /// Text or rendered number; `None` when missing.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            Cell::Missing => None,
            cell => Some(cell.render()),
        }
    }

    pub fn cells(&self) -> &'a [Cell] {
        &self.table.rows[self.index]
    }
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self, DatasetError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), DatasetError> {
        if row.len() != self.columns.len() {
            return Err(DatasetError::LengthMismatch {
                column: format!("row {}", self.rows.len()),
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[col]).collect())
    }

    /// Appends a column matched to existing rows by position. The value count
    /// must equal the row count and the name must be new.
    pub fn with_column(mut self, name: &str, values: Vec<Cell>) -> Result<Self, DatasetError> {
        if self.has_column(name) {
            return Err(DatasetError::DuplicateColumn(name.to_string()));
        }
        if values.len() != self.rows.len() {
            return Err(DatasetError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows.len(),
                got: values.len(),
            });
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(self)
    }

    /// Appends the rows of `other`, which must have identical columns.
    pub fn append(&mut self, other: Table) -> Result<(), DatasetError> {
        if other.columns != self.columns {
            return Err(DatasetError::SchemaMismatch {
                expected: self.columns.clone(),
                got: other.columns,
            });
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Rows for which `keep` holds, all columns preserved.
    pub fn filter(&self, mut keep: impl FnMut(&Row<'_>) -> bool) -> Table {
        let rows = self
            .rows()
            .filter(|row| keep(row))
            .map(|row| row.cells().to_vec())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Distinct rendered values of a column in first-seen order.
    pub fn distinct(&self, column: &str) -> Vec<Cell> {
        let Some(cells) = self.column(column) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for cell in cells {
            if cell.is_missing() {
                continue;
            }
            if seen.insert(cell.render()) {
                out.push(cell.clone());
            }
        }
        out
    }

    pub fn require_columns(&self, required: &[&str]) -> Result<(), DatasetError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DatasetError::MissingColumns(missing))
        }
    }

    pub fn from_csv_reader<R: Read>(rdr: R, source: &str) -> Result<Self, DatasetError> {
        let csv_err = |source_err: csv::Error| DatasetError::Csv {
            path: source.to_string(),
            source: source_err,
        };
        let mut reader = csv::Reader::from_reader(rdr);
        let headers = reader.headers().map_err(csv_err)?.clone();
        let mut table = Table::new(headers.iter().map(|h| h.trim().to_string()))?;
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            table.push_row(record.iter().map(Cell::from_raw).collect())?;
        }
        Ok(table)
    }

    pub fn read_csv(path: &Path) -> Result<Self, DatasetError> {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_csv_reader(file, &display)
    }

    pub fn to_csv_writer<W: Write>(&self, w: W, target: &str) -> Result<(), DatasetError> {
        let csv_err = |source: csv::Error| DatasetError::Csv {
            path: target.to_string(),
            source,
        };
        let mut writer = csv::Writer::from_writer(w);
        writer.write_record(&self.columns).map_err(csv_err)?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(Cell::render))
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|source| DatasetError::Io {
            path: target.to_string(),
            source,
        })
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), DatasetError> {
        let display = path.display().to_string();
        let file = File::create(path).map_err(|source| DatasetError::Io {
            path: display.clone(),
            source,
        })?;
        self.to_csv_writer(file, &display)
    }
}

/// Reads the dashboard CSV and checks the required columns are present.
pub fn load_player_table(path: &Path) -> Result<Table, DatasetError> {
    let table = Table::read_csv(path)?;
    table.require_columns(REQUIRED_COLUMNS)?;
    Ok(table)
}

/// Rows whose position is one of `positions` and whose year is `year`.
pub fn filter_position_year(table: &Table, positions: &[String], year: i64) -> Table {
    table.filter(|row| {
        let year_ok = row.number("year") == Some(year as f64);
        let pos_ok = row
            .text("position")
            .is_some_and(|p| positions.iter().any(|want| *want == p));
        year_ok && pos_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
player_name,position,year,total_points
A QB,QB,2020,300.5
B RB,RB,2020,
C QB,QB,2019,nan
";

    #[test]
    fn csv_cells_are_typed() {
        let table = Table::from_csv_reader(SAMPLE.as_bytes(), "sample").unwrap();
        assert_eq!(table.len(), 3);
        let first = table.row(0).unwrap();
        assert_eq!(first.number("total_points"), Some(300.5));
        assert_eq!(first.text("year").as_deref(), Some("2020"));
        assert!(table.row(1).unwrap().get("total_points").unwrap().is_missing());
        assert!(table.row(2).unwrap().get("total_points").unwrap().is_missing());
    }

    #[test]
    fn missing_columns_fail() {
        let table = Table::from_csv_reader(SAMPLE.as_bytes(), "sample").unwrap();
        let err = table.require_columns(REQUIRED_COLUMNS).unwrap_err();
        let DatasetError::MissingColumns(missing) = err else {
            panic!("expected missing columns");
        };
        assert!(missing.contains(&"z_score".to_string()));
        assert!(!missing.contains(&"position".to_string()));
    }

    #[test]
    fn with_column_checks_length_and_name() {
        let table = Table::from_csv_reader(SAMPLE.as_bytes(), "sample").unwrap();
        let err = table
            .clone()
            .with_column("extra", vec![Cell::Missing])
            .unwrap_err();
        assert!(matches!(err, DatasetError::LengthMismatch { expected: 3, got: 1, .. }));
        let err = table
            .clone()
            .with_column("year", vec![Cell::Missing; 3])
            .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateColumn(_)));
        let ok = table.with_column("extra", vec![Cell::Number(1.0); 3]).unwrap();
        assert_eq!(ok.columns().len(), 5);
    }

    #[test]
    fn csv_round_trip_keeps_blanks() {
        let table = Table::from_csv_reader(SAMPLE.as_bytes(), "sample").unwrap();
        let mut out = Vec::new();
        table.to_csv_writer(&mut out, "mem").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("player_name,position,year,total_points\n"));
        assert!(text.contains("B RB,RB,2020,\n"));
    }

    #[test]
    fn distinct_keeps_first_seen_order() {
        let table = Table::from_csv_reader(SAMPLE.as_bytes(), "sample").unwrap();
        let positions: Vec<String> = table.distinct("position").iter().map(Cell::render).collect();
        assert_eq!(positions, vec!["QB", "RB"]);
        let years: Vec<String> = table.distinct("year").iter().map(Cell::render).collect();
        assert_eq!(years, vec!["2020", "2019"]);
    }
}
