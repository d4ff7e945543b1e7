use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dataset::{Cell, Table};

pub struct ExportReport {
    pub rows: usize,
    pub columns: usize,
}

/// Writes the table to a single-sheet workbook: header row first, numbers
/// as numbers, missing cells left blank.
pub fn export_table_xlsx(path: &Path, sheet_name: &str, table: &Table) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name)?;
        write_table(sheet, table)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: table.len(),
        columns: table.columns().len(),
    })
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    for (col_idx, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, name)
            .with_context(|| format!("write header {name}"))?;
    }
    for row in table.rows() {
        let row_idx = row.index() as u32 + 1;
        for (col_idx, cell) in row.cells().iter().enumerate() {
            let col_idx = col_idx as u16;
            match cell {
                Cell::Missing => {}
                Cell::Number(v) => {
                    worksheet
                        .write_number(row_idx, col_idx, *v)
                        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
                }
                Cell::Text(s) => {
                    worksheet
                        .write_string(row_idx, col_idx, s)
                        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
                }
            }
        }
    }
    Ok(())
}
