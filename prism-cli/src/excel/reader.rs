//! Load workbook contents and the three reference tables
//!
//! Schemas are validated strictly at load time: a missing required column is
//! a structural error that aborts the run before any row is reconciled.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};

use crate::reconcile::{CategoryRecord, UpdateRequest, VmRecord};

use super::headers;
use super::workbook::{SheetBuffer, WorkbookBuffer};

/// Read every sheet of an xlsx file into a WorkbookBuffer.
///
/// Header text is preserved exactly as stored; no case normalization happens
/// at read time.
pub fn open_workbook_buffer(path: &Path) -> Result<WorkbookBuffer> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let mut buffer = WorkbookBuffer::default();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        let mut sheet = SheetBuffer::new(&sheet_name);
        for (row_idx, row) in range.rows().enumerate() {
            let cells: Vec<String> = row.iter().map(cell_to_string).collect();
            if row_idx == 0 {
                sheet.headers = cells;
            } else {
                sheet.rows.push(cells);
            }
        }
        buffer.sheets.push(sheet);
    }

    Ok(buffer)
}

/// Load the VM registry table.
pub fn load_registry(sheet: &SheetBuffer) -> Result<Vec<VmRecord>> {
    let name_col = require_column(sheet, headers::VM_NAME)?;
    let ext_id_col = require_column(sheet, headers::VM_EXT_ID)?;

    Ok(sheet
        .rows
        .iter()
        .map(|row| VmRecord {
            name: get(row, name_col),
            external_id: get(row, ext_id_col),
        })
        .collect())
}

/// Load the category catalog table. The identifier column is optional and
/// accepted under either spelling.
pub fn load_catalog(sheet: &SheetBuffer) -> Result<Vec<CategoryRecord>> {
    let category_col = require_column(sheet, headers::CATEGORY)?;
    let value_col = require_column(sheet, headers::VALUE)?;
    let identifier_col = sheet
        .column_index(headers::CATEGORY_EXT_ID)
        .or_else(|| sheet.column_index(headers::CATEGORY_EXT_ID_ALT));

    Ok(sheet
        .rows
        .iter()
        .map(|row| {
            let identifier = identifier_col
                .map(|col| get(row, col))
                .filter(|id| !id.is_empty());
            CategoryRecord {
                category: get(row, category_col),
                value: get(row, value_col),
                identifier,
            }
        })
        .collect())
}

/// Load the human-edited request table. Blank rows are kept here (with their
/// row index) so the caller can skip them without losing row alignment.
pub fn load_requests(sheet: &SheetBuffer) -> Result<Vec<UpdateRequest>> {
    let name_col = require_column(sheet, headers::VM_NAME)?;
    let ext_id_col = require_column(sheet, headers::VM_EXT_ID)?;
    let spec_col = require_column(sheet, headers::CATEGORY_SPEC)?;

    Ok(sheet
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| UpdateRequest {
            vm_name: get(row, name_col),
            vm_external_id: get(row, ext_id_col),
            raw_category_spec: row.get(spec_col).cloned().unwrap_or_default(),
            row_index,
        })
        .collect())
}

fn require_column(sheet: &SheetBuffer, header: &str) -> Result<usize> {
    sheet.column_index(header).with_context(|| {
        format!(
            "Sheet '{}' is missing required column '{}'",
            sheet.name, header
        )
    })
}

fn get(row: &[String], col: usize) -> String {
    row.get(col).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
