//! Serialize a WorkbookBuffer back to disk
//!
//! rust_xlsxwriter cannot patch an existing file, so the whole workbook is
//! rewritten in one save. Callers skip this entirely on dry runs.

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, Workbook};

use crate::reconcile::ReconciliationResult;

use super::workbook::{CellStyle, SheetBuffer, WorkbookBuffer};

const SUCCESS_FILL: u32 = 0x00B050;
const FAILURE_FILL: u32 = 0xC00000;

/// Project one reconciliation verdict into the request sheet.
///
/// Writes the literal `OK`/`Mismatch` verdict with success/failure styling,
/// and the comma-joined identifier list (empty for failed rows, so a re-run
/// never leaves stale identifiers from a previously matching row). Skipped
/// rows are never passed in, so their cells stay untouched.
pub fn write_result(
    sheet: &mut SheetBuffer,
    result: &ReconciliationResult,
    status_col: usize,
    identifier_col: Option<usize>,
) {
    let (verdict, style) = if result.ok {
        ("OK", CellStyle::Success)
    } else {
        ("Mismatch", CellStyle::Failure)
    };
    sheet.set_cell(result.row_index, status_col, verdict);
    sheet.set_style(result.row_index, status_col, style);

    if let Some(col) = identifier_col {
        sheet.set_cell(result.row_index, col, &result.resolved_identifiers.join(", "));
    }
}

/// Write every sheet of the buffer to an xlsx file at `path`.
pub fn save_workbook(buffer: &WorkbookBuffer, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let header_format = Format::new().set_bold();
    let success_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(SUCCESS_FILL));
    let failure_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(FAILURE_FILL));

    for sheet in &buffer.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                let excel_row = (row_idx + 1) as u32;
                match sheet.style(row_idx, col) {
                    Some(CellStyle::Success) => {
                        worksheet.write_string_with_format(
                            excel_row,
                            col as u16,
                            value,
                            &success_format,
                        )?;
                    }
                    Some(CellStyle::Failure) => {
                        worksheet.write_string_with_format(
                            excel_row,
                            col as u16,
                            value,
                            &failure_format,
                        )?;
                    }
                    None => {
                        worksheet.write_string(excel_row, col as u16, value)?;
                    }
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    log::info!("Workbook saved to {}", path.display());
    Ok(())
}
