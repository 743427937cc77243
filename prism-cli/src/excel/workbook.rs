//! In-memory workbook model
//!
//! Pure data structure, no file I/O: the reader fills it from calamine and
//! the writer serializes it with rust_xlsxwriter. The writeback engine works
//! exclusively against this model, which keeps it testable without touching
//! the filesystem.

use std::collections::HashMap;

/// Visual status applied to a written cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Bold white on green.
    Success,
    /// Bold white on red.
    Failure,
}

/// One worksheet: a header row plus data rows, all cells as text.
#[derive(Debug, Clone, Default)]
pub struct SheetBuffer {
    pub name: String,
    pub headers: Vec<String>,
    /// Data rows; index 0 is the first row under the header.
    pub rows: Vec<Vec<String>>,
    styles: HashMap<(usize, usize), CellStyle>,
}

impl SheetBuffer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Find a column by exact header text.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Return the column with the given header, appending it at the next
    /// free index when absent. Idempotent: repeated calls with the same
    /// header never create duplicates.
    pub fn ensure_column(&mut self, header: &str) -> usize {
        if let Some(col) = self.column_index(header) {
            return col;
        }
        self.headers.push(header.to_string());
        self.headers.len() - 1
    }

    /// Cell text at (data row, column); empty string when out of range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Write cell text, growing the row to fit.
    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) {
        while self.rows.len() <= row {
            self.rows.push(Vec::new());
        }
        let cells = &mut self.rows[row];
        while cells.len() <= col {
            cells.push(String::new());
        }
        cells[col] = value.to_string();
    }

    pub fn set_style(&mut self, row: usize, col: usize, style: CellStyle) {
        self.styles.insert((row, col), style);
    }

    pub fn style(&self, row: usize, col: usize) -> Option<CellStyle> {
        self.styles.get(&(row, col)).copied()
    }
}

/// A full workbook as loaded at the start of a run.
#[derive(Debug, Clone, Default)]
pub struct WorkbookBuffer {
    pub sheets: Vec<SheetBuffer>,
}

impl WorkbookBuffer {
    pub fn sheet(&self, name: &str) -> Option<&SheetBuffer> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut SheetBuffer> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Get a sheet by name, creating an empty one at the end when absent.
    pub fn ensure_sheet(&mut self, name: &str) -> &mut SheetBuffer {
        if let Some(idx) = self.sheets.iter().position(|s| s.name == name) {
            return &mut self.sheets[idx];
        }
        self.sheets.push(SheetBuffer::new(name));
        self.sheets.last_mut().unwrap()
    }

    /// Replace a sheet's contents wholesale, preserving its position.
    pub fn replace_sheet(&mut self, sheet: SheetBuffer) {
        if let Some(idx) = self.sheets.iter().position(|s| s.name == sheet.name) {
            self.sheets[idx] = sheet;
        } else {
            self.sheets.push(sheet);
        }
    }
}
