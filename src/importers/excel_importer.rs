use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExcelImportError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Failed to read sheet {name}: {msg}")]
    SheetRead { name: String, msg: String },

    #[error("Workbook contains no sheets")]
    EmptyWorkbook,
}

/// Name of the data sheet in WITS product workbooks.
const PRODUCT_SHEET: &str = "By-HS6Product";

/// A parsed worksheet: column labels from the first row, data rows below it.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl SheetTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| row.iter().map(cell_to_string).collect())
            .unwrap_or_default();
        let rows = rows.map(|row| row.to_vec()).collect();
        Self { headers, rows }
    }
}

/// Renders a cell as a trimmed string; empty cells become the empty string.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Parses workbook bytes into a table.
///
/// Sheet lookup is a two-step precedence: the sheet named `By-HS6Product`
/// when present, otherwise the first sheet in the workbook.
pub fn read_product_sheet(bytes: &[u8]) -> Result<SheetTable, ExcelImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ExcelImportError::WorkbookOpen(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_owned();
    let target = if sheet_names.iter().any(|name| name == PRODUCT_SHEET) {
        PRODUCT_SHEET.to_string()
    } else {
        debug!("Sheet {PRODUCT_SHEET} not present, falling back to first sheet");
        sheet_names
            .first()
            .cloned()
            .ok_or(ExcelImportError::EmptyWorkbook)?
    };

    let range = workbook
        .worksheet_range(&target)
        .map_err(|e| ExcelImportError::SheetRead {
            name: target.clone(),
            msg: e.to_string(),
        })?;

    debug!("Read sheet {target}, dimensions {:?}", range.get_size());
    Ok(SheetTable::from_range(&range))
}
