//! Serializes the final table to CSV and XLSX, and prints it to stdout.

use std::io;
use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;
use tracing::info;

use crate::report::ReportRow;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet write failed: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub const COLUMNS: [&str; 7] = [
    "Reporter",
    "Partner",
    "Tradeflow",
    "Year",
    "Quantity in kg",
    "Trade Value USD",
    "Trade Value EUR",
];

/// Writes the report as CSV; the header row comes from the serde renames on
/// [`ReportRow`].
pub fn write_csv(path: &Path, rows: &[ReportRow]) -> Result<(), WriteError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes the report as a single-sheet workbook.
pub fn write_xlsx(path: &Path, rows: &[ReportRow]) -> Result<(), WriteError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = (index + 1) as u32;
        worksheet.write_string(r, 0, &row.reporter)?;
        worksheet.write_string(r, 1, &row.partner)?;
        worksheet.write_string(r, 2, &row.tradeflow)?;
        worksheet.write_number(r, 3, row.year as f64)?;
        worksheet.write_number(r, 4, row.quantity_kg)?;
        worksheet.write_number(r, 5, row.trade_value_usd)?;
        // XLSX cannot hold NaN; an unconverted value leaves the cell blank
        if !row.trade_value_eur.is_nan() {
            worksheet.write_number(r, 6, row.trade_value_eur)?;
        }
    }

    workbook.save(path)?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Dumps the final table to stdout.
pub fn print_table(rows: &[ReportRow]) {
    println!(
        "{:<20} {:<20} {:<10} {:>6} {:>16} {:>18} {:>18}",
        COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4], COLUMNS[5], COLUMNS[6]
    );
    for row in rows {
        println!(
            "{:<20} {:<20} {:<10} {:>6} {:>16.1} {:>18.1} {:>18.1}",
            row.reporter,
            row.partner,
            row.tradeflow,
            row.year,
            row.quantity_kg,
            row.trade_value_usd,
            row.trade_value_eur
        );
    }
}
