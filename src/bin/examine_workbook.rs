use std::path::PathBuf;

use calamine::{open_workbook_auto, DataType, Reader};
use clap::Parser;

#[derive(Parser)]
#[command(name = "examine-workbook")]
#[command(about = "Dump sheet names and a row preview from a cached WITS workbook", long_about = None)]
struct Cli {
    /// Path to the .xlsx file to examine
    file: PathBuf,

    /// Sheet to preview (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Number of rows to preview
    #[arg(long, default_value = "40")]
    rows: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("Opening workbook: {}", cli.file.display());
    let mut workbook = open_workbook_auto(&cli.file)?;

    println!("\nSheet names:");
    for (i, name) in workbook.sheet_names().iter().enumerate() {
        println!("  {i}: {name}");
    }

    let sheet_name = match cli.sheet {
        Some(name) => name,
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or("workbook contains no sheets")?,
    };

    println!("\nExamining sheet: {sheet_name}");
    println!("{}", "=".repeat(100));

    let range = workbook.worksheet_range(&sheet_name)?;
    println!("Dimensions: {:?}", range.get_size());

    for (row_idx, row) in range.rows().enumerate().take(cli.rows) {
        // Only print rows with data
        let has_data = row.iter().any(|cell| !cell.is_empty());
        if !has_data {
            continue;
        }

        print!("Row {:3}: ", row_idx + 1);
        for cell in row.iter().take(10) {
            if cell.is_empty() {
                print!("[empty] ");
            } else {
                print!("[{cell}] ");
            }
        }
        println!();
    }

    Ok(())
}
