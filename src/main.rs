use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fur_trade_report::config::Config;
use fur_trade_report::report::build_report;
use fur_trade_report::services::TradeReportService;
use fur_trade_report::writer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fur_trade_report=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let config = Config::new();
    info!(
        "Starting WITS fur trade aggregation: {} reporters, {} years, {} products",
        config.reporters.len(),
        config.years.len(),
        config.products.len()
    );

    let service = TradeReportService::new(config.clone())?;
    let accumulator = service.collect_totals().await?;

    let rows = build_report(&accumulator, &config);

    let csv_path = PathBuf::from(format!("{}.csv", config.out_basename));
    let xlsx_path = PathBuf::from(format!("{}.xlsx", config.out_basename));
    writer::write_csv(&csv_path, &rows)?;
    writer::write_xlsx(&xlsx_path, &rows)?;

    writer::print_table(&rows);

    info!("Report complete: {} rows", rows.len());
    Ok(())
}
