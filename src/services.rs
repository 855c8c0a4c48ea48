pub mod trade_report_service;

pub use trade_report_service::{ImportError, TradeReportService};
