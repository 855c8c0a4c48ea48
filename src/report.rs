//! Expands the accumulated series into the final report table.

use serde::Serialize;

use crate::aggregator::{SeriesKey, TradeAccumulator, TradeTotals};
use crate::config::{Config, Flow, EU_LABEL, REST_OF_WORLD_LABEL, WORLD_LABEL};

/// One row of the combined report. Serde renames match the output column
/// headers exactly.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Reporter")]
    pub reporter: String,
    #[serde(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Tradeflow")]
    pub tradeflow: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Quantity in kg")]
    pub quantity_kg: f64,
    #[serde(rename = "Trade Value USD")]
    pub trade_value_usd: f64,
    #[serde(rename = "Trade Value EUR")]
    pub trade_value_eur: f64,
}

fn make_row(
    reporter: &str,
    partner: &str,
    flow: Flow,
    year: i32,
    totals: TradeTotals,
    config: &Config,
) -> ReportRow {
    let trade_value_usd = totals.value_1000usd * 1000.0;
    let trade_value_eur = match config.eur_rate(year) {
        Some(rate) => trade_value_usd * rate,
        None => f64::NAN,
    };

    ReportRow {
        reporter: reporter.to_string(),
        partner: partner.to_string(),
        tradeflow: flow.label().to_string(),
        year,
        quantity_kg: totals.quantity_kg,
        trade_value_usd,
        trade_value_eur,
    }
}

/// Builds the final sorted table from the accumulated series.
///
/// Primary rows cover every reporter x partner x year x flow combination.
/// Mirrored EU rows follow: for each non-EU reporter, the EU reporter's
/// accumulated figures for partner = that reporter at the inverse flow stand
/// in for the reporter's own trade with the EU, emitted under the original
/// flow label. A series the EU accumulator never saw mirrors as zero.
pub fn build_report(accumulator: &TradeAccumulator, config: &Config) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for reporter in &config.reporters {
        for partner in config.partners() {
            for &year in &config.years {
                for &flow in &config.flows {
                    let key = SeriesKey::new(reporter.label.clone(), partner.clone(), year, flow);
                    rows.push(make_row(
                        &reporter.label,
                        &partner,
                        flow,
                        year,
                        accumulator.totals(&key),
                        config,
                    ));
                }
            }
        }
    }

    for reporter in &config.reporters {
        if reporter.label == EU_LABEL {
            continue;
        }
        for &year in &config.years {
            for &flow in &config.flows {
                let key = SeriesKey::new(EU_LABEL, reporter.label.clone(), year, flow.inverse());
                rows.push(make_row(
                    &reporter.label,
                    EU_LABEL,
                    flow,
                    year,
                    accumulator.totals(&key),
                    config,
                ));
            }
        }
    }

    rows.retain(|row| row.reporter != row.partner);

    for row in &mut rows {
        if row.partner == WORLD_LABEL {
            row.partner = REST_OF_WORLD_LABEL.to_string();
        }
    }

    // "Export" sorts before "Import", so ordering by label is ascending
    rows.sort_by(|a, b| {
        (&a.reporter, &a.partner, a.year, &a.tradeflow)
            .cmp(&(&b.reporter, &b.partner, b.year, &b.tradeflow))
    });

    rows
}
