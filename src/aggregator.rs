//! Row preparation and summation over parsed product sheets.

use std::collections::{HashMap, HashSet};

use calamine::Data;
use thiserror::Error;

use crate::config::{Config, Flow};
use crate::importers::excel_importer::{cell_to_string, SheetTable};

pub const COL_PARTNER: &str = "Partner";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_QUANTITY_UNIT: &str = "Quantity Unit";
pub const COL_TRADE_VALUE: &str = "Trade Value 1000USD";

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Missing expected columns: {missing:?}. Found: {found:?}")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },
}

/// One prepared row from a product sheet: trimmed partner label plus the
/// numeric quantity and value figures. Only kg rows become records.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub partner: String,
    pub quantity: f64,
    pub value_1000usd: f64,
}

/// Quantity/value sums for one series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TradeTotals {
    pub quantity_kg: f64,
    pub value_1000usd: f64,
}

impl TradeTotals {
    pub fn new(quantity_kg: f64, value_1000usd: f64) -> Self {
        Self {
            quantity_kg,
            value_1000usd,
        }
    }

    pub fn add(&mut self, other: TradeTotals) {
        self.quantity_kg += other.quantity_kg;
        self.value_1000usd += other.value_1000usd;
    }
}

/// Composite accumulator key; the four fields hash and compare as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub reporter: String,
    pub partner: String,
    pub year: i32,
    pub flow: Flow,
}

impl SeriesKey {
    pub fn new(reporter: impl Into<String>, partner: impl Into<String>, year: i32, flow: Flow) -> Self {
        Self {
            reporter: reporter.into(),
            partner: partner.into(),
            year,
            flow,
        }
    }
}

/// Running totals per (reporter, partner, year, flow) series, summed across
/// product codes.
#[derive(Debug, Default)]
pub struct TradeAccumulator {
    totals: HashMap<SeriesKey, TradeTotals>,
}

impl TradeAccumulator {
    /// Zero entry for every reporter x partner x year x flow combination in
    /// the configuration.
    pub fn with_zeroed_series(config: &Config) -> Self {
        let mut totals = HashMap::new();
        for reporter in &config.reporters {
            for partner in config.partners() {
                for &year in &config.years {
                    for &flow in &config.flows {
                        totals.insert(
                            SeriesKey::new(reporter.label.clone(), partner.clone(), year, flow),
                            TradeTotals::default(),
                        );
                    }
                }
            }
        }
        Self { totals }
    }

    /// Adds a contribution into the series' running totals.
    pub fn add(&mut self, key: SeriesKey, contribution: TradeTotals) {
        self.totals.entry(key).or_default().add(contribution);
    }

    /// Totals for a series. A key that was never written reads as zero.
    pub fn totals(&self, key: &SeriesKey) -> TradeTotals {
        self.totals.get(key).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

fn cell_text(row: &[Data], col: usize) -> String {
    row.get(col).map(cell_to_string).unwrap_or_default()
}

/// Numeric coercion for quantity and value cells; anything unparseable
/// counts as zero.
fn cell_number(row: &[Data], col: usize) -> f64 {
    match row.get(col) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        Some(Data::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Validates the required columns and reduces a sheet to its kg rows.
///
/// Partner labels are trimmed, and only rows whose quantity unit equals
/// "kg" case-insensitively survive; rows in any other unit are dropped,
/// not converted.
pub fn prepare_kg_rows(table: &SheetTable) -> Result<Vec<TradeRecord>, AggregateError> {
    let partner_col = table.column_index(COL_PARTNER);
    let quantity_col = table.column_index(COL_QUANTITY);
    let unit_col = table.column_index(COL_QUANTITY_UNIT);
    let value_col = table.column_index(COL_TRADE_VALUE);

    let (Some(partner_col), Some(quantity_col), Some(unit_col), Some(value_col)) =
        (partner_col, quantity_col, unit_col, value_col)
    else {
        let missing = [COL_PARTNER, COL_QUANTITY, COL_QUANTITY_UNIT, COL_TRADE_VALUE]
            .iter()
            .zip([partner_col, quantity_col, unit_col, value_col])
            .filter(|(_, index)| index.is_none())
            .map(|(name, _)| (*name).to_string())
            .collect();
        return Err(AggregateError::MissingColumns {
            missing,
            found: table.headers.clone(),
        });
    };

    let mut records = Vec::new();
    for row in &table.rows {
        let unit = cell_text(row, unit_col);
        if !unit.eq_ignore_ascii_case("kg") {
            continue;
        }

        records.push(TradeRecord {
            partner: cell_text(row, partner_col),
            quantity: cell_number(row, quantity_col),
            value_1000usd: cell_number(row, value_col),
        });
    }

    Ok(records)
}

/// Per-partner sums over prepared rows. Partners absent from the data are
/// reported with zero totals.
pub fn sum_for_partners(
    records: &[TradeRecord],
    partners: &[String],
) -> HashMap<String, TradeTotals> {
    let mut sums: HashMap<String, TradeTotals> = partners
        .iter()
        .map(|partner| (partner.clone(), TradeTotals::default()))
        .collect();

    for record in records {
        if let Some(totals) = sums.get_mut(&record.partner) {
            totals.add(TradeTotals::new(record.quantity, record.value_1000usd));
        }
    }

    sums
}

/// Ungrouped sum over every row whose partner is not excluded. This is the
/// Rest of World residual for one product sheet.
pub fn rest_of_world_sum(records: &[TradeRecord], exclude: &HashSet<String>) -> TradeTotals {
    let mut totals = TradeTotals::default();
    for record in records.iter().filter(|r| !exclude.contains(&r.partner)) {
        totals.add(TradeTotals::new(record.quantity, record.value_1000usd));
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_table() -> SheetTable {
        // Reporter "United States", year 2024, flow E, product 430110
        SheetTable {
            headers: vec![
                "Reporter".to_string(),
                COL_PARTNER.to_string(),
                COL_QUANTITY.to_string(),
                COL_QUANTITY_UNIT.to_string(),
                COL_TRADE_VALUE.to_string(),
            ],
            rows: vec![
                vec![
                    Data::String("United States".to_string()),
                    Data::String("China".to_string()),
                    Data::Float(100.0),
                    Data::String("Kg".to_string()),
                    Data::Float(50.0),
                ],
                vec![
                    Data::String("United States".to_string()),
                    Data::String("Japan".to_string()),
                    Data::Float(10.0),
                    Data::String("KG".to_string()),
                    Data::Float(5.0),
                ],
            ],
        }
    }

    #[test]
    fn test_prepare_kg_rows_accepts_any_kg_casing() {
        let records = prepare_kg_rows(&product_table()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].partner, "China");
        assert_eq!(records[0].quantity, 100.0);
        assert_eq!(records[1].partner, "Japan");
        assert_eq!(records[1].value_1000usd, 5.0);
    }

    #[test]
    fn test_prepare_kg_rows_drops_other_units() {
        let mut table = product_table();
        table.rows.push(vec![
            Data::String("United States".to_string()),
            Data::String("Canada".to_string()),
            Data::Float(7000.0),
            Data::String("No Quantity".to_string()),
            Data::Float(3.0),
        ]);

        let records = prepare_kg_rows(&table).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.partner != "Canada"));
    }

    #[test]
    fn test_prepare_kg_rows_trims_partner_labels() {
        let mut table = product_table();
        table.rows.push(vec![
            Data::String("United States".to_string()),
            Data::String("  Chile ".to_string()),
            Data::Float(1.0),
            Data::String(" kg ".to_string()),
            Data::Float(2.0),
        ]);

        let records = prepare_kg_rows(&table).unwrap();
        assert_eq!(records[2].partner, "Chile");
    }

    #[test]
    fn test_prepare_kg_rows_coerces_bad_numbers_to_zero() {
        let mut table = product_table();
        table.rows.push(vec![
            Data::String("United States".to_string()),
            Data::String("Norway".to_string()),
            Data::String("n/a".to_string()),
            Data::String("kg".to_string()),
            Data::Empty,
        ]);

        let records = prepare_kg_rows(&table).unwrap();
        let norway = records.iter().find(|r| r.partner == "Norway").unwrap();
        assert_eq!(norway.quantity, 0.0);
        assert_eq!(norway.value_1000usd, 0.0);
    }

    #[test]
    fn test_prepare_kg_rows_parses_numeric_strings() {
        let mut table = product_table();
        table.rows.push(vec![
            Data::String("United States".to_string()),
            Data::String("Norway".to_string()),
            Data::String(" 42.5 ".to_string()),
            Data::String("kg".to_string()),
            Data::Int(3),
        ]);

        let records = prepare_kg_rows(&table).unwrap();
        let norway = records.iter().find(|r| r.partner == "Norway").unwrap();
        assert_eq!(norway.quantity, 42.5);
        assert_eq!(norway.value_1000usd, 3.0);
    }

    #[test]
    fn test_missing_columns_named_in_error() {
        let table = SheetTable {
            headers: vec!["Reporter".to_string(), COL_PARTNER.to_string()],
            rows: Vec::new(),
        };

        let err = prepare_kg_rows(&table).unwrap_err();
        let AggregateError::MissingColumns { missing, found } = err;
        assert_eq!(
            missing,
            vec![
                COL_QUANTITY.to_string(),
                COL_QUANTITY_UNIT.to_string(),
                COL_TRADE_VALUE.to_string()
            ]
        );
        assert_eq!(found, vec!["Reporter".to_string(), COL_PARTNER.to_string()]);
    }

    #[test]
    fn test_sum_for_partners_with_exclusion_example() {
        let records = prepare_kg_rows(&product_table()).unwrap();

        let partners = vec!["China".to_string()];
        let sums = sum_for_partners(&records, &partners);
        assert_eq!(sums.len(), 1);
        assert_eq!(sums["China"], TradeTotals::new(100.0, 50.0));

        let exclude: HashSet<String> = ["China".to_string()].into_iter().collect();
        let rest = rest_of_world_sum(&records, &exclude);
        assert_eq!(rest, TradeTotals::new(10.0, 5.0));
    }

    #[test]
    fn test_sum_for_partners_absent_partner_is_zero() {
        let records = prepare_kg_rows(&product_table()).unwrap();
        let partners = vec!["China".to_string(), "Argentina".to_string()];
        let sums = sum_for_partners(&records, &partners);

        assert_eq!(sums["Argentina"], TradeTotals::default());
    }

    #[test]
    fn test_sum_for_partners_groups_repeated_rows() {
        let mut table = product_table();
        table.rows.push(vec![
            Data::String("United States".to_string()),
            Data::String("China".to_string()),
            Data::Float(25.0),
            Data::String("kg".to_string()),
            Data::Float(10.0),
        ]);

        let records = prepare_kg_rows(&table).unwrap();
        let sums = sum_for_partners(&records, &["China".to_string()]);
        assert_eq!(sums["China"], TradeTotals::new(125.0, 60.0));
    }

    #[test]
    fn test_accumulator_zero_initialized_and_additive() {
        let config = Config::new();
        let mut accumulator = TradeAccumulator::with_zeroed_series(&config);

        // 7 reporters x 7 partners x 5 years x 2 flows
        assert_eq!(accumulator.len(), 490);

        let key = SeriesKey::new("Canada", "China", 2023, Flow::Import);
        assert_eq!(accumulator.totals(&key), TradeTotals::default());

        accumulator.add(key.clone(), TradeTotals::new(10.0, 4.0));
        accumulator.add(key.clone(), TradeTotals::new(2.5, 1.0));
        assert_eq!(accumulator.totals(&key), TradeTotals::new(12.5, 5.0));
    }

    #[test]
    fn test_accumulator_unknown_key_reads_zero() {
        let accumulator = TradeAccumulator::default();
        let key = SeriesKey::new("Nowhere", "Nobody", 1999, Flow::Export);
        assert_eq!(accumulator.totals(&key), TradeTotals::default());
    }
}
