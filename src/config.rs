use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Partner label under which the residual is accumulated; renamed to
/// [`REST_OF_WORLD_LABEL`] in the final table.
pub const WORLD_LABEL: &str = "World";
pub const REST_OF_WORLD_LABEL: &str = "Rest of World";
pub const EU_LABEL: &str = "European Union";

/// Trade flow direction as encoded by the WITS download endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Import,
    Export,
}

impl Flow {
    /// Single-letter code used in download URLs and cache file names.
    pub fn code(&self) -> &'static str {
        match self {
            Flow::Import => "I",
            Flow::Export => "E",
        }
    }

    /// Label used in the Tradeflow column of the report.
    pub fn label(&self) -> &'static str {
        match self {
            Flow::Import => "Import",
            Flow::Export => "Export",
        }
    }

    /// The opposite direction, used when mirroring EU-reported figures.
    pub fn inverse(&self) -> Flow {
        match self {
            Flow::Import => Flow::Export,
            Flow::Export => Flow::Import,
        }
    }
}

/// A reporting country or region: display label plus WITS reporter code.
#[derive(Debug, Clone)]
pub struct Reporter {
    pub label: String,
    pub code: String,
}

impl Reporter {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }
}

/// Fixed run configuration: reporters, partners, years, flows, product codes,
/// currency rates and output settings. Built once at startup and passed by
/// reference to the pipeline stages; nothing here is read from the
/// environment or the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub reporters: Vec<Reporter>,
    /// The six counterpart countries reported individually.
    pub base_partners: Vec<String>,
    /// EU member states, excluded from the Rest of World residual.
    pub eu_members: Vec<String>,
    pub years: Vec<i32>,
    pub flows: [Flow; 2],
    /// HS6 commodity subcodes of chapter 4301 (raw furskins).
    pub products: Vec<String>,
    pub usd_to_eur: HashMap<i32, f64>,
    pub base_url: String,
    pub use_cache: bool,
    pub cache_dir: PathBuf,
    pub out_basename: String,
}

impl Config {
    pub fn new() -> Self {
        let reporters = vec![
            Reporter::new(EU_LABEL, "EUN"),
            Reporter::new("China", "CHN"),
            Reporter::new("Chile", "CHL"),
            Reporter::new("Canada", "CAN"),
            Reporter::new("United States", "USA"),
            Reporter::new("Russian Federation", "RUS"),
            Reporter::new("Argentina", "ARG"),
        ];

        let base_partners = [
            "United States",
            "China",
            "Russian Federation",
            "Canada",
            "Argentina",
            "Chile",
        ]
        .map(String::from)
        .to_vec();

        let eu_members = [
            "Austria",
            "Belgium",
            "Bulgaria",
            "Croatia",
            "Cyprus",
            "Czech Republic",
            "Denmark",
            "Estonia",
            "Finland",
            "France",
            "Germany",
            "Greece",
            "Hungary",
            "Ireland",
            "Italy",
            "Latvia",
            "Lithuania",
            "Luxembourg",
            "Malta",
            "Netherlands",
            "Poland",
            "Portugal",
            "Romania",
            "Slovak Republic",
            "Slovenia",
            "Spain",
            "Sweden",
        ]
        .map(String::from)
        .to_vec();

        let products = [
            "430110", "430120", "430130", "430140", "430150", "430160", "430170", "430180",
            "430190",
        ]
        .map(String::from)
        .to_vec();

        let usd_to_eur = HashMap::from([
            (2024, 0.924),
            (2023, 0.924),
            (2022, 0.951),
            (2021, 0.846),
            (2020, 0.877),
        ]);

        Self {
            reporters,
            base_partners,
            eu_members,
            years: vec![2020, 2021, 2022, 2023, 2024],
            flows: [Flow::Import, Flow::Export],
            products,
            usd_to_eur,
            base_url: "https://wits.worldbank.org/Download.aspx".to_string(),
            use_cache: true,
            cache_dir: PathBuf::from("wits_cache"),
            out_basename: "Fur_Trade_Data_HS_4301".to_string(),
        }
    }

    /// Partner column values of the accumulated series: the six base partners
    /// plus the "World" placeholder.
    pub fn partners(&self) -> Vec<String> {
        let mut partners = self.base_partners.clone();
        partners.push(WORLD_LABEL.to_string());
        partners
    }

    /// Partner labels excluded from the Rest of World residual: the base
    /// partners, the "World" aggregate row, the EU aggregate row, and every
    /// EU member state.
    pub fn rest_of_world_exclusions(&self) -> HashSet<String> {
        let mut exclude: HashSet<String> = self.base_partners.iter().cloned().collect();
        exclude.insert(EU_LABEL.to_string());
        exclude.insert(WORLD_LABEL.to_string());
        exclude.extend(self.eu_members.iter().cloned());
        exclude
    }

    /// USD to EUR conversion rate for a year, if one is configured.
    pub fn eur_rate(&self, year: i32) -> Option<f64> {
        self.usd_to_eur.get(&year).copied()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
