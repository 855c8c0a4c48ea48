use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, instrument};

use crate::aggregator::{self, AggregateError, SeriesKey, TradeAccumulator};
use crate::config::{Config, WORLD_LABEL};
use crate::importers::downloader::{DownloadError, ProductRequest, WitsDownloader};
use crate::importers::excel_importer::{self, ExcelImportError};
use crate::importers::workbook_cache::WorkbookCache;

/// Error types for the download-and-aggregate pass
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Workbook parse failed: {0}")]
    Excel(#[from] ExcelImportError),

    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Service that drives the full sequential pass over every configured
/// reporter x year x flow x product combination.
pub struct TradeReportService {
    config: Config,
    downloader: WitsDownloader,
    cache: WorkbookCache,
}

impl TradeReportService {
    /// Creating the service also creates the cache directory when caching is
    /// enabled.
    pub fn new(config: Config) -> std::io::Result<Self> {
        let downloader = WitsDownloader::new(config.base_url.clone());
        let cache = WorkbookCache::new(config.cache_dir.clone(), config.use_cache)?;
        Ok(Self {
            config,
            downloader,
            cache,
        })
    }

    /// Workbook bytes for one request, from the file cache when present,
    /// otherwise downloaded and written back.
    async fn fetch_workbook(&self, request: &ProductRequest) -> Result<Vec<u8>, ImportError> {
        if let Some(bytes) = self.cache.lookup(request)? {
            return Ok(bytes);
        }

        let bytes = self.downloader.download_workbook(request).await?;
        self.cache.store(request, &bytes)?;
        Ok(bytes)
    }

    /// Downloads and aggregates every configured combination, one workbook at
    /// a time.
    ///
    /// Per-partner sums cover the base partners plus "World"; the "World"
    /// entry is then replaced by the Rest of World residual before the sums
    /// are added into the accumulator. Totals are additive across product
    /// codes, each code being a distinct commodity subcode. The first failed
    /// download or malformed workbook aborts the whole run.
    #[instrument(skip(self))]
    pub async fn collect_totals(&self) -> Result<TradeAccumulator, ImportError> {
        let config = &self.config;
        let partners = config.partners();
        let exclusions = config.rest_of_world_exclusions();

        let total = config.reporters.len()
            * config.years.len()
            * config.flows.len()
            * config.products.len();
        info!("Aggregating {} product workbooks", total);

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );

        let mut accumulator = TradeAccumulator::with_zeroed_series(config);

        for reporter in &config.reporters {
            for &year in &config.years {
                for &flow in &config.flows {
                    for product in &config.products {
                        let request =
                            ProductRequest::new(reporter.code.clone(), year, flow, product.clone());
                        pb.set_message(request.cache_file_name());

                        let bytes = self.fetch_workbook(&request).await?;
                        let table = excel_importer::read_product_sheet(&bytes)?;
                        let records = aggregator::prepare_kg_rows(&table)?;
                        debug!(
                            "{}: {} kg rows",
                            request.cache_file_name(),
                            records.len()
                        );

                        let mut sums = aggregator::sum_for_partners(&records, &partners);
                        let rest_of_world =
                            aggregator::rest_of_world_sum(&records, &exclusions);
                        sums.insert(WORLD_LABEL.to_string(), rest_of_world);

                        for (partner, totals) in sums {
                            accumulator.add(
                                SeriesKey::new(reporter.label.clone(), partner, year, flow),
                                totals,
                            );
                        }

                        pb.inc(1);
                    }
                }
            }
        }

        pb.finish_with_message("done");
        info!("Accumulated {} series", accumulator.len());
        Ok(accumulator)
    }
}
