use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::Flow;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("File not found (404): {0}")]
    NotFound(String),

    #[error("Server error (5xx): {0}")]
    ServerError(String),
}

/// Identifies one WITS product workbook: reporter code, year, flow and HS6
/// product code. Both the download URL and the cache file name derive from
/// this four-tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductRequest {
    pub reporter_code: String,
    pub year: i32,
    pub flow: Flow,
    pub product: String,
}

impl ProductRequest {
    pub fn new(
        reporter_code: impl Into<String>,
        year: i32,
        flow: Flow,
        product: impl Into<String>,
    ) -> Self {
        Self {
            reporter_code: reporter_code.into(),
            year,
            flow,
            product: product.into(),
        }
    }

    /// Deterministic cache entry name for this request.
    pub fn cache_file_name(&self) -> String {
        format!(
            "wits_{}_{}_{}_{}.xlsx",
            self.reporter_code,
            self.year,
            self.flow.code(),
            self.product
        )
    }
}

/// WITS data downloader for HS6 product workbooks
pub struct WitsDownloader {
    client: Client,
    base_url: String,
}

impl WitsDownloader {
    /// Create a new downloader against the given download endpoint.
    /// Production base URL: https://wits.worldbank.org/Download.aspx
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .user_agent("Mozilla/5.0")
                .default_headers(headers)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Full download URL for one product workbook.
    pub fn request_url(&self, request: &ProductRequest) -> String {
        format!(
            "{}?Reporter={}&Year={}&Tradeflow={}&Partner=ALL&product={}&Type=HS6Productdata&Lang=en",
            self.base_url,
            request.reporter_code,
            request.year,
            request.flow.code(),
            request.product
        )
    }

    /// Download the workbook for one (reporter, year, flow, product) tuple.
    /// Any non-success status fails the request; there is no retry.
    pub async fn download_workbook(
        &self,
        request: &ProductRequest,
    ) -> Result<Vec<u8>, DownloadError> {
        let url = self.request_url(request);
        let name = request.cache_file_name();

        debug!("Downloading workbook: {url}");
        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            debug!("Downloaded {name} ({} bytes)", bytes.len());
            Ok(bytes.to_vec())
        } else if status.as_u16() == 404 {
            Err(DownloadError::NotFound(format!(
                "{name} not found on server"
            )))
        } else if status.is_server_error() {
            Err(DownloadError::ServerError(format!(
                "Server error {status} while downloading {name}"
            )))
        } else {
            Err(DownloadError::HttpError(
                response.error_for_status().unwrap_err(),
            ))
        }
    }
}
