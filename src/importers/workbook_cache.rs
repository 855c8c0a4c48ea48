use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::downloader::ProductRequest;

/// Write-once file cache for downloaded workbooks, one file per
/// (reporter, year, flow, product) tuple. Entries are never invalidated or
/// overwritten in place; a key that exists on disk always short-circuits the
/// network.
pub struct WorkbookCache {
    dir: PathBuf,
    enabled: bool,
}

impl WorkbookCache {
    /// Creates the cache directory up front when caching is enabled.
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> io::Result<Self> {
        let dir = dir.into();
        if enabled {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir, enabled })
    }

    fn entry_path(&self, request: &ProductRequest) -> PathBuf {
        self.dir.join(request.cache_file_name())
    }

    /// Cached bytes for the request, or None on a miss. A disabled cache
    /// always misses.
    pub fn lookup(&self, request: &ProductRequest) -> io::Result<Option<Vec<u8>>> {
        if !self.enabled {
            return Ok(None);
        }

        let path = self.entry_path(request);
        if !path.exists() {
            return Ok(None);
        }

        debug!("Cache hit: {}", path.display());
        fs::read(&path).map(Some)
    }

    /// Persists freshly downloaded bytes under the request's key. No-op when
    /// caching is disabled.
    pub fn store(&self, request: &ProductRequest, bytes: &[u8]) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.entry_path(request);
        fs::write(&path, bytes)?;
        debug!("Cached {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}
