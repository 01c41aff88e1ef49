// Re-export modules
pub mod config;
pub mod coordinator;
pub mod crawlers;
pub mod download;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types for convenience
pub use config::FinderConfig;
pub use coordinator::{Coordinator, ScriptRow};
pub use crawlers::scan::ScanOptions;
pub use error::{FinderError, Result};
pub use filter::ScriptFilter;
pub use results::{DownloadEvent, DownloadStatus, DownloadSummary, FoundScript, ScanEvent, ScanState};

use std::path::{Path, PathBuf};

/// Main builder for a script finder session
pub struct Finder {
    config: FinderConfig,
    download_dir: Option<PathBuf>,
    auto_download: bool,
}

impl Default for Finder {
    fn default() -> Self {
        Self::new()
    }
}

impl Finder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: FinderConfig::default(),
            download_dir: None,
            auto_download: false,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: FinderConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.config = FinderConfig::from_file(path)?;
        Ok(self)
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(mut self, json: &str) -> Result<Self> {
        self.config = FinderConfig::from_json(json)?;
        Ok(self)
    }

    /// Set the directory downloads are written to
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Download all results as soon as a scan finds any
    pub fn with_auto_download(mut self, enabled: bool) -> Self {
        self.auto_download = enabled;
        self
    }

    /// Build the shared HTTP client and the coordinator that drives scans and downloads
    pub fn build(self) -> Result<Coordinator> {
        let config = self.config.with_env_overrides();
        let client = crawlers::plain::build_client(&config)?;

        let mut coordinator = Coordinator::new(client, config);
        if let Some(dir) = self.download_dir {
            coordinator.set_download_dir(dir);
        }
        coordinator.set_auto_download(self.auto_download);
        Ok(coordinator)
    }
}
