use crate::error::{FinderError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Desktop browser user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration shared by the scanner and the downloader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// User agent for the HTTP client and the rendering browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for the primary page fetch
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Timeout for each followed sub-page
    #[serde(default = "default_follow_timeout_secs")]
    pub follow_timeout_secs: u64,

    /// Timeout for each PDF download
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Navigation timeout when rendering through the browser
    #[serde(default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Where downloaded scripts go (defaults to a `Scripts` folder in the downloads directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_page_timeout_secs() -> u64 {
    30
}

fn default_follow_timeout_secs() -> u64 {
    15
}

fn default_download_timeout_secs() -> u64 {
    60
}

fn default_render_timeout_secs() -> u64 {
    60
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// `~/Downloads/Scripts`, or the platform's download folder when it is known
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
        .join("Scripts")
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            page_timeout_secs: default_page_timeout_secs(),
            follow_timeout_secs: default_follow_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            render_timeout_secs: default_render_timeout_secs(),
            webdriver_url: default_webdriver_url(),
            download_dir: None,
        }
    }
}

impl FinderConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
            .map_err(|e| FinderError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FinderError::Config(e.to_string()))
    }

    /// Apply the `WEBDRIVER_URL` environment override, if set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn follow_timeout(&self) -> Duration {
        Duration::from_secs(self.follow_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    /// The configured download directory, or the default one
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(default_download_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FinderConfig::from_json(r#"{"page_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.page_timeout(), Duration::from_secs(5));
        assert_eq!(config.follow_timeout(), Duration::from_secs(15));
        assert_eq!(config.download_timeout(), Duration::from_secs(60));
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(config.download_dir.is_none());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = FinderConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, FinderError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finder.json");
        std::fs::write(&path, r#"{"download_dir": "/tmp/scripts"}"#).unwrap();

        let config = FinderConfig::from_file(&path).unwrap();
        assert_eq!(config.resolved_download_dir(), PathBuf::from("/tmp/scripts"));
    }

    #[test]
    fn test_default_download_dir_is_scripts_folder() {
        assert!(default_download_dir().ends_with("Scripts"));
    }
}
