use thiserror::Error;

/// Errors produced while scanning pages or downloading scripts
#[derive(Debug, Error)]
pub enum FinderError {
    /// The user supplied something that cannot be turned into a URL
    #[error("invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    /// Transport-level failure from the HTTP client
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// A fetch or navigation exceeded its time bound
    #[error("timed out fetching {0}")]
    Timeout(String),

    /// Talking to the WebDriver browser failed
    #[error("webdriver: {0}")]
    WebDriver(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or parsed
    #[error("config: {0}")]
    Config(String),
}

impl FinderError {
    /// Maps a reqwest error for `url`, folding timeouts into [`FinderError::Timeout`]
    pub fn from_request(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FinderError::Timeout(url.to_string())
        } else {
            FinderError::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;
