use crate::config::FinderConfig;
use crate::crawlers::PageFetcher;
use crate::error::{FinderError, Result};
use std::time::Duration;
use url::Url;

/// Builds the HTTP client shared by scans and downloads
pub fn build_client(config: &FinderConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Fetches static markup with a single bounded GET
#[derive(Debug, Clone)]
pub struct PlainFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl PlainFetcher {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl PageFetcher for PlainFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        ::log::debug!("GET {} (timeout {:?})", url, self.timeout);

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FinderError::from_request(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FinderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FinderError::from_request(url.as_str(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Route, serve};

    fn fetcher(timeout: Duration) -> PlainFetcher {
        let client = build_client(&FinderConfig::default()).unwrap();
        PlainFetcher::new(client, timeout)
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let addr = serve(vec![Route::ok("/page", "<a href=\"/x.pdf\">x</a>")]).await;
        let url = Url::parse(&format!("http://{}/page", addr)).unwrap();

        let body = fetcher(Duration::from_secs(5)).fetch(&url).await.unwrap();
        assert_eq!(body, "<a href=\"/x.pdf\">x</a>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let addr = serve(vec![Route::status("/gone", 404)]).await;
        let url = Url::parse(&format!("http://{}/gone", addr)).unwrap();

        let err = fetcher(Duration::from_secs(5)).fetch(&url).await.unwrap_err();
        assert!(matches!(err, FinderError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let addr = serve(vec![Route::hang("/slow")]).await;
        let url = Url::parse(&format!("http://{}/slow", addr)).unwrap();

        let err = fetcher(Duration::from_millis(200))
            .fetch(&url)
            .await
            .unwrap_err();
        assert!(matches!(err, FinderError::Timeout(_)), "got {:?}", err);
    }
}
