use crate::config::FinderConfig;
use crate::crawlers::plain::PlainFetcher;
use crate::crawlers::web::{self, RenderFetcher};
use crate::error::Result;
use std::future::Future;
use url::Url;

/// Anything that can turn a URL into page HTML
pub trait PageFetcher {
    /// Fetch the page at `url` and return its HTML
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// The two interchangeable ways of fetching the primary page
pub enum FetchStrategy {
    /// Plain HTTP GET of the static markup
    Plain(PlainFetcher),
    /// Load through a WebDriver browser so JavaScript runs first
    Rendered(RenderFetcher),
}

impl FetchStrategy {
    /// Pick the strategy for a scan.
    ///
    /// Rendering is used only when requested and a WebDriver server answers;
    /// otherwise this quietly falls back to `plain`.
    pub async fn select(render_js: bool, config: &FinderConfig, plain: PlainFetcher) -> Self {
        if !render_js {
            return FetchStrategy::Plain(plain);
        }

        match web::find_webdriver(config).await {
            Some(endpoint) => FetchStrategy::Rendered(RenderFetcher::new(endpoint, config)),
            None => {
                ::log::info!("No WebDriver available, fetching without JavaScript rendering");
                FetchStrategy::Plain(plain)
            }
        }
    }
}

impl PageFetcher for FetchStrategy {
    async fn fetch(&self, url: &Url) -> Result<String> {
        match self {
            FetchStrategy::Plain(fetcher) => fetcher.fetch(url).await,
            FetchStrategy::Rendered(fetcher) => fetcher.fetch(url).await,
        }
    }
}
