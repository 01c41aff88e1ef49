use crate::config::FinderConfig;
use crate::crawlers::PageFetcher;
use crate::error::{FinderError, Result};
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use url::Url;

/// Common WebDriver endpoints tried after the configured one
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
const SCROLL_TO_TOP: &str = "window.scrollTo(0, 0);";

/// One step of the post-load routine that coaxes lazy content into the DOM
enum RenderStep {
    Wait(Duration),
    Run(&'static str),
}

/// Waits and scrolls performed after the load event, in order
const SETTLE_STEPS: [RenderStep; 7] = [
    RenderStep::Wait(Duration::from_millis(2000)),
    RenderStep::Run(SCROLL_TO_BOTTOM),
    RenderStep::Wait(Duration::from_millis(2000)),
    RenderStep::Run(SCROLL_TO_TOP),
    RenderStep::Wait(Duration::from_millis(500)),
    RenderStep::Run(SCROLL_TO_BOTTOM),
    RenderStep::Wait(Duration::from_millis(1500)),
];

/// Fetches pages through a headless browser so their JavaScript runs first
#[derive(Debug, Clone)]
pub struct RenderFetcher {
    webdriver_url: String,
    user_agent: String,
    navigation_timeout: Duration,
}

impl RenderFetcher {
    /// Create a fetcher bound to a WebDriver endpoint known to answer
    pub fn new(webdriver_url: String, config: &FinderConfig) -> Self {
        Self {
            webdriver_url,
            user_agent: config.user_agent.clone(),
            navigation_timeout: config.render_timeout(),
        }
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    async fn render(&self, client: &Client, url: &Url) -> Result<String> {
        // goto returns once the load event fires; pages with ads never go network-idle
        match timeout(self.navigation_timeout, client.goto(url.as_str())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(navigation_error(e, "accessing", url)),
            Err(_) => return Err(FinderError::Timeout(url.to_string())),
        }

        for step in &SETTLE_STEPS {
            match step {
                RenderStep::Wait(duration) => sleep(*duration).await,
                RenderStep::Run(script) => {
                    client
                        .execute(script, Vec::new())
                        .await
                        .map_err(|e| navigation_error(e, "scrolling", url))?;
                }
            }
        }

        client
            .source()
            .await
            .map_err(|e| navigation_error(e, "getting source for", url))
    }
}

impl PageFetcher for RenderFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let start = std::time::Instant::now();
        let client = connect(&self.webdriver_url, &self.user_agent)
            .await
            .map_err(FinderError::WebDriver)?;

        let result = self.render(&client, url).await;

        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }

        ::log::debug!(
            "Rendered {} in {:.2} seconds",
            url,
            start.elapsed().as_secs_f64()
        );
        result
    }
}

/// Headless Chrome/Firefox options carrying the desktop user agent
fn headless_capabilities(user_agent: &str) -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": ["--headless=new", format!("--user-agent={}", user_agent)] }),
    );
    caps.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": ["-headless"],
            "prefs": { "general.useragent.override": user_agent }
        }),
    );
    caps
}

/// Opens a new browser session at `webdriver_url`
async fn connect(webdriver_url: &str, user_agent: &str) -> std::result::Result<Client, String> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(headless_capabilities(user_agent));
    builder
        .connect(webdriver_url)
        .await
        .map_err(|e| format!("failed to connect to WebDriver at {}: {}", webdriver_url, e))
}

/// Finds a WebDriver endpoint that accepts sessions.
///
/// Tries the configured URL first, then the common fallbacks. Returns `None`
/// when rendering is not available on this machine.
pub async fn find_webdriver(config: &FinderConfig) -> Option<String> {
    let configured = config.webdriver_url.as_str();
    let candidates = std::iter::once(configured).chain(
        FALLBACK_WEBDRIVER_URLS
            .iter()
            .copied()
            .filter(|url| *url != configured),
    );

    for url in candidates {
        match connect(url, &config.user_agent).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", url);
                if let Err(e) = client.close().await {
                    ::log::warn!("Failed to close availability-check session at {}: {}", url, e);
                }
                return Some(url.to_string());
            }
            Err(e) => {
                ::log::debug!("{}", e);
            }
        }
    }

    ::log::warn!(
        "No WebDriver server found; start one (e.g. chromedriver) or set WEBDRIVER_URL to render JavaScript"
    );
    None
}

/// Converts a WebDriver command failure into a crate error
fn navigation_error(error: fantoccini::error::CmdError, context: &str, url: &Url) -> FinderError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost session while {} {}", context, url);
    } else {
        ::log::error!("Failed {} {}: {}", context, url, error);
    }
    FinderError::WebDriver(format!("{} {}: {}", context, url, error))
}
