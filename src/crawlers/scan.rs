use crate::config::FinderConfig;
use crate::crawlers::{FetchStrategy, PageFetcher, PlainFetcher};
use crate::error::Result;
use crate::filter::ScriptFilter;
use crate::parsers::{self, DiscoveredLink, LinkKind};
use crate::results::{FoundScript, ScanEvent, ScanState};
use crate::utils::derive_filename;
use std::collections::{BTreeSet, HashSet};
use tokio::sync::mpsc;
use url::Url;

/// Capacity of the scan event channel
const EVENT_BUFFER: usize = 1024;

/// How much of a link label to echo in progress messages
const LABEL_CHARS: usize = 50;

/// Options controlling a single scan
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub filter: ScriptFilter,
    /// Fetch likely script pages found on the primary page, one level deep
    pub follow_links: bool,
    /// Render the primary page through a browser when one is available
    pub render_js: bool,
}

/// Starts a scan on a background task and returns its event stream.
///
/// The stream ends with either [`ScanEvent::Complete`] or [`ScanEvent::Failed`].
pub fn spawn(
    client: reqwest::Client,
    config: FinderConfig,
    url: Url,
    options: ScanOptions,
) -> mpsc::Receiver<ScanEvent> {
    let (tx, rx) = mpsc::channel::<ScanEvent>(EVENT_BUFFER);

    tokio::spawn(async move {
        let page_fetcher = PlainFetcher::new(client.clone(), config.page_timeout());
        let follow_fetcher = PlainFetcher::new(client, config.follow_timeout());

        let primary = FetchStrategy::select(options.render_js, &config, page_fetcher).await;
        if let FetchStrategy::Rendered(renderer) = &primary {
            ::log::info!("Rendering through WebDriver at {}", renderer.webdriver_url());
            emit(&tx, ScanEvent::Log("Using browser to render JavaScript...".to_string())).await;
        }

        drive(&primary, &follow_fetcher, &url, &options, &tx).await;
    });

    rx
}

/// Runs a scan to completion and reports the outcome as terminal events
pub async fn drive<P, F>(
    primary: &P,
    follow: &F,
    url: &Url,
    options: &ScanOptions,
    tx: &mpsc::Sender<ScanEvent>,
) where
    P: PageFetcher + Sync,
    F: PageFetcher + Sync,
{
    match run(primary, follow, url, options, tx).await {
        Ok(found) => {
            ::log::info!("Scan of {} complete with {} PDF(s)", url, found.len());
            emit(tx, ScanEvent::State(ScanState::Complete)).await;
            emit(tx, ScanEvent::Complete(found)).await;
        }
        Err(e) => {
            ::log::error!("Scan of {} failed: {}", url, e);
            emit(tx, ScanEvent::State(ScanState::Failed)).await;
            emit(tx, ScanEvent::Failed(e.to_string())).await;
        }
    }
}

/// Scans `url` for PDF links, optionally following likely script pages once.
///
/// Only a failure to fetch `url` itself is an error; followed pages that fail
/// are logged and skipped.
pub async fn run<P, F>(
    primary: &P,
    follow: &F,
    url: &Url,
    options: &ScanOptions,
    tx: &mpsc::Sender<ScanEvent>,
) -> Result<Vec<FoundScript>>
where
    P: PageFetcher + Sync,
    F: PageFetcher + Sync,
{
    let mut found = BTreeSet::new();

    emit(tx, ScanEvent::State(ScanState::Fetching)).await;
    let html = primary.fetch(url).await?;

    emit(tx, ScanEvent::State(ScanState::Classifying)).await;
    let page = parsers::html::parse(&html, url);
    emit(
        tx,
        ScanEvent::Log(format!("Found {} links on page", page.anchor_count)),
    )
    .await;

    let mut candidates: Vec<DiscoveredLink> = Vec::new();
    let mut queued = HashSet::new();
    for link in page.links {
        match LinkKind::classify(&link, options.follow_links) {
            LinkKind::Pdf => collect(&mut found, &link, &options.filter),
            LinkKind::Follow => {
                if queued.insert(link.url.clone()) {
                    candidates.push(link);
                }
            }
            LinkKind::Other => {}
        }
    }

    let total = candidates.len();
    for (index, candidate) in candidates.iter().enumerate() {
        emit(
            tx,
            ScanEvent::State(ScanState::Following {
                current: index + 1,
                total,
            }),
        )
        .await;
        emit(
            tx,
            ScanEvent::Log(format!("Following link: {}...", label(candidate))),
        )
        .await;

        match follow.fetch(&candidate.url).await {
            Ok(sub_html) => {
                // Sub-page links are classified for PDFs only, never followed
                for link in parsers::html::parse(&sub_html, &candidate.url).links {
                    if parsers::is_pdf_link(&link.url, &link.href) {
                        collect(&mut found, &link, &options.filter);
                    }
                }
            }
            Err(e) => {
                ::log::warn!("Could not follow {}: {}", candidate.url, e);
                emit(tx, ScanEvent::Log(format!("Could not follow link: {}", e))).await;
            }
        }
    }

    Ok(found.into_iter().collect())
}

/// Adds a PDF link to the result set if it passes the filter
fn collect(found: &mut BTreeSet<FoundScript>, link: &DiscoveredLink, filter: &ScriptFilter) {
    if filter.matches(link.url.as_str(), &link.text) {
        found.insert(FoundScript::new(
            derive_filename(&link.url),
            link.url.to_string(),
        ));
    } else {
        ::log::debug!("Filter rejected: {}", link.url);
    }
}

/// Short human label for a link: its text, or its href when the text is blank
fn label(link: &DiscoveredLink) -> String {
    let text = link.text.trim();
    let source = if text.is_empty() { &link.href } else { text };
    source.chars().take(LABEL_CHARS).collect()
}

async fn emit(tx: &mpsc::Sender<ScanEvent>, event: ScanEvent) {
    if let Err(e) = tx.send(event).await {
        ::log::debug!("Scan event dropped, receiver gone: {}", e);
    }
}
