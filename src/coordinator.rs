use crate::config::FinderConfig;
use crate::crawlers::scan::{self, ScanOptions};
use crate::download;
use crate::results::{
    DownloadEvent, DownloadItem, DownloadStatus, DownloadSummary, FoundScript, ScanEvent,
    ScanState,
};
use std::path::PathBuf;
use tokio::sync::mpsc;
use url::Url;

/// One line of the result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRow {
    pub script: FoundScript,
    pub status: DownloadStatus,
}

/// Owns all user-facing state and applies events from scan and download tasks.
///
/// Workers never touch this state directly; they only send events, which the
/// driver feeds back through [`Coordinator::apply_scan_event`] and
/// [`Coordinator::apply_download_event`].
pub struct Coordinator {
    client: reqwest::Client,
    config: FinderConfig,
    download_dir: PathBuf,
    auto_download: bool,
    scan_state: ScanState,
    downloading: bool,
    rows: Vec<ScriptRow>,
    log: Vec<String>,
    last_error: Option<String>,
    last_summary: Option<DownloadSummary>,
}

impl Coordinator {
    pub fn new(client: reqwest::Client, config: FinderConfig) -> Self {
        let download_dir = config.resolved_download_dir();
        Self {
            client,
            config,
            download_dir,
            auto_download: false,
            scan_state: ScanState::Idle,
            downloading: false,
            rows: Vec::new(),
            log: Vec::new(),
            last_error: None,
            last_summary: None,
        }
    }

    /// Download everything as soon as a scan finds something
    pub fn set_auto_download(&mut self, enabled: bool) {
        self.auto_download = enabled;
    }

    pub fn set_download_dir(&mut self, dir: PathBuf) {
        self.download_dir = dir;
    }

    pub fn download_dir(&self) -> &PathBuf {
        &self.download_dir
    }

    pub fn rows(&self) -> &[ScriptRow] {
        &self.rows
    }

    pub fn scan_state(&self) -> ScanState {
        self.scan_state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_summary(&self) -> Option<DownloadSummary> {
        self.last_summary
    }

    /// Whether a scan is currently running
    pub fn is_scanning(&self) -> bool {
        !matches!(
            self.scan_state,
            ScanState::Idle | ScanState::Complete | ScanState::Failed
        )
    }

    /// Whether a download batch is currently running
    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    /// Take the log lines accumulated since the last call
    pub fn drain_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }

    /// Empty the result list
    pub fn clear_results(&mut self) {
        self.rows.clear();
    }

    /// Start a scan unless one is already running.
    ///
    /// Returns the event stream to feed into [`Coordinator::apply_scan_event`],
    /// or `None` when the request was ignored.
    pub fn start_scan(&mut self, url: Url, options: ScanOptions) -> Option<mpsc::Receiver<ScanEvent>> {
        if self.is_scanning() {
            ::log::debug!("Scan already in progress, ignoring request for {}", url);
            return None;
        }

        self.clear_results();
        self.last_error = None;
        self.scan_state = ScanState::Fetching;
        self.log.push(format!("Scanning: {}", url));

        Some(scan::spawn(
            self.client.clone(),
            self.config.clone(),
            url,
            options,
        ))
    }

    /// Apply one scan event.
    ///
    /// Returns true when the scan completed with results and auto-download is on.
    pub fn apply_scan_event(&mut self, event: ScanEvent) -> bool {
        match event {
            ScanEvent::Log(line) => self.log.push(line),
            ScanEvent::State(state) => self.scan_state = state,
            ScanEvent::Complete(found) => {
                self.scan_state = ScanState::Complete;
                self.rows = found
                    .into_iter()
                    .map(|script| ScriptRow {
                        script,
                        status: DownloadStatus::Ready,
                    })
                    .collect();

                if self.rows.is_empty() {
                    self.log.push("No PDF scripts found on this page".to_string());
                } else {
                    self.log
                        .push(format!("Found {} PDF script(s)", self.rows.len()));
                    return self.auto_download;
                }
            }
            ScanEvent::Failed(error) => {
                self.scan_state = ScanState::Failed;
                self.log.push(format!("Error: {}", error));
                self.last_error = Some(error);
            }
        }
        false
    }

    /// Call once the scan event stream has closed.
    ///
    /// A scan whose task ended without a terminal event is marked failed.
    pub fn finish_scan_stream(&mut self) {
        if !self.is_scanning() {
            return;
        }
        ::log::error!("Scan task ended without reporting a result");
        let error = "Scan ended unexpectedly".to_string();
        self.scan_state = ScanState::Failed;
        self.log.push(format!("Error: {}", error));
        self.last_error = Some(error);
    }

    /// Download every row
    pub fn download_all(&mut self) -> Option<mpsc::Receiver<DownloadEvent>> {
        let rows = (0..self.rows.len()).collect::<Vec<_>>();
        self.download_rows(&rows)
    }

    /// Download the given rows (0-based); unknown rows are skipped.
    ///
    /// Returns `None` when nothing is selected or a batch is already running.
    pub fn download_rows(&mut self, rows: &[usize]) -> Option<mpsc::Receiver<DownloadEvent>> {
        if self.downloading {
            ::log::debug!("Download already in progress, ignoring request");
            self.log.push("A download is already in progress".to_string());
            return None;
        }

        let items = rows
            .iter()
            .filter_map(|&row| {
                self.rows.get(row).map(|r| DownloadItem {
                    row,
                    filename: r.script.filename.clone(),
                    url: r.script.url.clone(),
                })
            })
            .collect::<Vec<_>>();

        if items.is_empty() {
            self.log.push("No scripts selected for download".to_string());
            return None;
        }

        self.last_summary = None;
        self.downloading = true;
        Some(download::spawn(
            self.client.clone(),
            items,
            self.download_dir.clone(),
            self.config.download_timeout(),
        ))
    }

    /// Apply one download event
    pub fn apply_download_event(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Log(line) => self.log.push(line),
            DownloadEvent::Status { row, status } => {
                if let Some(r) = self.rows.get_mut(row) {
                    r.status = status;
                }
            }
            DownloadEvent::Complete(summary) => {
                self.log.push(format!(
                    "Download complete: {}/{} files",
                    summary.succeeded, summary.total
                ));
                if summary.succeeded > 0 {
                    self.log.push(format!(
                        "Successfully downloaded {} script(s) to: {}",
                        summary.succeeded,
                        self.download_dir.display()
                    ));
                }
                self.last_summary = Some(summary);
                self.downloading = false;
            }
        }
    }

    /// Call once the download event stream has closed
    pub fn finish_download_stream(&mut self) {
        if self.downloading {
            ::log::error!("Download task ended without reporting a summary");
            self.log.push("Error: Download ended unexpectedly".to_string());
            self.downloading = false;
        }
    }
}
