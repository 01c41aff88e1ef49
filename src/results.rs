use serde::{Deserialize, Serialize};
use std::fmt;

/// A PDF link discovered by a scan
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FoundScript {
    /// Filename the script will be saved under
    pub filename: String,

    /// Absolute URL of the PDF
    pub url: String,
}

impl FoundScript {
    pub fn new(filename: String, url: String) -> Self {
        Self { filename, url }
    }
}

/// A found script queued for download, tagged with its row in the result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadItem {
    pub row: usize,
    pub filename: String,
    pub url: String,
}

/// Per-row download status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadStatus {
    Ready,
    Downloading,
    Downloaded,
    Failed,
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DownloadStatus::Ready => "Ready",
            DownloadStatus::Downloading => "Downloading...",
            DownloadStatus::Downloaded => "Downloaded",
            DownloadStatus::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// Phases a scan moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Fetching,
    Classifying,
    /// Fetching follow candidate `current` of `total` (1-based)
    Following { current: usize, total: usize },
    Complete,
    Failed,
}

/// Messages sent from a scan task to its coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// Human-readable progress line
    Log(String),
    State(ScanState),
    /// Final, deduplicated results
    Complete(Vec<FoundScript>),
    /// The primary page could not be fetched
    Failed(String),
}

/// Messages sent from a download task to its coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Log(String),
    Status { row: usize, status: DownloadStatus },
    Complete(DownloadSummary),
}

/// Outcome of a download batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub total: usize,
}
