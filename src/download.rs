use crate::error::{FinderError, Result};
use crate::results::{DownloadEvent, DownloadItem, DownloadStatus, DownloadSummary};
use crate::utils::unique_path;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::time;

/// Capacity of the download event channel
const EVENT_BUFFER: usize = 1024;

/// Starts a download batch on a background task and returns its event stream.
///
/// The stream ends with a single [`DownloadEvent::Complete`].
pub fn spawn(
    client: reqwest::Client,
    items: Vec<DownloadItem>,
    dir: PathBuf,
    timeout: Duration,
) -> mpsc::Receiver<DownloadEvent> {
    let (tx, rx) = mpsc::channel::<DownloadEvent>(EVENT_BUFFER);

    tokio::spawn(async move {
        let summary = run(&client, &items, &dir, timeout, &tx).await;
        emit(&tx, DownloadEvent::Complete(summary)).await;
    });

    rx
}

/// Downloads every item into `dir`, one after another.
///
/// A failing item is reported and skipped; the batch always runs to the end.
pub async fn run(
    client: &reqwest::Client,
    items: &[DownloadItem],
    dir: &Path,
    timeout: Duration,
    tx: &mpsc::Sender<DownloadEvent>,
) -> DownloadSummary {
    let total = items.len();

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        ::log::error!("Cannot create {}: {}", dir.display(), e);
        emit(
            tx,
            DownloadEvent::Log(format!("Cannot create {}: {}", dir.display(), e)),
        )
        .await;
        for item in items {
            emit(tx, status(item.row, DownloadStatus::Failed)).await;
        }
        return DownloadSummary {
            succeeded: 0,
            total,
        };
    }

    let mut succeeded = 0;
    for item in items {
        emit(tx, status(item.row, DownloadStatus::Downloading)).await;
        emit(tx, DownloadEvent::Log(format!("Downloading: {}", item.filename))).await;

        match download_one(client, item, dir, timeout).await {
            Ok(path) => {
                ::log::info!("Saved {} to {}", item.url, path.display());
                emit(tx, status(item.row, DownloadStatus::Downloaded)).await;
                succeeded += 1;
            }
            Err(e) => {
                ::log::warn!("Download of {} failed: {}", item.url, e);
                emit(
                    tx,
                    DownloadEvent::Log(format!("Failed to download {}: {}", item.filename, e)),
                )
                .await;
                emit(tx, status(item.row, DownloadStatus::Failed)).await;
            }
        }
    }

    DownloadSummary { succeeded, total }
}

/// Fetches one item and streams it to a collision-free path in `dir`.
///
/// `timeout` bounds the wait for the response head and for each body chunk,
/// not the whole transfer.
async fn download_one(
    client: &reqwest::Client,
    item: &DownloadItem,
    dir: &Path,
    timeout: Duration,
) -> Result<PathBuf> {
    let mut response = time::timeout(timeout, client.get(&item.url).send())
        .await
        .map_err(|_| FinderError::Timeout(item.url.clone()))?
        .map_err(|e| FinderError::from_request(&item.url, e))?;

    let code = response.status();
    if !code.is_success() {
        return Err(FinderError::Status {
            url: item.url.clone(),
            status: code.as_u16(),
        });
    }

    let path = unique_path(dir, &item.filename).await?;
    let mut file = tokio::fs::File::create(&path).await?;
    while let Some(chunk) = time::timeout(timeout, response.chunk())
        .await
        .map_err(|_| FinderError::Timeout(item.url.clone()))?
        .map_err(|e| FinderError::from_request(&item.url, e))?
    {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(path)
}

fn status(row: usize, status: DownloadStatus) -> DownloadEvent {
    DownloadEvent::Status { row, status }
}

async fn emit(tx: &mpsc::Sender<DownloadEvent>, event: DownloadEvent) {
    if let Err(e) = tx.send(event).await {
        ::log::debug!("Download event dropped, receiver gone: {}", e);
    }
}
