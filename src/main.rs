use clap::Parser;
use script_finder::coordinator::Coordinator;
use script_finder::utils::normalize_input_url;
use script_finder::{DownloadEvent, Finder, ScanEvent, ScanOptions, ScanState, ScriptFilter};
use std::process::ExitCode;
use tokio::sync::mpsc;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let url = match normalize_input_url(&args.url) {
        Ok(url) => url,
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut finder = Finder::new().with_auto_download(args.auto_download);
    if let Some(path) = &args.config {
        finder = match finder.with_config_file(path) {
            Ok(finder) => finder,
            Err(e) => {
                ::log::error!("Failed to load configuration: {}", e);
                return ExitCode::FAILURE;
            }
        };
    }
    if let Some(dir) = &args.dir {
        finder = finder.with_download_dir(dir.clone());
    }

    let mut coordinator = match finder.build() {
        Ok(coordinator) => coordinator,
        Err(e) => {
            ::log::error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = ScanOptions {
        filter: ScriptFilter::from(args.filter.as_deref()),
        follow_links: !args.no_follow,
        render_js: args.render_js,
    };

    let Some(scan_rx) = coordinator.start_scan(url, options) else {
        return ExitCode::FAILURE;
    };
    let auto_download = drain_scan(&mut coordinator, scan_rx).await;

    if coordinator.scan_state() == ScanState::Failed {
        if let Some(error) = coordinator.last_error() {
            eprintln!("Failed to scan URL: {}", error);
        }
        return ExitCode::FAILURE;
    }

    print_results(&coordinator, args.json);

    let download_rx = if auto_download {
        coordinator.download_all()
    } else if !args.select.is_empty() {
        coordinator.download_rows(&args.selected_rows())
    } else {
        None
    };
    print_log(&mut coordinator);

    if let Some(rx) = download_rx {
        drain_downloads(&mut coordinator, rx).await;
        print_results(&coordinator, args.json);

        match coordinator.last_summary() {
            Some(summary) if summary.succeeded == summary.total => {}
            _ => return ExitCode::FAILURE,
        }
    }

    ExitCode::SUCCESS
}

/// Feeds scan events into the coordinator; true when auto-download should start
async fn drain_scan(coordinator: &mut Coordinator, mut rx: mpsc::Receiver<ScanEvent>) -> bool {
    let mut auto_download = false;
    while let Some(event) = rx.recv().await {
        if let ScanEvent::State(ScanState::Following { current, total }) = &event {
            ::log::debug!("Following candidate {} of {}", current, total);
        }
        auto_download |= coordinator.apply_scan_event(event);
        print_log(coordinator);
    }
    coordinator.finish_scan_stream();
    print_log(coordinator);
    auto_download
}

async fn drain_downloads(coordinator: &mut Coordinator, mut rx: mpsc::Receiver<DownloadEvent>) {
    while let Some(event) = rx.recv().await {
        coordinator.apply_download_event(event);
        print_log(coordinator);
    }
    coordinator.finish_download_stream();
    print_log(coordinator);
}

fn print_log(coordinator: &mut Coordinator) {
    for line in coordinator.drain_log() {
        println!("{}", line);
    }
}

fn print_results(coordinator: &Coordinator, json: bool) {
    let rows = coordinator.rows();
    if rows.is_empty() {
        return;
    }

    if json {
        let scripts = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "filename": row.script.filename,
                    "url": row.script.url,
                    "status": row.status,
                })
            })
            .collect::<Vec<_>>();
        match serde_json::to_string_pretty(&scripts) {
            Ok(text) => println!("{}", text),
            Err(e) => ::log::error!("Failed to serialize results: {}", e),
        }
        return;
    }

    let width = rows
        .iter()
        .map(|row| row.script.filename.chars().count())
        .max()
        .unwrap_or(0);
    for (index, row) in rows.iter().enumerate() {
        println!(
            "{:>3}  {:<width$}  {:<14}  {}",
            index + 1,
            row.script.filename,
            row.status.to_string(),
            row.script.url,
            width = width
        );
    }
}
