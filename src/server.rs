use std::ffi::OsString;
use std::path::{Path, PathBuf};

use axum::Router;
use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_livereload::LiveReloadLayer;
use tracing::{error, info};

use crate::generator::{self, LayoutOptions};

/// Page written into the output directory
pub const INDEX_FILE: &str = "index.html";

/// Re-run the layout and rewrite the viewer page
fn regenerate(input: &Path, output: &Path, options: &LayoutOptions) -> anyhow::Result<()> {
    generator::generate(input, &output.join(INDEX_FILE), options)?;
    Ok(())
}

/// Run `regenerate` on the blocking pool
async fn regenerate_in_background(
    input: PathBuf,
    output: PathBuf,
    options: LayoutOptions,
) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || regenerate(&input, &output, &options)).await?
}

/// Queue a regeneration if `event` touches the input file.
///
/// Never blocks; a full channel means a regeneration is already pending.
fn notify_input_change(
    tx: &mpsc::Sender<()>,
    event: &Event,
    input_name: Option<&OsString>,
) -> bool {
    let touches_input = event
        .paths
        .iter()
        .any(|p| p.file_name() == input_name.map(OsString::as_os_str));
    if touches_input && (event.kind.is_modify() || event.kind.is_create()) {
        let _ = tx.try_send(());
        return true;
    }
    false
}

/// Start the preview server; the layout is recomputed whenever the input changes
pub async fn serve(
    input: &Path,
    output: &Path,
    port: u16,
    options: LayoutOptions,
) -> anyhow::Result<()> {
    regenerate(input, output, &options)?;
    info!(output = %output.display(), "generated initial layout");

    let (tx, mut rx) = mpsc::channel::<()>(1);

    let input_name = input.file_name().map(|n| n.to_os_string());
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            notify_input_change(&tx, &event, input_name.as_ref());
        }
    })?;

    // Watch the input file's parent directory so editors that replace the
    // file are still picked up
    let watch_path = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;

    let input_for_regen = input.to_path_buf();
    let output_for_regen = output.to_path_buf();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            // Debounce: wait a bit for rapid changes to settle
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            while rx.try_recv().is_ok() {}

            let result = regenerate_in_background(
                input_for_regen.clone(),
                output_for_regen.clone(),
                options.clone(),
            )
            .await;
            match result {
                Ok(()) => info!("regenerated layout"),
                Err(e) => error!("error regenerating layout: {e}"),
            }
        }
    });

    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    // Reload the browser whenever the output directory changes
    let mut output_watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                reloader.reload();
            }
        }
    })?;
    output_watcher.watch(output, RecursiveMode::Recursive)?;

    let app = Router::new()
        .fallback_service(ServeDir::new(output))
        .layer(livereload);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("preview server running at http://localhost:{port}");
    info!("watching {} for changes, press Ctrl+C to stop", input.display());

    // Keep watchers alive
    let _watcher = watcher;
    let _output_watcher = output_watcher;

    axum::serve(listener, app).await?;

    Ok(())
}
