//! Home Dashboard
//!
//! Live terminal dashboard: polls the server and redraws due tasks and
//! per-room temperature sparklines whenever the view changes.

use anyhow::Context;
use clap::Parser;
use home_dashboard::logging::init_logging;
use home_dashboard::view::render;
use home_dashboard::{ApiClient, Config, DashboardController, RefreshController, ViewStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "home-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live household dashboard")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API server URL, overriding the config
    #[arg(long)]
    api_url: Option<String>,

    /// Refresh period in seconds, overriding the config
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::resolve(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }
    if let Some(secs) = args.interval {
        config.refresh.interval_secs = secs;
    }

    init_logging(&config.logging);
    tracing::info!("Home Dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("API server: {}", config.api.base_url);

    let api = Arc::new(
        ApiClient::new(config.api.client_config()).context("Failed to build API client")?,
    );
    let store = Arc::new(ViewStore::new());
    let area = config.chart.plot_area();
    let dashboard = Arc::new(DashboardController::new(api, store.clone()).with_plot_area(area));

    let mut revisions = store.subscribe();
    let refresh = RefreshController::new(dashboard.clone())
        .with_period(config.refresh.period())
        .start();

    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                redraw(&dashboard, &store).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down...");
                break;
            }
        }
    }

    refresh.stop().await;
    Ok(())
}

async fn redraw(dashboard: &DashboardController, store: &ViewStore) {
    let state = store.read().await;
    if state.is_dashboard_loading() && state.dashboard.is_none() {
        return;
    }

    let error = state.error.clone();
    drop(state);

    match dashboard.view().await {
        Some(view) => {
            // Clear screen and home the cursor
            print!("\x1B[2J\x1B[H");
            println!("{}", render::dashboard_text(&view, dashboard.plot_area(), error.as_deref()));
        }
        None => {
            if let Some(error) = error {
                println!("! {}", error);
            }
        }
    }
}
