// src/main.rs
use anyhow::Result;
use service_pinger::{
    config::{self, Config},
    health::HttpProber,
    metrics::MetricsRegistry,
    panel::{run_display, StatusPanel},
    server::{shutdown_signal, start_metrics_server, MetricsHandler},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the panel.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("service_pinger=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => config::default_config()?,
    };
    info!("Probing services at {}", config.base_url);

    let metrics_registry = Arc::new(MetricsRegistry::new()?);
    let prober = Arc::new(HttpProber::from_config(&config)?);
    let panel = StatusPanel::new(prober, Some(metrics_registry.collector()));
    info!(session = %panel.session_id(), "Status panel created");

    let metrics_server = if config.metrics.enabled {
        Some(serve_metrics(&config, metrics_registry.clone()).await?)
    } else {
        None
    };

    let mut stdout = std::io::stdout();
    let state = run_display(&panel, config.output, &mut stdout).await?;
    info!(hello = %state.hello, greet = %state.greet, "Panel settled");

    if let Some((stop_tx, task)) = metrics_server {
        info!("Serving metrics until shutdown");
        shutdown_signal().await;
        let _ = stop_tx.send(());
        task.await?;
    }

    Ok(())
}

async fn serve_metrics(
    config: &Config,
    registry: Arc<MetricsRegistry>,
) -> Result<(oneshot::Sender<()>, JoinHandle<()>)> {
    let addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
    let handler = MetricsHandler::new(registry, &config.metrics.path);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let (local_addr, task) = start_metrics_server(addr, handler, async move {
        let _ = stop_rx.await;
    })
    .await?;

    info!(
        "Metrics server listening on http://{}{}",
        local_addr, config.metrics.path
    );
    Ok((stop_tx, task))
}
