//! src/bin/pinger_backend.rs
//! Demo target for the panel: serves `/hello` and `/greet` on one port.
//! Run: cargo run --bin pinger-backend -- <port>

use anyhow::Result;
use service_pinger::server::{shutdown_signal, BackendHandler, BackendOptions, ServerBuilder};
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("service_pinger=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // ── Parse args / env ─────────────────────────────────────────────
    let port: u16 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "8080".into())
        .parse()?;

    let base_delay_ms = std::env::var("BASE_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let fail_pct = std::env::var("FAIL_PCT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!(
        "Demo backend on http://{}  [delay={}ms fail={}%]",
        addr, base_delay_ms, fail_pct
    );

    ServerBuilder::new(addr)
        .with_handler(BackendHandler::new(BackendOptions {
            base_delay_ms,
            fail_pct,
        }))
        .serve_with_shutdown(shutdown_signal())
        .await
}
