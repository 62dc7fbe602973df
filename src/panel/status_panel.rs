// src/panel/status_panel.rs
use super::render;
use crate::config::OutputFormat;
use crate::health::{ProbeError, ProbeTarget, Prober};
use crate::metrics::MetricsCollector;
use crate::status::{PanelState, ServiceStatus};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Probes `/hello` then `/greet` once per mount and publishes what it saw.
///
/// State is held in a watch channel; every published update is one redraw
/// for subscribers.
pub struct StatusPanel {
    prober: Arc<dyn Prober>,
    metrics: Option<Arc<MetricsCollector>>,
    state_tx: Arc<watch::Sender<PanelState>>,
    mounted: AtomicBool,
    session_id: Uuid,
}

impl StatusPanel {
    pub fn new(prober: Arc<dyn Prober>, metrics: Option<Arc<MetricsCollector>>) -> Self {
        let (state_tx, _) = watch::channel(PanelState::default());

        Self {
            prober,
            metrics,
            state_tx: Arc::new(state_tx),
            mounted: AtomicBool::new(false),
            session_id: Uuid::new_v4(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> PanelState {
        self.state_tx.borrow().clone()
    }

    /// Spawn the probe task. Only the first call does anything.
    ///
    /// The task is not tied to the panel: dropping the panel early leaves it
    /// running and its updates go unobserved.
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        if self.mounted.swap(true, Ordering::SeqCst) {
            debug!(session = %self.session_id, "panel already mounted, not probing again");
            return None;
        }

        let task = ProbeTask {
            prober: self.prober.clone(),
            metrics: self.metrics.clone(),
            state_tx: self.state_tx.clone(),
        };
        let span = info_span!("status_panel", session = %self.session_id);

        Some(tokio::spawn(task.run().instrument(span)))
    }

    pub fn render(&self) -> String {
        render::render_text(&self.state())
    }

    pub fn render_with(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        render::render(&self.state(), format)
    }
}

struct ProbeTask {
    prober: Arc<dyn Prober>,
    metrics: Option<Arc<MetricsCollector>>,
    state_tx: Arc<watch::Sender<PanelState>>,
}

impl ProbeTask {
    async fn run(self) {
        info!("Checking services");

        if let Err(err) = self.check_services().await {
            error!(error = %err, "Service check failed");
            // One failure marks both services, whichever probe raised it.
            self.publish(|state| {
                state.hello = ServiceStatus::Error;
                state.greet = ServiceStatus::Error;
                state.diagnostic = Some(err.to_string());
            });
            self.report_status(ProbeTarget::Hello, ServiceStatus::Error);
            self.report_status(ProbeTarget::Greet, ServiceStatus::Error);
            return;
        }

        let state = self.state_tx.borrow().clone();
        info!(hello = %state.hello, greet = %state.greet, "Service check complete");
    }

    async fn check_services(&self) -> Result<(), ProbeError> {
        for target in ProbeTarget::ALL {
            let start = Instant::now();
            let response = match self.prober.probe(target).await {
                Ok(response) => response,
                Err(err) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_transport_failure(target, start.elapsed());
                    }
                    return Err(err);
                }
            };

            let status = response.status();
            if let Some(metrics) = &self.metrics {
                metrics.record_probe(
                    target,
                    status,
                    Duration::from_millis(response.response_time_ms),
                );
            }

            debug!(
                target = %response.target,
                status_code = response.status_code,
                %status,
                "Probe settled"
            );
            self.publish(|state| match target {
                ProbeTarget::Hello => state.hello = status,
                ProbeTarget::Greet => state.greet = status,
            });
            self.report_status(target, status);
        }
        Ok(())
    }

    fn publish(&self, update: impl FnOnce(&mut PanelState)) {
        self.state_tx.send_modify(|state| {
            update(state);
            state.revision += 1;
            state.updated_at = Some(Utc::now());
        });
    }

    fn report_status(&self, target: ProbeTarget, status: ServiceStatus) {
        if let Some(metrics) = &self.metrics {
            metrics.update_service_status(target, status);
        }
    }
}
