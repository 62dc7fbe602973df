// src/panel/display.rs
use super::{render, StatusPanel};
use crate::config::OutputFormat;
use crate::status::PanelState;
use anyhow::{Context, Result};
use std::io::Write;

/// Mount the panel and redraw to `out` on every observed update until both
/// services are settled. Returns the settled state.
///
/// Updates published faster than they are drawn collapse into one frame.
pub async fn run_display<W: Write>(
    panel: &StatusPanel,
    format: OutputFormat,
    out: &mut W,
) -> Result<PanelState> {
    let mut updates = panel.subscribe();
    let mut drawn = draw(out, &updates.borrow_and_update(), format)?;

    let Some(mut task) = panel.mount() else {
        return Ok(panel.state());
    };

    let mut finished = false;
    loop {
        tokio::select! {
            biased;
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                drawn = draw(out, &state, format)?;
                if state.is_settled() {
                    break;
                }
            }
            joined = &mut task => {
                joined.context("probe task panicked")?;
                finished = true;
                break;
            }
        }
    }
    if !finished {
        task.await.context("probe task panicked")?;
    }

    let state = panel.state();
    if state.revision != drawn {
        draw(out, &state, format)?;
    }
    Ok(state)
}

fn draw<W: Write>(out: &mut W, state: &PanelState, format: OutputFormat) -> Result<u64> {
    let frame = render::render(state, format).context("Failed to render panel")?;
    writeln!(out, "{}", frame)?;
    if format == OutputFormat::Text {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(state.revision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{ProbeError, ProbeResponse, ProbeTarget, Prober};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct AlwaysOk;

    #[async_trait]
    impl Prober for AlwaysOk {
        async fn probe(&self, target: ProbeTarget) -> Result<ProbeResponse, ProbeError> {
            Ok(ProbeResponse {
                target,
                status_code: 200,
                response_time_ms: 0,
            })
        }
    }

    #[tokio::test]
    async fn draws_initial_and_final_frames() {
        let panel = StatusPanel::new(Arc::new(AlwaysOk), None);
        let mut out = Vec::new();

        let state = run_display(&panel, OutputFormat::Text, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(state.revision, 2);
        assert!(text.starts_with("service pinger\n\"hello, world!\" service status: \n"));
        assert!(text.trim_end().ends_with("\"greet\" service status: online"));
    }

    #[tokio::test]
    async fn already_mounted_panel_is_drawn_once() {
        let panel = StatusPanel::new(Arc::new(AlwaysOk), None);
        panel.mount().unwrap().await.unwrap();
        let mut out = Vec::new();

        let state = run_display(&panel, OutputFormat::Json, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().count(), 1);
        assert_eq!(state.revision, 2);
    }

    #[tokio::test]
    async fn stops_drawing_once_both_services_settle() {
        let panel = StatusPanel::new(Arc::new(AlwaysOk), None);
        let mut out = Vec::new();

        let state = run_display(&panel, OutputFormat::Json, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let last: serde_json::Value =
            serde_json::from_str(text.lines().last().unwrap()).unwrap();

        assert!(state.is_settled());
        assert_eq!(last["greet"], "online");
        assert!(text.lines().count() <= 3);
    }
}
