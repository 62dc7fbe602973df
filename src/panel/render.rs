// src/panel/render.rs
use crate::config::OutputFormat;
use crate::health::ProbeTarget;
use crate::status::{PanelState, ServiceStatus};

pub const HEADING: &str = "service pinger";

/// An unknown status renders as an empty value.
fn display_value(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Unknown => "",
        other => other.as_str(),
    }
}

fn status_line(target: ProbeTarget, status: ServiceStatus) -> String {
    format!("{} service status: {}", target.label(), display_value(status))
}

pub fn render_text(state: &PanelState) -> String {
    let mut lines = vec![HEADING.to_string()];
    lines.push(status_line(ProbeTarget::Hello, state.hello));
    lines.push(status_line(ProbeTarget::Greet, state.greet));
    lines.join("\n")
}

pub fn render_json(state: &PanelState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

pub fn render(state: &PanelState, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(state)),
        OutputFormat::Json => render_json(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_statuses_render_empty() {
        let text = render_text(&PanelState::default());
        assert_eq!(
            text,
            "service pinger\n\"hello, world!\" service status: \n\"greet\" service status: "
        );
    }

    #[test]
    fn settled_statuses_render_by_name() {
        let state = PanelState {
            hello: ServiceStatus::Offline,
            greet: ServiceStatus::Online,
            revision: 2,
            ..Default::default()
        };
        let text = render_text(&state);

        assert!(text.contains("\"hello, world!\" service status: offline"));
        assert!(text.contains("\"greet\" service status: online"));
    }

    #[test]
    fn json_snapshot_keeps_diagnostic() {
        let state = PanelState {
            hello: ServiceStatus::Error,
            greet: ServiceStatus::Error,
            revision: 1,
            diagnostic: Some("connection refused".into()),
            updated_at: None,
        };
        let value: serde_json::Value =
            serde_json::from_str(&render(&state, OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(value["hello"], "error");
        assert_eq!(value["greet"], "error");
        assert_eq!(value["revision"], 1);
        assert_eq!(value["diagnostic"], "connection refused");
    }
}
