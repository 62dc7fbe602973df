// src/status/mod.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Last-known reachability of a probed service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Unknown,
    Online,
    Offline,
    Error,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::Online => "online",
            ServiceStatus::Offline => "offline",
            ServiceStatus::Error => "error",
        }
    }

    /// 2xx is online, anything else that answered is offline.
    pub fn from_http_status(code: u16) -> Self {
        if (200..300).contains(&code) {
            ServiceStatus::Online
        } else {
            ServiceStatus::Offline
        }
    }

    pub(crate) fn gauge_value(&self) -> i64 {
        match self {
            ServiceStatus::Unknown => 0,
            ServiceStatus::Online => 1,
            ServiceStatus::Offline => 2,
            ServiceStatus::Error => 3,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the panel displays. Published as a whole on each update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelState {
    pub hello: ServiceStatus,
    pub greet: ServiceStatus,
    /// Number of updates published since mount.
    pub revision: u64,
    pub diagnostic: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PanelState {
    pub fn is_settled(&self) -> bool {
        self.hello != ServiceStatus::Unknown && self.greet != ServiceStatus::Unknown
    }
}
