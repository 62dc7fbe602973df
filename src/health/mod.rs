// src/health/mod.rs
mod checker;
mod target;

pub use checker::{HttpProber, ProbeError, ProbeResponse, Prober};
pub use target::ProbeTarget;
