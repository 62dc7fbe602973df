// src/lib.rs
pub mod config;
pub mod health;
pub mod metrics;
pub mod panel;
pub mod server;
pub mod status;
