//! ShiftPulse engine library crate.
//!
//! This crate turns raw shift records (schedules, punches and breaks)
//! into workforce metrics: derived shift status, compliance scores,
//! range summaries, daily trends, per-employee statistics and ranked
//! operational alerts.  External applications may depend on the
//! `shiftpulse_engine` crate and call `engine::run_dashboard` directly
//! or embed the HTTP surface via `api::build_router`.

pub mod models;
pub mod error;
pub mod config;
pub mod status;
pub mod compliance;
pub mod metrics;
pub mod aggregate;
pub mod detector;
pub mod attendance;
pub mod engine;
pub mod fixtures;
pub mod api;
pub mod logging;
