//! syncdash - operator console for a data-sync daemon.
//!
//! The daemon owns the connector registry, job execution, and metrics
//! sampling. This crate is the presentation side: it renders daemon state in
//! a terminal UI and forwards structured requests over JSON-RPC.

pub mod config;
pub mod core;
pub mod host;
pub mod logging;
pub mod tui;
