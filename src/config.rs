//! Runtime configuration.
//!
//! Settings merge weakest to strongest: built-in defaults, then
//! `syncdash.toml`, then `SYNCDASH_*` environment variables, then CLI
//! flags.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "syncdash.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address of the daemon's RPC endpoint.
    pub host_addr: SocketAddr,
    /// Dashboard metrics poll period in milliseconds.
    pub poll_interval_ms: u64,
    /// Use the in-process simulated daemon instead of connecting out.
    pub simulation: bool,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host_addr: SocketAddr::from(([127, 0, 0, 1], 7450)),
            poll_interval_ms: 1000,
            simulation: false,
            verbose: false,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Merge configuration sources. `overrides` carries the CLI flags;
    /// fields left unset there fall through to the weaker sources.
    pub fn new<T: Serialize>(file: Option<&Path>, overrides: Option<&T>) -> Result<Self> {
        let path = file.unwrap_or(Path::new(CONFIG_FILE));

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("SYNCDASH_"));
        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        figment.extract().context("invalid configuration")
    }
}
