//! Simulated daemon for running the console without a live host.
//!
//! Enabled with `--simulation true`. Metrics are slow phase-shifted waves so
//! the dashboard chart shows movement; the catalog mirrors the connectors
//! the real daemon registers at startup. Accepted drafts are recorded and
//! never executed.

use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ClientError, HostApi};
use crate::core::models::{ConnectorDescriptor, ConnectorRole, JobDraft, JobId, MetricsSample};

/// Built-in connectors of the real daemon, each usable on both sides.
const CONNECTOR_NAMES: [&str; 3] = ["mysql", "postgres", "kafka"];

pub struct SimulatedHost {
    started: Instant,
    catalog: Vec<ConnectorDescriptor>,
    created: Mutex<Vec<JobDraft>>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        let mut catalog = Vec::new();
        for name in CONNECTOR_NAMES {
            for role in [ConnectorRole::Source, ConnectorRole::Sink] {
                catalog.push(ConnectorDescriptor {
                    name: name.to_string(),
                    role,
                    config_schema_id: format!("{name}/{role}.json"),
                });
            }
        }

        Self {
            started: Instant::now(),
            catalog,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Drafts accepted so far, oldest first.
    pub async fn created_jobs(&self) -> Vec<JobDraft> {
        self.created.lock().await.clone()
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostApi for SimulatedHost {
    async fn system_metrics(&self) -> Result<MetricsSample, ClientError> {
        let t = self.started.elapsed().as_secs_f32();

        Ok(MetricsSample {
            cpu_usage: 45.0 + 30.0 * (t / 7.0).sin(),
            memory_usage: 60.0 + 15.0 * (t / 13.0).sin(),
            disk_usage: 72.5 + 2.0 * (t / 31.0).sin(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        })
    }

    async fn available_connectors(&self) -> Result<Vec<ConnectorDescriptor>, ClientError> {
        Ok(self.catalog.clone())
    }

    async fn create_sync_job(&self, draft: &JobDraft) -> Result<JobId, ClientError> {
        self.created.lock().await.push(draft.clone());
        Ok(JobId(Uuid::now_v7().to_string()))
    }
}
