//! Client side of the daemon boundary.
//!
//! The daemon owns the connector registry, job execution, and metrics
//! sampling; everything in this crate reaches it through the three typed
//! operations on [`HostApi`].
//!
//! ## Architecture
//!
//! - `protocol`: JSON-RPC 2.0 request/response types
//! - `client`: one request/response pair per TCP connection
//! - `simulated`: in-process stand-in for running without a daemon

pub mod client;
mod protocol;
pub mod simulated;

pub use client::{ClientError, HostClient};
pub use protocol::{Request, Response, RpcError};
pub use simulated::SimulatedHost;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::models::{ConnectorDescriptor, JobDraft, JobId, MetricsSample};

/// Method names understood by the daemon.
pub const GET_SYSTEM_METRICS: &str = "get_system_metrics";
pub const GET_AVAILABLE_CONNECTORS: &str = "get_available_connectors";
pub const CREATE_SYNC_JOB: &str = "create_sync_job";

#[derive(Debug, Deserialize)]
struct CreatedJob {
    job_id: JobId,
}

/// Typed surface of the daemon's RPC methods.
///
/// The stateful components are written against this trait so tests can
/// drive them with scripted hosts.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// One metrics snapshot. Called once per telemetry poll tick.
    async fn system_metrics(&self) -> Result<MetricsSample, ClientError>;

    /// Contents of the connector registry. Called once per job-view activation.
    async fn available_connectors(&self) -> Result<Vec<ConnectorDescriptor>, ClientError>;

    /// Create a job from a validated draft. At most one call per submission.
    async fn create_sync_job(&self, draft: &JobDraft) -> Result<JobId, ClientError>;
}

#[async_trait]
impl HostApi for HostClient {
    async fn system_metrics(&self) -> Result<MetricsSample, ClientError> {
        self.call_no_params(GET_SYSTEM_METRICS).await
    }

    async fn available_connectors(&self) -> Result<Vec<ConnectorDescriptor>, ClientError> {
        self.call_no_params(GET_AVAILABLE_CONNECTORS).await
    }

    async fn create_sync_job(&self, draft: &JobDraft) -> Result<JobId, ClientError> {
        let params = serde_json::json!({ "config": draft });
        let created: CreatedJob = self.call(CREATE_SYNC_JOB, Some(params)).await?;
        Ok(created.job_id)
    }
}
