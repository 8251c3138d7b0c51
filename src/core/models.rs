use serde::{Deserialize, Serialize};

/// Role a connector can play in a sync job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorRole {
    Source,
    Sink,
}

impl std::fmt::Display for ConnectorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorRole::Source => write!(f, "source"),
            ConnectorRole::Sink => write!(f, "sink"),
        }
    }
}

/// A connector advertised by the daemon's registry.
///
/// Immutable once fetched; the catalog replaces its list wholesale on every
/// refresh rather than mutating entries in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    pub name: String,
    #[serde(rename = "connector_type")]
    pub role: ConnectorRole,
    #[serde(rename = "schema")]
    pub config_schema_id: String,
}

/// One side of a sync job: a chosen connector plus its configuration payload.
///
/// `raw_config` is typed by the operator as JSON text and passed through to
/// the daemon opaque. The client checks it parses; it never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorBinding {
    pub connector_name: String,
    pub raw_config: String,
}

/// An in-progress job configuration.
///
/// Created empty when the job-creation view mounts, filled field by field,
/// and consumed by exactly one submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDraft {
    pub job_name: String,
    pub source: ConnectorBinding,
    pub sink: ConnectorBinding,
}

/// One host metrics snapshot. Percentages are in `[0, 100]`, clamped by the
/// sampler; this side stores whatever arrives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSample {
    pub cpu_usage: f32,
    pub memory_usage: f32,
    pub disk_usage: f32,
    pub timestamp_ms: i64,
}

/// Identifier the daemon assigns to a created job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
