pub mod catalog;
pub mod job_form;
pub mod models;
pub mod telemetry;

pub use catalog::{ConnectorCatalog, FetchError};
pub use job_form::{DraftField, JobForm, SubmitError, ValidationError};
pub use models::{
    ConnectorBinding, ConnectorDescriptor, ConnectorRole, JobDraft, JobId, MetricsSample,
};
pub use telemetry::{TelemetryAggregator, TelemetrySnapshot, TelemetryWindow, WINDOW_CAPACITY};
