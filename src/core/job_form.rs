//! Draft job configuration, validation, and submission.

use thiserror::Error;

use crate::core::catalog::ConnectorCatalog;
use crate::core::models::{ConnectorBinding, ConnectorRole, JobDraft, JobId};
use crate::host::{ClientError, HostApi};

/// Field paths of the draft a view can write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    JobName,
    SourceConnector,
    SourceConfig,
    SinkConnector,
    SinkConfig,
}

/// A single failed validation check.
///
/// Validation collects every applicable violation so the view can flag all
/// invalid fields at once; nothing here is ever sent to the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("job name must not be empty")]
    JobNameEmpty,
    #[error("no source connector selected")]
    SourceConnectorEmpty,
    #[error("unknown source connector: {0}")]
    SourceConnectorUnknown(String),
    #[error("source configuration must not be empty")]
    SourceConfigEmpty,
    #[error("source configuration is not valid JSON")]
    SourceConfigNotJson,
    #[error("no sink connector selected")]
    SinkConnectorEmpty,
    #[error("unknown sink connector: {0}")]
    SinkConnectorUnknown(String),
    #[error("sink configuration must not be empty")]
    SinkConfigEmpty,
    #[error("sink configuration is not valid JSON")]
    SinkConfigNotJson,
}

impl ValidationError {
    /// The field the error should be rendered against.
    pub fn field(&self) -> DraftField {
        match self {
            ValidationError::JobNameEmpty => DraftField::JobName,
            ValidationError::SourceConnectorEmpty | ValidationError::SourceConnectorUnknown(_) => {
                DraftField::SourceConnector
            }
            ValidationError::SourceConfigEmpty | ValidationError::SourceConfigNotJson => {
                DraftField::SourceConfig
            }
            ValidationError::SinkConnectorEmpty | ValidationError::SinkConnectorUnknown(_) => {
                DraftField::SinkConnector
            }
            ValidationError::SinkConfigEmpty | ValidationError::SinkConfigNotJson => {
                DraftField::SinkConfig
            }
        }
    }
}

/// Why a submission did not produce a job.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The draft failed validation; nothing was sent to the daemon.
    #[error("draft failed validation ({} error(s))", .0.len())]
    Invalid(Vec<ValidationError>),
    /// The daemon rejected or failed the request; the draft is preserved.
    #[error("daemon rejected job creation: {0}")]
    Host(#[from] ClientError),
}

/// Builder for one sync job submission.
///
/// Accumulates operator input field by field with no validation on write,
/// then validates and submits the whole draft as a single request.
///
/// `submit` takes `&mut self`, so no field write or second submission can
/// overlap an in-flight one from the same form.
#[derive(Debug, Default)]
pub struct JobForm {
    draft: JobDraft,
}

impl JobForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &JobDraft {
        &self.draft
    }

    /// Update one field of the draft. The draft may transiently be
    /// incomplete; nothing is checked until [`validate`](Self::validate).
    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::JobName => self.draft.job_name = value,
            DraftField::SourceConnector => self.draft.source.connector_name = value,
            DraftField::SourceConfig => self.draft.source.raw_config = value,
            DraftField::SinkConnector => self.draft.sink.connector_name = value,
            DraftField::SinkConfig => self.draft.sink.raw_config = value,
        }
    }

    pub fn field_value(&self, field: DraftField) -> &str {
        match field {
            DraftField::JobName => &self.draft.job_name,
            DraftField::SourceConnector => &self.draft.source.connector_name,
            DraftField::SourceConfig => &self.draft.source.raw_config,
            DraftField::SinkConnector => &self.draft.sink.connector_name,
            DraftField::SinkConfig => &self.draft.sink.raw_config,
        }
    }

    /// Check the draft against the current catalog.
    ///
    /// Checks run in field order (name, source binding, sink binding) and
    /// every violation is collected; the result is never short-circuited at
    /// the first failure.
    pub fn validate(&self, catalog: &ConnectorCatalog) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.draft.job_name.trim().is_empty() {
            errors.push(ValidationError::JobNameEmpty);
        }
        check_binding(&self.draft.source, ConnectorRole::Source, catalog, &mut errors);
        check_binding(&self.draft.sink, ConnectorRole::Sink, catalog, &mut errors);

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validate and submit the draft as one atomic request.
    ///
    /// A draft failing validation never reaches the daemon. On daemon
    /// failure the draft is preserved unchanged so the operator can retry
    /// without re-entering anything; on success it is cleared.
    pub async fn submit(
        &mut self,
        host: &dyn HostApi,
        catalog: &ConnectorCatalog,
    ) -> Result<JobId, SubmitError> {
        if let Err(errors) = self.validate(catalog) {
            return Err(SubmitError::Invalid(errors));
        }

        let job_id = host.create_sync_job(&self.draft).await?;
        self.draft = JobDraft::default();
        Ok(job_id)
    }
}

fn check_binding(
    binding: &ConnectorBinding,
    role: ConnectorRole,
    catalog: &ConnectorCatalog,
    errors: &mut Vec<ValidationError>,
) {
    if binding.connector_name.is_empty() {
        errors.push(match role {
            ConnectorRole::Source => ValidationError::SourceConnectorEmpty,
            ConnectorRole::Sink => ValidationError::SinkConnectorEmpty,
        });
    } else if !catalog.contains(role, &binding.connector_name) {
        let name = binding.connector_name.clone();
        errors.push(match role {
            ConnectorRole::Source => ValidationError::SourceConnectorUnknown(name),
            ConnectorRole::Sink => ValidationError::SinkConnectorUnknown(name),
        });
    }

    if binding.raw_config.trim().is_empty() {
        errors.push(match role {
            ConnectorRole::Source => ValidationError::SourceConfigEmpty,
            ConnectorRole::Sink => ValidationError::SinkConfigEmpty,
        });
    } else if serde_json::from_str::<serde_json::Value>(&binding.raw_config).is_err() {
        errors.push(match role {
            ConnectorRole::Source => ValidationError::SourceConfigNotJson,
            ConnectorRole::Sink => ValidationError::SinkConfigNotJson,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ConnectorDescriptor;
    use crate::host::ClientError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Host that records create calls; fails them when `reject` is set.
    #[derive(Default)]
    struct RecordingHost {
        calls: AtomicUsize,
        last_draft: tokio::sync::Mutex<Option<JobDraft>>,
        reject: bool,
    }

    #[async_trait]
    impl HostApi for RecordingHost {
        async fn system_metrics(&self) -> Result<crate::core::models::MetricsSample, ClientError> {
            unimplemented!("not used by form tests")
        }

        async fn available_connectors(&self) -> Result<Vec<ConnectorDescriptor>, ClientError> {
            unimplemented!("not used by form tests")
        }

        async fn create_sync_job(&self, draft: &JobDraft) -> Result<JobId, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_draft.lock().await = Some(draft.clone());
            if self.reject {
                Err(ClientError::Rpc(crate::host::RpcError {
                    code: -32603,
                    message: "boom".to_string(),
                    data: None,
                }))
            } else {
                Ok(JobId("job-1".to_string()))
            }
        }
    }

    async fn test_catalog() -> ConnectorCatalog {
        struct Fixed;

        #[async_trait]
        impl HostApi for Fixed {
            async fn system_metrics(
                &self,
            ) -> Result<crate::core::models::MetricsSample, ClientError> {
                unimplemented!()
            }

            async fn available_connectors(&self) -> Result<Vec<ConnectorDescriptor>, ClientError> {
                Ok(vec![
                    ConnectorDescriptor {
                        name: "postgres".to_string(),
                        role: ConnectorRole::Source,
                        config_schema_id: "postgres/source.json".to_string(),
                    },
                    ConnectorDescriptor {
                        name: "s3".to_string(),
                        role: ConnectorRole::Sink,
                        config_schema_id: "s3/sink.json".to_string(),
                    },
                ])
            }

            async fn create_sync_job(&self, _draft: &JobDraft) -> Result<JobId, ClientError> {
                unimplemented!()
            }
        }

        let mut catalog = ConnectorCatalog::new();
        catalog.load(&Fixed).await.unwrap();
        catalog
    }

    fn filled_form() -> JobForm {
        let mut form = JobForm::new();
        form.set_field(DraftField::JobName, "nightly-sync");
        form.set_field(DraftField::SourceConnector, "postgres");
        form.set_field(DraftField::SourceConfig, r#"{"dsn":"postgres://src"}"#);
        form.set_field(DraftField::SinkConnector, "s3");
        form.set_field(DraftField::SinkConfig, r#"{"bucket":"archive"}"#);
        form
    }

    #[tokio::test]
    async fn test_empty_draft_collects_every_violation() {
        let catalog = test_catalog().await;
        let errors = JobForm::new().validate(&catalog).unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::JobNameEmpty,
                ValidationError::SourceConnectorEmpty,
                ValidationError::SourceConfigEmpty,
                ValidationError::SinkConnectorEmpty,
                ValidationError::SinkConfigEmpty,
            ]
        );
    }

    #[tokio::test]
    async fn test_violations_are_exactly_the_failing_checks() {
        let catalog = test_catalog().await;
        let mut form = JobForm::new();
        form.set_field(DraftField::SourceConnector, "postgres");
        form.set_field(DraftField::SourceConfig, "{}");
        form.set_field(DraftField::SinkConnector, "s3");

        let errors = form.validate(&catalog).unwrap_err();

        assert_eq!(
            errors,
            vec![ValidationError::JobNameEmpty, ValidationError::SinkConfigEmpty]
        );
    }

    #[tokio::test]
    async fn test_connector_must_exist_with_matching_role() {
        let catalog = test_catalog().await;
        let mut form = filled_form();
        // s3 only registers as a sink, postgres only as a source
        form.set_field(DraftField::SourceConnector, "s3");
        form.set_field(DraftField::SinkConnector, "postgres");

        let errors = form.validate(&catalog).unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::SourceConnectorUnknown("s3".to_string()),
                ValidationError::SinkConnectorUnknown("postgres".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_config_must_be_valid_json() {
        let catalog = test_catalog().await;
        let mut form = filled_form();
        form.set_field(DraftField::SourceConfig, "dsn = not json");

        let errors = form.validate(&catalog).unwrap_err();

        assert_eq!(errors, vec![ValidationError::SourceConfigNotJson]);
    }

    #[tokio::test]
    async fn test_well_formed_draft_validates() {
        let catalog = test_catalog().await;
        assert!(filled_form().validate(&catalog).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_submit_never_calls_host() {
        let catalog = test_catalog().await;
        let host = RecordingHost::default();
        let mut form = JobForm::new();
        form.set_field(DraftField::SourceConnector, "postgres");
        form.set_field(DraftField::SourceConfig, "{}");

        let result = form.submit(&host, &catalog).await;

        assert!(matches!(result, Err(SubmitError::Invalid(_))));
        assert_eq!(host.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_sends_full_draft_once_and_clears() {
        let catalog = test_catalog().await;
        let host = RecordingHost::default();
        let mut form = filled_form();
        let expected = form.draft().clone();

        let job_id = form.submit(&host, &catalog).await.unwrap();

        assert_eq!(job_id, JobId("job-1".to_string()));
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
        assert_eq!(host.last_draft.lock().await.as_ref(), Some(&expected));
        assert_eq!(form.draft(), &JobDraft::default());
    }

    #[tokio::test]
    async fn test_host_failure_preserves_draft() {
        let catalog = test_catalog().await;
        let host = RecordingHost {
            reject: true,
            ..Default::default()
        };
        let mut form = filled_form();
        let before = form.draft().clone();

        let result = form.submit(&host, &catalog).await;

        assert!(matches!(result, Err(SubmitError::Host(_))));
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
        assert_eq!(form.draft(), &before);
    }

    #[tokio::test]
    async fn test_error_maps_to_its_field() {
        assert_eq!(ValidationError::JobNameEmpty.field(), DraftField::JobName);
        assert_eq!(
            ValidationError::SourceConnectorUnknown("x".to_string()).field(),
            DraftField::SourceConnector
        );
        assert_eq!(ValidationError::SinkConfigNotJson.field(), DraftField::SinkConfig);
    }
}
