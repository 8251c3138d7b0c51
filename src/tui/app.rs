//! Console application state and logic.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::{
    ConnectorCatalog, ConnectorRole, DraftField, JobForm, SubmitError, TelemetryAggregator,
    TelemetrySnapshot, ValidationError,
};
use crate::host::HostApi;

/// Form slot that currently has focus in the job-creation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    JobName,
    SourceConnector,
    SourceConfig,
    SinkConnector,
    SinkConfig,
    Submit,
}

impl FormFocus {
    pub fn next(self) -> Self {
        match self {
            FormFocus::JobName => FormFocus::SourceConnector,
            FormFocus::SourceConnector => FormFocus::SourceConfig,
            FormFocus::SourceConfig => FormFocus::SinkConnector,
            FormFocus::SinkConnector => FormFocus::SinkConfig,
            FormFocus::SinkConfig => FormFocus::Submit,
            FormFocus::Submit => FormFocus::JobName,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormFocus::JobName => FormFocus::Submit,
            FormFocus::SourceConnector => FormFocus::JobName,
            FormFocus::SourceConfig => FormFocus::SourceConnector,
            FormFocus::SinkConnector => FormFocus::SourceConfig,
            FormFocus::SinkConfig => FormFocus::SinkConnector,
            FormFocus::Submit => FormFocus::SinkConfig,
        }
    }

    /// The draft field this slot edits, if any.
    pub fn field(self) -> Option<DraftField> {
        match self {
            FormFocus::JobName => Some(DraftField::JobName),
            FormFocus::SourceConnector => Some(DraftField::SourceConnector),
            FormFocus::SourceConfig => Some(DraftField::SourceConfig),
            FormFocus::SinkConnector => Some(DraftField::SinkConnector),
            FormFocus::SinkConfig => Some(DraftField::SinkConfig),
            FormFocus::Submit => None,
        }
    }

    /// Slots edited by typing.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            FormFocus::JobName | FormFocus::SourceConfig | FormFocus::SinkConfig
        )
    }

    /// Slots picked from the catalog with left/right.
    pub fn is_choice(self) -> bool {
        self.role().is_some()
    }

    pub fn role(self) -> Option<ConnectorRole> {
        match self {
            FormFocus::SourceConnector => Some(ConnectorRole::Source),
            FormFocus::SinkConnector => Some(ConnectorRole::Sink),
            _ => None,
        }
    }
}

/// Current view mounted in the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live metrics: headline tiles plus the usage chart.
    Dashboard,
    /// Job-creation form.
    CreateJob { focus: FormFocus },
}

/// Actions that can be triggered by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    OpenDashboard,
    OpenCreateJob,
    ReloadCatalog,
    FocusNext,
    FocusPrev,
    NextChoice,
    PrevChoice,
    TypeChar(char),
    Backspace,
    Activate,
}

/// Non-fatal notification shown in the footer.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Main console application state.
pub struct App {
    host: Arc<dyn HostApi>,
    config: AppConfig,
    pub view: View,
    pub telemetry: TelemetrySnapshot,
    aggregator: Option<TelemetryAggregator>,
    pub catalog: ConnectorCatalog,
    pub form: JobForm,
    pub form_errors: Vec<ValidationError>,
    pub notice: Option<Notice>,
    pub running: bool,
}

impl App {
    pub fn new(host: Arc<dyn HostApi>, config: AppConfig) -> Self {
        Self {
            host,
            config,
            view: View::Dashboard,
            telemetry: TelemetrySnapshot::default(),
            aggregator: None,
            catalog: ConnectorCatalog::new(),
            form: JobForm::new(),
            form_errors: Vec::new(),
            notice: None,
            running: true,
        }
    }

    /// Mount the initial view before the first frame.
    pub fn init(&mut self) {
        self.mount_dashboard();
    }

    fn mount_dashboard(&mut self) {
        self.notice = None;
        let mut aggregator = TelemetryAggregator::new();
        aggregator.start(
            Arc::clone(&self.host),
            Duration::from_millis(self.config.poll_interval_ms),
        );
        self.aggregator = Some(aggregator);
        self.view = View::Dashboard;
    }

    async fn mount_create_job(&mut self) {
        // Leaving the dashboard cancels its poll loop.
        if let Some(mut aggregator) = self.aggregator.take() {
            aggregator.stop();
        }
        self.telemetry = TelemetrySnapshot::default();
        self.notice = None;
        self.form = JobForm::new();
        self.form_errors.clear();
        self.view = View::CreateJob {
            focus: FormFocus::JobName,
        };
        self.reload_catalog().await;
    }

    async fn reload_catalog(&mut self) {
        if let Err(e) = self.catalog.load(self.host.as_ref()).await {
            // Stale catalog contents stay usable; just tell the operator.
            self.notice = Some(Notice::error(e.to_string()));
        }
    }

    /// Pull the latest telemetry snapshot for the next frame.
    pub async fn refresh_telemetry(&mut self) {
        if let Some(aggregator) = &self.aggregator {
            self.telemetry = aggregator.snapshot().await;
        }
    }

    /// Handle an action and update state accordingly.
    pub async fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::OpenDashboard => {
                if !matches!(self.view, View::Dashboard) {
                    self.mount_dashboard();
                }
            }
            Action::OpenCreateJob => {
                if !matches!(self.view, View::CreateJob { .. }) {
                    self.mount_create_job().await;
                }
            }
            Action::ReloadCatalog => {
                if matches!(self.view, View::CreateJob { .. }) {
                    self.reload_catalog().await;
                }
            }
            Action::FocusNext => self.move_focus(FormFocus::next),
            Action::FocusPrev => self.move_focus(FormFocus::prev),
            Action::NextChoice => self.cycle_choice(1),
            Action::PrevChoice => self.cycle_choice(-1),
            Action::TypeChar(c) => self.edit_focused(|value| value.push(c)),
            Action::Backspace => self.edit_focused(|value| {
                value.pop();
            }),
            Action::Activate => self.activate().await,
        }
    }

    fn move_focus(&mut self, step: fn(FormFocus) -> FormFocus) {
        if let View::CreateJob { focus } = self.view {
            self.view = View::CreateJob { focus: step(focus) };
        }
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        let View::CreateJob { focus } = self.view else {
            return;
        };
        if !focus.is_text() {
            return;
        }
        let Some(field) = focus.field() else {
            return;
        };
        let mut value = self.form.field_value(field).to_string();
        edit(&mut value);
        self.form.set_field(field, value);
    }

    fn cycle_choice(&mut self, step: isize) {
        let View::CreateJob { focus } = self.view else {
            return;
        };
        let (Some(role), Some(field)) = (focus.role(), focus.field()) else {
            return;
        };

        let names: Vec<String> = self.catalog.by_role(role).map(|c| c.name.clone()).collect();
        if names.is_empty() {
            self.notice = Some(Notice::error(format!("no {role} connectors available")));
            return;
        }

        let current = self.form.field_value(field);
        let next = match names.iter().position(|n| n == current) {
            Some(i) => {
                let len = names.len() as isize;
                let idx = (i as isize + step).rem_euclid(len) as usize;
                names[idx].clone()
            }
            None => names[0].clone(),
        };
        self.form.set_field(field, next);
    }

    async fn activate(&mut self) {
        let View::CreateJob { focus } = self.view else {
            return;
        };
        if focus == FormFocus::Submit {
            self.submit_form().await;
        } else {
            self.move_focus(FormFocus::next);
        }
    }

    async fn submit_form(&mut self) {
        match self.form.submit(self.host.as_ref(), &self.catalog).await {
            Ok(job_id) => {
                self.form_errors.clear();
                self.notice = Some(Notice::info(format!("created job {job_id}")));
                self.view = View::CreateJob {
                    focus: FormFocus::JobName,
                };
            }
            Err(SubmitError::Invalid(errors)) => {
                self.form_errors = errors;
            }
            Err(SubmitError::Host(e)) => {
                // Draft is preserved; the operator may retry as-is.
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
    }
}
