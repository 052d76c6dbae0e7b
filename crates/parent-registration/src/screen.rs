//! Registration screen state.
//!
//! [`ScreenState`] is a plain value; every user action or workflow result is
//! a [`ScreenEvent`] and [`ScreenState::reduce`] returns the next state.
//! [`RegistrationScreen`] owns the current state for one mounted screen and
//! runs submissions against the workflow.

use crate::form::{Field, RegistrationForm};
use crate::validation::ValidationErrors;
use crate::workflow::{RegistrationOutcome, RegistrationWorkflow};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Notification shown after a successful registration.
pub const SUCCESS_NOTICE: &str = "You are successfully registered";

/// Text shown under the form.
pub const FOOTNOTE: &str = "Only Parents or Guardians can sign up for this application. \
After initial sign up they may add dependents to their account.";

/// Screen the user should be taken to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
}

/// Something that happened on the screen.
#[derive(Debug)]
pub enum ScreenEvent {
    /// A field's text changed.
    Edited(Field, String),
    /// The screen lost focus.
    Blurred,
    /// "Register" was pressed.
    SubmitStarted,
    /// A submission finished.
    SubmitFinished(RegistrationOutcome),
    /// "Cancel" was pressed.
    Cancelled,
}

/// Everything the screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenState {
    form: RegistrationForm,
    errors: ValidationErrors,
    in_flight: usize,
    notice: Option<&'static str>,
    route: Option<Route>,
}

impl ScreenState {
    /// State of a freshly mounted screen.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Number of submissions still waiting on the store.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Notification to show, if any.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    /// Navigation requested by the screen, if any.
    pub fn route(&self) -> Option<Route> {
        self.route
    }

    /// Apply an event and return the next state.
    pub fn reduce(self, event: ScreenEvent) -> Self {
        match event {
            ScreenEvent::Edited(field, value) => Self {
                form: self.form.with_value(field, value),
                ..self
            },
            ScreenEvent::Blurred => Self {
                in_flight: self.in_flight,
                ..Self::default()
            },
            ScreenEvent::SubmitStarted => Self {
                in_flight: self.in_flight + 1,
                ..self
            },
            ScreenEvent::SubmitFinished(outcome) => {
                let in_flight = self.in_flight.saturating_sub(1);
                match outcome {
                    RegistrationOutcome::Invalid(errors)
                    | RegistrationOutcome::UsernameTaken(errors) => Self {
                        errors,
                        in_flight,
                        ..self
                    },
                    RegistrationOutcome::Registered { .. } => Self {
                        errors: ValidationErrors::new(),
                        in_flight,
                        notice: Some(SUCCESS_NOTICE),
                        route: Some(Route::Login),
                        ..self
                    },
                    // Store failures are logged by the workflow and not shown.
                    RegistrationOutcome::Failed(_) => Self {
                        errors: ValidationErrors::new(),
                        in_flight,
                        ..self
                    },
                }
            }
            ScreenEvent::Cancelled => Self {
                route: Some(Route::Login),
                ..self
            },
        }
    }

    /// Lines of the error region: each non-empty message in field order,
    /// then the suggestion list.
    pub fn error_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .errors
            .messages()
            .map(|(_, message)| message.to_string())
            .collect();

        if let Some(suggestions) = self.errors.suggestions() {
            if !suggestions.is_empty() {
                lines.push(format!("Try: {}", suggestions.join(", ")));
            }
        }

        lines
    }
}

/// What happened to a submit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The result was applied to the screen.
    Applied,
    /// Not started: the screen is unmounted or another submit is pending.
    Ignored,
    /// The workflow ran but the screen was unmounted before it finished.
    Discarded,
}

/// One mounted registration screen.
///
/// Clones share the same state, so several submissions can be in flight at
/// once unless the in-flight guard is enabled.
#[derive(Clone)]
pub struct RegistrationScreen {
    state: Arc<RwLock<ScreenState>>,
    mounted: Arc<AtomicBool>,
    workflow: RegistrationWorkflow,
    guard_in_flight: bool,
}

impl RegistrationScreen {
    /// Mount a new screen.
    pub fn new(workflow: RegistrationWorkflow) -> Self {
        Self {
            state: Arc::new(RwLock::new(ScreenState::new())),
            mounted: Arc::new(AtomicBool::new(true)),
            workflow,
            guard_in_flight: false,
        }
    }

    /// Ignore submits while one is pending.
    pub fn guard_in_flight(mut self, enabled: bool) -> Self {
        self.guard_in_flight = enabled;
        self
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> ScreenState {
        self.state.read().await.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Tear the screen down. Later events are dropped.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Apply an event. Returns false if the screen is no longer mounted.
    pub async fn dispatch(&self, event: ScreenEvent) -> bool {
        if !self.is_mounted() {
            debug!(?event, "Screen unmounted, dropping event");
            return false;
        }

        let mut state = self.state.write().await;
        let current = std::mem::take(&mut *state);
        *state = current.reduce(event);
        true
    }

    pub async fn edit(&self, field: Field, value: impl Into<String>) -> bool {
        self.dispatch(ScreenEvent::Edited(field, value.into())).await
    }

    pub async fn blur(&self) -> bool {
        self.dispatch(ScreenEvent::Blurred).await
    }

    pub async fn cancel(&self) -> bool {
        self.dispatch(ScreenEvent::Cancelled).await
    }

    /// Submit the current form.
    pub async fn submit(&self) -> Submission {
        let form = {
            let mut state = self.state.write().await;
            if !self.is_mounted() {
                return Submission::Ignored;
            }
            if self.guard_in_flight && state.in_flight > 0 {
                debug!("Submission already in flight, ignoring");
                return Submission::Ignored;
            }
            let current = std::mem::take(&mut *state);
            *state = current.reduce(ScreenEvent::SubmitStarted);
            state.form.clone()
        };

        let outcome = self.workflow.register(&form).await;

        if self.dispatch(ScreenEvent::SubmitFinished(outcome)).await {
            Submission::Applied
        } else {
            Submission::Discarded
        }
    }
}
