//! Validate, check for an existing record, hash and write.

use crate::error::{RegistrationError, RegistrationResult};
use crate::form::RegistrationForm;
use crate::id::{IdGenerator, UuidGenerator};
use crate::record::{user_path, UserRecord};
use crate::store::UserStore;
use crate::validation::{validate_with, ErrorPolicy, ValidationErrors};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Result of one registration attempt.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// The form failed validation; the store was not contacted.
    Invalid(ValidationErrors),
    /// A record already exists at the generated path; nothing was written.
    UsernameTaken(ValidationErrors),
    /// The record was written.
    Registered { user_id: String },
    /// Reading or writing failed. Already logged; not retried.
    Failed(RegistrationError),
}

impl RegistrationOutcome {
    /// Errors to show on the form, if this outcome has any.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            RegistrationOutcome::Invalid(errors) | RegistrationOutcome::UsernameTaken(errors) => {
                Some(errors)
            }
            _ => None,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, RegistrationOutcome::Registered { .. })
    }
}

/// Registration of parent accounts against a user store.
#[derive(Clone)]
pub struct RegistrationWorkflow {
    store: Arc<dyn UserStore>,
    ids: Arc<dyn IdGenerator>,
    policy: ErrorPolicy,
    suggestion_count: usize,
}

impl RegistrationWorkflow {
    /// Create a workflow that assigns random UUIDs.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self::with_id_generator(store, Arc::new(UuidGenerator))
    }

    /// Create a workflow with a custom id source.
    pub fn with_id_generator(store: Arc<dyn UserStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store,
            ids,
            policy: ErrorPolicy::default(),
            suggestion_count: 3,
        }
    }

    /// Set how messages on the same field combine.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set how many usernames to suggest on a collision.
    pub fn suggestion_count(mut self, count: usize) -> Self {
        self.suggestion_count = count;
        self
    }

    /// Validate the form without touching the store.
    pub fn validate(&self, form: &RegistrationForm) -> ValidationErrors {
        validate_with(form, self.policy)
    }

    /// Validate the form and, if it passes, create the user record.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegistrationForm) -> RegistrationOutcome {
        let errors = self.validate(form);
        if !errors.is_empty() {
            debug!(fields = errors.len(), "Form rejected by validation");
            return RegistrationOutcome::Invalid(errors);
        }

        match self.create_record(form).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Registration failed");
                RegistrationOutcome::Failed(e)
            }
        }
    }

    async fn create_record(&self, form: &RegistrationForm) -> RegistrationResult<RegistrationOutcome> {
        let user_id = self.ids.generate();
        let path = user_path(&user_id);

        // Existence is checked at the freshly generated path, not by username.
        if self.store.exists(&path).await? {
            warn!(user_id = %user_id, "Record already exists at generated path");
            return Ok(RegistrationOutcome::UsernameTaken(
                ValidationErrors::username_taken(&form.username, self.suggestion_count),
            ));
        }

        let record = UserRecord::from_form(form);
        self.store.write(&path, &record).await?;

        info!(user_id = %user_id, "User registered");
        Ok(RegistrationOutcome::Registered { user_id })
    }
}
