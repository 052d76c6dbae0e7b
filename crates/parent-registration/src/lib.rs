//! Parent account registration.
//!
//! Collects a username, password and email, validates them, checks the user
//! store for an existing record and writes a new one with the password
//! stored as a SHA-256 digest.

pub mod config;
pub mod error;
pub mod form;
pub mod id;
pub mod record;
pub mod screen;
pub mod store;
pub mod validation;
pub mod workflow;

pub use config::Config;
pub use error::{RegistrationError, RegistrationResult};
pub use form::{Field, RegistrationForm, Role};
pub use id::{IdGenerator, UuidGenerator};
pub use record::UserRecord;
pub use screen::{RegistrationScreen, Route, ScreenEvent, ScreenState, Submission};
pub use store::{MemoryStore, RealtimeDbStore, UserStore};
pub use validation::{validate, validate_with, ErrorPolicy, ValidationErrors};
pub use workflow::{RegistrationOutcome, RegistrationWorkflow};
