//! Registration form values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role stored with the user record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Parent or guardian; the only role this screen creates
    #[default]
    Parent,
    /// Account attached to a parent
    Dependent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Parent => write!(f, "parent"),
            Role::Dependent => write!(f, "dependent"),
        }
    }
}

/// A user-editable form field.
///
/// The ordering is the on-screen order, which is also the order errors are
/// listed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    #[serde(rename = "user_name")]
    Username,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "confirmPassword")]
    ConfirmPassword,
    #[serde(rename = "email")]
    Email,
}

impl Field {
    /// All fields in on-screen order.
    pub const ALL: [Field; 4] = [
        Field::Username,
        Field::Password,
        Field::ConfirmPassword,
        Field::Email,
    ];

    /// Placeholder text shown in the empty input.
    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Username => "Username",
            Field::Password => "Password",
            Field::ConfirmPassword => "Confirm Password",
            Field::Email => "Email",
        }
    }

    /// Whether the input should mask what is typed.
    pub fn is_secret(self) -> bool {
        matches!(self, Field::Password | Field::ConfirmPassword)
    }
}

/// Values typed into the registration screen.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
    pub role: Role,
    /// Reserved for dependent registration; always empty here.
    pub parent_id: String,
}

impl RegistrationForm {
    /// Create an empty parent registration form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a field.
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Username => &self.username,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
            Field::Email => &self.email,
        }
    }

    /// Return a copy of the form with one field replaced.
    pub fn with_value(&self, field: Field, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let value = value.into();
        match field {
            Field::Username => next.username = value,
            Field::Password => next.password = value,
            Field::ConfirmPassword => next.confirm_password = value,
            Field::Email => next.email = value,
        }
        next
    }
}

// Passwords stay out of logs and panic messages.
impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("parent_id", &self.parent_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_is_empty_parent() {
        let form = RegistrationForm::new();

        for field in Field::ALL {
            assert_eq!(form.value(field), "");
        }
        assert_eq!(form.role, Role::Parent);
        assert!(form.parent_id.is_empty());
    }

    #[test]
    fn test_with_value_leaves_original_untouched() {
        let form = RegistrationForm::new();
        let edited = form.with_value(Field::Email, "dana@example.com");

        assert_eq!(form.email, "");
        assert_eq!(edited.email, "dana@example.com");
        assert_eq!(edited.value(Field::Email), "dana@example.com");
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let form = RegistrationForm::new()
            .with_value(Field::Password, "Hunter2!xyz")
            .with_value(Field::ConfirmPassword, "Hunter2!xyz");

        let debug = format!("{:?}", form);
        assert!(!debug.contains("Hunter2!xyz"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_field_serialization_matches_document_keys() {
        assert_eq!(serde_json::to_string(&Field::Username).unwrap(), "\"user_name\"");
        assert_eq!(
            serde_json::to_string(&Field::ConfirmPassword).unwrap(),
            "\"confirmPassword\""
        );
        assert_eq!(serde_json::to_string(&Role::Parent).unwrap(), "\"parent\"");
    }

    #[test]
    fn test_secret_fields() {
        assert!(Field::Password.is_secret());
        assert!(Field::ConfirmPassword.is_secret());
        assert!(!Field::Username.is_secret());
        assert!(!Field::Email.is_secret());
    }
}
