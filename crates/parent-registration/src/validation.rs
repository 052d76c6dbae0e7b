//! Client-side validation of the registration form.
//!
//! Rules run in a fixed order and each one is checked independently. Several
//! rules target the same field (`password` and `email`); how their messages
//! combine is decided by [`ErrorPolicy`].

use crate::form::{Field, RegistrationForm};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
pub const PASSWORD_CHARACTER_CLASS: &str =
    "Password must contain at least one capital letter and at least one special character";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Email is not valid";
pub const USERNAME_TAKEN: &str = "Username already exists";

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Characters that count as "special" for the password rule.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is a valid regex"));

/// How messages from several rules on the same field are combined.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// The last failing rule's message replaces earlier ones.
    #[default]
    LastWins,
    /// The first failing rule's message is kept.
    FirstWins,
    /// Every failing rule's message is kept, newline separated, in rule order.
    CollectAll,
}

/// Per-field messages from one registration attempt.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ValidationErrors {
    #[serde(flatten)]
    messages: BTreeMap<Field, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors for a username that is already registered.
    ///
    /// Suggestions are the lower-cased username with `1..=count` appended.
    pub fn username_taken(username: &str, count: usize) -> Self {
        let base = username.to_lowercase();
        let mut messages = BTreeMap::new();
        messages.insert(Field::Username, USERNAME_TAKEN.to_string());

        Self {
            messages,
            suggestions: Some((1..=count).map(|n| format!("{}{}", base, n)).collect()),
        }
    }

    /// Record a message for a field according to `policy`.
    pub fn insert(&mut self, field: Field, message: &str, policy: ErrorPolicy) {
        match policy {
            ErrorPolicy::LastWins => {
                self.messages.insert(field, message.to_string());
            }
            ErrorPolicy::FirstWins => {
                self.messages
                    .entry(field)
                    .or_insert_with(|| message.to_string());
            }
            ErrorPolicy::CollectAll => {
                self.messages
                    .entry(field)
                    .and_modify(|existing| {
                        existing.push('\n');
                        existing.push_str(message);
                    })
                    .or_insert_with(|| message.to_string());
            }
        }
    }

    /// Message for a field, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    /// Username suggestions, present only after a collision.
    pub fn suggestions(&self) -> Option<&[String]> {
        self.suggestions.as_deref()
    }

    /// Non-empty messages in field order.
    pub fn messages(&self) -> impl Iterator<Item = (Field, &str)> {
        self.messages
            .iter()
            .filter(|(_, message)| !message.is_empty())
            .map(|(field, message)| (*field, message.as_str()))
    }

    /// True when no field has a message.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of fields with a message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

struct Rule {
    field: Field,
    message: &'static str,
    violated: fn(&RegistrationForm) -> bool,
}

const RULES: [Rule; 7] = [
    Rule {
        field: Field::Username,
        message: USERNAME_REQUIRED,
        violated: username_missing,
    },
    Rule {
        field: Field::Password,
        message: PASSWORD_REQUIRED,
        violated: password_missing,
    },
    Rule {
        field: Field::Password,
        message: PASSWORD_TOO_SHORT,
        violated: password_too_short,
    },
    Rule {
        field: Field::Password,
        message: PASSWORD_CHARACTER_CLASS,
        violated: password_lacks_character_class,
    },
    Rule {
        field: Field::ConfirmPassword,
        message: PASSWORDS_DO_NOT_MATCH,
        violated: passwords_differ,
    },
    Rule {
        field: Field::Email,
        message: EMAIL_REQUIRED,
        violated: email_missing,
    },
    Rule {
        field: Field::Email,
        message: EMAIL_INVALID,
        violated: email_malformed,
    },
];

fn username_missing(form: &RegistrationForm) -> bool {
    form.username.is_empty()
}

fn password_missing(form: &RegistrationForm) -> bool {
    form.password.is_empty()
}

// Length is measured in UTF-16 code units, as the existing clients count it.
fn password_too_short(form: &RegistrationForm) -> bool {
    form.password.encode_utf16().count() < MIN_PASSWORD_LEN
}

// Either an uppercase letter or a special character satisfies the rule.
fn password_lacks_character_class(form: &RegistrationForm) -> bool {
    !form
        .password
        .chars()
        .any(|c| c.is_ascii_uppercase() || SPECIAL_CHARACTERS.contains(c))
}

fn passwords_differ(form: &RegistrationForm) -> bool {
    form.password != form.confirm_password
}

fn email_missing(form: &RegistrationForm) -> bool {
    form.email.is_empty()
}

fn email_malformed(form: &RegistrationForm) -> bool {
    !EMAIL_PATTERN.is_match(&form.email)
}

/// Validate with the default policy.
pub fn validate(form: &RegistrationForm) -> ValidationErrors {
    validate_with(form, ErrorPolicy::default())
}

/// Run every rule against the form and collect the failures.
pub fn validate_with(form: &RegistrationForm, policy: ErrorPolicy) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for rule in RULES.iter().filter(|rule| (rule.violated)(form)) {
        errors.insert(rule.field, rule.message, policy);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            username: "DanaP".into(),
            password: "Secret!pass".into(),
            confirm_password: "Secret!pass".into(),
            email: "dana.p@example.com".into(),
            ..RegistrationForm::default()
        }
    }

    fn with_password(password: &str) -> RegistrationForm {
        RegistrationForm {
            password: password.into(),
            confirm_password: password.into(),
            ..valid_form()
        }
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        let errors = validate(&valid_form());
        assert!(errors.is_empty());
        assert!(errors.suggestions().is_none());
    }

    #[test]
    fn test_missing_username() {
        let form = RegistrationForm {
            username: String::new(),
            ..valid_form()
        };
        let errors = validate(&form);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Username), Some(USERNAME_REQUIRED));
    }

    #[test]
    fn test_empty_password_reports_last_rule() {
        // Empty also fails the length and character-class rules.
        let errors = validate(&with_password(""));
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_CHARACTER_CLASS));
    }

    #[test]
    fn test_short_password_with_capital() {
        let errors = validate(&with_password("Short"));
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_TOO_SHORT));
    }

    #[test]
    fn test_short_password_without_character_class() {
        let errors = validate(&with_password("short"));
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_CHARACTER_CLASS));

        let errors = validate(&with_password("shortpw"));
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_CHARACTER_CLASS));
    }

    #[test]
    fn test_long_password_without_character_class() {
        let errors = validate(&with_password("alllowercase1"));
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_CHARACTER_CLASS));
    }

    #[test]
    fn test_uppercase_alone_satisfies_character_class() {
        assert!(validate(&with_password("Abcdefg1")).is_empty());
    }

    #[test]
    fn test_special_character_alone_satisfies_character_class() {
        assert!(validate(&with_password("abcdefg!")).is_empty());
        for special in SPECIAL_CHARACTERS.chars() {
            let password = format!("abcdefg{}", special);
            assert!(validate(&with_password(&password)).is_empty(), "{}", password);
        }
    }

    #[test]
    fn test_other_punctuation_is_not_special() {
        let errors = validate(&with_password("abcdefg?"));
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_CHARACTER_CLASS));
    }

    #[test]
    fn test_length_counts_utf16_units() {
        // Seven units, one of them multi-byte in UTF-8.
        let errors = validate(&with_password("Abcdef\u{e9}"));
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_TOO_SHORT));

        // Five characters, but each emoji is a surrogate pair.
        let errors = validate(&with_password("Ab\u{1F600}\u{1F600}\u{1F600}"));
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_passwords_do_not_match() {
        let form = RegistrationForm {
            confirm_password: "Secret!pasz".into(),
            ..valid_form()
        };
        let errors = validate(&form);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::ConfirmPassword), Some(PASSWORDS_DO_NOT_MATCH));
    }

    #[test]
    fn test_missing_email_reports_invalid() {
        let form = RegistrationForm {
            email: String::new(),
            ..valid_form()
        };
        assert_eq!(validate(&form).get(Field::Email), Some(EMAIL_INVALID));
    }

    #[test]
    fn test_email_pattern() {
        let accepted = ["a@b.c", "dana.p@example.com", "x y@b.c", "first+tag@sub.example.org"];
        let rejected = ["plainaddress", "a@b", "@b.c", "a@.c", "a@b.", "a @b.c"];

        for email in accepted {
            let form = RegistrationForm {
                email: email.into(),
                ..valid_form()
            };
            assert!(validate(&form).is_empty(), "{} should be accepted", email);
        }

        for email in rejected {
            let form = RegistrationForm {
                email: email.into(),
                ..valid_form()
            };
            assert_eq!(
                validate(&form).get(Field::Email),
                Some(EMAIL_INVALID),
                "{} should be rejected",
                email
            );
        }
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = validate(&RegistrationForm::new());

        assert_eq!(errors.get(Field::Username), Some(USERNAME_REQUIRED));
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_CHARACTER_CLASS));
        assert_eq!(errors.get(Field::Email), Some(EMAIL_INVALID));
        // Both passwords are empty, so they match.
        assert_eq!(errors.get(Field::ConfirmPassword), None);
    }

    #[test]
    fn test_first_wins_policy() {
        let errors = validate_with(&RegistrationForm::new(), ErrorPolicy::FirstWins);

        assert_eq!(errors.get(Field::Password), Some(PASSWORD_REQUIRED));
        assert_eq!(errors.get(Field::Email), Some(EMAIL_REQUIRED));
    }

    #[test]
    fn test_collect_all_policy() {
        let errors = validate_with(&with_password("short"), ErrorPolicy::CollectAll);

        assert_eq!(
            errors.get(Field::Password),
            Some(format!("{}\n{}", PASSWORD_TOO_SHORT, PASSWORD_CHARACTER_CLASS).as_str())
        );
    }

    #[test]
    fn test_messages_are_in_field_order() {
        let fields: Vec<Field> = validate(&RegistrationForm {
            confirm_password: "different".into(),
            ..RegistrationForm::new()
        })
        .messages()
        .map(|(field, _)| field)
        .collect();

        assert_eq!(
            fields,
            vec![Field::Username, Field::Password, Field::ConfirmPassword, Field::Email]
        );
    }

    #[test]
    fn test_username_taken_suggestions() {
        let errors = ValidationErrors::username_taken("DanaP", 3);

        assert_eq!(errors.get(Field::Username), Some(USERNAME_TAKEN));
        assert_eq!(
            errors.suggestions(),
            Some(&["danap1".to_string(), "danap2".to_string(), "danap3".to_string()][..])
        );
    }

    #[test]
    fn test_serialization_uses_document_keys() {
        let json = serde_json::to_value(ValidationErrors::username_taken("Dana", 1)).unwrap();

        assert_eq!(json["user_name"], USERNAME_TAKEN);
        assert_eq!(json["suggestions"], serde_json::json!(["dana1"]));
    }
}
