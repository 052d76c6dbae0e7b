//! Stored user records.

use crate::form::{RegistrationForm, Role};
use serde::{Deserialize, Serialize};

/// Collection that holds user records.
pub const USERS_COLLECTION: &str = "users";

/// A registered user as stored in the database.
///
/// Field names on the wire match the documents already in the `users`
/// collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    /// Lower-cased username
    #[serde(rename = "user_name")]
    pub username: String,

    /// SHA-256 of the password, lowercase hex
    #[serde(rename = "password")]
    pub password_hash: String,

    /// Email with every `.` replaced by `,`
    pub email: String,

    pub role: Role,

    #[serde(default)]
    pub parent_id: String,
}

impl UserRecord {
    /// Build the record to store for a validated form.
    pub fn from_form(form: &RegistrationForm) -> Self {
        Self {
            username: form.username.to_lowercase(),
            password_hash: hash_password(&form.password),
            email: normalize_email_key(&form.email),
            role: form.role,
            parent_id: form.parent_id.clone(),
        }
    }

    /// The email as the user typed it.
    pub fn original_email(&self) -> String {
        restore_email_key(&self.email)
    }
}

/// Path of the record for a user id.
pub fn user_path(user_id: &str) -> String {
    format!("{}/{}", USERS_COLLECTION, user_id)
}

/// Replace every `.` with `,` so the email is a legal database key.
pub fn normalize_email_key(email: &str) -> String {
    email.replace('.', ",")
}

/// Reverse of [`normalize_email_key`] for emails without a literal comma.
pub fn restore_email_key(key: &str) -> String {
    key.replace(',', ".")
}

/// Hash a password using SHA-256.
///
/// No salt is applied.
pub fn hash_password(password: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
