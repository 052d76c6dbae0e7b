//! Realtime database HTTP client.

use crate::error::DatabaseError;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Characters the database refuses inside a key.
const FORBIDDEN_KEY_CHARS: [char; 5] = ['.', '$', '#', '[', ']'];

/// Client for the JSON realtime database REST API.
///
/// Every document is addressed as `{base_url}/{path}.json`. The optional
/// auth token is kept in a `SecretString` and sent as the `auth` query
/// parameter.
#[derive(Clone)]
pub struct RealtimeDbClient {
    client: Client,
    base_url: String,
    auth_token: Option<SecretString>,
}

impl RealtimeDbClient {
    /// Create a new realtime database client.
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.map(SecretString::new),
        })
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the database is reachable.
    pub async fn health_check(&self) -> bool {
        let request = self
            .client
            .get(format!("{}/.json", self.base_url))
            .query(&[("shallow", "true")]);

        self.authorize(request)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Read the document at `path`.
    ///
    /// Returns `None` when nothing is stored there (the database answers `null`).
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, DatabaseError> {
        let url = self.document_url(path)?;

        let response = self.authorize(self.client.get(&url)).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.extract_error(response).await);
        }

        let body = response.text().await?;
        debug!(path = %path, bytes = body.len(), "Document read");

        Ok(serde_json::from_str::<Option<T>>(&body)?)
    }

    /// Create or overwrite the document at `path`.
    #[instrument(skip(self, value))]
    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), DatabaseError> {
        let url = self.document_url(path)?;

        let response = self
            .authorize(self.client.put(&url))
            .json(value)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        debug!(path = %path, "Document written");
        Ok(())
    }

    fn document_url(&self, path: &str) -> Result<String, DatabaseError> {
        validate_path(path)?;
        Ok(format!("{}/{}.json", self.base_url, path))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token.expose_secret().as_str())]),
            None => request,
        }
    }

    /// Extract error information from failed response.
    async fn extract_error(&self, response: reqwest::Response) -> DatabaseError {
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Database rejected credentials");
                DatabaseError::Unauthorized
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".into());
                warn!(status = %status, "Database request failed");
                DatabaseError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

/// Check that every segment of `path` is a legal database key.
pub fn validate_path(path: &str) -> Result<(), DatabaseError> {
    if path.is_empty() {
        return Err(DatabaseError::InvalidPath("path is empty".into()));
    }

    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(DatabaseError::InvalidPath(format!(
                "empty segment in '{}'",
                path
            )));
        }
        if let Some(c) = segment.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
            return Err(DatabaseError::InvalidPath(format!(
                "segment '{}' contains '{}'",
                segment, c
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_accepts_uuid_keys() {
        assert!(validate_path("users/0b6f3c1e-8a4d-4f55-9f0e-2d7c1a9b3e11").is_ok());
        assert!(validate_path("users").is_ok());
    }

    #[test]
    fn test_validate_path_rejects_forbidden_chars() {
        for bad in ["users/a.b", "users/$x", "users/#", "users/[0]", "users/a]"] {
            assert!(
                matches!(validate_path(bad), Err(DatabaseError::InvalidPath(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_path_rejects_empty_segments() {
        assert!(validate_path("").is_err());
        assert!(validate_path("users//x").is_err());
        assert!(validate_path("/users").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = RealtimeDbClient::new(
            "https://example-db.local/",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://example-db.local");
    }
}
