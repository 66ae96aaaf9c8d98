use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least 8 characters with an uppercase letter, a lowercase letter and a digit")]
    WeakPassword,
    #[error("No user is signed in")]
    NotSignedIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub expires_in: Option<i64>,
    pub expires_at: Option<i64>,
    pub user: User,
}

impl TokenResponse {
    pub fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| now + chrono::Duration::seconds(secs))
            });

        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Error body; the auth and REST services disagree on the field name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServiceErrorBody {
    pub error_description: Option<String>,
    pub msg: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ServiceErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Passes successful responses through and turns the rest into
/// [`AccountError::Rejected`] with the service's own message when it sent one.
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AccountError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ServiceErrorBody>(&body)
        .ok()
        .and_then(ServiceErrorBody::into_message)
        .unwrap_or_else(|| status.to_string());

    Err(AccountError::Rejected {
        status: status.as_u16(),
        message,
    })
}
