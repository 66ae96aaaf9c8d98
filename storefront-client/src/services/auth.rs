use crate::models::account::{ensure_success, AccountError, AuthSession, TokenResponse, User};
use crate::utils::security::{sanitize_input, validate_email, validate_password};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::sync::Mutex;
use tracing::{error, info};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

pub struct SupabaseAuth {
    client: Client,
    auth_url: String,
    anon_key: String,
    session: Mutex<Option<AuthSession>>,
}

impl SupabaseAuth {
    pub fn new(client: Client, supabase_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            auth_url: format!("{}/auth/v1", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
            session: Mutex::new(None),
        }
    }

    fn store_session(&self, session: Option<AuthSession>) {
        *self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session;
    }

    pub fn session(&self) -> Option<AuthSession> {
        let mut guard = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if guard.as_ref().is_some_and(|s| s.is_expired(Utc::now())) {
            info!("Session expired");
            *guard = None;
        }
        guard.clone()
    }

    fn checked_credentials(email: &str, password: &str) -> Result<String, AccountError> {
        let email = sanitize_input(email);
        if !validate_email(&email) {
            return Err(AccountError::InvalidEmail);
        }
        if !validate_password(password) {
            return Err(AccountError::WeakPassword);
        }
        Ok(email)
    }

    /// Registers a new account. Returns the session when the service signs
    /// the user in straight away, `None` when it waits for email confirmation.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>, AccountError> {
        let email = Self::checked_credentials(email, password)?;

        let response = self
            .client
            .post(format!("{}/signup", self.auth_url))
            .header("apikey", &self.anon_key)
            .json(&Credentials {
                email: &email,
                password,
            })
            .send()
            .await?;

        let body = match ensure_success(response).await {
            Ok(response) => response.text().await?,
            Err(e) => {
                error!("Sign-up failed: {}", e);
                return Err(e);
            }
        };

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) => {
                let session = token.into_session(Utc::now());
                info!("Signed up and signed in as {}", session.user.id);
                self.store_session(Some(session.clone()));
                Ok(Some(session))
            }
            Err(_) => {
                let user: User = serde_json::from_str(&body)?;
                info!("Signed up {}, awaiting confirmation", user.id);
                Ok(None)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AccountError> {
        let email = sanitize_input(email);
        if !validate_email(&email) {
            return Err(AccountError::InvalidEmail);
        }

        let response = self
            .client
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&Credentials {
                email: &email,
                password,
            })
            .send()
            .await?;

        let body = match ensure_success(response).await {
            Ok(response) => response.text().await?,
            Err(e) => {
                error!("Sign-in failed: {}", e);
                return Err(e);
            }
        };

        let session = serde_json::from_str::<TokenResponse>(&body)?.into_session(Utc::now());
        info!("Signed in as {}", session.user.id);
        self.store_session(Some(session.clone()));
        Ok(session)
    }

    pub async fn current_user(&self) -> Result<User, AccountError> {
        let session = self.session().ok_or(AccountError::NotSignedIn)?;

        let response = self
            .client
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        let body = ensure_success(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Signs out remotely; the local session is only dropped once the
    /// service has accepted it.
    pub async fn sign_out(&self) -> Result<(), AccountError> {
        let Some(session) = self.session() else {
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        if let Err(e) = ensure_success(response).await {
            error!("Sign-out failed: {}", e);
            return Err(e);
        }

        self.store_session(None);
        info!("Signed out");
        Ok(())
    }
}
