// Session lifecycle
// Restores persisted sessions and owns the login/logout state machine

use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ApiError;

use super::store::TokenStore;
use super::types::{
    CurrentUser, LoginRequest, LoginResponse, RegisterRequest, Role, Session,
};

/// Authentication state observed by the router and UI.
///
/// `Unknown` exists only between process start and `restore()`; the
/// composition root awaits restoration before rendering any route decision,
/// so readers never act on it.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unknown,
    Anonymous,
    Authenticated(CurrentUser),
}

impl SessionState {
    pub fn current_user(&self) -> Option<&CurrentUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Single owned session manager, injected by `Arc` wherever session state
/// is read. Login and registration use dedicated calls that are never
/// routed through the 401-intercepting client.
pub struct SessionManager {
    store: Arc<TokenStore>,
    http: Client,
    base_url: String,
    state: RwLock<SessionState>,
}

impl SessionManager {
    pub fn new(store: Arc<TokenStore>, base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            store,
            http,
            base_url,
            state: RwLock::new(SessionState::Unknown),
        }
    }

    /// Restore the persisted session without contacting the backend.
    /// The stored role is trusted at face value until the first protected
    /// call fails.
    pub async fn restore(&self) -> Result<SessionState, ApiError> {
        let restored = match self.store.load()? {
            Some(persisted) => {
                tracing::info!(role = %persisted.role, "Session restored from token store");
                SessionState::Authenticated(CurrentUser {
                    role: persisted.role,
                    username: persisted.username.unwrap_or_default(),
                })
            }
            None => {
                tracing::debug!("No persisted session found");
                SessionState::Anonymous
            }
        };

        let mut state = self.state.write().await;
        *state = restored.clone();
        Ok(restored)
    }

    /// Authenticate against the backend and persist the returned session.
    /// On rejection the prior state is left untouched and nothing is stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<Role, ApiError> {
        let url = format!("{}/auth/login/", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            tracing::warn!(email, "Login rejected by backend");
            return Err(ApiError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        let data: LoginResponse = response.json().await?;
        let session = Session {
            access_token: data.access,
            refresh_token: data.refresh,
            role: data.role,
            username: data.username,
        };
        self.store.save(&session)?;

        let mut state = self.state.write().await;
        *state = SessionState::Authenticated(CurrentUser {
            role: session.role,
            username: session.username.clone(),
        });
        tracing::info!(role = %session.role, username = %session.username, "Login successful");

        Ok(session.role)
    }

    /// Create a new student account. Public endpoint, no bearer token.
    pub async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}/auth/register/", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }

    /// Clear storage and drop to `Anonymous`. Idempotent.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.store.clear()?;
        let mut state = self.state.write().await;
        if *state != SessionState::Anonymous {
            tracing::info!("Logged out");
        }
        *state = SessionState::Anonymous;
        Ok(())
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<CurrentUser> {
        self.state.read().await.current_user().cloned()
    }
}
