// HTTP client for the ACADEMIYA-Hub API
// Injects the bearer token and retries once after a 401-triggered refresh

use anyhow::Context;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

use crate::auth::{RefreshRequest, RefreshResponse, TokenStore};
use crate::error::ApiError;

/// Out-of-band auth condition the composition root subscribes to.
/// The transport layer never navigates; it only announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The refresh flow failed; the persisted session was cleared
    Expired,
}

/// Shared API client with connection pooling.
///
/// Every outbound request carries `Authorization: Bearer <access>` when a
/// token is stored. A 401 triggers the refresh flow and re-issues the
/// original request exactly once; a second 401 propagates.
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<TokenStore>,
    events: broadcast::Sender<SessionEvent>,

    /// Coalesces concurrent refresh attempts into one in-flight call
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<TokenStore>,
        connect_timeout: u64,
        request_timeout: u64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        let (events, _) = broadcast::channel(8);

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            events,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Receiver for session-expired notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The underlying HTTP client (shared pool, no interception)
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.client.get(self.url(path)).build()?;
        self.send_json(request).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.client.get(self.url(path)).query(query).build()?;
        self.send_json(request).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.post(self.url(path)).json(body).build()?;
        self.send_json(request).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.put(self.url(path)).json(body).build()?;
        self.send_json(request).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.patch(self.url(path)).json(body).build()?;
        self.send_json(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.client.delete(self.url(path)).build()?;
        self.execute(request).await.map(|_| ())
    }

    async fn send_json<T: DeserializeOwned>(&self, request: Request) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Core send loop: bearer injection plus at most one refresh-and-retry.
    /// The refresh completes (or fails) before the original request is
    /// re-issued; nothing is fired concurrently for the same request.
    async fn execute(&self, request: Request) -> Result<Response, ApiError> {
        let mut bearer = self.store.access_token()?;
        let mut retried = false;

        loop {
            let mut attempt = request.try_clone().ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!("Request body is not cloneable"))
            })?;

            if let Some(ref token) = bearer {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Access token is not a valid header value")?;
                attempt.headers_mut().insert(AUTHORIZATION, value);
            }

            tracing::debug!(
                method = %attempt.method(),
                url = %attempt.url(),
                retried,
                "Sending HTTP request"
            );

            let response = self.client.execute(attempt).await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::UNAUTHORIZED && !retried {
                tracing::warn!(url = %request.url(), "Received 401, refreshing token and retrying");
                bearer = Some(self.refresh_access_token(bearer.as_deref()).await?);
                retried = true;
                continue;
            }

            // A second 401 after the retry is not retried again
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                url = %request.url(),
                "HTTP request failed"
            );
            return Err(ApiError::from_status(status.as_u16(), body));
        }
    }

    /// Refresh the access token through the dedicated, non-intercepted
    /// endpoint. The mutex makes concurrent 401s share one refresh: tasks
    /// queued behind the first holder observe the rotated token and skip
    /// their own call.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.store.access_token()? {
            if stale != Some(current.as_str()) {
                tracing::debug!("Access token already rotated by a concurrent refresh");
                return Ok(current);
            }
        }

        let refresh = match self.store.refresh_token()? {
            Some(token) => token,
            None => {
                self.expire_session("no refresh token stored")?;
                return Err(ApiError::SessionExpired);
            }
        };

        let url = self.url("/auth/refresh/");
        let result = self
            .client
            .post(&url)
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.expire_session(&format!("refresh call failed: {}", e))?;
                return Err(ApiError::SessionExpired);
            }
        };

        if !response.status().is_success() {
            self.expire_session(&format!(
                "refresh endpoint returned {}",
                response.status().as_u16()
            ))?;
            return Err(ApiError::SessionExpired);
        }

        let data: RefreshResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                self.expire_session(&format!("malformed refresh response: {}", e))?;
                return Err(ApiError::SessionExpired);
            }
        };

        self.store.save_access_token(&data.access)?;
        tracing::info!("Access token refreshed");
        Ok(data.access)
    }

    /// Irrecoverable auth failure: wipe storage and announce it
    fn expire_session(&self, reason: &str) -> Result<(), ApiError> {
        tracing::warn!(reason, "Session expired - clearing stored tokens");
        self.store.clear()?;
        let _ = self.events.send(SessionEvent::Expired);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let store = Arc::new(TokenStore::open_in_memory().unwrap());
        let client = ApiClient::new("http://localhost:8000/api/", store, 5, 30).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/notes/"), "http://localhost:8000/api/notes/");
    }

    #[tokio::test]
    async fn test_subscribe_receives_expiry() {
        let store = Arc::new(TokenStore::open_in_memory().unwrap());
        let client = ApiClient::new("http://localhost:8000/api", store, 5, 30).unwrap();

        let mut rx = client.subscribe();
        client.expire_session("test").unwrap();

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::Expired);
    }
}
