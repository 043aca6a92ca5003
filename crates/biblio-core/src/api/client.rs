//! API client for the library REST API.
//!
//! `ApiClient::send` is the authenticated request pipeline: it decorates
//! each request with the session's bearer token, classifies the response,
//! and on a rejected token refreshes the session and resubmits the request
//! exactly once. Call sites never see an expired token unless the refresh
//! itself fails.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use super::pipeline::{classify, decorate, ApiRequest, Outcome};
use super::ApiError;
use crate::auth::SessionHandle;

// ============================================================================
// Constants
// ============================================================================

const REFRESH_PATH: &str = "/auth/refresh";

/// Envelope discriminator value for failures
const STATUS_ERROR: &str = "erreur";

/// Buffered navigation events per subscriber before the oldest are dropped
const NAVIGATION_CHANNEL_CAPACITY: usize = 16;

/// Navigation side effects requested by the pipeline.
///
/// The client never navigates itself; a front end subscribes and reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    /// A request was forbidden; leave for a neutral page
    Home,
    /// The session was torn down; the user must log in again
    Login,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(rename = "token_acces")]
    access_token: String,
}

/// Body of endpoints that only report success.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

/// API client for the library server.
/// Clone is cheap - the connection pool, session and event channel are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    session: SessionHandle,
    events: broadcast::Sender<NavigationEvent>,
    // Serializes token refreshes so concurrent 401s share one refresh
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: SessionHandle) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let (events, _) = broadcast::channel(NAVIGATION_CHANNEL_CAPACITY);

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            session,
            events,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Receive navigation events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: NavigationEvent) {
        // No subscribers is fine: nobody is driving navigation
        let _ = self.events.send(event);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Transport =====

    async fn execute(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, path = %request.path, "Sending request");
        builder.send().await.map_err(|e| {
            if e.is_builder() {
                ApiError::RequestMalformed(e.to_string())
            } else {
                warn!(method = %request.method, path = %request.path, error = %e, "No response from server");
                ApiError::NetworkUnreachable(e)
            }
        })
    }

    /// Decode a successful response, honoring the `statut` discriminator.
    async fn read_body<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        let value: Value = if text.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&text)
                .map_err(|e| ApiError::InvalidResponse(format!("Body is not JSON: {}", e)))?
        };

        if value.get("statut").and_then(Value::as_str) == Some(STATUS_ERROR) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string);
            return Err(ApiError::ValidationFailed(message));
        }

        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("Unexpected response shape: {}", e)))
    }

    /// Turn a failed response into an error, logging it on the way.
    async fn read_error(response: Response, request: &ApiRequest) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            body = %ApiError::truncate_body(&body),
            "API request failed"
        );
        ApiError::from_status(status, &body)
    }

    // ===== Pipeline =====

    /// Send a request through the authenticated pipeline.
    ///
    /// - 2xx/3xx: decoded and returned
    /// - 401, first time: refresh the session and resubmit once; the retry's
    ///   outcome is final. If the refresh fails the session is cleared and
    ///   the refresh error is returned.
    /// - 403: returned, and `NavigationEvent::Home` is emitted
    /// - anything else: logged and returned
    pub async fn send<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<T, ApiError> {
        let mut token = self.session.access_token().await;

        loop {
            let decorated = decorate(request.clone(), token.as_deref())?;
            let response = self.execute(&decorated).await?;

            match classify(response.status()) {
                Outcome::Succeeded => return Self::read_body(response).await,
                Outcome::FailedAuth if !request.is_retried() => {
                    request.mark_retried();
                    let original = Self::read_error(response, &request).await;
                    debug!(path = %request.path, "Access token rejected, refreshing");
                    token = Some(self.recover(token.as_deref(), original).await?);
                }
                Outcome::FailedAuth => {
                    return Err(Self::read_error(response, &request).await);
                }
                Outcome::Forbidden => {
                    let error = Self::read_error(response, &request).await;
                    self.emit(NavigationEvent::Home);
                    return Err(error);
                }
                Outcome::FailedOther => return Err(Self::read_error(response, &request).await),
            }
        }
    }

    /// Send a request once with an explicit bearer token.
    ///
    /// No refresh, no retry, no navigation events. Used for the auth
    /// endpoints themselves, where a 401 means bad credentials.
    pub async fn send_direct<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = decorate(request, bearer)?;
        let response = self.execute(&request).await?;
        match classify(response.status()) {
            Outcome::Succeeded => Self::read_body(response).await,
            _ => Err(Self::read_error(response, &request).await),
        }
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Does not touch the session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let response: RefreshResponse = self
            .send_direct(ApiRequest::post(REFRESH_PATH), Some(refresh_token))
            .await?;
        Ok(response.access_token)
    }

    /// Refresh the session's access token, coalescing with pipeline refreshes.
    ///
    /// `Ok(None)` means the session was ended or replaced while the refresh
    /// was in flight and the new token was discarded.
    pub async fn refresh_session(&self) -> Result<Option<String>, ApiError> {
        let _guard = self.refresh_lock.lock().await;
        let Some(refresh_token) = self.session.refresh_token().await else {
            return Err(ApiError::AuthenticationExpired(None));
        };
        self.refresh_with(&refresh_token).await
    }

    // Caller holds `refresh_lock`.
    async fn refresh_with(&self, refresh_token: &str) -> Result<Option<String>, ApiError> {
        let access_token = self.refresh(refresh_token).await?;
        if self
            .session
            .rotate_access_token(refresh_token, access_token.clone())
            .await?
        {
            debug!("Access token refreshed");
            Ok(Some(access_token))
        } else {
            debug!("Session changed during refresh, discarding new access token");
            Ok(None)
        }
    }

    /// Recover from a rejected access token, returning the token to retry with.
    async fn recover(&self, rejected: Option<&str>, original: ApiError) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited for the lock
        if let Some(current) = self.session.access_token().await {
            if Some(current.as_str()) != rejected {
                debug!("Reusing access token refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.session.refresh_token().await else {
            warn!("Access token rejected and no refresh token on file");
            self.emit(NavigationEvent::Login);
            return Err(original);
        };

        match self.refresh_with(&refresh_token).await {
            Ok(Some(access_token)) => Ok(access_token),
            // The session is gone; the request must not be replayed for it
            Ok(None) => Err(original),
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                if self.session.refresh_token().await.as_deref() == Some(refresh_token.as_str()) {
                    self.end_session().await;
                }
                Err(e)
            }
        }
    }

    async fn end_session(&self) {
        if let Err(e) = self.session.clear().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.emit(NavigationEvent::Login);
    }

    // ===== Convenience wrappers =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::patch(path)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::delete(path)).await
    }
}
