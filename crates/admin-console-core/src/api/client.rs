//! Authenticated request pipeline for the management API.
//!
//! Every call goes through `ApiClient::execute`, which attaches the bearer
//! token, classifies the response, and on a 401 performs at most one token
//! refresh followed by exactly one retry of the original request.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{login_location, AuthContext};
use crate::config::Config;
use crate::feedback::{Feedback, ReauthDecision};
use crate::models::Envelope;

use super::{ApiError, ApiResult};

/// Outbound request descriptor. One per call; cloned only for the retry.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Where a call is in its refresh-and-retry lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallPhase {
    Initial,
    Refreshing,
    Retried,
}

/// Raw outcome of one round trip
struct Exchange {
    status: StatusCode,
    body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Client for the user/role management API.
/// Clone is cheap - the HTTP client and the auth context are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Arc<AuthContext>,
    feedback: Arc<dyn Feedback>,
    return_path: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        auth: Arc<AuthContext>,
        feedback: Arc<dyn Feedback>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            feedback,
            return_path: None,
        })
    }

    pub fn from_config(
        config: &Config,
        auth: Arc<AuthContext>,
        feedback: Arc<dyn Feedback>,
    ) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout(), auth, feedback)
    }

    /// Copy of this client that sends the user back to `path` after a forced login
    pub fn with_return_path(&self, path: &str) -> Self {
        Self {
            return_path: Some(path.to_string()),
            ..self.clone()
        }
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn feedback(&self) -> &Arc<dyn Feedback> {
        &self.feedback
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<reqwest::RequestBuilder> {
        let mut headers = request.headers.clone();
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("access token is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.to_string());
        }
        Ok(builder)
    }

    /// One round trip with the given credential, no classification
    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<Exchange> {
        debug!(method = %request.method, path = %request.path, authenticated = token.is_some(), "Sending request");
        let response = self
            .build(request, token)?
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;
        debug!(path = %request.path, status = status.as_u16(), "Response received");
        Ok(Exchange { status, body })
    }

    /// Issue a request through the full pipeline and return its envelope.
    ///
    /// Failures are reported to the user through `Feedback` before being
    /// returned, so callers only need to react to the error value.
    pub async fn execute(&self, request: &ApiRequest) -> ApiResult<Envelope> {
        let mut phase = CallPhase::Initial;
        loop {
            let token = self.auth.credentials().access_token();
            let exchange = match self.dispatch(request, token.as_deref()).await {
                Ok(exchange) => exchange,
                Err(err) => return Err(self.fail(err)),
            };

            if exchange.status != StatusCode::UNAUTHORIZED {
                return Self::classify(exchange).map_err(|err| self.fail(err));
            }

            let used_token = match (token.as_deref(), phase) {
                (Some(used), _) => used,
                // No session to refresh: an ordinary rejection, e.g. a wrong password
                (None, CallPhase::Initial) => {
                    return Err(self.fail(ApiError::from_status(exchange.status, &exchange.body)));
                }
                (None, _) => return Err(self.expire_session(ApiError::SessionExpired)),
            };

            match phase {
                CallPhase::Initial => {
                    phase = CallPhase::Refreshing;
                    debug!(path = %request.path, ?phase, "Unauthorized, refreshing session");
                    if let Err(cause) = self.refresh_after_unauthorized(used_token).await {
                        return Err(self.expire_session(cause));
                    }
                    phase = CallPhase::Retried;
                    debug!(path = %request.path, ?phase, "Retrying with refreshed token");
                }
                CallPhase::Refreshing | CallPhase::Retried => {
                    warn!(path = %request.path, "Still unauthorized after refresh");
                    return Err(self.expire_session(ApiError::SessionExpired));
                }
            }
        }
    }

    /// Issue a request and deserialize the envelope's `data`
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let envelope = self.execute(&request).await?;
        envelope.into_data().map_err(|e| {
            self.fail(ApiError::InvalidResponse(format!(
                "unexpected data for {}: {}",
                request.path, e
            )))
        })
    }

    /// Issue a request whose only useful output is the server message
    pub async fn send_message(&self, request: ApiRequest) -> ApiResult<Option<String>> {
        Ok(self.execute(&request).await?.message)
    }

    fn classify(exchange: Exchange) -> ApiResult<Envelope> {
        if !exchange.status.is_success() {
            return Err(ApiError::from_status(exchange.status, &exchange.body));
        }
        let envelope = Envelope::parse(&exchange.body).ok_or_else(|| {
            ApiError::InvalidResponse("response is not a JSON envelope".to_string())
        })?;
        if !envelope.success {
            return Err(ApiError::from_envelope(&envelope));
        }
        Ok(envelope)
    }

    /// Report a terminal error and hand it back
    fn fail(&self, err: ApiError) -> ApiError {
        debug!(error = %err, "Request failed");
        self.feedback.notify_error(&err.user_message());

        if err.is_access_denied() {
            let decision = self
                .feedback
                .confirm_reauthenticate("You do not have permission to access this resource. Log in again?");
            if decision == ReauthDecision::Confirm {
                info!("User chose to log in again after access denial");
                self.clear_auth();
                self.feedback.redirect_to_login(&login_location(None));
            }
        }
        err
    }

    /// Tear down the session after an unrecoverable 401
    fn expire_session(&self, cause: ApiError) -> ApiError {
        warn!(cause = %cause, "Session could not be refreshed, logging out");
        self.clear_auth();
        let err = ApiError::SessionExpired;
        self.feedback.notify_error(&err.user_message());
        self.feedback
            .redirect_to_login(&login_location(self.return_path.as_deref()));
        err
    }

    fn clear_auth(&self) {
        if let Err(e) = self.auth.clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
    }

    /// Make sure a usable token exists after a 401 seen with `used_token`.
    ///
    /// Only one refresh runs at a time. A call that waited on the gate first
    /// checks whether the token changed underneath it, in which case the
    /// refresh already happened (or failed) and its outcome is reused.
    async fn refresh_after_unauthorized(&self, used_token: &str) -> ApiResult<()> {
        let _gate = self.auth.refresh_gate().lock().await;

        match self.auth.credentials().access_token() {
            Some(current) if current != used_token => {
                debug!("Token already refreshed by a concurrent request");
                return Ok(());
            }
            None => {
                debug!("Session was cleared by a concurrent request");
                return Err(ApiError::SessionExpired);
            }
            Some(_) => {}
        }

        self.refresh_tokens_locked().await.map(|_| ())
    }

    /// Exchange the refresh token for a new pair. Caller holds the gate.
    async fn refresh_tokens_locked(&self) -> ApiResult<TokenPair> {
        let refresh_token = self.auth.credentials().refresh_token().ok_or_else(|| {
            debug!("No refresh token available");
            ApiError::SessionExpired
        })?;

        let request = ApiRequest::post("/auth/refresh").json(&RefreshRequest { refresh_token })?;
        let token = self.auth.credentials().access_token();
        let exchange = self.dispatch(&request, token.as_deref()).await?;
        let envelope = Self::classify(exchange)?;
        let pair: TokenPair = envelope
            .into_data()
            .map_err(|e| ApiError::InvalidResponse(format!("refresh response: {}", e)))?;

        self.auth
            .credentials()
            .set_tokens(&pair.access_token, &pair.refresh_token)?;
        info!("Session tokens refreshed");
        Ok(pair)
    }

    /// Refresh the token pair explicitly, sharing the gate with 401 recovery.
    /// On failure the session is cleared and `SessionExpired` is returned.
    pub async fn refresh_session(&self) -> ApiResult<()> {
        let result = {
            let _gate = self.auth.refresh_gate().lock().await;
            self.refresh_tokens_locked().await
        };
        match result {
            Ok(_) => Ok(()),
            Err(cause) => Err(self.expire_session(cause)),
        }
    }

    /// Best-effort call that never refreshes, retries or notifies
    pub(crate) async fn fire_and_forget(&self, request: &ApiRequest) {
        let token = self.auth.credentials().access_token();
        match self.dispatch(request, token.as_deref()).await {
            Ok(exchange) if exchange.status.is_success() => {
                debug!(path = %request.path, "Best-effort request succeeded");
            }
            Ok(exchange) => {
                warn!(path = %request.path, status = exchange.status.as_u16(), "Best-effort request rejected");
            }
            Err(e) => {
                warn!(path = %request.path, error = %e, "Best-effort request failed");
            }
        }
    }
}
