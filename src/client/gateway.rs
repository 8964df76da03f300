//! API Gateway Client
//!
//! Attaches the bearer token from the [`TokenStore`] and recovers a single 401
//! per request by refreshing the token pair and replaying the request once.
//! Concurrent requests that hit a 401 each refresh on their own.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::envelope::ApiResponse;
use super::transport::{ApiReply, ApiRequest, HttpTransport};
use super::ClientError;
use crate::auth::navigator::Navigator;
use crate::auth::token_store::TokenStore;
use crate::auth::tokens::{RefreshRequest, TokenPair};

pub const REFRESH_PATH: &str = "/auth/refresh-token";

pub struct ApiGateway {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl ApiGateway {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            tokens,
            navigator,
            login_path: login_path.into(),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Send a request, applying the bearer and the one-shot refresh policy
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiReply, ClientError> {
        if !request.anonymous && request.bearer.is_none() {
            request.bearer = self.tokens.access_token();
        }

        let reply = self.transport.send(&request).await?;
        if reply.status != 401 || request.retried || request.anonymous {
            return Ok(reply);
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            return Ok(reply);
        };

        debug!("{} {} returned 401, refreshing token", request.method, request.path);
        let pair = match self.refresh(&refresh_token).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.tokens.clear();
                self.navigator.navigate(&self.login_path);
                return Err(ClientError::RefreshFailed(e.to_string()));
            }
        };

        self.tokens.save(&pair);

        let mut replay = request;
        replay.bearer = Some(pair.access_token);
        replay.retried = true;
        self.transport.send(&replay).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        let request = ApiRequest::post(REFRESH_PATH)
            .anonymous()
            .with_json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })?;

        let reply = self.transport.send(&request).await?;
        let envelope: ApiResponse<TokenPair> = reply.decode()?;
        if !reply.is_success() {
            return Err(match envelope {
                ApiResponse::Failure { error } => ClientError::api(reply.status, error),
                ApiResponse::Success { .. } => ClientError::api(reply.status, "Refresh rejected"),
            });
        }

        envelope
            .into_result(reply.status)?
            .filter(TokenPair::has_access_token)
            .ok_or_else(|| ClientError::Decode("refresh response carried no tokens".into()))
    }

    /// Send and decode the envelope; the payload may be absent
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Option<T>, ClientError> {
        let reply = self.send(request).await?;
        let envelope = match reply.decode::<ApiResponse<T>>() {
            Ok(envelope) => envelope,
            Err(e) if reply.is_success() => return Err(e),
            Err(_) => {
                let text = String::from_utf8_lossy(&reply.body).trim().to_string();
                let message = if text.is_empty() {
                    format!("HTTP {}", reply.status)
                } else {
                    text
                };
                return Err(ClientError::api(reply.status, message));
            }
        };

        if !reply.is_success() {
            let message = match envelope {
                ApiResponse::Failure { error } => error,
                ApiResponse::Success { .. } => format!("HTTP {}", reply.status),
            };
            return Err(ClientError::api(reply.status, message));
        }

        envelope.into_result(reply.status)
    }

    /// Like [`request`](Self::request) but the payload is required
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let path = request.path.clone();
        self.request(request)
            .await?
            .ok_or_else(|| ClientError::Decode(format!("{} returned no data", path)))
    }
}
