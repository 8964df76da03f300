//! Auth Session Manager
//!
//! ```text
//! Unknown ──restore()──→ Checking ──profile ok──→ Authenticated
//!                            └──no token / fail──→ Anonymous
//! login()/signup() ok → Authenticated     logout() → Anonymous
//! ```
//!
//! Session state is never persisted; it is rebuilt from the token store.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::tokens::{LoginCredentials, SignupCredentials, TokenPair, UserSummary};
use crate::client::{ApiGateway, ApiRequest, ClientError};
use crate::config::AuthConfig;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const PROFILE_PATH: &str = "/auth/profile";

/// Query parameter carrying the post-login target
pub const CALLBACK_PARAM: &str = "callbackUrl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unknown,
    Checking,
    Authenticated,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub user: Option<UserSummary>,
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Unknown,
            user: None,
            is_loading: true,
        }
    }
}

/// Same-site absolute path only; rejects `//host`, `/\host` and `scheme://` targets
pub fn sanitize_target(target: &str) -> Option<&str> {
    let target = target.trim();
    let second = target.chars().nth(1);
    if target.starts_with('/')
        && !matches!(second, Some('/') | Some('\\'))
        && !target.contains("://")
    {
        Some(target)
    } else {
        None
    }
}

pub struct AuthSession {
    gateway: Arc<ApiGateway>,
    state: RwLock<SessionState>,
    deferred: Mutex<Option<String>>,
    last_error: Mutex<Option<String>>,
    default_redirect: String,
}

impl AuthSession {
    pub fn new(gateway: Arc<ApiGateway>, auth: &AuthConfig) -> Self {
        Self {
            gateway,
            state: RwLock::new(SessionState::default()),
            deferred: Mutex::new(None),
            last_error: Mutex::new(None),
            default_redirect: auth.default_redirect.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase
    }

    pub fn user(&self) -> Option<UserSummary> {
        self.state.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated
    }

    /// Message of the last failed login/signup
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    fn transition(&self, phase: SessionPhase, user: Option<UserSummary>) {
        let mut state = self.state.write();
        debug!("Session {:?} -> {:?}", state.phase, phase);
        state.phase = phase;
        state.user = user;
        state.is_loading = phase == SessionPhase::Checking;
    }

    /// Mount-time check: rebuild the session from stored tokens
    pub async fn restore(&self) -> SessionPhase {
        self.transition(SessionPhase::Checking, None);

        if !self.gateway.tokens().is_authenticated() {
            self.transition(SessionPhase::Anonymous, None);
            return SessionPhase::Anonymous;
        }

        match self.fetch_profile().await {
            Ok(user) => {
                self.transition(SessionPhase::Authenticated, Some(user));
                SessionPhase::Authenticated
            }
            Err(e) => {
                warn!("Session restore failed: {}", e);
                self.gateway.tokens().clear();
                self.transition(SessionPhase::Anonymous, None);
                SessionPhase::Anonymous
            }
        }
    }

    async fn fetch_profile(&self) -> Result<UserSummary, ClientError> {
        self.gateway.fetch(ApiRequest::get(PROFILE_PATH)).await
    }

    /// Remember where to go after the next successful login
    pub fn defer_navigation(&self, target: &str) -> bool {
        match sanitize_target(target) {
            Some(target) => {
                *self.deferred.lock() = Some(target.to_string());
                true
            }
            None => {
                debug!("Ignoring unsafe navigation target {:?}", target);
                false
            }
        }
    }

    /// Pick up `callbackUrl` from a login page query string
    pub fn defer_from_query(&self, query: &str) -> bool {
        let query = query.trim_start_matches('?');
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == CALLBACK_PARAM)
            .is_some_and(|(_, value)| self.defer_navigation(&value))
    }

    pub fn deferred_target(&self) -> Option<String> {
        self.deferred.lock().clone()
    }

    /// Caller target, then the deferred target, then the default
    fn resolve_target(&self, requested: Option<&str>) -> String {
        let deferred = self.deferred.lock().take();
        requested
            .and_then(sanitize_target)
            .map(String::from)
            .or(deferred)
            .unwrap_or_else(|| self.default_redirect.clone())
    }

    async fn establish(&self, request: ApiRequest, success_target: Option<&str>) -> bool {
        self.transition(SessionPhase::Checking, None);
        *self.last_error.lock() = None;

        let result = match self.gateway.fetch::<TokenPair>(request).await {
            Ok(pair) if pair.has_access_token() => {
                self.gateway.tokens().save(&pair);
                let user = match pair.user {
                    Some(user) => Ok(user),
                    None => self.fetch_profile().await,
                };
                // 令牌已写入，失败时一并清除
                if user.is_err() {
                    self.gateway.tokens().clear();
                }
                user
            }
            Ok(_) => Err(ClientError::Decode("response carried no access token".into())),
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => {
                info!("Signed in as {}", user.email);
                self.transition(SessionPhase::Authenticated, Some(user));
                let target = self.resolve_target(success_target);
                self.gateway.navigator().navigate(&target);
                true
            }
            Err(e) => {
                warn!("Authentication failed: {}", e);
                let message = match &e {
                    ClientError::Api { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                *self.last_error.lock() = Some(message);
                self.transition(SessionPhase::Anonymous, None);
                false
            }
        }
    }

    /// Never returns an error; failures leave the session anonymous
    pub async fn login(&self, credentials: &LoginCredentials, success_target: Option<&str>) -> bool {
        let request = match ApiRequest::post(LOGIN_PATH).anonymous().with_json(credentials) {
            Ok(request) => request,
            Err(e) => {
                *self.last_error.lock() = Some(e.to_string());
                self.transition(SessionPhase::Anonymous, None);
                return false;
            }
        };
        self.establish(request, success_target).await
    }

    pub async fn signup(&self, credentials: &SignupCredentials, success_target: Option<&str>) -> bool {
        let request = match ApiRequest::post(REGISTER_PATH).anonymous().with_json(credentials) {
            Ok(request) => request,
            Err(e) => {
                *self.last_error.lock() = Some(e.to_string());
                self.transition(SessionPhase::Anonymous, None);
                return false;
            }
        };
        self.establish(request, success_target).await
    }

    pub fn logout(&self) {
        self.gateway.tokens().clear();
        self.transition(SessionPhase::Anonymous, None);
        self.gateway.navigator().navigate(self.gateway.login_path());
        info!("Signed out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_target() {
        assert_eq!(sanitize_target("/dashboard/links"), Some("/dashboard/links"));
        assert_eq!(sanitize_target("//evil.com"), None);
        assert_eq!(sanitize_target("/\\evil.com"), None);
        assert_eq!(sanitize_target("https://evil.com"), None);
        assert_eq!(sanitize_target("/redirect?to=https://x"), None);
        assert_eq!(sanitize_target("dashboard"), None);
    }

    #[test]
    fn test_initial_state_is_loading() {
        let state = SessionState::default();
        assert_eq!(state.phase, SessionPhase::Unknown);
        assert!(state.is_loading);
        assert!(state.user.is_none());
    }
}
