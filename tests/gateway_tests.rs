//! ApiGateway tests
//!
//! Refresh-and-retry behaviour against a scripted transport.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use linkdash::auth::{RecordingNavigator, TokenPair, TokenStore};
use linkdash::client::gateway::REFRESH_PATH;
use linkdash::client::{ApiGateway, ApiReply, ApiRequest, ClientError, HttpTransport};
use linkdash::models::LinkPage;

// =============================================================================
// Scripted transport
// =============================================================================

/// `/links` accepts only `valid_token`; the refresh endpoint hands out
/// `valid_token` unless told to fail
struct ScriptedTransport {
    valid_token: String,
    refresh_fails: bool,
    always_unauthorized: bool,
    seen: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn new(valid_token: &str) -> Self {
        Self {
            valid_token: valid_token.to_string(),
            refresh_fails: false,
            always_unauthorized: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<ApiRequest> {
        self.seen.lock().clone()
    }

    fn count(&self, path: &str) -> usize {
        self.seen.lock().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiReply, ClientError> {
        self.seen.lock().push(request.clone());

        if request.path == REFRESH_PATH {
            if self.refresh_fails {
                return Ok(ApiReply::json(
                    401,
                    &json!({"success": false, "error": "Invalid refresh token"}),
                ));
            }
            return Ok(ApiReply::json(
                200,
                &json!({
                    "success": true,
                    "data": {"accessToken": self.valid_token, "refreshToken": "refresh-2"}
                }),
            ));
        }

        let authorized = request.bearer.as_deref() == Some(self.valid_token.as_str());
        if self.always_unauthorized || !authorized {
            return Ok(ApiReply::json(
                401,
                &json!({"success": false, "error": "Unauthorized"}),
            ));
        }
        Ok(ApiReply::json(
            200,
            &json!({"success": true, "data": {"links": [], "total": 0}}),
        ))
    }
}

fn gateway_with(
    transport: Arc<ScriptedTransport>,
    tokens: Option<TokenPair>,
) -> (ApiGateway, Arc<TokenStore>, Arc<RecordingNavigator>) {
    let store = Arc::new(TokenStore::in_memory());
    if let Some(pair) = tokens {
        store.save(&pair);
    }
    let navigator = Arc::new(RecordingNavigator::new());
    let gateway = ApiGateway::new(transport, store.clone(), navigator.clone(), "/login");
    (gateway, store, navigator)
}

// =============================================================================
// Refresh and retry
// =============================================================================

#[tokio::test]
async fn test_valid_token_needs_no_refresh() {
    let transport = Arc::new(ScriptedTransport::new("access-1"));
    let (gateway, _, _) =
        gateway_with(transport.clone(), Some(TokenPair::new("access-1", "refresh-1")));

    let page: LinkPage = gateway.fetch(ApiRequest::get("/links")).await.unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(transport.count(REFRESH_PATH), 0);
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn test_expired_token_refreshes_once_and_replays_once() {
    let transport = Arc::new(ScriptedTransport::new("access-2"));
    let (gateway, store, navigator) =
        gateway_with(transport.clone(), Some(TokenPair::new("access-1", "refresh-1")));

    let page: LinkPage = gateway.fetch(ApiRequest::get("/links")).await.unwrap();
    assert_eq!(page.links.len(), 0);

    let seen = transport.seen();
    let paths: Vec<&str> = seen.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/links", REFRESH_PATH, "/links"]);

    // refresh call carries no bearer
    assert!(seen[1].bearer.is_none());
    assert_eq!(seen[1].body, Some(json!({"refreshToken": "refresh-1"})));

    // the replay carries the new token and is marked as retried
    assert_eq!(seen[2].bearer.as_deref(), Some("access-2"));
    assert!(seen[2].retried);

    assert_eq!(store.access_token().as_deref(), Some("access-2"));
    assert_eq!(store.refresh_token().as_deref(), Some("refresh-2"));
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn test_replay_401_is_not_refreshed_again() {
    let mut scripted = ScriptedTransport::new("access-2");
    scripted.always_unauthorized = true;
    let transport = Arc::new(scripted);
    let (gateway, _, _) =
        gateway_with(transport.clone(), Some(TokenPair::new("access-1", "refresh-1")));

    let err = gateway
        .fetch::<LinkPage>(ApiRequest::get("/links"))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(transport.count(REFRESH_PATH), 1);
    assert_eq!(transport.count("/links"), 2);
}

#[tokio::test]
async fn test_refresh_failure_clears_tokens_and_navigates_to_login() {
    let mut scripted = ScriptedTransport::new("access-2");
    scripted.refresh_fails = true;
    let transport = Arc::new(scripted);
    let (gateway, store, navigator) =
        gateway_with(transport.clone(), Some(TokenPair::new("access-1", "refresh-1")));

    let err = gateway
        .fetch::<LinkPage>(ApiRequest::get("/links"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::RefreshFailed(_)));
    assert!(!store.is_authenticated());
    assert!(store.load().is_none());
    assert_eq!(navigator.history(), vec!["/login".to_string()]);
    // the original request is not replayed
    assert_eq!(transport.count("/links"), 1);
}

#[tokio::test]
async fn test_401_without_refresh_token_is_returned() {
    let transport = Arc::new(ScriptedTransport::new("access-2"));
    let (gateway, _, navigator) = gateway_with(transport.clone(), None);

    let err = gateway
        .fetch::<LinkPage>(ApiRequest::get("/links"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Unauthorized"));
    assert_eq!(transport.count(REFRESH_PATH), 0);
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn test_anonymous_request_never_refreshes() {
    let transport = Arc::new(ScriptedTransport::new("access-2"));
    let (gateway, store, _) =
        gateway_with(transport.clone(), Some(TokenPair::new("access-1", "refresh-1")));

    let reply = gateway
        .send(ApiRequest::post("/auth/login").anonymous())
        .await
        .unwrap();

    assert_eq!(reply.status, 401);
    assert_eq!(transport.count(REFRESH_PATH), 0);
    assert!(transport.seen()[0].bearer.is_none());
    // stored tokens are untouched
    assert_eq!(store.access_token().as_deref(), Some("access-1"));
}

#[tokio::test]
async fn test_error_envelope_message_is_surfaced() {
    let transport = Arc::new(ScriptedTransport::new("access-1"));
    let (gateway, _, _) = gateway_with(transport, None);

    let err = gateway
        .request::<Value>(ApiRequest::get("/links"))
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
