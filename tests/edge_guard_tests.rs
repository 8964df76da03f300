//! EdgeGuard middleware tests
//!
//! Protected-route redirects and short-code resolution in front of the site
//! pages, with a fake probe.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;

use linkdash::api::middleware::EdgeGuard;
use linkdash::api::probe::ShortCodeProbe;
use linkdash::api::services::{SiteContext, site_routes};
use linkdash::api::RoutePolicy;
use linkdash::auth::TokenPair;
use linkdash::auth::backends::encode_cookie_value;
use linkdash::client::ClientError;
use linkdash::config::{AuthConfig, GuardConfig, SiteConfig};

// =============================================================================
// Test Setup
// =============================================================================

#[derive(Default)]
struct FakeProbe {
    codes: HashMap<String, String>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeProbe {
    fn with_code(code: &str, target: &str) -> Self {
        let mut codes = HashMap::new();
        codes.insert(code.to_string(), target.to_string());
        Self {
            codes,
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShortCodeProbe for FakeProbe {
    async fn resolve(&self, code: &str) -> Result<Option<String>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        Ok(self.codes.get(code).cloned())
    }
}

macro_rules! guarded_app {
    ($probe:expr) => {{
        let auth = AuthConfig::default();
        let policy = Arc::new(RoutePolicy::new(&GuardConfig::default(), &auth));
        test::init_service(
            App::new()
                .wrap(EdgeGuard::new(policy, $probe.clone(), auth.cookie_name.clone()))
                .app_data(web::Data::new(SiteContext {
                    site: SiteConfig::default(),
                    auth,
                }))
                .configure(site_routes),
        )
        .await
    }};
}

fn session_cookie() -> Cookie<'static> {
    let json = TokenPair::new("access-1", "refresh-1").encode().unwrap();
    Cookie::new("auth_tokens", encode_cookie_value(&json))
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// Protected routes
// =============================================================================

#[actix_rt::test]
async fn test_protected_route_without_cookie_redirects_to_login() {
    let probe = Arc::new(FakeProbe::default());
    let app = guarded_app!(probe);

    let req = TestRequest::get().uri("/dashboard").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/login?callbackUrl=%2Fdashboard");
    assert_eq!(probe.calls(), 0);
}

#[actix_rt::test]
async fn test_nested_protected_route_keeps_callback_path() {
    let probe = Arc::new(FakeProbe::default());
    let app = guarded_app!(probe);

    let req = TestRequest::get()
        .uri("/dashboard/stats/link-1")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&resp),
        "/login?callbackUrl=%2Fdashboard%2Fstats%2Flink-1"
    );
}

#[actix_rt::test]
async fn test_protected_route_with_session_cookie_renders() {
    let probe = Arc::new(FakeProbe::default());
    let app = guarded_app!(probe);

    let req = TestRequest::get()
        .uri("/dashboard/stats/link-1")
        .cookie(session_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(probe.calls(), 0);
}

#[actix_rt::test]
async fn test_cookie_with_access_token_only_renders() {
    let probe = Arc::new(FakeProbe::default());
    let app = guarded_app!(probe);

    let req = TestRequest::get()
        .uri("/dashboard")
        .cookie(Cookie::new(
            "auth_tokens",
            encode_cookie_value(r#"{"accessToken":"access-1"}"#),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(location(&resp).is_empty());
}

#[actix_rt::test]
async fn test_malformed_cookie_counts_as_no_session() {
    let probe = Arc::new(FakeProbe::default());
    let app = guarded_app!(probe);

    let req = TestRequest::get()
        .uri("/settings")
        .cookie(Cookie::new("auth_tokens", "%7Bnot-json"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/login?callbackUrl=%2Fsettings");
}

// =============================================================================
// Pass-through
// =============================================================================

#[actix_rt::test]
async fn test_auth_pages_pass_without_probe() {
    let probe = Arc::new(FakeProbe::default());
    let app = guarded_app!(probe);

    for uri in ["/login", "/signup", "/login?callbackUrl=%2Fdashboard"] {
        let req = TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
    }
    assert_eq!(probe.calls(), 0);
}

#[actix_rt::test]
async fn test_internal_assets_and_root_bypass_probe() {
    let probe = Arc::new(FakeProbe::default());
    let app = guarded_app!(probe);

    let req = TestRequest::get().uri("/").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/favicon.ico").to_request();
    let resp = test::call_service(&app, req).await;
    assert_ne!(resp.status(), StatusCode::TEMPORARY_REDIRECT);

    let req = TestRequest::get().uri("/_next/static/app.js").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(probe.calls(), 0);
}

// =============================================================================
// Short codes
// =============================================================================

#[actix_rt::test]
async fn test_known_short_code_redirects_to_target() {
    let probe = Arc::new(FakeProbe::with_code("abc123", "https://example.com/long"));
    let app = guarded_app!(probe);

    let req = TestRequest::get().uri("/abc123").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "https://example.com/long");
    assert_eq!(probe.calls(), 1);
}

#[actix_rt::test]
async fn test_unknown_short_code_renders_not_found() {
    let probe = Arc::new(FakeProbe::with_code("abc123", "https://example.com/long"));
    let app = guarded_app!(probe);

    let req = TestRequest::get().uri("/zzz999").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(probe.calls(), 1);
}

#[actix_rt::test]
async fn test_site_pages_are_probed_then_rendered() {
    let probe = Arc::new(FakeProbe::default());
    let app = guarded_app!(probe);

    let req = TestRequest::get().uri("/pricing").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(probe.calls(), 1);
}

#[actix_rt::test]
async fn test_probe_failure_falls_through() {
    let probe = Arc::new(FakeProbe::failing());
    let app = guarded_app!(probe);

    let req = TestRequest::get().uri("/pricing").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(probe.calls(), 1);
}
