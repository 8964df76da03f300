//! LinkService tests
//!
//! Cached reads, mutations with invalidation, and validation before dispatch,
//! against the in-memory backend.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use reqwest::Method;

use linkdash::auth::{AuthSession, LoginCredentials, RecordingNavigator, TokenStore};
use linkdash::client::mock::data::{DEMO_EMAIL, DEMO_PASSWORD, DOMAINS};
use linkdash::client::{ApiGateway, MockBackend};
use linkdash::config::{ApiStyle, AuthConfig, LinksConfig};
use linkdash::errors::LinkdashError;
use linkdash::models::{CreateLinkRequest, UpdateLinkRequest};
use linkdash::services::{LinkService, StatsPeriod};

const SECRET: &str = "link_service_tests_secret_32byte";

async fn signed_in(style: ApiStyle) -> (Arc<MockBackend>, LinkService) {
    let mock = Arc::new(MockBackend::new(SECRET));
    let gateway = Arc::new(ApiGateway::new(
        mock.clone(),
        Arc::new(TokenStore::in_memory()),
        Arc::new(RecordingNavigator::new()),
        "/login",
    ));
    let session = AuthSession::new(gateway.clone(), &AuthConfig::default());
    assert!(
        session
            .login(&LoginCredentials::new(DEMO_EMAIL, DEMO_PASSWORD), None)
            .await
    );

    let config = LinksConfig {
        api_style: style,
        ..LinksConfig::default()
    };
    (mock, LinkService::new(gateway, &config))
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_list_is_cached() {
    let (mock, service) = signed_in(ApiStyle::Links).await;

    let first = service.list_links(1, 10).await.unwrap();
    assert_eq!(first.total, 5);
    assert_eq!(first.links[0].id, "link-1");

    let second = service.list_links(1, 10).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(mock.count_requests("/links"), 1);
    assert!(service.cached_page(1, 10).await.is_some());
}

#[tokio::test]
async fn test_list_pagination() {
    let (_, service) = signed_in(ApiStyle::Links).await;

    let page = service.list_links(2, 2).await.unwrap();
    assert_eq!(page.total, 5);
    let ids: Vec<&str> = page.links.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["link-3", "link-4"]);
}

#[tokio::test]
async fn test_legacy_url_family_list() {
    let (mock, service) = signed_in(ApiStyle::Url).await;

    let page = service.list_links(1, 10).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.links.len(), 5);
    assert_eq!(mock.count_requests("/url/user/urls"), 1);
}

#[tokio::test]
async fn test_find_link_by_id_or_code() {
    let (_, service) = signed_in(ApiStyle::Links).await;

    let by_id = service.find_link("link-3").await.unwrap().unwrap();
    assert_eq!(by_id.short_code, "ghi789");
    let by_code = service.find_link("ghi789").await.unwrap().unwrap();
    assert_eq!(by_code.id, "link-3");
    assert!(service.find_link("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_stats_and_period_filter() {
    let (_, service) = signed_in(ApiStyle::Links).await;

    let stats = service.link_stats("link-1").await.unwrap();
    assert_eq!(stats.total_clicks, 42);
    assert_eq!(stats.clicks_by_day.len(), 4);
    assert_eq!(stats.referrers[0].source, "Direct");

    let now = Utc.with_ymd_and_hms(2023, 5, 4, 12, 0, 0).unwrap();
    let week = StatsPeriod::Week.filter(&stats.clicks_by_day, now);
    assert_eq!(week.len(), 4);
    let day = StatsPeriod::Day.filter(&stats.clicks_by_day, now);
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].date, "2023-05-04");
}

#[tokio::test]
async fn test_stats_for_link_without_seed_stats() {
    let (_, service) = signed_in(ApiStyle::Links).await;
    let stats = service.link_stats("link-4").await.unwrap();
    assert_eq!(stats.total_clicks, 5);
    assert!(stats.clicks_by_day.is_empty());
}

#[tokio::test]
async fn test_qr_and_domains() {
    let (_, service) = signed_in(ApiStyle::Links).await;

    let qr = service.qr_code("link-1").await.unwrap();
    assert_eq!(qr.short_url, "https://capp.to/abc123");
    assert!(qr.qr_code.contains("https%3A%2F%2Fcapp.to%2Fabc123"));

    let domains = service.domains().await.unwrap();
    assert_eq!(domains, DOMAINS.map(String::from).to_vec());
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_create_without_slug_generates_code() {
    let (mock, service) = signed_in(ApiStyle::Links).await;
    service.list_links(1, 10).await.unwrap();

    let link = service
        .create_link(&CreateLinkRequest::new("https://example.org/new"))
        .await
        .unwrap();

    assert!(!link.short_code.is_empty());
    assert_eq!(link.clicks, 0);
    assert_eq!(mock.link_count(), 6);

    // list cache was invalidated
    assert!(service.cached_page(1, 10).await.is_none());
    let page = service.list_links(1, 10).await.unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(page.links[0].id, link.id);
}

#[tokio::test]
async fn test_create_with_expiration_days() {
    let (_, service) = signed_in(ApiStyle::Links).await;

    let link = service
        .create_link(&CreateLinkRequest {
            custom_slug: Some("docs-link".to_string()),
            expiration_days: Some(7),
            ..CreateLinkRequest::new("https://example.org/docs")
        })
        .await
        .unwrap();

    assert_eq!(link.short_code, "docs-link");
    let expires_at = link.expires_at.unwrap();
    assert!(expires_at > Utc::now() + Duration::days(6));
    assert!(!link.is_expired(Utc::now()));
}

#[tokio::test]
async fn test_create_with_taken_slug_keeps_cache() {
    let (_, service) = signed_in(ApiStyle::Links).await;
    let before = service.list_links(1, 10).await.unwrap();

    let err = service
        .create_link(&CreateLinkRequest {
            custom_slug: Some("example".to_string()),
            ..CreateLinkRequest::new("https://example.org/other")
        })
        .await
        .unwrap_err();

    assert_eq!(err, LinkdashError::Conflict("Custom slug already in use".to_string()));
    assert_eq!(service.cached_page(1, 10).await, Some(before));
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_dispatch() {
    let (mock, service) = signed_in(ApiStyle::Links).await;

    let err = service
        .create_link(&CreateLinkRequest::new("ftp://example.org/file"))
        .await
        .unwrap_err();

    assert!(matches!(err, LinkdashError::Validation(ref m) if m.contains("Please enter a valid URL")));
    assert_eq!(mock.count_requests("/links"), 0);
}

#[tokio::test]
async fn test_invalid_slug_is_rejected() {
    let (mock, service) = signed_in(ApiStyle::Links).await;

    let err = service
        .create_link(&CreateLinkRequest {
            custom_slug: Some("a b".to_string()),
            ..CreateLinkRequest::new("https://example.org")
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LinkdashError::Validation(_)));
    assert_eq!(mock.link_count(), 5);
}

#[tokio::test]
async fn test_past_expiration_is_rejected() {
    let (_, service) = signed_in(ApiStyle::Links).await;

    let err = service
        .create_link(&CreateLinkRequest {
            expires_at: Some(Utc::now() - Duration::hours(1)),
            ..CreateLinkRequest::new("https://example.org")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LinkdashError::Validation(ref m) if m.contains("future")));
}

#[tokio::test]
async fn test_update_invalidates_list_and_stats() {
    let (_, service) = signed_in(ApiStyle::Links).await;
    service.list_links(1, 10).await.unwrap();

    let updated = service
        .update_link(
            "link-2",
            &UpdateLinkRequest {
                description: Some("Quarterly report".to_string()),
                ..UpdateLinkRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.description.as_deref(), Some("Quarterly report"));
    assert!(service.cached_page(1, 10).await.is_none());
    let found = service.find_link("link-2").await.unwrap().unwrap();
    assert_eq!(found.description.as_deref(), Some("Quarterly report"));
}

#[tokio::test]
async fn test_update_uses_patch_on_url_family() {
    let (mock, service) = signed_in(ApiStyle::Url).await;

    service
        .update_link(
            "link-2",
            &UpdateLinkRequest {
                original_url: Some("https://example.org/moved".to_string()),
                ..UpdateLinkRequest::default()
            },
        )
        .await
        .unwrap();

    let update = mock
        .requests()
        .into_iter()
        .find(|r| r.path == "/url/link-2")
        .unwrap();
    assert_eq!(update.method, Method::PATCH);
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let (_, service) = signed_in(ApiStyle::Links).await;
    let err = service
        .update_link("link-1", &UpdateLinkRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LinkdashError::Validation(_)));
}

#[tokio::test]
async fn test_delete_missing_link_keeps_cache() {
    let (mock, service) = signed_in(ApiStyle::Links).await;
    let before = service.list_links(1, 10).await.unwrap();

    let err = service.delete_link("does-not-exist").await.unwrap_err();

    assert_eq!(err, LinkdashError::NotFound("Link not found".to_string()));
    assert_eq!(service.cached_page(1, 10).await, Some(before));
    assert_eq!(mock.link_count(), 5);
}

#[tokio::test]
async fn test_delete_existing_link() {
    let (mock, service) = signed_in(ApiStyle::Links).await;
    service.list_links(1, 10).await.unwrap();

    service.delete_link("link-5").await.unwrap();

    assert_eq!(mock.link_count(), 4);
    assert!(service.cached_page(1, 10).await.is_none());
    assert_eq!(service.list_links(1, 10).await.unwrap().total, 4);
}

#[tokio::test]
async fn test_update_by_short_code_drops_stats_cached_by_id() {
    let (mock, service) = signed_in(ApiStyle::Links).await;
    service.link_stats("link-2").await.unwrap();
    assert_eq!(mock.count_requests("/links/link-2/stats"), 1);

    service
        .update_link(
            "def456",
            &UpdateLinkRequest {
                description: Some("Design doc".to_string()),
                ..UpdateLinkRequest::default()
            },
        )
        .await
        .unwrap();

    service.link_stats("link-2").await.unwrap();
    assert_eq!(mock.count_requests("/links/link-2/stats"), 2);
}

#[tokio::test]
async fn test_delete_by_short_code_drops_stats_cached_by_id() {
    let (_, service) = signed_in(ApiStyle::Links).await;
    service.list_links(1, 10).await.unwrap();
    assert_eq!(service.link_stats("link-1").await.unwrap().total_clicks, 42);

    service.delete_link("abc123").await.unwrap();

    let err = service.link_stats("link-1").await.unwrap_err();
    assert_eq!(err, LinkdashError::NotFound("Link not found".to_string()));
}

// =============================================================================
// Session expiry
// =============================================================================

#[tokio::test]
async fn test_expired_session_is_refreshed_transparently() {
    let (mock, service) = signed_in(ApiStyle::Links).await;
    mock.expire_sessions();

    let page = service.list_links(1, 10).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(mock.count_requests("/auth/refresh-token"), 1);
    assert_eq!(mock.count_requests("/links"), 2);
}

#[tokio::test]
async fn test_failed_refresh_surfaces_unauthorized() {
    let (mock, service) = signed_in(ApiStyle::Links).await;
    mock.expire_sessions();
    mock.set_refresh_failure(true);

    let err = service.list_links(1, 10).await.unwrap_err();
    assert!(matches!(err, LinkdashError::Unauthorized(_)));
}
