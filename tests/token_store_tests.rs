//! TokenStore tests
//!
//! File-backed persistence, cookie mirroring and degraded backends.

use std::sync::Arc;

use linkdash::api::has_valid_session;
use linkdash::auth::backends::{CookieAttributes, CookieStore, FileStore, MemoryStore, UnavailableStore};
use linkdash::auth::{TokenPair, TokenStore, decode_cookie_value};
use linkdash::config::{AuthConfig, SiteConfig};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> AuthConfig {
    AuthConfig {
        token_dir: dir.path().join("tokens").to_string_lossy().to_string(),
        ..AuthConfig::default()
    }
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_tokens_survive_reload() {
    let dir = TempDir::new().unwrap();
    let auth = config_in(&dir);
    let site = SiteConfig::default();

    let store = TokenStore::from_config(&auth, &site);
    store.save(&TokenPair::new("access-1", "refresh-1"));
    drop(store);

    let reloaded = TokenStore::from_config(&auth, &site);
    assert!(reloaded.is_authenticated());
    assert_eq!(reloaded.access_token().as_deref(), Some("access-1"));
    assert_eq!(reloaded.refresh_token().as_deref(), Some("refresh-1"));
}

#[test]
fn test_clear_removes_both_files() {
    let dir = TempDir::new().unwrap();
    let auth = config_in(&dir);
    let store = TokenStore::from_config(&auth, &SiteConfig::default());

    store.save(&TokenPair::new("access-1", "refresh-1"));
    let token_dir = dir.path().join("tokens");
    assert!(token_dir.join("local-storage.json").exists());
    assert!(token_dir.join("cookies.txt").exists());

    store.clear();
    assert!(store.load().is_none());
    assert!(!token_dir.join("local-storage.json").exists());
    assert!(!token_dir.join("cookies.txt").exists());
    assert!(!TokenStore::from_config(&auth, &SiteConfig::default()).is_authenticated());
}

#[test]
fn test_local_store_used_when_cookie_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local.json");
    let local = Arc::new(FileStore::new(&path, "auth_tokens"));
    let cookie = Arc::new(MemoryStore::new());

    let store = TokenStore::new(local.clone(), cookie.clone());
    store.save(&TokenPair::new("access-1", "refresh-1"));

    // drop the cookie only
    let only_local = TokenStore::new(local, Arc::new(MemoryStore::new()));
    assert_eq!(only_local.access_token().as_deref(), Some("access-1"));
}

#[test]
fn test_malformed_value_reads_as_absent() {
    let store = TokenStore::new(
        Arc::new(MemoryStore::with_value("{not json")),
        Arc::new(MemoryStore::with_value("garbage")),
    );
    assert!(store.load().is_none());
    assert!(!store.is_authenticated());
}

#[test]
fn test_unavailable_backend_is_skipped() {
    let cookie = Arc::new(MemoryStore::new());
    let store = TokenStore::new(Arc::new(UnavailableStore), cookie.clone());

    store.save(&TokenPair::new("access-1", "refresh-1"));
    assert!(cookie.raw().is_some());
    assert_eq!(store.access_token().as_deref(), Some("access-1"));

    store.clear();
    assert!(cookie.raw().is_none());
}

#[test]
fn test_empty_access_token_is_not_authenticated() {
    let store = TokenStore::in_memory();
    store.save(&TokenPair::new("", "refresh-1"));
    assert!(!store.is_authenticated());
    assert!(store.access_token().is_none());
    assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
}

// =============================================================================
// Cookie mirror
// =============================================================================

#[test]
fn test_cookie_mirror_is_readable_by_edge_guard() {
    let cookie = Arc::new(CookieStore::new(CookieAttributes::default()));
    let store = TokenStore::new(Arc::new(MemoryStore::new()), cookie.clone());
    store.save(&TokenPair::new("access-1", "refresh-1"));

    let header = cookie.set_cookie_header().unwrap();
    assert!(header.starts_with("auth_tokens="));
    assert!(header.contains("Path=/"));
    assert!(header.contains("SameSite=Strict"));
    assert!(header.contains("Max-Age=604800"));
    // development default: not secure
    assert!(!header.contains("Secure"));

    let value = header
        .split(';')
        .next()
        .and_then(|kv| kv.split_once('='))
        .map(|(_, v)| v)
        .unwrap();
    assert!(has_valid_session(Some(value)));
    assert_eq!(decode_cookie_value(value).unwrap().access_token, "access-1");
}

#[test]
fn test_production_cookie_is_secure() {
    let site = SiteConfig {
        environment: "production".to_string(),
        ..SiteConfig::default()
    };
    let attrs = CookieAttributes::from_config(&AuthConfig::default(), &site);
    assert!(attrs.secure);

    let cookie = CookieStore::new(attrs);
    let store = TokenStore::new(Arc::new(MemoryStore::new()), Arc::new(cookie));
    store.save(&TokenPair::new("a", "r"));
    assert!(store.is_authenticated());
}

#[test]
fn test_cookie_from_request_header() {
    let pair = TokenPair::new("access-1", "refresh-1");
    let encoded = urlencoding::encode(&pair.encode().unwrap()).into_owned();
    let header = format!("theme=dark; auth_tokens={}; other=1", encoded);

    let cookie = CookieStore::from_request_header(CookieAttributes::default(), &header);
    let store = TokenStore::new(Arc::new(UnavailableStore), Arc::new(cookie));
    assert_eq!(store.load(), Some(pair));
}
