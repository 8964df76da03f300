//! Token Store
//!
//! Single entry point for reading and writing the token pair. Every write and
//! clear goes to both backends so the local store and the edge-readable cookie
//! never diverge.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::backends::{
    CookieAttributes, CookieStore, FileStore, MemoryStore, TokenBackend, decode_cookie_value_raw,
};
use super::tokens::TokenPair;
use crate::config::{AuthConfig, SiteConfig};

/// Decode a raw cookie value into a token pair
///
/// Accepts both the percent-encoded form this crate writes and bare JSON.
pub fn decode_cookie_value(raw: &str) -> Option<TokenPair> {
    if raw.is_empty() {
        return None;
    }
    TokenPair::decode(&decode_cookie_value_raw(raw))
}

pub struct TokenStore {
    persistent: Arc<dyn TokenBackend>,
    cookie: Arc<dyn TokenBackend>,
}

impl TokenStore {
    pub fn new(persistent: Arc<dyn TokenBackend>, cookie: Arc<dyn TokenBackend>) -> Self {
        Self { persistent, cookie }
    }

    /// Two in-memory backends
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// File-backed local store plus a persisted cookie jar under `auth.token_dir`
    pub fn from_config(auth: &AuthConfig, site: &SiteConfig) -> Self {
        let dir = Path::new(&auth.token_dir);
        let persistent = FileStore::new(dir.join("local-storage.json"), auth.storage_key.clone());
        let cookie = CookieStore::persisted(
            CookieAttributes::from_config(auth, site),
            dir.join("cookies.txt"),
        );
        Self::new(Arc::new(persistent), Arc::new(cookie))
    }

    fn backends(&self) -> [&Arc<dyn TokenBackend>; 2] {
        [&self.persistent, &self.cookie]
    }

    /// Write the pair to every available backend
    ///
    /// Never fails: unavailable backends are skipped, write errors are logged.
    pub fn save(&self, tokens: &TokenPair) {
        let raw = match tokens.encode() {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to encode token pair: {}", e);
                return;
            }
        };

        for backend in self.backends() {
            if !backend.is_available() {
                trace!("Skipping unavailable token backend {}", backend.name());
                continue;
            }
            if let Err(e) = backend.write(&raw) {
                warn!("Failed to write tokens to {}: {}", backend.name(), e);
            }
        }
        debug!("Token pair saved");
    }

    /// Cookie first, then the persistent store
    pub fn load(&self) -> Option<TokenPair> {
        for backend in [&self.cookie, &self.persistent] {
            if !backend.is_available() {
                continue;
            }
            match backend.read() {
                Ok(Some(raw)) => {
                    if let Some(pair) = TokenPair::decode(&raw) {
                        return Some(pair);
                    }
                    debug!("Ignoring malformed token value in {}", backend.name());
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to read tokens from {}: {}", backend.name(), e),
            }
        }
        None
    }

    pub fn clear(&self) {
        for backend in self.backends() {
            if !backend.is_available() {
                continue;
            }
            if let Err(e) = backend.remove() {
                warn!("Failed to clear tokens from {}: {}", backend.name(), e);
            }
        }
        debug!("Token pair cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.load().is_some_and(|pair| pair.has_access_token())
    }

    pub fn access_token(&self) -> Option<String> {
        self.load()
            .filter(TokenPair::has_access_token)
            .map(|pair| pair.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.load()
            .filter(TokenPair::has_refresh_token)
            .map(|pair| pair.refresh_token)
    }
}
