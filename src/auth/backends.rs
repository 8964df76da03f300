//! Token storage backends
//!
//! - `FileStore`: persistent local key/value file (the client-side store)
//! - `CookieStore`: the `auth_tokens` cookie the edge guard reads
//! - `MemoryStore`: process-local, for tests and embedded use
//! - `UnavailableStore`: stands in for a store that does not exist in the
//!   current context (e.g. server-side rendering has no local storage)

use std::path::{Path, PathBuf};

use actix_web::cookie::time::{Duration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::config::{AuthConfig, SameSitePolicy, SiteConfig};
use crate::errors::{LinkdashError, Result};

/// A single-slot storage for the serialized token pair
pub trait TokenBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the backend exists in the current context
    fn is_available(&self) -> bool {
        true
    }

    fn read(&self) -> Result<Option<String>>;

    fn write(&self, value: &str) -> Result<()>;

    fn remove(&self) -> Result<()>;
}

// ============ MemoryStore ============

#[derive(Default)]
pub struct MemoryStore {
    value: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(Some(value.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.value.read().clone()
    }
}

impl TokenBackend for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self) -> Result<Option<String>> {
        Ok(self.value.read().clone())
    }

    fn write(&self, value: &str) -> Result<()> {
        *self.value.write() = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.value.write() = None;
        Ok(())
    }
}

// ============ UnavailableStore ============

pub struct UnavailableStore;

impl TokenBackend for UnavailableStore {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn read(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn write(&self, _value: &str) -> Result<()> {
        Err(LinkdashError::internal("storage backend unavailable"))
    }

    fn remove(&self) -> Result<()> {
        Err(LinkdashError::internal("storage backend unavailable"))
    }
}

// ============ FileStore ============

/// JSON object file keyed like browser local storage
pub struct FileStore {
    path: PathBuf,
    key: String,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                debug!("Local store {} is corrupt, starting fresh", self.path.display());
                Ok(Map::new())
            }
        }
    }

    fn store_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        restrict_permissions(&tmp)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl TokenBackend for FileStore {
    fn name(&self) -> &'static str {
        "local-file"
    }

    fn read(&self) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        let map = self.load_map()?;
        Ok(map.get(&self.key).and_then(Value::as_str).map(String::from))
    }

    fn write(&self, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut map = self.load_map()?;
        map.insert(self.key.clone(), Value::String(value.to_string()));
        self.store_map(&map)
    }

    fn remove(&self) -> Result<()> {
        let _guard = self.lock.lock();
        let mut map = self.load_map()?;
        if map.remove(&self.key).is_none() {
            return Ok(());
        }
        if map.is_empty() {
            std::fs::remove_file(&self.path)?;
            Ok(())
        } else {
            self.store_map(&map)
        }
    }
}

// ============ CookieStore ============

/// Attributes of the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub name: String,
    pub path: String,
    pub same_site: SameSitePolicy,
    pub secure: bool,
    pub max_age_days: i64,
}

impl CookieAttributes {
    pub fn from_config(auth: &AuthConfig, site: &SiteConfig) -> Self {
        Self {
            name: auth.cookie_name.clone(),
            path: "/".to_string(),
            same_site: auth.cookie_same_site,
            secure: auth.cookie_secure(site),
            max_age_days: auth.cookie_max_age_days,
        }
    }
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default(), &SiteConfig::default())
    }
}

/// Percent-encode a JSON value so it is a legal cookie value
pub fn encode_cookie_value(json: &str) -> String {
    urlencoding::encode(json).into_owned()
}

/// Undo [`encode_cookie_value`]; raw JSON written by other clients passes through
pub fn decode_cookie_value_raw(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Cookie jar holding the `auth_tokens` cookie
///
/// Can be seeded from a request `Cookie` header (server side) or persisted
/// to a file between CLI runs.
pub struct CookieStore {
    attrs: CookieAttributes,
    jar: RwLock<Option<Cookie<'static>>>,
    persist_path: Option<PathBuf>,
}

impl CookieStore {
    pub fn new(attrs: CookieAttributes) -> Self {
        Self {
            attrs,
            jar: RwLock::new(None),
            persist_path: None,
        }
    }

    /// A cookie jar backed by a file holding the `Set-Cookie` line
    pub fn persisted(attrs: CookieAttributes, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cookie = std::fs::read_to_string(&path)
            .ok()
            .and_then(|line| Cookie::parse(line.trim().to_string()).ok())
            .filter(|c| c.name() == attrs.name);
        Self {
            attrs,
            jar: RwLock::new(cookie),
            persist_path: Some(path),
        }
    }

    /// Seed the jar from an incoming `Cookie` request header
    pub fn from_request_header(attrs: CookieAttributes, header: &str) -> Self {
        // 值保持百分号编码形式，与 build_cookie 写入的一致
        let cookie = header
            .split(';')
            .filter_map(|pair| Cookie::parse(pair.trim().to_string()).ok())
            .find(|c| c.name() == attrs.name);
        Self {
            attrs,
            jar: RwLock::new(cookie),
            persist_path: None,
        }
    }

    pub fn attributes(&self) -> &CookieAttributes {
        &self.attrs
    }

    /// Build the session cookie for a JSON value
    pub fn build_cookie(&self, json: &str) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.attrs.name.clone(), encode_cookie_value(json));
        cookie.set_path(self.attrs.path.clone());
        cookie.set_same_site(match self.attrs.same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        });
        cookie.set_secure(self.attrs.secure);
        cookie.set_max_age(Duration::days(self.attrs.max_age_days));
        cookie.set_expires(OffsetDateTime::now_utc() + Duration::days(self.attrs.max_age_days));
        cookie
    }

    /// Cookie that deletes the session cookie on the client
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.attrs.name.clone(), "");
        cookie.set_path(self.attrs.path.clone());
        cookie.make_removal();
        cookie
    }

    /// Current `Set-Cookie` header value, if a cookie is held
    pub fn set_cookie_header(&self) -> Option<String> {
        self.jar.read().as_ref().map(|c| c.to_string())
    }

    fn persist(&self, cookie: Option<&Cookie<'static>>) -> Result<()> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        match cookie {
            Some(cookie) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                    && !parent.exists()
                {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, cookie.to_string())?;
                restrict_permissions(path)
            }
            None => {
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
                Ok(())
            }
        }
    }
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    cookie
        .expires_datetime()
        .is_some_and(|at| at <= OffsetDateTime::now_utc())
}

impl TokenBackend for CookieStore {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn read(&self) -> Result<Option<String>> {
        let jar = self.jar.read();
        match jar.as_ref() {
            Some(cookie) if is_expired(cookie) => {
                trace!("Cookie {} expired", cookie.name());
                Ok(None)
            }
            Some(cookie) => Ok(Some(decode_cookie_value_raw(cookie.value()))),
            None => Ok(None),
        }
    }

    fn write(&self, value: &str) -> Result<()> {
        let cookie = self.build_cookie(value);
        self.persist(Some(&cookie))?;
        *self.jar.write() = Some(cookie);
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.jar.write() = None;
        self.persist(None)
    }
}
