use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, trace};

use super::data::{self, DEMO_PASSWORD};
use super::jwt::{ACCESS, MockJwt, REFRESH};
use crate::auth::tokens::{LoginCredentials, RefreshRequest, SignupCredentials, TokenPair, UserSummary};
use crate::client::envelope::ApiResponse;
use crate::client::transport::{ApiReply, ApiRequest, HttpTransport};
use crate::client::ClientError;
use crate::models::{ContactForm, CreateLinkRequest, LinkPage, LinkStats, QrCode, ShortLink, UpdateLinkRequest};
use crate::utils::generate_random_code;
use crate::utils::password::{hash_password, verify_password};

const SHORT_CODE_LEN: usize = 6;

static DEMO_PASSWORD_HASH: OnceLock<String> = OnceLock::new();

fn demo_password_hash() -> String {
    DEMO_PASSWORD_HASH
        .get_or_init(|| hash_password(DEMO_PASSWORD).unwrap_or_default())
        .clone()
}

struct Account {
    user: UserSummary,
    password_hash: String,
}

struct MockState {
    accounts: Vec<Account>,
    links: Vec<ShortLink>,
    stats: HashMap<String, LinkStats>,
    contacts: Vec<ContactForm>,
    epoch: u64,
    refresh_failure: bool,
    requests: Vec<ApiRequest>,
}

/// In-memory link backend speaking the same envelope as the real API
///
/// Starts with the demo account and its seed links. `/links/...` answers in
/// the `{data}` envelope, `/url/...` list responses use the older top-level
/// shape.
pub struct MockBackend {
    jwt: MockJwt,
    site_base_url: String,
    state: Mutex<MockState>,
}

fn ok<T: Serialize>(status: u16, data: T) -> ApiReply {
    ApiReply::json(status, &ApiResponse::ok(data))
}

fn fail(status: u16, message: &str) -> ApiReply {
    ApiReply::json(status, &ApiResponse::<()>::fail(message))
}

fn parse_body<T: DeserializeOwned>(request: &ApiRequest) -> Result<T, ApiReply> {
    request
        .body
        .clone()
        .ok_or_else(|| fail(400, "Request body is required"))
        .and_then(|body| serde_json::from_value(body).map_err(|_| fail(400, "Invalid request body")))
}

impl MockBackend {
    pub fn new(secret: &str) -> Self {
        let now = Utc::now();
        let accounts = vec![Account {
            user: data::demo_user(now),
            password_hash: demo_password_hash(),
        }];
        Self {
            jwt: MockJwt::new(secret),
            site_base_url: "https://capp.to".to_string(),
            state: Mutex::new(MockState {
                accounts,
                links: data::seed_links(now),
                stats: data::seed_stats().into_iter().collect(),
                contacts: Vec::new(),
                epoch: 0,
                refresh_failure: false,
                requests: Vec::new(),
            }),
        }
    }

    pub fn with_site_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.site_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Invalidate every access token issued so far
    pub fn expire_sessions(&self) {
        self.state.lock().epoch += 1;
    }

    /// Make the refresh endpoint reject every call
    pub fn set_refresh_failure(&self, fail: bool) {
        self.state.lock().refresh_failure = fail;
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().requests.clone()
    }

    pub fn count_requests(&self, path: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn link_count(&self) -> usize {
        self.state.lock().links.len()
    }

    pub fn contact_messages(&self) -> Vec<ContactForm> {
        self.state.lock().contacts.clone()
    }

    fn handle(&self, request: &ApiRequest) -> ApiReply {
        let mut state = self.state.lock();
        state.requests.push(request.clone());

        let path = request.path.trim_matches('/').to_string();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        trace!("mock {} /{}", request.method, path);

        let method = &request.method;
        let result = match segments.as_slice() {
            ["auth", "login"] if method == Method::POST => self.login(&state, request),
            ["auth", "register"] if method == Method::POST => self.register(&mut state, request),
            ["auth", "refresh-token"] if method == Method::POST => self.refresh(&state, request),
            ["auth", "profile"] if method == Method::GET => {
                self.authenticate(&state, request).map(|user| ok(200, user))
            }

            ["links"] if method == Method::GET => self.list(&state, request, false),
            ["links"] if method == Method::POST => self.create(&mut state, request),
            ["links", key] if method == Method::GET => self.show(&state, request, key),
            ["links", key] if method == Method::PUT || method == Method::PATCH => {
                self.update(&mut state, request, key)
            }
            ["links", key] if method == Method::DELETE => self.delete(&mut state, request, key),
            ["links", key, "stats"] if method == Method::GET => self.stats(&state, request, key),
            ["links", key, "qr"] if method == Method::GET => self.qr(&state, request, key),

            ["url", "user", "urls"] if method == Method::GET => self.list(&state, request, true),
            ["url", "shorten"] if method == Method::POST => self.create(&mut state, request),
            ["url", "contact"] if method == Method::POST => self.contact(&mut state, request),
            ["url", key] if method == Method::GET => self.show(&state, request, key),
            ["url", key] if method == Method::PUT || method == Method::PATCH => {
                self.update(&mut state, request, key)
            }
            ["url", key] if method == Method::DELETE => self.delete(&mut state, request, key),
            ["url", key, "stats"] if method == Method::GET => self.stats(&state, request, key),
            ["url", key, "qr"] if method == Method::GET => self.qr(&state, request, key),

            ["domains"] if method == Method::GET => Ok(ok(200, data::DOMAINS)),
            _ => Err(fail(404, "Not found")),
        };

        result.unwrap_or_else(|reply| reply)
    }

    // ============ auth ============

    fn issue_pair(&self, state: &MockState, user: &UserSummary) -> Result<TokenPair, ApiReply> {
        let access = self.jwt.access_token(&user.id, &user.email, state.epoch);
        let refresh = self.jwt.refresh_token(&user.id, &user.email, state.epoch);
        match (access, refresh) {
            (Ok(access), Ok(refresh)) => Ok(TokenPair::new(access, refresh).with_user(user.clone())),
            _ => Err(fail(500, "Failed to issue tokens")),
        }
    }

    fn authenticate(&self, state: &MockState, request: &ApiRequest) -> Result<UserSummary, ApiReply> {
        let token = request
            .bearer
            .as_deref()
            .ok_or_else(|| fail(401, "Unauthorized"))?;
        let claims = self
            .jwt
            .validate(token, ACCESS)
            .map_err(|_| fail(401, "Unauthorized"))?;
        if claims.epoch != state.epoch {
            return Err(fail(401, "Unauthorized"));
        }
        state
            .accounts
            .iter()
            .find(|a| a.user.id == claims.user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| fail(401, "Unauthorized"))
    }

    fn login(&self, state: &MockState, request: &ApiRequest) -> Result<ApiReply, ApiReply> {
        let creds: LoginCredentials = parse_body(request)?;
        let account = state
            .accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(creds.email.trim()))
            .filter(|a| verify_password(&creds.password, &a.password_hash))
            .ok_or_else(|| fail(401, "Invalid credentials"))?;

        debug!("mock login for {}", account.user.email);
        Ok(ok(200, self.issue_pair(state, &account.user)?))
    }

    fn register(&self, state: &mut MockState, request: &ApiRequest) -> Result<ApiReply, ApiReply> {
        let creds: SignupCredentials = parse_body(request)?;
        let email = creds.email.trim().to_string();
        if email.is_empty() || creds.password.is_empty() {
            return Err(fail(400, "Email and password are required"));
        }
        if state
            .accounts
            .iter()
            .any(|a| a.user.email.eq_ignore_ascii_case(&email))
        {
            return Err(fail(409, "Email already registered"));
        }

        let password_hash = hash_password(&creds.password).map_err(|_| fail(500, "Failed to hash password"))?;
        let user = UserSummary {
            id: format!("user-{}", state.accounts.len() + 1),
            email,
            name: creds.name.filter(|n| !n.is_empty()),
            created_at: Utc::now().to_rfc3339(),
        };
        state.accounts.push(Account {
            user: user.clone(),
            password_hash,
        });
        Ok(ok(201, self.issue_pair(state, &user)?))
    }

    fn refresh(&self, state: &MockState, request: &ApiRequest) -> Result<ApiReply, ApiReply> {
        if state.refresh_failure {
            return Err(fail(401, "Invalid refresh token"));
        }
        let body: RefreshRequest = parse_body(request)?;
        let claims = self
            .jwt
            .validate(&body.refresh_token, REFRESH)
            .map_err(|_| fail(401, "Invalid refresh token"))?;
        let user = state
            .accounts
            .iter()
            .find(|a| a.user.id == claims.user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| fail(401, "Invalid refresh token"))?;
        Ok(ok(200, self.issue_pair(state, &user)?))
    }

    // ============ links ============

    fn find_index(state: &MockState, user: &UserSummary, key: &str) -> Result<usize, ApiReply> {
        state
            .links
            .iter()
            .position(|l| {
                l.user_id.as_deref() == Some(user.id.as_str())
                    && (l.id == key || l.short_code == key || l.custom_slug.as_deref() == Some(key))
            })
            .ok_or_else(|| fail(404, "Link not found"))
    }

    fn slug_taken(state: &MockState, slug: &str, except_id: Option<&str>) -> bool {
        state.links.iter().any(|l| {
            Some(l.id.as_str()) != except_id
                && (l.short_code == slug || l.custom_slug.as_deref() == Some(slug))
        })
    }

    fn list(&self, state: &MockState, request: &ApiRequest, legacy: bool) -> Result<ApiReply, ApiReply> {
        let user = self.authenticate(state, request)?;
        let page: usize = request
            .query_value("page")
            .and_then(|p| p.parse().ok())
            .filter(|&p| p > 0)
            .unwrap_or(1);
        let limit: usize = request
            .query_value("limit")
            .and_then(|l| l.parse().ok())
            .filter(|&l| l > 0)
            .unwrap_or(10);

        let owned: Vec<&ShortLink> = state
            .links
            .iter()
            .filter(|l| l.user_id.as_deref() == Some(user.id.as_str()))
            .collect();
        let total = owned.len() as u64;
        let links: Vec<ShortLink> = owned
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .cloned()
            .collect();

        if legacy {
            Ok(ApiReply::json(
                200,
                &json!({"success": true, "links": links, "count": total}),
            ))
        } else {
            Ok(ok(200, LinkPage { links, total }))
        }
    }

    fn create(&self, state: &mut MockState, request: &ApiRequest) -> Result<ApiReply, ApiReply> {
        let user = self.authenticate(state, request)?;
        let body: CreateLinkRequest = parse_body(request)?;
        if body.original_url.trim().is_empty() {
            return Err(fail(400, "Original URL is required"));
        }

        let slug = body.custom_slug.filter(|s| !s.is_empty());
        let short_code = match &slug {
            Some(slug) if Self::slug_taken(state, slug, None) => {
                return Err(fail(409, "Custom slug already in use"));
            }
            Some(slug) => slug.clone(),
            None => loop {
                let code = generate_random_code(SHORT_CODE_LEN);
                if !Self::slug_taken(state, &code, None) {
                    break code;
                }
            },
        };

        let now = Utc::now();
        let expires_at = body.expires_at.or_else(|| {
            body.expiration_days
                .map(|d| now + chrono::Duration::days(i64::from(d)))
        });
        let link = ShortLink {
            id: format!("link-{}", uuid::Uuid::new_v4().simple()),
            original_url: body.original_url.trim().to_string(),
            short_code,
            custom_slug: slug,
            domain: body.domain,
            description: body.description,
            expires_at,
            expiration_days: body.expiration_days,
            created_at: now,
            user_id: Some(user.id),
            clicks: 0,
            qr_code: None,
        };
        state.links.insert(0, link.clone());
        Ok(ok(201, link))
    }

    fn show(&self, state: &MockState, request: &ApiRequest, key: &str) -> Result<ApiReply, ApiReply> {
        let user = self.authenticate(state, request)?;
        let idx = Self::find_index(state, &user, key)?;
        Ok(ok(200, &state.links[idx]))
    }

    fn update(&self, state: &mut MockState, request: &ApiRequest, key: &str) -> Result<ApiReply, ApiReply> {
        let user = self.authenticate(state, request)?;
        let body: UpdateLinkRequest = parse_body(request)?;
        let idx = Self::find_index(state, &user, key)?;

        if let Some(slug) = body.custom_slug.as_deref().filter(|s| !s.is_empty()) {
            let id = state.links[idx].id.clone();
            if Self::slug_taken(state, slug, Some(&id)) {
                return Err(fail(409, "Custom slug already in use"));
            }
        }

        let link = &mut state.links[idx];
        if let Some(url) = body.original_url {
            link.original_url = url;
        }
        if let Some(slug) = body.custom_slug {
            link.custom_slug = Some(slug).filter(|s| !s.is_empty());
        }
        if let Some(description) = body.description {
            link.description = Some(description);
        }
        if let Some(expires_at) = body.expires_at {
            link.expires_at = Some(expires_at);
        }
        Ok(ok(200, link.clone()))
    }

    fn delete(&self, state: &mut MockState, request: &ApiRequest, key: &str) -> Result<ApiReply, ApiReply> {
        let user = self.authenticate(state, request)?;
        let idx = Self::find_index(state, &user, key)?;
        let removed = state.links.remove(idx);
        state.stats.remove(&removed.id);
        Ok(ApiReply::json(200, &ApiResponse::<Value>::empty()))
    }

    fn stats(&self, state: &MockState, request: &ApiRequest, key: &str) -> Result<ApiReply, ApiReply> {
        let user = self.authenticate(state, request)?;
        let link = &state.links[Self::find_index(state, &user, key)?];
        let stats = state.stats.get(&link.id).cloned().unwrap_or_else(|| LinkStats {
            total_clicks: link.clicks,
            ..LinkStats::default()
        });
        Ok(ok(200, stats))
    }

    fn qr(&self, state: &MockState, request: &ApiRequest, key: &str) -> Result<ApiReply, ApiReply> {
        let user = self.authenticate(state, request)?;
        let link = &state.links[Self::find_index(state, &user, key)?];
        let short_url = format!("{}/{}", self.site_base_url, link.short_code);
        let qr_code = format!(
            "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={}",
            urlencoding::encode(&short_url)
        );
        Ok(ok(200, QrCode { short_url, qr_code }))
    }

    fn contact(&self, state: &mut MockState, request: &ApiRequest) -> Result<ApiReply, ApiReply> {
        let form: ContactForm = parse_body(request)?;
        if form.email.trim().is_empty() || form.message.trim().is_empty() {
            return Err(fail(400, "Email and message are required"));
        }
        state.contacts.push(form);
        Ok(ApiReply::json(
            200,
            &json!({"success": true, "message": "Message received"}),
        ))
    }
}

#[async_trait]
impl HttpTransport for MockBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiReply, ClientError> {
        Ok(self.handle(request))
    }
}
