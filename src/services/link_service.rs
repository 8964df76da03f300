//! Link management service
//!
//! Typed queries and mutations over the API gateway. Reads go through moka
//! caches; a successful mutation discards every cached list page (and the
//! link's stats), a failed one leaves the caches untouched.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use tracing::{debug, info};

use crate::client::{ApiGateway, ApiRequest};
use crate::config::{ApiStyle, LinksConfig};
use crate::errors::{LinkdashError, Result};
use crate::models::{CreateLinkRequest, LinkPage, LinkStats, QrCode, ShortLink, UpdateLinkRequest};
use crate::utils::url_validator::{validate_custom_slug, validate_url};
use crate::utils::validation::FieldErrors;

/// Cache key of one list page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkQueryKey {
    pub page: u32,
    pub limit: u32,
}

/// Paths of one endpoint family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEndpoints {
    pub list: &'static str,
    pub create: &'static str,
    pub item_prefix: &'static str,
    pub use_patch: bool,
}

impl LinkEndpoints {
    pub fn for_style(style: ApiStyle) -> Self {
        match style {
            ApiStyle::Links => Self {
                list: "/links",
                create: "/links",
                item_prefix: "/links",
                use_patch: false,
            },
            ApiStyle::Url => Self {
                list: "/url/user/urls",
                create: "/url/shorten",
                item_prefix: "/url",
                use_patch: true,
            },
        }
    }

    pub fn item(&self, key: &str) -> String {
        format!("{}/{}", self.item_prefix, urlencoding::encode(key))
    }

    pub fn stats(&self, key: &str) -> String {
        format!("{}/stats", self.item(key))
    }

    pub fn qr(&self, key: &str) -> String {
        format!("{}/qr", self.item(key))
    }
}

fn validate_create(req: &CreateLinkRequest) -> Result<()> {
    let mut errors = FieldErrors::new();
    if let Err(e) = validate_url(&req.original_url) {
        errors.push("originalUrl", e.field_message());
    }
    if let Some(slug) = req.custom_slug.as_deref().filter(|s| !s.is_empty())
        && let Err(msg) = validate_custom_slug(slug)
    {
        errors.push("customSlug", msg);
    }
    if req.expires_at.is_some_and(|at| at <= Utc::now()) {
        errors.push("expiresAt", "Expiration must be in the future");
    }
    if req.expiration_days == Some(0) {
        errors.push("expirationDays", "Expiration must be at least 1 day");
    }
    errors.into_result().map_err(LinkdashError::from)
}

fn validate_update(req: &UpdateLinkRequest) -> Result<()> {
    if req.is_empty() {
        return Err(LinkdashError::validation("Nothing to update"));
    }
    let mut errors = FieldErrors::new();
    if let Some(url) = req.original_url.as_deref()
        && let Err(e) = validate_url(url)
    {
        errors.push("originalUrl", e.field_message());
    }
    if let Some(slug) = req.custom_slug.as_deref().filter(|s| !s.is_empty())
        && let Err(msg) = validate_custom_slug(slug)
    {
        errors.push("customSlug", msg);
    }
    if req.expires_at.is_some_and(|at| at <= Utc::now()) {
        errors.push("expiresAt", "Expiration must be in the future");
    }
    errors.into_result().map_err(LinkdashError::from)
}

pub struct LinkService {
    gateway: Arc<ApiGateway>,
    endpoints: LinkEndpoints,
    page_size: u32,
    pages: Cache<LinkQueryKey, LinkPage>,
    stats: Cache<String, LinkStats>,
    domains: Cache<(), Vec<String>>,
}

impl LinkService {
    pub fn new(gateway: Arc<ApiGateway>, config: &LinksConfig) -> Self {
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        Self {
            gateway,
            endpoints: LinkEndpoints::for_style(config.api_style),
            page_size: config.page_size.max(1),
            pages: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(config.cache_capacity)
                .build(),
            stats: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(config.cache_capacity)
                .build(),
            domains: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
        }
    }

    pub fn endpoints(&self) -> &LinkEndpoints {
        &self.endpoints
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// One page of the user's links (read-through cache)
    pub async fn list_links(&self, page: u32, limit: u32) -> Result<LinkPage> {
        let key = LinkQueryKey {
            page: page.max(1),
            limit: limit.max(1),
        };
        self.pages
            .try_get_with(key, async {
                debug!("Link page {:?} cache miss", key);
                let request = ApiRequest::get(self.endpoints.list)
                    .with_query("page", key.page)
                    .with_query("limit", key.limit);
                let page: LinkPage = self.gateway.fetch(request).await?;
                Ok::<_, LinkdashError>(page)
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Cached copy of a page, without touching the network
    pub async fn cached_page(&self, page: u32, limit: u32) -> Option<LinkPage> {
        self.pages.get(&LinkQueryKey { page, limit }).await
    }

    /// Locate a link (by id or short code) on the first page
    pub async fn find_link(&self, key: &str) -> Result<Option<ShortLink>> {
        let page = self.list_links(1, self.page_size).await?;
        Ok(page
            .links
            .into_iter()
            .find(|l| l.id == key || l.short_code == key))
    }

    pub async fn create_link(&self, req: &CreateLinkRequest) -> Result<ShortLink> {
        validate_create(req)?;

        let request = ApiRequest::post(self.endpoints.create).with_json(req)?;
        let link: ShortLink = self.gateway.fetch(request).await?;

        self.invalidate_lists();
        info!("Created short link {}", link.short_code);
        Ok(link)
    }

    pub async fn update_link(&self, key: &str, req: &UpdateLinkRequest) -> Result<ShortLink> {
        validate_update(req)?;

        let path = self.endpoints.item(key);
        let request = match self.endpoints.use_patch {
            true => ApiRequest::patch(path),
            false => ApiRequest::put(path),
        };
        let request = request.with_json(req)?;
        let mut keys = self.cached_keys_for(key);
        let link: ShortLink = self.gateway.fetch(request).await?;

        keys.push(link.id.clone());
        keys.push(link.short_code.clone());
        self.invalidate_lists();
        self.invalidate_stats(&keys).await;
        info!("Updated short link {}", link.short_code);
        Ok(link)
    }

    pub async fn delete_link(&self, key: &str) -> Result<()> {
        let keys = self.cached_keys_for(key);
        self.gateway
            .request::<serde_json::Value>(ApiRequest::delete(self.endpoints.item(key)))
            .await?;

        self.invalidate_lists();
        self.invalidate_stats(&keys).await;
        info!("Deleted short link {}", key);
        Ok(())
    }

    pub async fn link_stats(&self, key: &str) -> Result<LinkStats> {
        self.stats
            .try_get_with(key.to_string(), async {
                let stats: LinkStats = self
                    .gateway
                    .fetch(ApiRequest::get(self.endpoints.stats(key)))
                    .await?;
                Ok::<_, LinkdashError>(stats)
            })
            .await
            .map_err(|e| (*e).clone())
    }

    pub async fn qr_code(&self, key: &str) -> Result<QrCode> {
        Ok(self
            .gateway
            .fetch(ApiRequest::get(self.endpoints.qr(key)))
            .await?)
    }

    pub async fn domains(&self) -> Result<Vec<String>> {
        self.domains
            .try_get_with((), async {
                let domains: Vec<String> = self.gateway.fetch(ApiRequest::get("/domains")).await?;
                Ok::<_, LinkdashError>(domains)
            })
            .await
            .map_err(|e| (*e).clone())
    }

    fn invalidate_lists(&self) {
        self.pages.invalidate_all();
    }

    /// `key` plus the id and short code of every cached copy it names
    fn cached_keys_for(&self, key: &str) -> Vec<String> {
        let mut keys = vec![key.to_string()];
        for (_, page) in self.pages.iter() {
            for link in page.links.iter().filter(|l| l.id == key || l.short_code == key) {
                keys.push(link.id.clone());
                keys.push(link.short_code.clone());
            }
        }
        keys
    }

    async fn invalidate_stats(&self, keys: &[String]) {
        for key in keys {
            self.stats.invalidate(key).await;
        }
    }

    /// Drop every cached value (used on logout)
    pub fn invalidate_all(&self) {
        self.pages.invalidate_all();
        self.stats.invalidate_all();
        self.domains.invalidate_all();
    }
}
