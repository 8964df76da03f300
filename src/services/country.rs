//! 访客国家检测
//!
//! 调用外部 IP 信息接口（默认 ipinfo.io），读取 `country` 字段。
//! 结果（含失败的 `None`）缓存一小时。

use std::time::Duration;

use moka::future::Cache;
use tracing::{trace, warn};
use ureq::Agent;

use crate::config::CountryConfig;

const COUNTRY_CACHE_TTL_SECS: u64 = 3600;

pub struct CountryDetector {
    lookup_url: String,
    agent: Agent,
    /// 查询地址 → 国家代码（Option 用于负缓存）
    cache: Cache<String, Option<String>>,
}

/// 从接口响应中取出国家代码（兼容多种字段名）
pub fn parse_country(json: &serde_json::Value) -> Option<String> {
    json["country"]
        .as_str()
        .or_else(|| json["countryCode"].as_str())
        .or_else(|| json["country_code"].as_str())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase)
}

impl CountryDetector {
    pub fn new(config: &CountryConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(COUNTRY_CACHE_TTL_SECS))
            .max_capacity(16)
            .build();
        Self {
            lookup_url: config.lookup_url.clone(),
            agent,
            cache,
        }
    }

    /// 同步查询，在 spawn_blocking 中调用
    fn detect_sync(agent: Agent, url: String) -> Option<String> {
        let resp = match agent.get(&url).call() {
            Ok(r) => r,
            Err(e) => {
                warn!("Country lookup request to \"{}\" failed: {}", url, e);
                return None;
            }
        };

        let json: serde_json::Value = match resp.into_body().read_json() {
            Ok(j) => j,
            Err(e) => {
                warn!("Country lookup response from \"{}\" parse failed: {}", url, e);
                return None;
            }
        };

        let country = parse_country(&json);
        trace!("Country lookup: {:?}", country);
        country
    }

    async fn fetch(&self) -> Option<String> {
        let agent = self.agent.clone();
        let url = self.lookup_url.clone();
        tokio::task::spawn_blocking(move || Self::detect_sync(agent, url))
            .await
            .unwrap_or_else(|e| {
                warn!("Country lookup spawn_blocking failed: {}", e);
                None
            })
    }

    /// 检测失败时返回 `None`（按默认货币处理）
    ///
    /// 并发调用只发起一次请求（`get_with`）
    pub async fn detect(&self) -> Option<String> {
        self.cache
            .get_with(self.lookup_url.clone(), async {
                trace!("Country cache miss, querying {}", self.lookup_url);
                self.fetch().await
            })
            .await
    }
}
