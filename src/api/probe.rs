//! 短码探测
//!
//! 向后端跳转端点发起请求（不跟随重定向），读取 `Location`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use tracing::trace;

use crate::client::ClientError;
use crate::config::GuardConfig;

/// 视为短码命中的状态码
pub fn is_redirect_status(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

#[async_trait]
pub trait ShortCodeProbe: Send + Sync {
    /// 命中时返回目标地址；未命中返回 `None`
    async fn resolve(&self, code: &str) -> Result<Option<String>, ClientError>;
}

pub struct BackendProbe {
    client: reqwest::Client,
    base_url: String,
}

impl BackendProbe {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(guard: &GuardConfig) -> Result<Self, ClientError> {
        Self::new(
            guard.redirect_base_url.clone(),
            Duration::from_millis(guard.probe_timeout_ms),
        )
    }
}

#[async_trait]
impl ShortCodeProbe for BackendProbe {
    async fn resolve(&self, code: &str) -> Result<Option<String>, ClientError> {
        let url = format!("{}/{}", self.base_url, code);
        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        trace!("Probe {} -> {}", url, status);

        if !is_redirect_status(status) {
            return Ok(None);
        }
        Ok(response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_statuses() {
        for status in [301, 302, 303, 307, 308] {
            assert!(is_redirect_status(status));
        }
        for status in [200, 204, 304, 404, 500] {
            assert!(!is_redirect_status(status));
        }
    }
}
