//! 边缘路由策略
//!
//! 纯函数部分：路径分类、登录跳转地址、会话 Cookie 校验。
//! 中间件（`middleware::edge_guard`）据此决定放行、跳转或探测短码。

use crate::auth::session::CALLBACK_PARAM;
use crate::auth::token_store::decode_cookie_value;
use crate::config::{AuthConfig, GuardConfig};

/// 单次导航请求的处理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// 框架内部资源，直接放行
    Bypass,
    /// 受保护路由，需要有效会话
    Protected,
    /// 登录/注册页，无条件放行
    AuthEntry,
    /// 可能是短码，需要向后端探测
    Candidate(String),
    /// 普通页面（根路径）
    Page,
}

#[derive(Debug, Clone)]
pub struct RoutePolicy {
    protected_routes: Vec<String>,
    auth_routes: Vec<String>,
    bypass_prefixes: Vec<String>,
    bypass_exact: Vec<String>,
    login_path: String,
}

/// `route` 本身或其子路径
fn matches_route(path: &str, route: &str) -> bool {
    let route = route.trim_end_matches('/');
    if route.is_empty() {
        return false;
    }
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

impl RoutePolicy {
    pub fn new(guard: &GuardConfig, auth: &AuthConfig) -> Self {
        Self {
            protected_routes: guard.protected_routes.clone(),
            auth_routes: guard.auth_routes.clone(),
            bypass_prefixes: guard.bypass_prefixes.clone(),
            bypass_exact: guard.bypass_exact.clone(),
            login_path: auth.login_path.clone(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn classify(&self, path: &str) -> RouteDecision {
        if self.bypass_exact.iter().any(|p| p == path)
            || self
                .bypass_prefixes
                .iter()
                .any(|p| !p.is_empty() && path.starts_with(p.as_str()))
        {
            return RouteDecision::Bypass;
        }

        if self.protected_routes.iter().any(|r| matches_route(path, r)) {
            return RouteDecision::Protected;
        }

        // 前缀匹配：/login、/login/...、/signup?x 均视为认证页
        if self
            .auth_routes
            .iter()
            .any(|r| !r.is_empty() && path.starts_with(r.as_str()))
        {
            return RouteDecision::AuthEntry;
        }

        match path.trim_start_matches('/') {
            "" => RouteDecision::Page,
            code => RouteDecision::Candidate(code.to_string()),
        }
    }

    /// `/login?callbackUrl=<编码后的原路径>`
    pub fn login_redirect(&self, original_path: &str) -> String {
        format!(
            "{}?{}={}",
            self.login_path,
            CALLBACK_PARAM,
            urlencoding::encode(original_path)
        )
    }
}

/// Cookie 中是否有可用的访问令牌
pub fn has_valid_session(cookie_value: Option<&str>) -> bool {
    cookie_value
        .and_then(decode_cookie_value)
        .is_some_and(|pair| pair.has_access_token())
}
