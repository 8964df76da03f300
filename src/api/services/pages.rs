//! 站点页面
//!
//! 营销页、认证页和仪表盘外壳。页面只做服务端渲染，
//! 仪表盘数据由客户端通过 API 获取。

use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde::Deserialize;
use tracing::trace;

use crate::auth::session::{CALLBACK_PARAM, sanitize_target};
use crate::auth::token_store::decode_cookie_value;
use crate::config::{AuthConfig, SiteConfig};
use crate::services::pricing::{format_price, pricing_for_country};

/// 页面渲染所需的配置
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub site: SiteConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
pub struct PricingQuery {
    pub country: Option<String>,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Linkdash</title>
<link rel="stylesheet" href="/static/site.css">
</head>
<body>
<header><nav><a href="/">Linkdash</a><a href="/pricing">Pricing</a><a href="/dashboard">Dashboard</a><a href="/login">Log in</a></nav></header>
<main>
{body}
</main>
<footer>Linkdash v{version}</footer>
</body>
</html>"#,
        title = escape_html(title),
        body = body,
        version = env!("CARGO_PKG_VERSION"),
    )
}

fn html(status: actix_web::http::StatusCode, title: &str, body: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(layout(title, body))
}

fn ok_page(title: &str, body: &str) -> HttpResponse {
    html(actix_web::http::StatusCode::OK, title, body)
}

pub struct PageService;

impl PageService {
    pub async fn handle_index() -> Result<HttpResponse> {
        trace!("Serving index page");
        Ok(ok_page(
            "Shorten your links",
            r#"<h1>Short links, real insight</h1>
<p>Create short links, share them anywhere and see who clicks.</p>
<p><a class="button" href="/signup">Get started</a> <a href="/pricing">See pricing</a></p>"#,
        ))
    }

    pub async fn handle_pricing(query: web::Query<PricingQuery>) -> Result<HttpResponse> {
        let pricing = pricing_for_country(query.country.as_deref());
        let plans: String = pricing
            .plans
            .iter()
            .map(|plan| {
                let features: String = plan
                    .features
                    .iter()
                    .map(|f| format!("<li>{}</li>", escape_html(f)))
                    .collect();
                format!(
                    r#"<section class="plan{popular}"><h2>{name}</h2><p>{description}</p>
<p class="price">{monthly}<small>/month</small></p><p>or {lifetime} lifetime</p>
<ul>{features}</ul><a class="button" href="/signup">{cta}</a></section>"#,
                    popular = if plan.popular { " popular" } else { "" },
                    name = escape_html(plan.name),
                    description = escape_html(plan.description),
                    monthly = format_price(plan.monthly_price.in_currency(pricing.currency), pricing.currency),
                    lifetime = format_price(plan.lifetime_price.in_currency(pricing.currency), pricing.currency),
                    features = features,
                    cta = escape_html(plan.cta),
                )
            })
            .collect();

        Ok(ok_page(
            "Pricing",
            &format!(
                r#"<h1>Pricing</h1><p>Prices in {currency}</p><div class="plans">{plans}</div>"#,
                currency = pricing.currency.as_ref(),
                plans = plans,
            ),
        ))
    }

    pub async fn handle_login(req: HttpRequest) -> Result<HttpResponse> {
        let callback = web::Query::<std::collections::HashMap<String, String>>::from_query(
            req.query_string(),
        )
        .ok()
        .and_then(|q| q.get(CALLBACK_PARAM).cloned())
        .filter(|target| sanitize_target(target).is_some());

        let hidden = callback
            .map(|target| {
                format!(
                    r#"<input type="hidden" name="{}" value="{}">"#,
                    CALLBACK_PARAM,
                    escape_html(&target)
                )
            })
            .unwrap_or_default();

        Ok(ok_page(
            "Log in",
            &format!(
                r#"<h1>Log in</h1>
<form class="auth" method="post" action="/login">{hidden}
<input type="email" name="email" placeholder="Email" required>
<input type="password" name="password" placeholder="Password" minlength="6" required>
<button class="button" type="submit">Log in</button></form>
<p>No account? <a href="/signup">Sign up</a></p>"#
            ),
        ))
    }

    pub async fn handle_signup() -> Result<HttpResponse> {
        Ok(ok_page(
            "Sign up",
            r#"<h1>Create an account</h1>
<form class="auth" method="post" action="/signup">
<input type="text" name="name" placeholder="Name">
<input type="email" name="email" placeholder="Email" required>
<input type="password" name="password" placeholder="Password" minlength="8" required>
<input type="password" name="confirmPassword" placeholder="Confirm password" minlength="8" required>
<button class="button" type="submit">Sign up</button></form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
        ))
    }

    /// 从会话 Cookie 中读出用户邮箱（仅用于展示）
    fn session_email(req: &HttpRequest, ctx: &SiteContext) -> Option<String> {
        req.cookie(&ctx.auth.cookie_name)
            .and_then(|c| decode_cookie_value(c.value()))
            .and_then(|pair| pair.user)
            .map(|user| user.email)
    }

    pub async fn handle_dashboard(req: HttpRequest, ctx: web::Data<SiteContext>) -> Result<HttpResponse> {
        let who = Self::session_email(&req, &ctx)
            .map(|email| format!("<p>Signed in as {}</p>", escape_html(&email)))
            .unwrap_or_default();
        Ok(ok_page(
            "Dashboard",
            &format!(
                r#"<h1>Your links</h1>{who}<div id="links" data-page-path="{path}"></div>"#,
                who = who,
                path = escape_html(req.path()),
            ),
        ))
    }

    pub async fn handle_settings(req: HttpRequest, ctx: web::Data<SiteContext>) -> Result<HttpResponse> {
        let who = Self::session_email(&req, &ctx).unwrap_or_default();
        Ok(ok_page(
            "Settings",
            &format!(
                r#"<h1>Settings</h1><p>{}</p><form method="post" action="/logout"><button class="button">Log out</button></form>"#,
                escape_html(&who)
            ),
        ))
    }

    pub async fn handle_not_found(req: HttpRequest) -> Result<HttpResponse> {
        trace!("No page for {}", req.path());
        Ok(html(
            actix_web::http::StatusCode::NOT_FOUND,
            "Not found",
            r#"<h1>Page not found</h1><p><a href="/">Back home</a></p>"#,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }
}
