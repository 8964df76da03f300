use actix_web::{HttpResponse, Result, web};
use chrono::{DateTime, Utc};

use super::pages::{SiteContext, escape_html};

/// (path, changefreq, priority)
const ENTRIES: [(&str, &str, &str); 4] = [
    ("", "weekly", "1.0"),
    ("/pricing", "monthly", "0.9"),
    ("/login", "monthly", "0.4"),
    ("/signup", "monthly", "0.4"),
];

pub fn render_sitemap(base_url: &str, now: DateTime<Utc>) -> String {
    let base = base_url.trim_end_matches('/');
    let lastmod = now.format("%Y-%m-%d");
    let urls: String = ENTRIES
        .iter()
        .map(|(path, freq, priority)| {
            format!(
                "  <url><loc>{}{}</loc><lastmod>{}</lastmod><changefreq>{}</changefreq><priority>{}</priority></url>\n",
                escape_html(base),
                path,
                lastmod,
                freq,
                priority
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
        urls
    )
}

pub async fn handle_sitemap(ctx: web::Data<SiteContext>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .body(render_sitemap(&ctx.site.base_url, Utc::now())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_entries() {
        let xml = render_sitemap("https://capp.to/", Utc::now());
        assert!(xml.contains("<loc>https://capp.to</loc>"));
        assert!(xml.contains("<loc>https://capp.to/pricing</loc><lastmod>"));
        assert!(xml.contains("<priority>0.9</priority>"));
        assert_eq!(xml.matches("<url>").count(), 4);
    }
}
