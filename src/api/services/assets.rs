use actix_web::{HttpRequest, HttpResponse, Result};
use rust_embed::Embed;
use tracing::{debug, trace};

// 使用 RustEmbed 嵌入站点静态文件
#[derive(Embed)]
#[folder = "static/"]
struct SiteAssets;

pub struct AssetService;

impl AssetService {
    /// 处理 `/static/{path}` 静态资源
    pub async fn handle_static(req: HttpRequest) -> Result<HttpResponse> {
        let path = req.match_info().query("path");
        trace!("Serving static file: {}", path);

        match SiteAssets::get(path) {
            Some(content) => Ok(HttpResponse::Ok()
                .content_type(Self::get_content_type(path))
                .body(content.data.into_owned())),
            None => {
                debug!("Static file not found: {}", path);
                Ok(HttpResponse::NotFound().body("File not found"))
            }
        }
    }

    /// 没有图标时返回空内容
    pub async fn handle_favicon() -> Result<HttpResponse> {
        let body = SiteAssets::get("favicon.ico")
            .map(|f| f.data.into_owned())
            .unwrap_or_default();
        Ok(HttpResponse::Ok().content_type("image/x-icon").body(body))
    }

    /// 根据文件扩展名确定 Content-Type
    fn get_content_type(path: &str) -> &'static str {
        match path.rsplit('.').next() {
            Some("css") => "text/css; charset=utf-8",
            Some("js") => "application/javascript",
            Some("svg") => "image/svg+xml",
            Some("png") => "image/png",
            Some("ico") => "image/x-icon",
            Some("txt") => "text/plain; charset=utf-8",
            _ => "application/octet-stream",
        }
    }
}
