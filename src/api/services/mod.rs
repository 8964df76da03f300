pub mod assets;
pub mod pages;
pub mod sitemap;

use actix_web::web;

pub use assets::AssetService;
pub use pages::{PageService, SiteContext};

/// 注册全部站点路由
pub fn site_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(PageService::handle_index))
        .route("/pricing", web::get().to(PageService::handle_pricing))
        .route("/login", web::get().to(PageService::handle_login))
        .route("/signup", web::get().to(PageService::handle_signup))
        .route("/dashboard", web::get().to(PageService::handle_dashboard))
        .route("/dashboard/{tail:.*}", web::get().to(PageService::handle_dashboard))
        .route("/settings", web::get().to(PageService::handle_settings))
        .route("/sitemap.xml", web::get().to(sitemap::handle_sitemap))
        .route("/favicon.ico", web::get().to(AssetService::handle_favicon))
        .route("/static/{path:.*}", web::get().to(AssetService::handle_static))
        .default_service(web::to(PageService::handle_not_found));
}
