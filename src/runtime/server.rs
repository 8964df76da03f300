//! Server mode
//!
//! Starts the edge front server: every request passes the edge guard
//! before a site page is produced.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::middleware::EdgeGuard;
use crate::api::probe::{BackendProbe, ShortCodeProbe};
use crate::api::services::{SiteContext, site_routes};
use crate::api::guard::RoutePolicy;
use crate::config::StaticConfig;

pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let policy = Arc::new(RoutePolicy::new(&config.guard, &config.auth));
    let probe: Arc<dyn ShortCodeProbe> = Arc::new(BackendProbe::from_config(&config.guard)?);
    let context = web::Data::new(SiteContext {
        site: config.site.clone(),
        auth: config.auth.clone(),
    });
    let cookie_name = config.auth.cookie_name.clone();

    if !config.site.is_production() {
        info!("Running in {} mode", config.site.environment);
    }

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(EdgeGuard::new(policy.clone(), probe.clone(), cookie_name.clone()))
            .app_data(context.clone())
            .configure(site_routes)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(config.server.cpu_count.max(1));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    server.bind(bind_address)?.run().await?;
    info!("Server stopped");
    Ok(())
}
