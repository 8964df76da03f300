use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::LOCATION,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::api::guard::{RouteDecision, RoutePolicy, has_valid_session};
use crate::api::probe::ShortCodeProbe;

/// 边缘路由守卫中间件
///
/// 每个导航请求在页面渲染前执行一次：
/// 受保护路由校验会话 Cookie，其余路径探测短码，探测失败时照常渲染。
#[derive(Clone)]
pub struct EdgeGuard {
    policy: Arc<RoutePolicy>,
    probe: Arc<dyn ShortCodeProbe>,
    cookie_name: String,
}

impl EdgeGuard {
    pub fn new(
        policy: Arc<RoutePolicy>,
        probe: Arc<dyn ShortCodeProbe>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            probe,
            cookie_name: cookie_name.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for EdgeGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = EdgeGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(EdgeGuardMiddleware {
            service: Rc::new(service),
            policy: self.policy.clone(),
            probe: self.probe.clone(),
            cookie_name: self.cookie_name.clone(),
        }))
    }
}

pub struct EdgeGuardMiddleware<S> {
    service: Rc<S>,
    policy: Arc<RoutePolicy>,
    probe: Arc<dyn ShortCodeProbe>,
    cookie_name: String,
}

impl<S, B> EdgeGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn redirect(req: ServiceRequest, location: String) -> ServiceResponse<EitherBody<B>> {
        req.into_response(
            HttpResponse::TemporaryRedirect()
                .insert_header((LOCATION, location))
                .finish()
                .map_into_right_body(),
        )
    }
}

impl<S, B> Service<ServiceRequest> for EdgeGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let policy = self.policy.clone();
        let probe = self.probe.clone();
        let cookie_name = self.cookie_name.clone();

        Box::pin(async move {
            let path = req.path().to_string();

            match policy.classify(&path) {
                RouteDecision::Bypass | RouteDecision::AuthEntry | RouteDecision::Page => {
                    trace!("Edge guard pass-through: {}", path);
                }
                RouteDecision::Protected => {
                    let cookie = req.cookie(&cookie_name);
                    if !has_valid_session(cookie.as_ref().map(|c| c.value())) {
                        debug!("No valid session for {}, redirecting to login", path);
                        let location = policy.login_redirect(&path);
                        return Ok(Self::redirect(req, location));
                    }
                }
                RouteDecision::Candidate(code) => match probe.resolve(&code).await {
                    Ok(Some(location)) => {
                        debug!("Short code {} resolved to {}", code, location);
                        return Ok(Self::redirect(req, location));
                    }
                    Ok(None) => trace!("{} is not a short code", code),
                    Err(e) => warn!("Short code probe for {} failed: {}", code, e),
                },
            }

            srv.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
