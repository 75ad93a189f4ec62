//! Per-operation request rate limiting middleware.
//!
//! [`RateLimit`] wraps a resource with a [`RateLimitRule`] scoped to a single
//! HTTP method, so a resource serving several methods can budget each write
//! operation independently. Requests with other methods pass through
//! untouched. Clients are keyed by peer IP address; requests without a peer
//! address (only possible with in-process test clients) share an `unknown`
//! bucket.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::ResponseError;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::debug;

use crate::domain::ports::{RateLimitRule, RateLimiter};
use crate::domain::Error;

/// Middleware enforcing a [`RateLimitRule`] for one HTTP method.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use actix_web::http::Method;
/// use actix_web::web;
/// use backend::domain::ports::RateLimitRule;
/// use backend::middleware::RateLimit;
/// use backend::outbound::ratelimit::FixedWindowLimiter;
///
/// const CREATE_RULE: RateLimitRule = RateLimitRule::per_minute("create_user", 10);
///
/// let limiter = Arc::new(FixedWindowLimiter::new(Arc::new(mockable::DefaultClock)));
/// let resource = web::resource("/users")
///     .wrap(RateLimit::new(Method::POST, CREATE_RULE, limiter));
/// ```
#[derive(Clone)]
pub struct RateLimit {
    method: Method,
    rule: RateLimitRule,
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimit {
    /// Limit requests with `method` according to `rule`.
    #[must_use]
    pub fn new(method: Method, rule: RateLimitRule, limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            method,
            rule,
            limiter,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            method: self.method.clone(),
            rule: self.rule,
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
///
/// Applications should not use this type directly.
pub struct RateLimitMiddleware<S> {
    service: S,
    method: Method,
    rule: RateLimitRule,
    limiter: Arc<dyn RateLimiter>,
}

fn client_key(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map_or_else(|| String::from("unknown"), |addr| addr.ip().to_string())
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() == self.method {
            let key = client_key(&req);
            if !self.limiter.try_acquire(&self.rule, &key) {
                debug!(
                    rule = self.rule.name(),
                    client = %key,
                    "rate limit exceeded"
                );
                let (req, _payload) = req.into_parts();
                let response = Error::rate_limit_exceeded("Rate limit exceeded. Try again later.")
                    .error_response()
                    .map_into_right_body();
                return Box::pin(ready(Ok(ServiceResponse::new(req, response))));
            }
        }
        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}
