//! Server construction and middleware wiring.

mod app_config;

pub use app_config::{AppConfig, AppConfigError, Environment};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::{web, App, HttpResponse, HttpServer};
use mockable::DefaultClock;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{RateLimitRule, RateLimiter};
use crate::domain::{Error, UsersService};
use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::health::health;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{
    create_user, delete_user, get_user, list_users, search_users, update_user,
};
use crate::middleware::{RateLimit, Trace};
use crate::outbound::persistence::{DbPool, DieselUserRepository};
use crate::outbound::ratelimit::FixedWindowLimiter;

/// Budget for user creation per client address.
const CREATE_USER_RULE: RateLimitRule = RateLimitRule::per_minute("create_user", 10);
/// Budget for user updates per client address.
const UPDATE_USER_RULE: RateLimitRule = RateLimitRule::per_minute("update_user", 20);
/// Budget for user deletion per client address.
const DELETE_USER_RULE: RateLimitRule = RateLimitRule::per_minute("delete_user", 10);

/// Shared collaborators injected into every worker's application instance.
#[derive(Clone)]
pub struct AppDependencies {
    http_state: web::Data<HttpState>,
    limiter: Arc<dyn RateLimiter>,
}

impl AppDependencies {
    /// Bundle the domain service and rate limiter for application assembly.
    #[must_use]
    pub fn new(users: UsersService, limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            http_state: web::Data::new(HttpState::new(users)),
            limiter,
        }
    }
}

async fn method_not_allowed() -> Result<HttpResponse, Error> {
    Err(Error::method_not_allowed("Method not allowed"))
}

async fn route_not_found() -> Result<HttpResponse, Error> {
    Err(Error::not_found("Resource not found"))
}

/// Assemble the actix application: routes, extractor configs, tracing, and
/// per-operation rate limits.
///
/// `/api/users/search` registers before `/api/users/{id}` so `search` never
/// parses as an id. Each resource answers unmatched methods with 405; the
/// application-level fallback answers unknown paths with 404.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        limiter,
    } = deps;

    let api = web::scope("/api")
        .service(
            web::resource("/users")
                .route(web::post().to(create_user))
                .route(web::get().to(list_users))
                .default_service(web::to(method_not_allowed))
                .wrap(RateLimit::new(
                    Method::POST,
                    CREATE_USER_RULE,
                    Arc::clone(&limiter),
                )),
        )
        .service(
            web::resource("/users/search")
                .route(web::get().to(search_users))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/users/{id}")
                .route(web::get().to(get_user))
                .route(web::put().to(update_user))
                .route(web::delete().to(delete_user))
                .default_service(web::to(method_not_allowed))
                .wrap(RateLimit::new(
                    Method::PUT,
                    UPDATE_USER_RULE,
                    Arc::clone(&limiter),
                ))
                .wrap(RateLimit::new(
                    Method::DELETE,
                    DELETE_USER_RULE,
                    Arc::clone(&limiter),
                )),
        );

    let app = App::new()
        .app_data(http_state)
        .app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .wrap(Trace)
        .service(
            web::resource("/health")
                .route(web::get().to(health))
                .default_service(web::to(method_not_allowed)),
        )
        .service(api)
        .default_service(web::to(route_not_found));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server bound to the configured address.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: &AppConfig, pool: DbPool) -> std::io::Result<Server> {
    let repository = Arc::new(DieselUserRepository::new(pool));
    let limiter: Arc<dyn RateLimiter> = Arc::new(FixedWindowLimiter::new(Arc::new(DefaultClock)));
    let deps = AppDependencies::new(UsersService::new(repository), limiter);

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr())?
        .run();
    Ok(server)
}
