//! HTTP service: routing, middleware stack and server start.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod migrations;
pub mod models;
pub mod store;


use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE, SERVER},
    },
    middleware,
    routing::{get, post, put},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::{SetRequestHeaderLayer, SetResponseHeaderLayer},
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use url::Url;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use self::{
    auth::{AuthConfig, AuthState, require_admin, require_bearer, require_session_cookie},
    handlers::{admin, comments, health, login, pages, posts, root, users},
    migrations::MigrationCatalog,
    store::{PgStore, Store},
};
use crate::APP_USER_AGENT;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        users::create_user,
        users::update_user,
        users::update_password,
        login::login,
        login::logout,
        posts::list_posts,
        posts::get_post,
        posts::create_post,
        comments::list_comments,
        comments::create_comment,
        pages::restricted_main,
        pages::cookie_main,
        pages::admin_main,
        admin::list_users,
        admin::get_user,
        admin::list_migrations,
        admin::run_migration,
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "users", description = "Registration and profile updates"),
        (name = "auth", description = "Login and logout"),
        (name = "posts", description = "Feed posts"),
        (name = "comments", description = "Comments on posts"),
        (name = "admin", description = "Admin-only user and migration management"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

/// Assemble the full application router.
///
/// Each gate is mounted with `route_layer` on its own group, so an unknown
/// path under a gated prefix is still a plain 404.
pub fn router(
    store: Arc<dyn Store>,
    auth: Arc<AuthState>,
    catalog: Arc<MigrationCatalog>,
    cors_origin: HeaderValue,
) -> Router {
    let restricted = Router::new()
        .route("/main", get(pages::restricted_main))
        .route("/users/:uid", put(users::update_user))
        .route(
            "/users-update-password/:uid",
            put(users::update_password),
        )
        .route("/posts", post(posts::create_post))
        .route("/comments", post(comments::create_comment))
        .route_layer(middleware::from_fn(require_bearer));

    let cookie = Router::new()
        .route("/main", get(pages::cookie_main))
        .route_layer(middleware::from_fn(require_session_cookie));

    let admin = Router::new()
        .route("/main", get(pages::admin_main))
        .route("/users", get(admin::list_users))
        .route("/users/:uid", get(admin::get_user))
        .route("/get-migrations", get(admin::list_migrations))
        .route("/run-migrations", post(admin::run_migration))
        .route_layer(middleware::from_fn(require_admin));

    let api = Router::new()
        .route("/users", post(users::create_user))
        .route("/login", post(login::login))
        .route("/logout", post(login::logout))
        .route("/posts", get(posts::list_posts))
        .route("/posts/:pid", get(posts::get_post))
        .route("/comments/:pid", get(comments::list_comments))
        .nest("/restricted", restricted)
        .nest("/cookie", cookie)
        .nest("/admin", admin);

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_origin(AllowOrigin::exact(cors_origin))
        .allow_credentials(true);

    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(SetResponseHeaderLayer::overriding(
                    SERVER,
                    HeaderValue::from_static(APP_USER_AGENT),
                ))
                .layer(cors)
                .layer(Extension(store))
                .layer(Extension(auth))
                .layer(Extension(catalog)),
        )
}

/// Start the server
/// # Errors
/// Return error if the database is unreachable, the auth config is unusable
/// or the listener cannot bind
pub async fn new(
    port: u16,
    dsn: String,
    auth_config: AuthConfig,
    cors_origin: &str,
    migrations_dir: PathBuf,
) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let auth_state = Arc::new(AuthState::new(auth_config).context("Invalid auth configuration")?);
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let catalog = Arc::new(MigrationCatalog::new(migrations_dir));
    let cors_origin = frontend_origin(cors_origin)?;

    let app = router(store, auth_state, catalog, cors_origin);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Reduce a configured URL to the `scheme://host[:port]` form CORS expects.
pub(crate) fn frontend_origin(url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid CORS origin: {url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("CORS origin must include a valid host: {url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build CORS origin header")
}
