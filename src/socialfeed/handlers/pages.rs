//! One landing route per gate, handy for checking a credential by hand.

use axum::extract::Extension;

use crate::socialfeed::auth::{AdminPrincipal, Claims, SessionUser};

#[utoipa::path(
    get,
    path = "/api/v1/restricted/main",
    responses(
        (status = 200, description = "Bearer token accepted", body = String),
        (status = 400, description = "Malformed Authorization header"),
        (status = 401, description = "Missing, invalid or expired token"),
    ),
    security(("bearer" = [])),
    tag = "pages"
)]
pub async fn restricted_main(Extension(claims): Extension<Claims>) -> String {
    format!("Welcome {}!", claims.username)
}

#[utoipa::path(
    get,
    path = "/api/v1/cookie/main",
    responses(
        (status = 200, description = "Session cookie accepted", body = String),
        (status = 401, description = "Missing or unknown session cookie"),
    ),
    tag = "pages"
)]
pub async fn cookie_main(Extension(user): Extension<SessionUser>) -> String {
    format!("Welcome user {}", user.user_id)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/main",
    responses(
        (status = 200, description = "Admin credentials accepted", body = String),
        (status = 401, description = "Bad admin credentials"),
    ),
    security(("basic" = [])),
    tag = "pages"
)]
pub async fn admin_main(Extension(_admin): Extension<AdminPrincipal>) -> &'static str {
    "Welcome to the admin page"
}
