use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    change_password, decode, delete_account, handler_404, health, login, logout, logout_all,
    register, token, update_profile,
};
use super::state::AppState;

/// Build the CORS layer from the configured origin allow-list.
fn build_cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if allowed_origins.is_empty() {
        tracing::warn!(
            "TV_ALLOWED_ORIGINS not configured, cross-origin requests will be refused. \
             Set TV_ALLOWED_ORIGINS to the browser origins that may call the API."
        );
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .into_iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

/// Build the router with routes and middleware wired.
pub fn app_router(state: AppState, allowed_origins: Vec<String>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token", post(token))
        .route("/decode", post(decode))
        .route("/logout", delete(logout))
        .route("/logoutAll", delete(logout_all))
        .route("/update", put(update_profile))
        .route("/changePassword", put(change_password))
        .route("/delete", delete(delete_account))
        .fallback(handler_404)
        .layer(build_cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
