//! Main [axum::Router] interface for webserver.

use crate::{
    app_state::AppState,
    docs,
    routes::{fallback::notfound_404, health, password, ping, user, verification},
    setups::ServerSetup,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Setup main router for application.
pub fn setup_app_router<S: ServerSetup>(app_state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
            http::header::ACCEPT,
        ])
        .allow_origin(Any);

    Router::new()
        .route("/user/enrollment", post(user::post_enrollment::<S>))
        .route("/user", get(user::list_users::<S>))
        .route(
            "/user/:id",
            get(user::get_user::<S>)
                .patch(user::patch_user::<S>)
                .delete(user::delete_user::<S>),
        )
        .route(
            "/user/verification",
            put(verification::put_verification::<S>),
        )
        .route(
            "/user/password",
            post(password::post_password_reset::<S>).put(password::put_password::<S>),
        )
        .route("/ping", get(ping::get))
        .route("/healthcheck", get(health::healthcheck::<S>))
        .route("/api-doc/openapi.json", get(docs::openapi))
        .layer(cors)
        .fallback(notfound_404)
        .with_state(app_state)
}
