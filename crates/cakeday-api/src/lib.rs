pub mod auth;
pub mod birthdays;
pub mod congratulations;
pub mod countdown;
pub mod error;
pub mod forms;
pub mod images;
pub mod middleware;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use auth::AppState;
use middleware::require_auth;

/// Assemble the API router: public reads and auth endpoints, plus the
/// mutating routes behind the bearer-token middleware.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/birthdays", get(birthdays::list_birthdays))
        .route("/birthdays/{id}", get(birthdays::get_birthday))
        .route("/birthdays/{id}/image", get(images::serve_image))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/birthdays", post(birthdays::create_birthday))
        .route("/birthdays/{id}", put(birthdays::update_birthday))
        .route("/birthdays/{id}", delete(birthdays::delete_birthday))
        .route(
            "/birthdays/{id}/congratulations",
            post(congratulations::add_congratulation),
        )
        .route(
            "/birthdays/{id}/image",
            post(images::upload_image)
                // 16 MB transport limit; upload_image enforces MAX_IMAGE_SIZE
                .layer(DefaultBodyLimit::max(16 * 1024 * 1024)),
        )
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
