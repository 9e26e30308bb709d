use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod bookings;
pub mod comments;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod properties;
pub mod state;
pub mod suggestions;

pub use error::AppError;
pub use state::{AppState, AuthConfig};

/// Longest accepted comment or suggestion, in characters.
pub const MAX_CONTENT_LENGTH: usize = 1000;

pub(crate) fn check_content_length(content: &str) -> Result<(), AppError> {
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(AppError::ValidationError(format!(
            "content must be at most {} characters",
            MAX_CONTENT_LENGTH
        )));
    }
    Ok(())
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Catalog reads need no credentials
    let public = Router::new()
        .route("/health", get(health))
        .route("/v1/properties", get(properties::list_properties))
        .route("/v1/properties/{id}", get(properties::get_property));

    let protected = Router::new()
        .route("/v1/properties", post(properties::create_property))
        .route(
            "/v1/properties/{id}",
            axum::routing::patch(properties::update_property).delete(properties::delete_property),
        )
        .route("/v1/properties/{id}/pending-bookings", get(properties::pending_bookings))
        .route("/v1/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route(
            "/v1/bookings/{id}",
            get(bookings::get_booking)
                .patch(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route("/v1/bookings/{id}/approve", post(bookings::approve_booking))
        .route("/v1/bookings/{id}/reject", post(bookings::reject_booking))
        .route("/v1/bookings/{id}/complete", post(bookings::complete_booking))
        .route("/v1/comments", get(comments::list_comments).post(comments::create_comment))
        .route(
            "/v1/comments/{id}",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/v1/suggestions",
            get(suggestions::list_suggestions).post(suggestions::create_suggestion),
        )
        .route(
            "/v1/suggestions/{id}",
            get(suggestions::get_suggestion)
                .patch(suggestions::update_suggestion)
                .delete(suggestions::delete_suggestion),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_actor,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
