use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use lodge_core::Actor;
use lodge_shared::{Booking, NewProperty, Page, PropertyFilter, PropertyPatch, PropertyView};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

/// GET /v1/properties
pub async fn list_properties(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
) -> Result<Json<Page<PropertyView>>, AppError> {
    Ok(Json(state.properties.list(&filter).await?))
}

/// GET /v1/properties/{id}
pub async fn get_property(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<PropertyView>, AppError> {
    Ok(Json(state.properties.read(property_id).await?))
}

/// POST /v1/properties
pub async fn create_property(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    AppJson(req): AppJson<NewProperty>,
) -> Result<(StatusCode, Json<PropertyView>), AppError> {
    let view = state.properties.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PATCH /v1/properties/{id}
pub async fn update_property(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(property_id): Path<Uuid>,
    AppJson(patch): AppJson<PropertyPatch>,
) -> Result<Json<PropertyView>, AppError> {
    Ok(Json(state.properties.update(property_id, patch, &actor).await?))
}

/// DELETE /v1/properties/{id}
pub async fn delete_property(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(property_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.properties.delete(property_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/properties/{id}/pending-bookings
/// Booking requests awaiting the supplier's decision
pub async fn pending_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.pending_for_property(property_id, &actor).await?))
}
