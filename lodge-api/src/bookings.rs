use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use lodge_core::Actor;
use lodge_shared::{Booking, BookingPatch, NewBooking};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

/// GET /v1/bookings
/// Own bookings for guests, bookings on owned properties for suppliers, everything for admins
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list(&actor).await?))
}

/// POST /v1/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    AppJson(req): AppJson<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state.bookings.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.read(booking_id, &actor).await?))
}

/// PATCH /v1/bookings/{id}
pub async fn update_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
    AppJson(patch): AppJson<BookingPatch>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.update(booking_id, patch, &actor).await?))
}

/// DELETE /v1/bookings/{id}
pub async fn delete_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.bookings.delete(booking_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/bookings/{id}/approve
pub async fn approve_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.approve(booking_id, &actor).await?))
}

/// POST /v1/bookings/{id}/reject
pub async fn reject_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.reject(booking_id, &actor).await?))
}

/// POST /v1/bookings/{id}/complete
/// Marks the stay as finished (admin only)
pub async fn complete_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.complete(booking_id, &actor).await?))
}
