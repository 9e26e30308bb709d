use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use lodge_core::Actor;
use lodge_shared::{NewSuggestion, Suggestion, SuggestionPatch};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use crate::check_content_length;

#[derive(Debug, Deserialize)]
pub struct ListSuggestionsQuery {
    pub property_id: Option<Uuid>,
}

/// GET /v1/suggestions?property_id=
pub async fn list_suggestions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListSuggestionsQuery>,
) -> Result<Json<Vec<Suggestion>>, AppError> {
    Ok(Json(state.suggestions.list(&actor, query.property_id).await?))
}

/// POST /v1/suggestions
/// Requires a completed stay at the property
pub async fn create_suggestion(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    AppJson(req): AppJson<NewSuggestion>,
) -> Result<(StatusCode, Json<Suggestion>), AppError> {
    check_content_length(&req.content)?;
    let suggestion = state.suggestions.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(suggestion)))
}

/// GET /v1/suggestions/{id}
pub async fn get_suggestion(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(suggestion_id): Path<Uuid>,
) -> Result<Json<Suggestion>, AppError> {
    Ok(Json(state.suggestions.read(suggestion_id, &actor).await?))
}

/// PATCH /v1/suggestions/{id}
pub async fn update_suggestion(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(suggestion_id): Path<Uuid>,
    AppJson(patch): AppJson<SuggestionPatch>,
) -> Result<Json<Suggestion>, AppError> {
    if let Some(content) = &patch.content {
        check_content_length(content)?;
    }
    Ok(Json(state.suggestions.update(suggestion_id, patch, &actor).await?))
}

/// DELETE /v1/suggestions/{id}
pub async fn delete_suggestion(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(suggestion_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.suggestions.delete(suggestion_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
