use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use lodge_core::Actor;
use lodge_shared::{Comment, CommentPatch, NewComment};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use crate::check_content_length;

/// GET /v1/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(state.comments.list(&actor).await?))
}

/// POST /v1/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    AppJson(req): AppJson<NewComment>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    check_content_length(&req.content)?;
    let comment = state.comments.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /v1/comments/{id}
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(state.comments.read(comment_id, &actor).await?))
}

/// PATCH /v1/comments/{id}
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(comment_id): Path<Uuid>,
    AppJson(patch): AppJson<CommentPatch>,
) -> Result<Json<Comment>, AppError> {
    if let Some(content) = &patch.content {
        check_content_length(content)?;
    }
    Ok(Json(state.comments.update(comment_id, patch, &actor).await?))
}

/// DELETE /v1/comments/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.comments.delete(comment_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
