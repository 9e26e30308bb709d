use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lodge_core::repository::{CommentRepository, SuggestionQuery, SuggestionRepository};
use lodge_core::StoreResult;
use lodge_shared::{Comment, Suggestion};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::{db_error, ensure_affected};

/// Comments and suggestions share a table shape and a repository.
pub struct PgFeedbackRepository {
    pool: PgPool,
}

impl PgFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    author_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            author_id: row.author_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SuggestionRow {
    id: Uuid,
    author_id: Uuid,
    property_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SuggestionRow> for Suggestion {
    fn from(row: SuggestionRow) -> Self {
        Suggestion {
            id: row.id,
            author_id: row.author_id,
            property_id: row.property_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CommentRepository for PgFeedbackRepository {
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO comments (id, author_id, content, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(comment.id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT id, author_id, content, created_at, updated_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(Comment::from))
    }

    async fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        let result = sqlx::query("UPDATE comments SET content = $2, updated_at = $3 WHERE id = $1")
            .bind(comment.id)
            .bind(&comment.content)
            .bind(comment.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        ensure_affected(result.rows_affected(), "comment", comment.id)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        ensure_affected(result.rows_affected(), "comment", id)
    }

    async fn list_comments(&self, author_id: Option<Uuid>) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, author_id, content, created_at, updated_at FROM comments
            WHERE ($1::uuid IS NULL OR author_id = $1)
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }
}

#[async_trait]
impl SuggestionRepository for PgFeedbackRepository {
    async fn insert_suggestion(&self, suggestion: &Suggestion) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO suggestions (id, author_id, property_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(suggestion.id)
        .bind(suggestion.author_id)
        .bind(suggestion.property_id)
        .bind(&suggestion.content)
        .bind(suggestion.created_at)
        .bind(suggestion.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_suggestion(&self, id: Uuid) -> StoreResult<Option<Suggestion>> {
        let row = sqlx::query_as::<_, SuggestionRow>(
            "SELECT id, author_id, property_id, content, created_at, updated_at FROM suggestions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(Suggestion::from))
    }

    async fn update_suggestion(&self, suggestion: &Suggestion) -> StoreResult<()> {
        let result = sqlx::query("UPDATE suggestions SET content = $2, updated_at = $3 WHERE id = $1")
            .bind(suggestion.id)
            .bind(&suggestion.content)
            .bind(suggestion.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        ensure_affected(result.rows_affected(), "suggestion", suggestion.id)
    }

    async fn delete_suggestion(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM suggestions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        ensure_affected(result.rows_affected(), "suggestion", id)
    }

    async fn list_suggestions(&self, query: &SuggestionQuery) -> StoreResult<Vec<Suggestion>> {
        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT id, author_id, property_id, content, created_at, updated_at FROM suggestions WHERE TRUE",
        );
        if let Some(author_id) = query.author_id {
            select.push(" AND author_id = ").push_bind(author_id);
        }
        if let Some(property_id) = query.property_id {
            select.push(" AND property_id = ").push_bind(property_id);
        }
        select.push(" ORDER BY created_at DESC, id");

        let rows = select
            .build_query_as::<SuggestionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Suggestion::from).collect())
    }
}
