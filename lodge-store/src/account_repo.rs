use async_trait::async_trait;
use lodge_core::repository::AccountRepository;
use lodge_core::{Actor, Role, StoreError, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::db_error;

pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    role: String,
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Actor>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT id, role FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(|row| {
            let role: Role = row.role.parse().map_err(StoreError::Backend)?;
            Ok(Actor::new(row.id, role))
        })
        .transpose()
    }
}
