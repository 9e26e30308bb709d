use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use lodge_core::repository::{BookingQuery, BookingRepository};
use lodge_core::{StoreError, StoreResult};
use lodge_shared::{Booking, BookingStatus};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::{db_error, ensure_affected};

const BOOKING_COLUMNS: &str =
    "SELECT id, guest_id, property_id, check_in, check_out, status, created_at, updated_at FROM bookings";

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    guest_id: Uuid,
    property_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e: lodge_shared::ParseStatusError| StoreError::Backend(e.to_string()))?;

        Ok(Booking {
            id: row.id,
            guest_id: row.guest_id,
            property_id: row.property_id,
            check_in: row.check_in,
            check_out: row.check_out,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, guest_id, property_id, check_in, check_out, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking.id)
        .bind(booking.guest_id)
        .bind(booking.property_id)
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("{} WHERE id = $1", BOOKING_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Booking::try_from).transpose()
    }

    async fn update_booking(&self, booking: &Booking) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET check_in = $2, check_out = $3, status = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(booking.id)
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.status.as_str())
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        ensure_affected(result.rows_affected(), "booking", booking.id)
    }

    async fn delete_booking(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        ensure_affected(result.rows_affected(), "booking", id)
    }

    async fn list_bookings(&self, query: &BookingQuery) -> StoreResult<Vec<Booking>> {
        let mut select = QueryBuilder::<Postgres>::new(BOOKING_COLUMNS);
        select.push(" WHERE TRUE");
        if let Some(guest_id) = query.guest_id {
            select.push(" AND guest_id = ").push_bind(guest_id);
        }
        if let Some(property_ids) = &query.property_ids {
            select.push(" AND property_id = ANY(").push_bind(property_ids.clone()).push(")");
        }
        if let Some(status) = query.status {
            select.push(" AND status = ").push_bind(status.as_str());
        }
        select.push(" ORDER BY created_at DESC, id");

        let rows = select
            .build_query_as::<BookingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn exists_booking(
        &self,
        guest_id: Uuid,
        property_id: Uuid,
        status: BookingStatus,
    ) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings WHERE guest_id = $1 AND property_id = $2 AND status = $3
            )
            "#,
        )
        .bind(guest_id)
        .bind(property_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }
}
