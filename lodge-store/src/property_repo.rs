use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lodge_core::repository::PropertyRepository;
use lodge_core::{StoreError, StoreResult};
use lodge_shared::{
    AvailabilityPeriod, Page, Pagination, ParseTermError, PaymentType, Property, PropertyFilter, SortField,
    SortOrder,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::{db_error, ensure_affected};

const PROPERTY_COLUMNS: &str = "SELECT id, owner_id, name, location, description, payment_type, \
     availability_period, is_active, created_at, updated_at FROM properties";

pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PropertyRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    location: String,
    description: Option<String>,
    payment_type: String,
    availability_period: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = StoreError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let term_error = |e: ParseTermError| StoreError::Backend(e.to_string());
        let payment_type: PaymentType = row.payment_type.parse().map_err(term_error)?;
        let availability_period: AvailabilityPeriod = row.availability_period.parse().map_err(term_error)?;

        Ok(Property {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            location: row.location,
            description: row.description,
            payment_type,
            availability_period,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PropertyFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = &filter.name {
        qb.push(" AND name ILIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location ILIKE ").push_bind(format!("%{}%", location));
    }
    if let Some(payment_type) = filter.payment_type {
        qb.push(" AND payment_type = ").push_bind(payment_type.as_str());
    }
    if let Some(period) = filter.availability_period {
        qb.push(" AND availability_period = ").push_bind(period.as_str());
    }
    if let Some(is_active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    async fn insert_property(&self, property: &Property) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO properties
                (id, owner_id, name, location, description, payment_type, availability_period,
                 is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(property.id)
        .bind(property.owner_id)
        .bind(&property.name)
        .bind(&property.location)
        .bind(&property.description)
        .bind(property.payment_type.as_str())
        .bind(property.availability_period.as_str())
        .bind(property.is_active)
        .bind(property.created_at)
        .bind(property.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_property(&self, id: Uuid) -> StoreResult<Option<Property>> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!("{} WHERE id = $1", PROPERTY_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Property::try_from).transpose()
    }

    async fn update_property(&self, property: &Property) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE properties
            SET name = $2, location = $3, description = $4, payment_type = $5,
                availability_period = $6, is_active = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(property.id)
        .bind(&property.name)
        .bind(&property.location)
        .bind(&property.description)
        .bind(property.payment_type.as_str())
        .bind(property.availability_period.as_str())
        .bind(property.is_active)
        .bind(property.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        ensure_affected(result.rows_affected(), "property", property.id)
    }

    async fn delete_property(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        ensure_affected(result.rows_affected(), "property", id)
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> StoreResult<Page<Property>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let column = match filter.sort_by.unwrap_or_default() {
            SortField::CreatedAt => "created_at",
            SortField::Name => "name",
            SortField::Location => "location",
        };
        let direction = match filter.sort_order.unwrap_or_default() {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        let mut select = QueryBuilder::<Postgres>::new(PROPERTY_COLUMNS);
        push_filters(&mut select, filter);
        select
            .push(format!(" ORDER BY {} {}, id", column, direction))
            .push(" LIMIT ")
            .push_bind(i64::from(filter.limit()))
            .push(" OFFSET ")
            .push_bind(filter.offset() as i64);

        let rows = select
            .build_query_as::<PropertyRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(Page {
            data: rows.into_iter().map(Property::try_from).collect::<StoreResult<_>>()?,
            pagination: Pagination::new(filter.page(), filter.limit(), total.max(0) as u64),
        })
    }

    async fn list_properties_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Property>> {
        let rows = sqlx::query_as::<_, PropertyRow>(&format!("{} WHERE owner_id = $1", PROPERTY_COLUMNS))
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.into_iter().map(Property::try_from).collect()
    }
}
