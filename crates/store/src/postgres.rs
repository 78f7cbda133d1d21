//! Postgres-backed part store implementation.
//!
//! Every movement is a single SQL statement: the OUT direction decrements
//! conditionally (`... AND stock >= $2`), so concurrent consumers can never
//! drive stock below zero regardless of interleaving.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use stockroom_core::{DomainError, PartId};
use stockroom_parts::{InventorySummary, Movement, MovementDirection, NewPart, Part, PartPatch};

use crate::part_store::{PartStore, StoreError, StoreResult};

const ENSURE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS parts (
    id TEXT PRIMARY KEY,
    qr_code_id TEXT UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    unit TEXT NOT NULL DEFAULT 'unit',
    stock BIGINT NOT NULL DEFAULT 0 CHECK (stock >= 0),
    critical_threshold BIGINT NOT NULL DEFAULT 3,
    low_stock_threshold BIGINT NOT NULL DEFAULT 8,
    location TEXT,
    image TEXT,
    vendor TEXT,
    category TEXT NOT NULL DEFAULT 'General',
    last_restocked_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (critical_threshold < low_stock_threshold)
)
"#;

const SELECT_COLUMNS: &str = "id, qr_code_id, name, description, unit, stock, \
     critical_threshold, low_stock_threshold, location, image, vendor, \
     category, last_restocked_at, created_at";

/// Postgres-backed part store.
///
/// The pool is constructed by the caller and injected; this type owns no
/// global state and is cheap to clone.
#[derive(Clone)]
pub struct PostgresPartStore {
    pool: PgPool,
}

impl PostgresPartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensure the `parts` table exists (idempotent; run once at startup).
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(ENSURE_SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        tracing::debug!("parts schema ensured");
        Ok(())
    }

    async fn fetch(&self, id: &PartId) -> StoreResult<Option<Part>> {
        let row = sqlx::query_as::<_, PartRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM parts WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(Part::try_from).transpose()
    }
}

#[async_trait]
impl PartStore for PostgresPartStore {
    async fn list(&self) -> StoreResult<Vec<Part>> {
        let rows = sqlx::query_as::<_, PartRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM parts ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(Part::try_from).collect()
    }

    async fn create(&self, new_part: NewPart) -> StoreResult<Part> {
        let part = new_part.into_part(Utc::now())?;

        let row = sqlx::query_as::<_, PartRow>(&format!(
            r#"
            INSERT INTO parts (
                id, qr_code_id, name, description, unit, stock,
                critical_threshold, low_stock_threshold, location, image,
                vendor, category, last_restocked_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(part.id.as_str())
        .bind(&part.qr_code_id)
        .bind(&part.name)
        .bind(&part.description)
        .bind(&part.unit)
        .bind(part.stock)
        .bind(part.critical_threshold)
        .bind(part.low_stock_threshold)
        .bind(&part.location)
        .bind(&part.image)
        .bind(&part.vendor)
        .bind(&part.category)
        .bind(part.last_restocked_at)
        .bind(part.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Part::try_from(row)
    }

    async fn update(&self, id: &PartId, patch: PartPatch) -> StoreResult<Part> {
        if patch.is_empty() {
            return Err(DomainError::validation("no fields to update").into());
        }

        // Validate the merged record against the current row before writing;
        // the write itself only touches the supplied columns so an untouched
        // stock value cannot clobber a concurrent movement.
        let current = self.fetch(id).await?.ok_or(DomainError::NotFound)?;
        patch.apply_to(&current)?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE parts SET ");
        let mut set = builder.separated(", ");
        if let Some(qr_code_id) = &patch.qr_code_id {
            set.push("qr_code_id = ").push_bind_unseparated(qr_code_id);
        }
        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(description) = &patch.description {
            set.push("description = ").push_bind_unseparated(description);
        }
        if let Some(unit) = &patch.unit {
            set.push("unit = ").push_bind_unseparated(unit);
        }
        if let Some(stock) = patch.stock {
            set.push("stock = ").push_bind_unseparated(stock);
        }
        if let Some(critical_threshold) = patch.critical_threshold {
            set.push("critical_threshold = ")
                .push_bind_unseparated(critical_threshold);
        }
        if let Some(low_stock_threshold) = patch.low_stock_threshold {
            set.push("low_stock_threshold = ")
                .push_bind_unseparated(low_stock_threshold);
        }
        if let Some(location) = &patch.location {
            set.push("location = ").push_bind_unseparated(location);
        }
        if let Some(image) = &patch.image {
            set.push("image = ").push_bind_unseparated(image);
        }
        if let Some(vendor) = &patch.vendor {
            set.push("vendor = ").push_bind_unseparated(vendor);
        }
        if let Some(category) = &patch.category {
            set.push("category = ").push_bind_unseparated(category);
        }
        builder.push(" WHERE id = ").push_bind(id.as_str());
        builder.push(format!(" RETURNING {SELECT_COLUMNS}"));

        let row = builder
            .build_query_as::<PartRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        match row {
            Some(row) => Part::try_from(row),
            None => Err(DomainError::NotFound.into()),
        }
    }

    async fn delete(&self, id: &PartId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM parts WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_movement(&self, movement: Movement) -> StoreResult<Part> {
        let row = match movement.direction {
            MovementDirection::In => sqlx::query_as::<_, PartRow>(&format!(
                r#"
                UPDATE parts
                SET stock = stock + $2, last_restocked_at = NOW()
                WHERE id = $1
                RETURNING {SELECT_COLUMNS}
                "#
            ))
            .bind(movement.part_id.as_str())
            .bind(movement.quantity)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?,

            MovementDirection::Out => sqlx::query_as::<_, PartRow>(&format!(
                r#"
                UPDATE parts
                SET stock = stock - $2
                WHERE id = $1 AND stock >= $2
                RETURNING {SELECT_COLUMNS}
                "#
            ))
            .bind(movement.part_id.as_str())
            .bind(movement.quantity)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?,
        };

        if let Some(row) = row {
            return Part::try_from(row);
        }

        // The conditional update matched nothing: either the part is missing
        // or an OUT asked for more than is on hand. Re-read to tell them apart
        // (read-only, so the atomicity of the movement is unaffected).
        let current: Option<i64> = sqlx::query("SELECT stock FROM parts WHERE id = $1")
            .bind(movement.part_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?
            .map(|row| row.try_get("stock"))
            .transpose()
            .map_err(map_db_err)?;

        match current {
            Some(stock) => Err(DomainError::insufficient_stock(stock).into()),
            None => Err(DomainError::NotFound.into()),
        }
    }

    async fn summary(&self) -> StoreResult<InventorySummary> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_items,
                COUNT(*) FILTER (WHERE stock <= critical_threshold) AS critical_count,
                COUNT(*) FILTER (
                    WHERE stock > critical_threshold AND stock <= low_stock_threshold
                ) AS low_stock_count
            FROM parts
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(InventorySummary {
            total_items: row.try_get::<i64, _>("total_items").map_err(map_db_err)? as u64,
            critical_count: row.try_get::<i64, _>("critical_count").map_err(map_db_err)? as u64,
            low_stock_count: row.try_get::<i64, _>("low_stock_count").map_err(map_db_err)? as u64,
        })
    }
}

/// Row shape of the `parts` table.
#[derive(sqlx::FromRow)]
struct PartRow {
    id: String,
    qr_code_id: Option<String>,
    name: String,
    description: Option<String>,
    unit: String,
    stock: i64,
    critical_threshold: i64,
    low_stock_threshold: i64,
    location: Option<String>,
    image: Option<String>,
    vendor: Option<String>,
    category: String,
    last_restocked_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PartRow> for Part {
    type Error = StoreError;

    fn try_from(row: PartRow) -> Result<Self, Self::Error> {
        Ok(Part {
            id: row.id.parse::<PartId>()?,
            qr_code_id: row.qr_code_id,
            name: row.name,
            description: row.description,
            unit: row.unit,
            stock: row.stock,
            critical_threshold: row.critical_threshold,
            low_stock_threshold: row.low_stock_threshold,
            location: row.location,
            image: row.image,
            vendor: row.vendor,
            category: row.category,
            last_restocked_at: row.last_restocked_at,
            created_at: row.created_at,
        })
    }
}

/// Map driver errors: unique-key violations are caller conflicts, everything
/// else means the store is unavailable.
fn map_db_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return DomainError::conflict(format!("duplicate unique key: {}", db_err.message())).into();
        }
    }
    StoreError::Unavailable(err.to_string())
}
