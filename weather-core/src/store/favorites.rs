use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::StoreResult;
use crate::model::FavoriteCity;

const COLUMNS: &str = "id, user_id, city, country, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    id: i64,
    user_id: i64,
    city: String,
    country: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FavoriteRow> for FavoriteCity {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            city: row.city,
            country: row.country,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Per-user favorite cities. Every query is scoped by owner.
#[derive(Debug, Clone)]
pub struct FavoriteStore {
    pool: SqlitePool,
}

impl FavoriteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All favorites of `user_id` in insertion order.
    pub async fn list(&self, user_id: i64) -> StoreResult<Vec<FavoriteCity>> {
        let rows: Vec<FavoriteRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM favorite_cities WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a favorite. An existing (user, city) pair yields
    /// `StoreError::UniqueViolation` and leaves the table untouched.
    pub async fn insert(&self, user_id: i64, city: &str, country: &str) -> StoreResult<FavoriteCity> {
        let now = Utc::now();
        let row: FavoriteRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO favorite_cities (user_id, city, country, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(city)
        .bind(country)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete favorite `id` if `user_id` owns it. Returns whether a row was removed.
    pub async fn delete_owned(&self, user_id: i64, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM favorite_cities WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
impl FavoriteStore {
    pub(crate) async fn count(&self, user_id: i64) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorite_cities WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
