use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::{StoreError, StoreResult};
use crate::model::{Page, PageRequest, SearchHistoryEntry, WeatherReading};

const COLUMNS: &str = "id, user_id, city, country, temperature, condition, wind_speed, \
                       humidity, local_time, raw_data, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    user_id: i64,
    city: String,
    country: Option<String>,
    temperature: f64,
    condition: String,
    wind_speed: f64,
    humidity: i64,
    local_time: String,
    raw_data: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for SearchHistoryEntry {
    type Error = StoreError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let raw_data = match row.raw_data.as_deref() {
            None => Value::Null,
            Some(text) => serde_json::from_str(text).map_err(|e| {
                StoreError::Corrupt(format!("weather_searches.raw_data of row {}: {e}", row.id))
            })?,
        };

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            city: row.city,
            country: row.country.unwrap_or_default(),
            temperature: row.temperature,
            condition: row.condition,
            wind_speed: row.wind_speed,
            humidity: row.humidity,
            local_time: row.local_time,
            raw_data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Append-only log of weather lookups, cleared in bulk per user.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        user_id: i64,
        reading: &WeatherReading,
    ) -> StoreResult<SearchHistoryEntry> {
        let now = Utc::now();
        let raw_data = serde_json::to_string(&reading.raw_data)
            .map_err(|e| StoreError::Corrupt(format!("raw_data is not serializable: {e}")))?;

        let row: HistoryRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO weather_searches (
                user_id, city, country, temperature, condition, wind_speed,
                humidity, local_time, raw_data, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&reading.city)
        .bind(&reading.country)
        .bind(reading.temperature)
        .bind(&reading.condition)
        .bind(reading.wind_speed)
        .bind(reading.humidity)
        .bind(&reading.local_time)
        .bind(raw_data)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    /// Newest first; equal timestamps fall back to id order.
    pub async fn page(
        &self,
        user_id: i64,
        request: PageRequest,
    ) -> StoreResult<Page<SearchHistoryEntry>> {
        let total = self.count(user_id).await?;

        let rows: Vec<HistoryRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS} FROM weather_searches
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(user_id)
        .bind(i64::from(request.per_page))
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let data = rows
            .into_iter()
            .map(SearchHistoryEntry::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page::new(request, total, data))
    }

    /// Remove every entry of `user_id`, returning how many were deleted.
    pub async fn clear(&self, user_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM weather_searches WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self, user_id: i64) -> StoreResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM weather_searches WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }
}
