use tracing::{debug, error};

use crate::error::StoreResult;
use crate::model::{Page, PageRequest, SearchHistoryEntry, WeatherReading};
use crate::store::HistoryStore;

#[derive(Debug, Clone)]
pub struct HistoryService {
    store: HistoryStore,
}

impl HistoryService {
    pub fn new(store: HistoryStore) -> Self {
        Self { store }
    }

    /// Append `reading` to the user's history. Failures are logged and swallowed.
    pub async fn record(&self, user_id: i64, reading: &WeatherReading) {
        match self.store.insert(user_id, reading).await {
            Ok(entry) => debug!(user_id, entry_id = entry.id, city = %reading.city, "search recorded"),
            Err(err) => error!(
                user_id,
                city = %reading.city,
                error = %err,
                "Failed to save search history"
            ),
        }
    }

    pub async fn list(
        &self,
        user_id: i64,
        request: PageRequest,
    ) -> StoreResult<Page<SearchHistoryEntry>> {
        self.store.page(user_id, request).await
    }

    /// Delete the user's whole history; returns the number of removed entries.
    pub async fn clear(&self, user_id: i64) -> StoreResult<u64> {
        let removed = self.store.clear(user_id).await?;
        debug!(user_id, removed, "search history cleared");
        Ok(removed)
    }
}
