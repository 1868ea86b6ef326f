//! Database operations for the `watches` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fynd_core::{PreferenceProfile, SearchFilters, Watch};

use crate::StorageError;

/// A row from the `watches` table. Filters and preferences are stored
/// as `jsonb` and decoded into their core types on read.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WatchRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub query: String,
    pub filters: serde_json::Value,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl WatchRow {
    /// Decodes the row into a [`Watch`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CorruptJson`] if a `jsonb` column does not
    /// match the expected shape.
    pub fn into_watch(self) -> Result<Watch, StorageError> {
        let filters: SearchFilters =
            serde_json::from_value(self.filters).map_err(|e| StorageError::CorruptJson {
                watch_id: self.id,
                field: "filters",
                source: e,
            })?;
        let preferences: PreferenceProfile =
            serde_json::from_value(self.preferences).map_err(|e| StorageError::CorruptJson {
                watch_id: self.id,
                field: "preferences",
                source: e,
            })?;
        Ok(Watch {
            id: self.id,
            name: self.name,
            query: self.query,
            filters,
            preferences,
            created_at: self.created_at,
        })
    }
}

/// Creates a new watch. Generates the UUID in Rust and returns the full
/// stored watch.
///
/// # Errors
///
/// Returns [`StorageError::Sqlx`] if the insert fails.
pub async fn create_watch(
    pool: &PgPool,
    name: Option<&str>,
    query: &str,
    filters: &SearchFilters,
    preferences: &PreferenceProfile,
) -> Result<Watch, StorageError> {
    let id = Uuid::new_v4();
    let filters_json = serde_json::to_value(filters).map_err(|e| StorageError::CorruptJson {
        watch_id: id,
        field: "filters",
        source: e,
    })?;
    let preferences_json =
        serde_json::to_value(preferences).map_err(|e| StorageError::CorruptJson {
            watch_id: id,
            field: "preferences",
            source: e,
        })?;

    let row = sqlx::query_as::<_, WatchRow>(
        "INSERT INTO watches (id, name, query, filters, preferences) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, name, query, filters, preferences, created_at",
    )
    .bind(id)
    .bind(name)
    .bind(query)
    .bind(filters_json)
    .bind(preferences_json)
    .fetch_one(pool)
    .await?;

    row.into_watch()
}

/// Fetches one watch by id.
///
/// # Errors
///
/// Returns [`StorageError::WatchNotFound`] if no row matches, or
/// [`StorageError::Sqlx`] on query failure.
pub async fn get_watch(pool: &PgPool, id: Uuid) -> Result<Watch, StorageError> {
    let row = sqlx::query_as::<_, WatchRow>(
        "SELECT id, name, query, filters, preferences, created_at \
         FROM watches WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(StorageError::WatchNotFound(id))?;

    row.into_watch()
}

/// Lists all watches, newest first.
///
/// # Errors
///
/// Returns [`StorageError::Sqlx`] on query failure, or
/// [`StorageError::CorruptJson`] if a stored row fails to decode.
pub async fn list_watches(pool: &PgPool) -> Result<Vec<Watch>, StorageError> {
    let rows = sqlx::query_as::<_, WatchRow>(
        "SELECT id, name, query, filters, preferences, created_at \
         FROM watches ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(WatchRow::into_watch).collect()
}

/// Deletes a watch and (via cascade) its seen-listing set.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`StorageError::Sqlx`] on query failure.
pub async fn delete_watch(pool: &PgPool, id: Uuid) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM watches WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_row_decodes_into_watch() {
        let row = WatchRow {
            id: Uuid::new_v4(),
            name: Some("iphone bevakning".to_string()),
            query: "iphone 13".to_string(),
            filters: serde_json::json!({"locations": ["stockholm"]}),
            preferences: serde_json::json!({"max_price": 6000.0}),
            created_at: Utc::now(),
        };

        let watch = row.into_watch().unwrap();
        assert_eq!(watch.query, "iphone 13");
        assert_eq!(watch.filters.locations, vec!["stockholm"]);
        assert_eq!(watch.preferences.max_price, Some(6000.0));
    }

    #[test]
    fn corrupt_filters_json_is_a_typed_error() {
        let row = WatchRow {
            id: Uuid::new_v4(),
            name: None,
            query: "iphone".to_string(),
            filters: serde_json::json!({"locations": "not-an-array"}),
            preferences: serde_json::json!({}),
            created_at: Utc::now(),
        };

        let err = row.into_watch().unwrap_err();
        assert!(matches!(err, StorageError::CorruptJson { field: "filters", .. }));
    }
}
