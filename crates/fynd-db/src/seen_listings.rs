//! Database operations for the per-watch `seen_listings` set.
//!
//! The set is add-only: [`mark_seen`] unions new identifiers in with
//! `ON CONFLICT DO NOTHING`, and no clear or replace operation exists.
//! The set may end up a superset of what was truly reported (a replayed
//! batch after a crash re-inserts harmlessly), never a subset — missed
//! "new" items are worse than repeated ones.

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::StorageError;

/// Loads the set of listing ids already seen by a watch.
///
/// An empty set (first run) is a normal result, not an error.
///
/// # Errors
///
/// Returns [`StorageError::Sqlx`] on query failure.
pub async fn load_seen_ids(pool: &PgPool, watch_id: Uuid) -> Result<HashSet<String>, StorageError> {
    let ids: Vec<String> =
        sqlx::query_scalar("SELECT listing_id FROM seen_listings WHERE watch_id = $1")
            .bind(watch_id)
            .fetch_all(pool)
            .await?;
    Ok(ids.into_iter().collect())
}

/// Extends a watch's seen set with the given listing ids.
///
/// Idempotent: already-present ids are skipped. Returns the number of
/// ids that were actually new to the set.
///
/// # Errors
///
/// Returns [`StorageError::Sqlx`] on insert failure; the statement is a
/// single multi-row insert, so it either applies fully or not at all.
pub async fn mark_seen(
    pool: &PgPool,
    watch_id: Uuid,
    listing_ids: &[String],
) -> Result<u64, StorageError> {
    if listing_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        "INSERT INTO seen_listings (watch_id, listing_id) \
         SELECT $1, unnest($2::text[]) \
         ON CONFLICT (watch_id, listing_id) DO NOTHING",
    )
    .bind(watch_id)
    .bind(listing_ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
