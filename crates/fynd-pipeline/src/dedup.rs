//! Partitioning of fetched batches into new and previously seen listings.

use std::collections::HashSet;

use fynd_core::NormalizedListing;

/// The listing ids a watch has already reported, loaded from storage at
/// the start of a run.
///
/// Add-only: ids can be inserted but never removed, mirroring the
/// durable set in `fynd-db`. A replayed extension only re-inserts, so
/// the in-memory view stays a superset of what was truly reported,
/// never a subset.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    #[must_use]
    pub fn new(ids: HashSet<String>) -> Self {
        Self { ids }
    }

    #[must_use]
    pub fn contains(&self, listing_id: &str) -> bool {
        self.ids.contains(listing_id)
    }

    /// Extends the set with every id in the batch, new and seen alike.
    pub fn extend_from_batch(&mut self, batch: &[NormalizedListing]) {
        for listing in batch {
            self.ids.insert(listing.listing_id.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// One batch split against a [`SeenSet`]. Every input listing lands in
/// exactly one of the two halves.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub new: Vec<NormalizedListing>,
    pub seen: Vec<NormalizedListing>,
}

/// Splits a fetched batch by seen-set membership, preserving input order
/// within each half. An empty seen set (first run) classifies everything
/// as new.
#[must_use]
pub fn partition_batch(batch: Vec<NormalizedListing>, seen: &SeenSet) -> Partition {
    let mut partition = Partition::default();
    for listing in batch {
        if seen.contains(&listing.listing_id) {
            partition.seen.push(listing);
        } else {
            partition.new.push(listing);
        }
    }
    partition
}
