//! Run orchestration: one sequential pass per user action.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use fynd_ai::{discover_domain, LlmClient};
use fynd_blocket::{normalize_batch, BlocketClient};
use fynd_core::{
    ExportBody, ExportMode, FullRunExport, InferredDomain, NormalizedListing, PipelineConfig,
    PreferenceProfile, RunMetadata, SearchFilters, Watch,
};

use crate::dedup::{partition_batch, SeenSet};
use crate::enrich::Enricher;
use crate::error::PipelineError;
use crate::export::market_summary;
use crate::filter::filter_candidates;
use crate::{comps, scoring};

/// Result of a plain search run.
#[derive(Debug)]
pub struct SearchRun {
    pub listings: Vec<NormalizedListing>,
    pub dropped_invalid: usize,
}

/// Result of a watch run: the batch split against the watch's seen set,
/// with the seen set already extended in storage.
#[derive(Debug)]
pub struct WatchRun {
    pub watch: Watch,
    pub mode: ExportMode,
    /// New listings in delta mode, the full batch in full mode.
    pub listings: Vec<NormalizedListing>,
    pub new_count: usize,
    pub seen_count: usize,
    pub dropped_invalid: usize,
}

/// How a pipeline run ended.
///
/// A low-confidence domain inference is a valid outcome: the caller
/// gets the clarifying question back instead of a ranked export. A
/// completed run keeps the inferred domain (when discovery ran) so the
/// caller can surface its suggested preference questions.
#[derive(Debug)]
pub enum PipelineOutcome {
    Completed {
        export: Box<FullRunExport>,
        domain: Option<InferredDomain>,
    },
    NeedsClarification(InferredDomain),
}

/// Fetches and normalizes listings for an ad-hoc query.
///
/// # Errors
///
/// Returns [`PipelineError::Fetch`] if the marketplace fetch fails.
/// Records failing the data contract are dropped and counted, never
/// fatal.
pub async fn run_search(
    client: &BlocketClient,
    query: &str,
    filters: &SearchFilters,
) -> Result<SearchRun, PipelineError> {
    let docs = client.search_all(query, filters).await?;
    let batch = normalize_batch(&docs, Utc::now());
    info!(
        query,
        fetched = docs.len(),
        normalized = batch.listings.len(),
        dropped = batch.dropped,
        "search run complete"
    );
    Ok(SearchRun {
        listings: batch.listings,
        dropped_invalid: batch.dropped,
    })
}

/// Re-runs a saved watch and partitions the batch against its seen set.
///
/// The seen set is extended with every id in the batch, new and seen
/// alike, after partitioning. The insert is idempotent, so a replayed
/// run only grows the set — the durable set can be a superset of what
/// was reported, never a subset.
///
/// # Errors
///
/// Returns [`PipelineError::Storage`] if the watch cannot be loaded or
/// the seen set cannot be extended, [`PipelineError::Fetch`] on
/// marketplace failure.
pub async fn run_watch(
    pool: &PgPool,
    client: &BlocketClient,
    watch_id: Uuid,
    mode: ExportMode,
) -> Result<WatchRun, PipelineError> {
    let watch = fynd_db::get_watch(pool, watch_id).await?;

    let docs = client.search_all(&watch.query, &watch.filters).await?;
    let batch = normalize_batch(&docs, Utc::now());

    let seen = SeenSet::new(fynd_db::load_seen_ids(pool, watch_id).await?);
    let partition = partition_batch(batch.listings, &seen);

    let all_ids: Vec<String> = partition
        .new
        .iter()
        .chain(partition.seen.iter())
        .map(|l| l.listing_id.clone())
        .collect();
    let inserted = fynd_db::mark_seen(pool, watch_id, &all_ids).await?;

    info!(
        watch_id = %watch_id,
        new = partition.new.len(),
        seen = partition.seen.len(),
        marked = inserted,
        dropped = batch.dropped,
        "watch run complete"
    );

    let new_count = partition.new.len();
    let seen_count = partition.seen.len();
    let listings = match mode {
        ExportMode::Delta => partition.new,
        ExportMode::Full => {
            let mut all = partition.new;
            all.extend(partition.seen);
            all
        }
    };

    Ok(WatchRun {
        watch,
        mode,
        listings,
        new_count,
        seen_count,
        dropped_invalid: batch.dropped,
    })
}

/// The full v2 flow: fetch, normalize, discover the domain, filter to a
/// bounded candidate set, enrich, build per-candidate market stats, and
/// score and rank the result.
///
/// Pass `llm = None` to skip domain discovery (the caller has already
/// confirmed the domain). With discovery enabled, a confidence below
/// the configured threshold short-circuits into
/// [`PipelineOutcome::NeedsClarification`] before any scoring work.
///
/// # Errors
///
/// Returns [`PipelineError::Fetch`] on marketplace failure and
/// [`PipelineError::Inference`] when the inference response violates
/// its contract — a malformed response is never coerced into a domain.
pub async fn run_pipeline(
    client: &BlocketClient,
    llm: Option<&LlmClient>,
    query: &str,
    filters: &SearchFilters,
    preferences: &PreferenceProfile,
    config: &PipelineConfig,
) -> Result<PipelineOutcome, PipelineError> {
    let docs = client.search_all(query, filters).await?;
    let batch = normalize_batch(&docs, Utc::now());
    let total_fetched = batch.listings.len();
    info!(query, fetched = total_fetched, dropped = batch.dropped, "fetched listings");

    let mut inferred = None;
    if let Some(llm) = llm {
        let domain = discover_domain(llm, &batch.listings, config).await?;
        info!(
            domain = %domain.domain_label,
            confidence = domain.confidence,
            "domain discovery complete"
        );
        if domain.needs_clarification {
            return Ok(PipelineOutcome::NeedsClarification(domain));
        }
        inferred = Some(domain);
    }

    let summary = market_summary(&batch.listings);

    let candidates = filter_candidates(batch.listings, preferences, config.candidate_limit);
    let after_filter = candidates.len();
    info!(candidates = after_filter, "filtered to candidate set");

    let enricher = Enricher::new(config);
    let enriched = enricher.enrich_batch(candidates);
    let enriched_count = enriched.len();

    let scored: Vec<_> = enriched
        .iter()
        .map(|candidate| {
            let stats = comps::find_comps(
                candidate,
                &enriched,
                &config.comp_key_attributes,
                config.min_comps,
            );
            let breakdown = scoring::score_candidate(candidate, stats.as_ref(), preferences, config);
            (candidate.clone(), stats, breakdown)
        })
        .collect();

    let ranked = scoring::rank_candidates(scored, config.top_k);
    info!(ranked = ranked.len(), "scored and ranked candidates");

    let export = FullRunExport {
        metadata: RunMetadata {
            run_id: Uuid::new_v4(),
            exported_at: Utc::now(),
            query: query.to_string(),
            watch_id: None,
            filters: filters.clone(),
            preferences: preferences.clone(),
            mode: ExportMode::Full,
            total_fetched,
            after_filter,
            enriched: enriched_count,
            dropped_invalid: batch.dropped,
            market_summary: summary,
        },
        body: ExportBody::Ranked(ranked),
    };
    Ok(PipelineOutcome::Completed {
        export: Box::new(export),
        domain: inferred,
    })
}

/// Wraps a search run as an exportable artifact.
#[must_use]
pub fn search_export(query: &str, filters: &SearchFilters, run: SearchRun) -> FullRunExport {
    let summary = market_summary(&run.listings);
    FullRunExport {
        metadata: RunMetadata {
            run_id: Uuid::new_v4(),
            exported_at: Utc::now(),
            query: query.to_string(),
            watch_id: None,
            filters: filters.clone(),
            preferences: PreferenceProfile::default(),
            mode: ExportMode::Full,
            total_fetched: run.listings.len(),
            after_filter: 0,
            enriched: 0,
            dropped_invalid: run.dropped_invalid,
            market_summary: summary,
        },
        body: ExportBody::Listings(run.listings),
    }
}

/// Wraps a watch run as an exportable artifact.
#[must_use]
pub fn watch_export(run: WatchRun) -> FullRunExport {
    let summary = market_summary(&run.listings);
    FullRunExport {
        metadata: RunMetadata {
            run_id: Uuid::new_v4(),
            exported_at: Utc::now(),
            query: run.watch.query.clone(),
            watch_id: Some(run.watch.id),
            filters: run.watch.filters.clone(),
            preferences: run.watch.preferences.clone(),
            mode: run.mode,
            total_fetched: run.new_count + run.seen_count,
            after_filter: 0,
            enriched: 0,
            dropped_invalid: run.dropped_invalid,
            market_summary: summary,
        },
        body: ExportBody::Listings(run.listings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fynd_core::Price;

    fn listing(id: &str, price: Option<f64>) -> NormalizedListing {
        NormalizedListing {
            listing_id: id.to_string(),
            url: format!("https://www.blocket.se/annons/{id}"),
            title: format!("Listing {id}"),
            description: None,
            price: price.map(Price::sek),
            location: None,
            published_at: None,
            shipping_available: None,
            image_count: 1,
            fetched_at: Utc::now(),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn search_export_carries_counts_and_summary() {
        let run = SearchRun {
            listings: vec![listing("1", Some(100.0)), listing("2", Some(200.0))],
            dropped_invalid: 3,
        };
        let export = search_export("iphone", &SearchFilters::default(), run);

        assert_eq!(export.metadata.total_fetched, 2);
        assert_eq!(export.metadata.dropped_invalid, 3);
        assert!(export.metadata.market_summary.is_some());
        assert!(matches!(export.body, ExportBody::Listings(ref l) if l.len() == 2));
    }

    #[test]
    fn watch_export_references_the_watch() {
        let watch = Watch {
            id: Uuid::new_v4(),
            name: Some("phones".to_string()),
            query: "iphone 13".to_string(),
            filters: SearchFilters::default(),
            preferences: PreferenceProfile::default(),
            created_at: Utc::now(),
        };
        let watch_id = watch.id;
        let run = WatchRun {
            watch,
            mode: ExportMode::Delta,
            listings: vec![listing("1", None)],
            new_count: 1,
            seen_count: 4,
            dropped_invalid: 0,
        };

        let export = watch_export(run);
        assert_eq!(export.metadata.watch_id, Some(watch_id));
        assert_eq!(export.metadata.mode, ExportMode::Delta);
        assert_eq!(export.metadata.total_fetched, 5);
        assert_eq!(export.metadata.query, "iphone 13");
    }
}
