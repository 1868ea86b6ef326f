//! The run core: deduplication, candidate filtering, enrichment,
//! comparable pricing, scoring, ranking, and export assembly.
//!
//! One run is one sequential pass — fetch, normalize, partition or
//! filter, enrich, compare, score, export — with no shared mutable
//! state between runs. The only durable state touched is the per-watch
//! seen set, which only ever grows.

pub mod comps;
pub mod dedup;
pub mod enrich;
pub mod error;
pub mod export;
pub mod filter;
pub mod run;
pub mod scoring;

pub use comps::find_comps;
pub use dedup::{partition_batch, Partition, SeenSet};
pub use enrich::Enricher;
pub use error::PipelineError;
pub use export::{market_summary, ExportError, ExportWriter};
pub use filter::filter_candidates;
pub use run::{
    run_pipeline, run_search, run_watch, search_export, watch_export, PipelineOutcome, SearchRun,
    WatchRun,
};
pub use scoring::{rank_candidates, score_candidate};
