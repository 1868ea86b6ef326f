//! Core data contracts and configuration for the fynd workspace.
//!
//! Every shape that crosses a crate boundary lives here: normalized
//! listings, watches, preference profiles, discovery output, enrichment
//! results, scoring breakdowns, and the run export. All of them are
//! `serde` round-trippable.

pub mod app_config;
pub mod config;
pub mod discovery;
pub mod enrichment;
pub mod export;
pub mod listing;
pub mod preferences;
pub mod scoring;
pub mod watch;

pub use app_config::{AppConfig, PipelineConfig};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use discovery::{DomainGateError, InferredDomain, PreferenceQuestion};
pub use enrichment::{EnrichedListing, ExtractedAttribute, RiskFlag, SellerQuestion};
pub use export::{ExportBody, ExportMode, FullRunExport, MarketSummary, RunMetadata};
pub use listing::{NormalizedListing, Price};
pub use preferences::{Condition, ConstraintKind, PreferenceCriterion, PreferenceProfile};
pub use scoring::{MarketStats, RankedListing, ScoringBreakdown};
pub use watch::{SearchFilters, SortOrder, Watch};
