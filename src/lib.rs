//! Ludex matching engine: reconciles externally sourced game titles (store
//! libraries, deal feeds) against a canonical catalog, enriches library
//! records from fetched metadata, and batch-processes whole libraries under
//! an external rate limit.
//!
//! The engine has no network surface of its own; it talks to the catalog
//! through the injected [`catalog::CatalogProvider`] port.

pub mod catalog;
pub mod enrichment;
pub mod matching;
pub mod shared;

pub use catalog::{CatalogProvider, CatalogSearchResult, GameDetails, TokenCache};
pub use enrichment::{
    BatchConfig, BatchEnricher, EnrichedGame, EnrichmentEvent, EnrichmentRun, EnrichmentSummary,
    LibraryGame,
};
pub use matching::{
    clean_title_for_search, generate_variants, normalize_title, reconcile_fields, similarity,
    GameFields, MatchDecision, MatcherConfig, TitleMatcher,
};
pub use shared::errors::{AppError, AppResult};
pub use shared::utils::init_logger;
