use async_trait::async_trait;

use crate::catalog::types::{CatalogSearchResult, GameDetails};
use crate::shared::errors::AppResult;

/// Port (interface) for the external game catalog.
///
/// The concrete implementation (IGDB client, test stub, ...) lives outside
/// this engine; it owns credentials, transport, retries and rate limiting.
/// The catalog only does keyword/substring search, no fuzzy ranking — the
/// matcher compensates by probing it with generated variants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Keyword search; may return zero or more loosely-relevant results.
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<CatalogSearchResult>>;

    /// Resolve a candidate id to full metadata.
    /// Returns `None` if the id has since become invalid.
    async fn get_details(&self, id: u64) -> AppResult<Option<GameDetails>>;
}
