// Batch enrichment: run the matcher over a whole library under an external
// rate limit, reporting progress as a pull-based event stream.

pub mod batch;
pub mod progress;
pub mod types;

pub use batch::{BatchConfig, BatchEnricher, EnrichmentRun};
pub use progress::EnrichmentEvent;
pub use types::{EnrichedGame, EnrichmentSummary, LibraryGame};
