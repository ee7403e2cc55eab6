/// Fuzzy title matching: normalization, variant generation, similarity
/// scoring and match orchestration.
///
/// Externally sourced names (store libraries, deal feeds) rarely equal the
/// catalog's names byte-for-byte, and the catalog search is keyword-only.
/// The pipeline here reconciles the two: clean the title, probe the search
/// with structurally diverse variants, score every candidate, pick the best
/// one above a threshold.
pub mod matcher;
pub mod normalizer;
pub mod reconcile;
pub mod similarity;
pub mod variants;

pub use matcher::{MatchDecision, MatcherConfig, TitleMatcher};
pub use normalizer::{clean_title_for_search, normalize_title};
pub use reconcile::{reconcile_fields, GameFields};
pub use similarity::{similarity, JaroWinklerScorer, LevenshteinScorer, SimilarityScorer};
pub use variants::{generate_variants, MAX_VARIANTS};
