use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::provider::CatalogProvider;
use crate::catalog::types::{CatalogSearchResult, GameDetails};
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::{log_debug, log_warn};

use super::normalizer::clean_title_for_search;
use super::similarity::{LevenshteinScorer, SimilarityScorer};
use super::variants::generate_variants;

/// Thresholds and limits for the matching pipeline.
///
/// The score cut-offs were tuned empirically against store-library exports;
/// they are configuration, not invariants, so callers can tighten or relax
/// them per source.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Probe-loop score at which a result is accepted immediately,
    /// skipping all remaining variants.
    pub early_exit_score: f64,

    /// Probe-loop score at which a result joins the "best results" shortlist.
    pub shortlist_score: f64,

    /// Minimum final score for a match to be accepted at all.
    pub min_match_score: f64,

    /// Results requested per variant probe.
    pub results_per_variant: usize,

    /// Maximum words taken from the cleaned title for the partial search.
    pub partial_word_count: usize,

    /// Results requested per word in the partial search.
    pub partial_results_per_word: usize,

    /// Cap on the partial-search candidate pool.
    pub partial_pool_cap: usize,
}

impl MatcherConfig {
    pub fn new() -> Self {
        Self {
            early_exit_score: 0.9,
            shortlist_score: 0.7,
            min_match_score: 0.3,
            results_per_variant: 5,
            partial_word_count: 3,
            partial_results_per_word: 10,
            partial_pool_cap: 15,
        }
    }

    pub fn early_exit_score(mut self, score: f64) -> Self {
        self.early_exit_score = score;
        self
    }

    pub fn shortlist_score(mut self, score: f64) -> Self {
        self.shortlist_score = score;
        self
    }

    pub fn min_match_score(mut self, score: f64) -> Self {
        self.min_match_score = score;
        self
    }

    pub fn results_per_variant(mut self, limit: usize) -> Self {
        self.results_per_variant = limit;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, score) in [
            ("early_exit_score", self.early_exit_score),
            ("shortlist_score", self.shortlist_score),
            ("min_match_score", self.min_match_score),
        ] {
            if !(0.0..=1.0).contains(&score) {
                return Err(format!("{} must be within [0, 1], got {}", name, score));
            }
        }

        if self.min_match_score > self.shortlist_score
            || self.shortlist_score > self.early_exit_score
        {
            return Err(format!(
                "score thresholds must be ordered: min ({}) <= shortlist ({}) <= early exit ({})",
                self.min_match_score, self.shortlist_score, self.early_exit_score
            ));
        }

        if self.results_per_variant == 0 {
            return Err("results_per_variant must be > 0".to_string());
        }
        if self.partial_word_count == 0
            || self.partial_results_per_word == 0
            || self.partial_pool_cap == 0
        {
            return Err("partial search limits must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The winning candidate of one matching call, with the score and the query
/// string that produced it. Ephemeral; callers immediately resolve the id to
/// full details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDecision {
    pub result: CatalogSearchResult,
    pub score: f64,
    pub matched_query: String,
}

/// Reconciles one externally named game against the catalog.
///
/// Holds no mutable state; concurrent calls for different titles are
/// independent. There is no internal timeout or retry: upstream clients do
/// their own backoff before returning, and callers wrap the whole call if
/// they need a deadline.
pub struct TitleMatcher {
    provider: Arc<dyn CatalogProvider>,
    scorer: Box<dyn SimilarityScorer>,
    config: MatcherConfig,
}

impl TitleMatcher {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            provider,
            scorer: Box::new(LevenshteinScorer),
            config: MatcherConfig::default(),
        }
    }

    pub fn with_config(provider: Arc<dyn CatalogProvider>, config: MatcherConfig) -> Self {
        Self {
            provider,
            scorer: Box::new(LevenshteinScorer),
            config,
        }
    }

    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Find the best catalog entry for a raw title and resolve its details.
    ///
    /// Every upstream failure is absorbed into `None` here; a matching
    /// failure is never fatal to the caller. Use [`Self::match_title`] to
    /// observe the error instead.
    pub async fn find_best_match(
        &self,
        raw_title: &str,
        platform_hint: Option<&str>,
    ) -> Option<GameDetails> {
        let timer = TimedOperation::new("find_best_match");
        let outcome = self.resolve_details(raw_title, platform_hint).await;
        timer.finish_with_info(raw_title);

        match outcome {
            Ok(details) => details,
            Err(e) => {
                LogContext::error_with_context(&e, &format!("Matching '{}' failed", raw_title));
                None
            }
        }
    }

    async fn resolve_details(
        &self,
        raw_title: &str,
        platform_hint: Option<&str>,
    ) -> AppResult<Option<GameDetails>> {
        let Some(decision) = self.match_title(raw_title, platform_hint).await? else {
            LogContext::match_operation(raw_title, "no match", None);
            return Ok(None);
        };

        LogContext::match_operation(raw_title, &format!("-> '{}'", decision.result.name), Some(decision.score));
        self.provider.get_details(decision.result.id).await
    }

    /// Run the matching pipeline and return the winning candidate, if any.
    ///
    /// Variants are probed strictly in priority order; an early exit means
    /// later variants are never tried. Errors from the injected search
    /// function propagate.
    pub async fn match_title(
        &self,
        raw_title: &str,
        platform_hint: Option<&str>,
    ) -> AppResult<Option<MatchDecision>> {
        let variants = generate_variants(raw_title);
        log_debug!(
            "Generated {} variants for '{}': {:?}",
            variants.len(),
            raw_title,
            variants
        );

        let mut shortlist: Vec<CatalogSearchResult> = Vec::new();
        let mut shortlist_ids: HashSet<u64> = HashSet::new();
        let mut pool: Vec<CatalogSearchResult> = Vec::new();
        let mut pool_ids: HashSet<u64> = HashSet::new();

        for variant in &variants {
            let results = self
                .provider
                .search(variant, self.config.results_per_variant)
                .await?;
            LogContext::search_operation(variant, Some(results.len()));

            for result in results {
                let score = self.scorer.score(variant, &result.name);

                if score >= self.config.early_exit_score {
                    log_debug!(
                        "Early exit on variant '{}': '{}' scored {:.3}",
                        variant,
                        result.name,
                        score
                    );
                    return Ok(Some(MatchDecision {
                        result,
                        score,
                        matched_query: variant.clone(),
                    }));
                }

                if score >= self.config.shortlist_score && shortlist_ids.insert(result.id) {
                    shortlist.push(result.clone());
                }
                if pool_ids.insert(result.id) {
                    pool.push(result);
                }
            }
        }

        if pool.is_empty() {
            pool = self.partial_search(raw_title).await?;
        }

        let mut candidates = if shortlist.is_empty() { pool } else { shortlist };

        if let Some(hint) = platform_hint {
            let hint_lower = hint.to_lowercase();
            let on_platform: Vec<CatalogSearchResult> = candidates
                .iter()
                .filter(|c| {
                    c.platforms
                        .iter()
                        .any(|p| p.to_lowercase().contains(&hint_lower))
                })
                .cloned()
                .collect();
            if on_platform.is_empty() {
                log_debug!("No candidate lists platform '{}', ignoring hint", hint);
            } else {
                candidates = on_platform;
            }
        }

        // Final pass: every candidate against every variant and the raw
        // title itself, keeping the single best pair.
        let mut best: Option<MatchDecision> = None;
        for candidate in &candidates {
            for query in variants
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(raw_title))
            {
                let score = self.scorer.score(query, &candidate.name);
                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(MatchDecision {
                        result: candidate.clone(),
                        score,
                        matched_query: query.to_string(),
                    });
                }
            }
        }

        match best {
            Some(decision) if decision.score >= self.config.min_match_score => Ok(Some(decision)),
            Some(decision) => {
                log_debug!(
                    "Best candidate '{}' for '{}' scored {:.3}, below accept threshold {:.2}",
                    decision.result.name,
                    raw_title,
                    decision.score,
                    self.config.min_match_score
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Coarser fallback used only when variant probing returned nothing:
    /// query word-by-word, then keep results sharing at least one
    /// substring-overlapping word with the query words.
    async fn partial_search(&self, raw_title: &str) -> AppResult<Vec<CatalogSearchResult>> {
        let cleaned = clean_title_for_search(raw_title);
        let query_words: Vec<&str> = cleaned
            .split_whitespace()
            .filter(|w| w.chars().count() > 3)
            .take(self.config.partial_word_count)
            .collect();

        log_warn!(
            "No results for '{}' across variants, partial search with {:?}",
            raw_title,
            query_words
        );

        let mut pool: Vec<CatalogSearchResult> = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();

        for word in &query_words {
            let results = self
                .provider
                .search(word, self.config.partial_results_per_word)
                .await?;
            for result in results {
                if seen.insert(result.id) {
                    pool.push(result);
                }
            }
        }

        pool.retain(|result| {
            let name = result.name.to_lowercase();
            name.split_whitespace()
                .any(|rw| query_words.iter().any(|qw| rw.contains(qw) || qw.contains(rw)))
        });
        pool.truncate(self.config.partial_pool_cap);

        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::provider::MockCatalogProvider;
    use crate::shared::errors::AppError;
    use mockall::predicate::eq;

    fn details(id: u64, name: &str) -> GameDetails {
        GameDetails {
            id,
            name: name.to_string(),
            description: None,
            cover_url: None,
            release_date: None,
            developer: None,
            publisher: None,
            genres: Vec::new(),
            rating: None,
            platforms: Vec::new(),
        }
    }

    fn result_with_platforms(id: u64, name: &str, platforms: &[&str]) -> CatalogSearchResult {
        CatalogSearchResult {
            id,
            name: name.to_string(),
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
        }
    }

    // Config

    #[test]
    fn test_default_config_is_valid() {
        assert!(MatcherConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_out_of_range_scores() {
        let config = MatcherConfig::new().early_exit_score(1.4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_unordered_thresholds() {
        let config = MatcherConfig::new().min_match_score(0.8).shortlist_score(0.5);
        let err = config.validate().unwrap_err();
        assert!(err.contains("ordered"));
    }

    #[test]
    fn test_config_rejects_zero_limits() {
        let config = MatcherConfig::new().results_per_variant(0);
        assert!(config.validate().is_err());
    }

    // Early exit: exact hit on the first variant

    #[tokio::test]
    async fn test_exact_hit_short_circuits_remaining_variants() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_, _| Ok(vec![CatalogSearchResult::new(42, "Hades")]));
        provider
            .expect_get_details()
            .with(eq(42u64))
            .times(1)
            .returning(|id| Ok(Some(details(id, "Hades"))));

        let matcher = TitleMatcher::new(Arc::new(provider));
        let found = matcher.find_best_match("Hades", None).await;

        assert_eq!(found.unwrap().id, 42);
    }

    // No match: only unrelated candidates

    #[tokio::test]
    async fn test_unrelated_candidates_yield_no_match_and_no_details_call() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_search().returning(|_, _| {
            Ok(vec![CatalogSearchResult::new(
                7,
                "Farming Simulator 22 Platinum Expansion",
            )])
        });
        provider.expect_get_details().times(0);

        let matcher = TitleMatcher::new(Arc::new(provider));
        let found = matcher.find_best_match("Hades", None).await;

        assert!(found.is_none());
    }

    // Fallback partial search invoked exactly once when probing finds nothing

    #[tokio::test]
    async fn test_partial_search_runs_once_when_variants_come_up_empty() {
        let mut provider = MockCatalogProvider::new();
        // "Hollow Knight" generates 4 variants: cleaned, raw, all-but-first,
        // all-but-last (core keywords duplicate the cleaned title).
        provider
            .expect_search()
            .withf(|_, limit| *limit == 5)
            .times(4)
            .returning(|_, _| Ok(vec![]));
        // Partial search: one probe per word > 3 chars, limit 10.
        provider
            .expect_search()
            .withf(|_, limit| *limit == 10)
            .times(2)
            .returning(|_, _| Ok(vec![]));
        provider.expect_get_details().times(0);

        let matcher = TitleMatcher::new(Arc::new(provider));
        let found = matcher.find_best_match("Hollow Knight", None).await;

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_partial_search_keeps_word_overlapping_results_only() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_search()
            .withf(|_, limit| *limit == 5)
            .returning(|_, _| Ok(vec![]));
        provider
            .expect_search()
            .withf(|_, limit| *limit == 10)
            .returning(|query, _| {
                if query == "hollow" {
                    Ok(vec![
                        CatalogSearchResult::new(1, "Hollow Knight"),
                        CatalogSearchResult::new(2, "Stardew Valley"),
                    ])
                } else {
                    Ok(vec![CatalogSearchResult::new(3, "Shovel Knight")])
                }
            });
        provider
            .expect_get_details()
            .with(eq(1u64))
            .times(1)
            .returning(|id| Ok(Some(details(id, "Hollow Knight"))));

        let matcher = TitleMatcher::new(Arc::new(provider));
        let found = matcher.find_best_match("Hollow Knight", None).await;

        // "Stardew Valley" shares no word with {hollow, knight}; of the two
        // survivors the exact-name entry scores best against the variants.
        assert_eq!(found.unwrap().id, 1);
    }

    // Shortlist path: near matches win through the final scoring pass

    #[tokio::test]
    async fn test_shortlisted_candidate_wins_final_pass() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_search().returning(|_, _| {
            Ok(vec![
                CatalogSearchResult::new(1, "Outer Wilds: Archaeologist Edition"),
                CatalogSearchResult::new(2, "Outer Worlds"),
            ])
        });
        provider
            .expect_get_details()
            .with(eq(2u64))
            .times(1)
            .returning(|id| Ok(Some(details(id, "Outer Worlds"))));

        let matcher = TitleMatcher::new(Arc::new(provider));
        let found = matcher.find_best_match("Outer Wilds", None).await;

        assert_eq!(found.unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_match_title_reports_winning_variant_and_score() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_search()
            .returning(|_, _| Ok(vec![CatalogSearchResult::new(9, "Celeste")]));

        let matcher = TitleMatcher::new(Arc::new(provider));
        let decision = matcher
            .match_title("Celeste", None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(decision.result.id, 9);
        assert_eq!(decision.score, 1.0);
        assert_eq!(decision.matched_query, "celeste");
    }

    // Platform hint narrows the candidate pool

    #[tokio::test]
    async fn test_platform_hint_prefers_matching_candidate() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_search().returning(|_, _| {
            Ok(vec![
                result_with_platforms(1, "Metro Exodus", &["PC (Microsoft Windows)"]),
                result_with_platforms(2, "Metro Redux", &["Nintendo Switch"]),
            ])
        });
        provider
            .expect_get_details()
            .with(eq(2u64))
            .times(1)
            .returning(|id| Ok(Some(details(id, "Metro Redux"))));

        let matcher = TitleMatcher::new(Arc::new(provider));
        let found = matcher.find_best_match("Metro", Some("switch")).await;

        assert_eq!(found.unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_platform_hint_ignored_when_nothing_matches() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_search().returning(|_, _| {
            Ok(vec![result_with_platforms(
                1,
                "Metro Exodus",
                &["PC (Microsoft Windows)"],
            )])
        });
        provider
            .expect_get_details()
            .with(eq(1u64))
            .times(1)
            .returning(|id| Ok(Some(details(id, "Metro Exodus"))));

        let matcher = TitleMatcher::new(Arc::new(provider));
        let found = matcher.find_best_match("Metro", Some("dreamcast")).await;

        assert_eq!(found.unwrap().id, 1);
    }

    // Failure semantics

    #[tokio::test]
    async fn test_upstream_failure_is_absorbed_by_find_best_match() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_search()
            .returning(|_, _| Err(AppError::ExternalServiceError("catalog down".to_string())));
        provider.expect_get_details().times(0);

        let matcher = TitleMatcher::new(Arc::new(provider));
        assert!(matcher.find_best_match("Hades", None).await.is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates_from_match_title() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_search()
            .returning(|_, _| Err(AppError::ExternalServiceError("catalog down".to_string())));

        let matcher = TitleMatcher::new(Arc::new(provider));
        assert!(matcher.match_title("Hades", None).await.is_err());
    }

    #[tokio::test]
    async fn test_stale_id_resolves_to_no_match() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_, _| Ok(vec![CatalogSearchResult::new(42, "Hades")]));
        provider
            .expect_get_details()
            .with(eq(42u64))
            .times(1)
            .returning(|_| Ok(None));

        let matcher = TitleMatcher::new(Arc::new(provider));
        assert!(matcher.find_best_match("Hades", None).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_title_degrades_to_no_match() {
        let mut provider = MockCatalogProvider::new();
        // No variants and no partial-search words: the provider is never hit.
        provider.expect_search().times(0);
        provider.expect_get_details().times(0);

        let matcher = TitleMatcher::new(Arc::new(provider));
        assert!(matcher.find_best_match("", None).await.is_none());
    }
}
