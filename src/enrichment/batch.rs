use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::matching::matcher::TitleMatcher;
use crate::matching::reconcile::reconcile_fields;
use crate::shared::utils::logger::{LogContext, TimedOperation};

use super::progress::{EnrichmentEvent, ProgressEmitter};
use super::types::{EnrichedGame, EnrichmentSummary, LibraryGame};

/// Pacing and behavior of a batch run.
///
/// Games within a group are dispatched concurrently; `group_delay` sleeps
/// between consecutive groups so the catalog's rate limit holds even though
/// each match fans out into several search probes.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub group_size: usize,
    pub group_delay: Duration,
    /// Forwarded to [`reconcile_fields`]: overwrite populated fields too.
    pub force_update: bool,
    /// Capacity of the progress event channel.
    pub event_buffer: usize,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self {
            group_size: 4,
            group_delay: Duration::from_millis(1000),
            force_update: false,
            event_buffer: 64,
        }
    }

    pub fn group_size(mut self, size: usize) -> Self {
        self.group_size = size;
        self
    }

    pub fn group_delay(mut self, delay: Duration) -> Self {
        self.group_delay = delay;
        self
    }

    pub fn force_update(mut self, force: bool) -> Self {
        self.force_update = force;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.group_size == 0 {
            return Err("group_size must be > 0".to_string());
        }
        if self.event_buffer == 0 {
            return Err("event_buffer must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a spawned batch run: pull `events` for progress, await `handle`
/// for the collected results and summary. Cancellation is not supported;
/// callers needing a deadline wrap the await.
pub struct EnrichmentRun {
    pub events: mpsc::Receiver<EnrichmentEvent>,
    pub handle: JoinHandle<(Vec<EnrichedGame>, EnrichmentSummary)>,
}

/// Runs the matcher over a whole library in rate-limited groups.
pub struct BatchEnricher {
    matcher: Arc<TitleMatcher>,
    config: BatchConfig,
}

impl BatchEnricher {
    pub fn new(matcher: Arc<TitleMatcher>) -> Self {
        Self {
            matcher,
            config: BatchConfig::default(),
        }
    }

    pub fn with_config(matcher: Arc<TitleMatcher>, config: BatchConfig) -> Self {
        Self { matcher, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Start enriching `games` on the runtime and return immediately.
    pub fn spawn(&self, games: Vec<LibraryGame>) -> EnrichmentRun {
        let (tx, rx) = mpsc::channel(self.config.event_buffer);
        let matcher = Arc::clone(&self.matcher);
        let config = self.config.clone();

        let handle =
            tokio::spawn(
                async move { run_batch(matcher, config, games, ProgressEmitter::new(tx)).await },
            );

        EnrichmentRun { events: rx, handle }
    }
}

async fn run_batch(
    matcher: Arc<TitleMatcher>,
    config: BatchConfig,
    games: Vec<LibraryGame>,
    emitter: ProgressEmitter,
) -> (Vec<EnrichedGame>, EnrichmentSummary) {
    let timer = TimedOperation::new("batch_enrichment");
    let total = games.len();
    let group_count = if total == 0 {
        0
    } else {
        (total + config.group_size - 1) / config.group_size
    };

    emitter
        .emit(EnrichmentEvent::Started {
            total,
            groups: group_count,
        })
        .await;

    let mut enriched: Vec<EnrichedGame> = Vec::with_capacity(total);
    let mut summary = EnrichmentSummary {
        total,
        ..EnrichmentSummary::default()
    };
    let mut processed = 0usize;

    // Groups never overlap: the next one starts only after every game of the
    // current one finished and the inter-group delay elapsed.
    for (group_index, group) in games.chunks(config.group_size).enumerate() {
        emitter
            .emit(EnrichmentEvent::GroupStarted {
                group: group_index + 1,
                size: group.len(),
            })
            .await;

        let tasks = group
            .iter()
            .map(|game| enrich_single(&matcher, game, config.force_update));
        let results = futures::future::join_all(tasks).await;

        for item in results {
            processed += 1;
            LogContext::enrichment_progress(processed, total, &item.title);

            if item.details.is_some() {
                summary.matched += 1;
                summary.fields_updated += item.updated_fields.len();
            } else {
                summary.unmatched += 1;
            }

            emitter
                .emit(EnrichmentEvent::ItemProcessed {
                    current: processed,
                    total,
                    title: item.title.clone(),
                    catalog_id: item.details.as_ref().map(|d| d.id),
                    updated_fields: item.updated_fields.len(),
                })
                .await;
            enriched.push(item);
        }

        emitter
            .emit(EnrichmentEvent::GroupCompleted {
                group: group_index + 1,
                processed,
            })
            .await;

        if group_index + 1 < group_count {
            tokio::time::sleep(config.group_delay).await;
        }
    }

    emitter
        .emit(EnrichmentEvent::Completed {
            summary: summary.clone(),
        })
        .await;
    timer.finish_with_info(&format!("{}/{} matched", summary.matched, total));

    (enriched, summary)
}

/// Match one library entry and reconcile its fields. Matching failures were
/// already absorbed into `None` by the matcher; the batch never aborts.
async fn enrich_single(matcher: &TitleMatcher, game: &LibraryGame, force: bool) -> EnrichedGame {
    let details = matcher
        .find_best_match(&game.title, game.platform.as_deref())
        .await;

    let mut fields = game.fields.clone();
    let updated_fields = match &details {
        Some(payload) => reconcile_fields(&mut fields, payload, force)
            .into_iter()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    EnrichedGame {
        id: game.id,
        title: game.title.clone(),
        details,
        updated_fields,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_group_size() {
        let config = BatchConfig::new().group_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder_chaining() {
        let config = BatchConfig::new()
            .group_size(8)
            .group_delay(Duration::from_millis(250))
            .force_update(true);
        assert!(config.validate().is_ok());
        assert_eq!(config.group_size, 8);
        assert_eq!(config.group_delay, Duration::from_millis(250));
        assert!(config.force_update);
    }
}
