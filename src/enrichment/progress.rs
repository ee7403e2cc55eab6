use serde::Serialize;
use tokio::sync::mpsc;

use crate::log_debug;

use super::types::EnrichmentSummary;

/// Progress of a batch run, delivered through the channel returned by
/// [`super::batch::BatchEnricher::spawn`]. The caller pulls events at its own
/// pace; a dropped receiver only discards progress, never the run itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EnrichmentEvent {
    Started {
        total: usize,
        groups: usize,
    },
    GroupStarted {
        group: usize,
        size: usize,
    },
    ItemProcessed {
        current: usize,
        total: usize,
        title: String,
        catalog_id: Option<u64>,
        updated_fields: usize,
    },
    GroupCompleted {
        group: usize,
        processed: usize,
    },
    Completed {
        summary: EnrichmentSummary,
    },
}

/// Sends progress events, tolerating a gone receiver.
pub(crate) struct ProgressEmitter {
    tx: mpsc::Sender<EnrichmentEvent>,
}

impl ProgressEmitter {
    pub(crate) fn new(tx: mpsc::Sender<EnrichmentEvent>) -> Self {
        Self { tx }
    }

    pub(crate) async fn emit(&self, event: EnrichmentEvent) -> bool {
        match self.tx.send(event).await {
            Ok(()) => true,
            Err(_) => {
                log_debug!("Progress receiver dropped, discarding event");
                false
            }
        }
    }
}
