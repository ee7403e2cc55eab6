use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::types::GameDetails;
use crate::matching::reconcile::GameFields;

/// One library entry submitted for enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryGame {
    pub id: Uuid,
    pub title: String,
    /// Optional platform hint forwarded to the matcher ("pc", "switch", ...).
    pub platform: Option<String>,
    pub fields: GameFields,
}

impl LibraryGame {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            platform: None,
            fields: GameFields::default(),
        }
    }
}

/// Per-entry outcome of a batch run. `details` is `None` when no catalog
/// entry matched; `fields` holds the reconciled field values either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedGame {
    pub id: Uuid,
    pub title: String,
    pub details: Option<GameDetails>,
    pub updated_fields: Vec<String>,
    pub fields: GameFields,
}

/// Aggregate counts for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub fields_updated: usize,
}
