use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::types::GameDetails;

/// The reconcilable field view of a canonical library record.
///
/// Persistence of the record itself belongs to the surrounding application;
/// the engine only decides which fields a fresh enrichment payload may
/// overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameFields {
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub genres: Vec<String>,
    pub rating: Option<f32>,
}

/// Apply a fetched enrichment payload onto the current field values.
///
/// Each field updates independently, and only when the new value is present
/// AND (the current value is absent OR `force` is set). The genre list counts
/// as absent only when empty. Returns the names of the fields that changed.
pub fn reconcile_fields(
    current: &mut GameFields,
    fetched: &GameDetails,
    force: bool,
) -> Vec<&'static str> {
    let mut updated = Vec::new();

    if fetched.description.is_some() && (current.description.is_none() || force) {
        current.description = fetched.description.clone();
        updated.push("description");
    }
    if fetched.cover_url.is_some() && (current.cover_url.is_none() || force) {
        current.cover_url = fetched.cover_url.clone();
        updated.push("cover_url");
    }
    if fetched.release_date.is_some() && (current.release_date.is_none() || force) {
        current.release_date = fetched.release_date;
        updated.push("release_date");
    }
    if fetched.developer.is_some() && (current.developer.is_none() || force) {
        current.developer = fetched.developer.clone();
        updated.push("developer");
    }
    if fetched.publisher.is_some() && (current.publisher.is_none() || force) {
        current.publisher = fetched.publisher.clone();
        updated.push("publisher");
    }
    if !fetched.genres.is_empty() && (current.genres.is_empty() || force) {
        current.genres = fetched.genres.clone();
        updated.push("genres");
    }
    if fetched.rating.is_some() && (current.rating.is_none() || force) {
        current.rating = fetched.rating;
        updated.push("rating");
    }

    updated
}
