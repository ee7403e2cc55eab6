use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::errors::{AppError, AppResult};

/// One candidate returned by probing the catalog's keyword search.
///
/// Parsed and validated from the provider's loosely-typed payload right at
/// the boundary; everything downstream can rely on `id` and `name` being
/// present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSearchResult {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl CatalogSearchResult {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            platforms: Vec::new(),
        }
    }

    /// Validate a single raw search entry.
    ///
    /// Accepts `platforms` as an array of strings or of `{ "name": ... }`
    /// objects, since the catalog returns either depending on query expansion.
    pub fn from_value(value: &Value) -> AppResult<Self> {
        let id = value
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| AppError::SerializationError("search result missing id".to_string()))?;

        let name = value
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                AppError::SerializationError(format!("search result {} missing name", id))
            })?;

        Ok(Self {
            id,
            name: name.to_string(),
            platforms: string_list(value.get("platforms")),
        })
    }

    /// Validate a whole search response, skipping malformed entries.
    pub fn from_value_list(values: &[Value]) -> Vec<Self> {
        values
            .iter()
            .filter_map(|v| match Self::from_value(v) {
                Ok(result) => Some(result),
                Err(e) => {
                    log::warn!("Skipping malformed search entry: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Full catalog metadata for one game, fetched after a match decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetails {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl GameDetails {
    /// Validate a raw details payload.
    ///
    /// `release_date` is accepted either as epoch seconds
    /// (`first_release_date`, the catalog's native shape) or as an ISO date
    /// string under `release_date`.
    pub fn from_value(value: &Value) -> AppResult<Self> {
        let id = value
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| AppError::SerializationError("details missing id".to_string()))?;

        let name = value
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::SerializationError(format!("details {} missing name", id)))?;

        let release_date = match value.get("first_release_date").and_then(Value::as_i64) {
            Some(epoch) => chrono::DateTime::from_timestamp(epoch, 0).map(|dt| dt.date_naive()),
            None => match value.get("release_date").and_then(Value::as_str) {
                Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?),
                None => None,
            },
        };

        Ok(Self {
            id,
            name: name.to_string(),
            description: opt_string(value.get("summary").or_else(|| value.get("description"))),
            cover_url: opt_string(
                value
                    .get("cover_url")
                    .or_else(|| value.get("cover").and_then(|c| c.get("url"))),
            ),
            release_date,
            developer: opt_string(value.get("developer")),
            publisher: opt_string(value.get("publisher")),
            genres: string_list(value.get("genres")),
            rating: value.get("rating").and_then(Value::as_f64).map(|r| r as f32),
            platforms: string_list(value.get("platforms")),
        })
    }
}

fn opt_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect()
}
