//! One-shot load of the static recipe dataset into the `recipes` table.

use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::recipes::repo::{self, NewRecipe};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("dataset is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dataset must be a json array or object of records, got {0}")]
    Shape(&'static str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Replaces bare `NaN` tokens with `null` so the document parses as JSON.
/// Text inside string literals is left alone.
pub fn sanitize_nan(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match (escaped, b) {
                (true, _) => escaped = false,
                (false, b'\\') => escaped = true,
                (false, b'"') => in_string = false,
                _ => {}
            }
        } else if b == b'"' {
            in_string = true;
        } else if bytes[i..].starts_with(b"NaN") && is_token_edge(bytes, i, i + 3) {
            out.push_str(&raw[last..i]);
            out.push_str("null");
            i += 3;
            last = i;
            continue;
        }
        i += 1;
    }
    out.push_str(&raw[last..]);
    out
}

fn is_token_edge(bytes: &[u8], start: usize, end: usize) -> bool {
    let ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let before = start == 0 || !ident(bytes[start - 1]);
    let after = end >= bytes.len() || !ident(bytes[end]);
    before && after
}

/// Records of the dataset: either a top-level array, or an object keyed by
/// row index.
pub fn parse_dataset(raw: &str) -> Result<Vec<Value>, IngestError> {
    match serde_json::from_str::<Value>(&sanitize_nan(raw))? {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
            Ok(entries.into_iter().map(|(_, v)| v).collect())
        }
        Value::Null => Err(IngestError::Shape("null")),
        Value::Bool(_) => Err(IngestError::Shape("a boolean")),
        Value::Number(_) => Err(IngestError::Shape("a number")),
        Value::String(_) => Err(IngestError::Shape("a string")),
    }
}

fn finite(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn minutes(v: Option<&Value>) -> Option<i64> {
    finite(v).map(|n| n.round() as i64)
}

fn text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerces one raw record into an insertable row. Returns `None` for
/// records without a string title.
pub fn normalize(record: &Value) -> Option<NewRecipe> {
    let title = record.get("title")?.as_str()?.to_string();
    let nutrients = match record.get("nutrients") {
        None | Some(Value::Null) => None,
        Some(v @ Value::Object(_)) => Some(v.to_string()),
        Some(other) => {
            warn!(title = %title, nutrients = %other, "dropping non-object nutrients");
            None
        }
    };
    Some(NewRecipe {
        cuisine: text(record.get("cuisine")),
        title,
        rating: finite(record.get("rating")),
        prep_time: minutes(record.get("prep_time")),
        cook_time: minutes(record.get("cook_time")),
        total_time: minutes(record.get("total_time")),
        description: text(record.get("description")),
        nutrients,
        serves: text(record.get("serves")),
    })
}

/// Inserts every record of `raw` in a single transaction.
#[instrument(skip(db, raw), fields(bytes = raw.len()))]
pub async fn ingest_str(db: &SqlitePool, raw: &str) -> anyhow::Result<IngestReport> {
    let records = parse_dataset(raw)?;
    let mut report = IngestReport::default();

    let mut tx = db.begin().await.context("begin ingest transaction")?;
    for (idx, record) in records.iter().enumerate() {
        match normalize(record) {
            Some(recipe) => {
                repo::insert(&mut tx, &recipe)
                    .await
                    .with_context(|| format!("insert record {}", idx))?;
                report.inserted += 1;
            }
            None => {
                warn!(idx, "skipping record without a title");
                report.skipped += 1;
            }
        }
    }
    tx.commit().await.context("commit ingest transaction")?;

    info!(inserted = report.inserted, skipped = report.skipped, "dataset ingested");
    Ok(report)
}

pub async fn ingest_file(db: &SqlitePool, path: impl AsRef<Path>) -> anyhow::Result<IngestReport> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read dataset {}", path.display()))?;
    ingest_str(db, &raw)
        .await
        .with_context(|| format!("ingest dataset {}", path.display()))
}

/// Startup entry point honoring `INGEST_SKIP_IF_POPULATED`.
pub async fn run(
    db: &SqlitePool,
    path: impl AsRef<Path>,
    skip_if_populated: bool,
) -> anyhow::Result<IngestReport> {
    if skip_if_populated {
        let existing = repo::count(db).await?;
        if existing > 0 {
            info!(existing, "recipes table already populated; skipping ingest");
            return Ok(IngestReport::default());
        }
    }
    ingest_file(db, path).await
}
