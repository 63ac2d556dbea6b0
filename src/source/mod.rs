//! File record sources
//!
//! The assembler never performs I/O. Records reach it through a
//! [`FileRecordSource`]: the dataset's own file list plus a batched lookup
//! for related files that are only referenced by id.

mod cache;
mod json;

pub use cache::CachedSource;
pub use json::{parse_records, JsonFileSource};

use crate::record::FileRecord;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Ids per batched lookup when nothing else is configured
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Errors from a record source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("source error: {0}")]
    Backend(String),
}

/// Result type for record sources
pub type SourceResult<T> = Result<T, SourceError>;

/// Batched lookup of file records by id
///
/// Ids the source cannot resolve are simply absent from the result; only a
/// failure of the whole request is an error.
#[async_trait]
pub trait FileRecordSource: Send + Sync {
    async fn fetch_by_ids(&self, ids: &[String]) -> SourceResult<Vec<FileRecord>>;
}

/// Fetch the related files not already loaded
///
/// Ids are split into chunks of at most `chunk_size` and all chunks are
/// requested at once. A failed chunk contributes nothing; the rest still
/// come back.
pub async fn fetch_related(
    source: &dyn FileRecordSource,
    related_ids: &[String],
    loaded: &[FileRecord],
    chunk_size: usize,
) -> Vec<FileRecord> {
    let loaded: HashSet<&str> = loaded.iter().map(|f| f.id.as_str()).collect();
    let mut seen = HashSet::new();
    let wanted: Vec<String> = related_ids
        .iter()
        .filter(|id| !loaded.contains(id.as_str()) && seen.insert(id.as_str()))
        .cloned()
        .collect();
    if wanted.is_empty() {
        return Vec::new();
    }

    let chunks: Vec<&[String]> = wanted.chunks(chunk_size.max(1)).collect();
    debug!(ids = wanted.len(), chunks = chunks.len(), "fetching related files");

    let results = join_all(chunks.iter().map(|chunk| source.fetch_by_ids(chunk))).await;
    results
        .into_iter()
        .enumerate()
        .flat_map(|(chunk, result)| match result {
            Ok(files) => files,
            Err(e) => {
                warn!(chunk, error = %e, "related file chunk failed, treating as empty");
                Vec::new()
            }
        })
        .collect()
}
