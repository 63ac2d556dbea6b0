//! Memoizing decorator over another record source

use super::{FileRecordSource, SourceResult};
use crate::record::FileRecord;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;

/// Remembers every id it has looked up, including ids the inner source did
/// not know, so repeated lookups (opening the same coalesced group twice)
/// never go back to the backend
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    cache: DashMap<String, Option<FileRecord>>,
}

impl<S: FileRecordSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Number of ids with a cached answer
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: FileRecordSource> FileRecordSource for CachedSource<S> {
    async fn fetch_by_ids(&self, ids: &[String]) -> SourceResult<Vec<FileRecord>> {
        let mut found = Vec::new();
        let mut misses = Vec::new();
        for id in ids {
            match self.cache.get(id) {
                Some(entry) => found.extend(entry.value().clone()),
                None => misses.push(id.clone()),
            }
        }
        if misses.is_empty() {
            return Ok(found);
        }

        // Failed lookups are not cached
        let fetched = self.inner.fetch_by_ids(&misses).await?;
        let mut by_id: HashMap<String, FileRecord> =
            fetched.into_iter().map(|f| (f.id.clone(), f)).collect();
        for id in misses {
            let record = by_id.remove(&id);
            found.extend(record.clone());
            self.cache.insert(id, record);
        }
        Ok(found)
    }
}
