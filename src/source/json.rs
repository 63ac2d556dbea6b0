//! Record source backed by a JSON document on disk

use super::{FileRecordSource, SourceResult};
use crate::record::FileRecord;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Accepted document shapes: a bare array, or a search result
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordDocument {
    Search {
        #[serde(rename = "@graph")]
        graph: Vec<FileRecord>,
    },
    List(Vec<FileRecord>),
}

/// Parse records from either a JSON array or an object with an `@graph` array
pub fn parse_records(json: &str) -> SourceResult<Vec<FileRecord>> {
    let records = match serde_json::from_str(json)? {
        RecordDocument::Search { graph } => graph,
        RecordDocument::List(records) => records,
    };
    Ok(records)
}

/// In-memory records loaded from a JSON file
#[derive(Debug, Default)]
pub struct JsonFileSource {
    records: Vec<FileRecord>,
    by_id: HashMap<String, usize>,
}

impl JsonFileSource {
    pub fn from_records(records: Vec<FileRecord>) -> Self {
        let by_id = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        Self { records, by_id }
    }

    pub fn open(path: &Path) -> SourceResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_records(parse_records(&json)?))
    }

    /// Every record, in document order
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl FileRecordSource for JsonFileSource {
    async fn fetch_by_ids(&self, ids: &[String]) -> SourceResult<Vec<FileRecord>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .map(|&i| self.records[i].clone())
            .collect())
    }
}
