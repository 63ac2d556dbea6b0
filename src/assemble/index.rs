//! Lookup structures over the record set: id index, reverse derivations
//! and memoized derivation keys

use super::filter::AssemblyFilter;
use crate::record::FileRecord;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// id -> record over every supplied record
///
/// Duplicate ids resolve last-write-wins.
#[derive(Debug, Default)]
pub struct FileIndex<'a> {
    files: HashMap<&'a str, &'a FileRecord>,
}

impl<'a> FileIndex<'a> {
    pub fn build(files: impl IntoIterator<Item = &'a FileRecord>) -> Self {
        let mut index = HashMap::new();
        for file in files {
            if index.insert(file.id.as_str(), file).is_some() {
                debug!(file_id = %file.id, "duplicate file id, keeping the later record");
            }
        }
        Self { files: index }
    }

    pub fn get(&self, id: &str) -> Option<&'a FileRecord> {
        self.files.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Files eligible for the selected filter, and who derives from what
///
/// A matching file is eligible unless it names a step but lists no inputs:
/// such a file cannot be connected to anything.
#[derive(Debug, Default)]
pub struct DerivationIndex<'a> {
    eligible: Vec<&'a FileRecord>,
    derived_by: BTreeMap<&'a str, Vec<&'a FileRecord>>,
}

impl<'a> DerivationIndex<'a> {
    pub fn build(files: &[&'a FileRecord], filter: &AssemblyFilter) -> Self {
        let mut eligible: Vec<&'a FileRecord> = Vec::new();
        let mut positions: HashMap<&'a str, usize> = HashMap::new();
        for &file in files {
            if !filter.matches(file) || (file.step().is_some() && !file.has_derivations()) {
                continue;
            }
            match positions.get(file.id.as_str()) {
                Some(&pos) => eligible[pos] = file,
                None => {
                    positions.insert(file.id.as_str(), eligible.len());
                    eligible.push(file);
                }
            }
        }

        let mut derived_by: BTreeMap<&'a str, Vec<&'a FileRecord>> = BTreeMap::new();
        for &file in &eligible {
            for target in &file.derived_from {
                let consumers = derived_by.entry(target.as_str()).or_default();
                if consumers.last().map(|c| c.id != file.id).unwrap_or(true) {
                    consumers.push(file);
                }
            }
        }

        Self {
            eligible,
            derived_by,
        }
    }

    /// Matching files that may appear in the graph, islands included
    pub fn eligible(&self) -> &[&'a FileRecord] {
        &self.eligible
    }

    /// Eligible files listing `id` in their derivations
    pub fn consumers(&self, id: &str) -> &[&'a FileRecord] {
        self.derived_by.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when some eligible file derives from `id`
    pub fn is_derived_from(&self, id: &str) -> bool {
        self.derived_by.contains_key(id)
    }

    /// Every id that appears in an eligible file's derivations
    pub fn targets(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.derived_by.keys().copied()
    }
}

/// Sorted, comma-joined derivation list: the identity of a file's inputs
pub fn derivation_key(derived_from: &[String]) -> String {
    let mut ids: Vec<&str> = derived_from.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.join(",")
}

/// Memoized [`derivation_key`] per file id
///
/// Lives beside the records instead of on them, so callers' records stay
/// untouched.
#[derive(Debug, Default)]
pub struct DerivationKeys<'a> {
    keys: HashMap<&'a str, String>,
}

impl<'a> DerivationKeys<'a> {
    pub fn key(&mut self, file: &'a FileRecord) -> &str {
        self.keys
            .entry(file.id.as_str())
            .or_insert_with(|| derivation_key(&file.derived_from))
    }
}
