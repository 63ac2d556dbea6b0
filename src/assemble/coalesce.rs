//! Coalescing of contributing files that share the same consumers
//!
//! Datasets often reference dozens of near-identical external reference or
//! control files. Those consumed by exactly the same set of dataset files
//! collapse into a single summary node once the group is large enough.

use super::index::DerivationIndex;
use crate::record::Dataset;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Smallest group that collapses into a summary node
pub const MINIMUM_COALESCE_COUNT: usize = 5;

/// Hex digits of the consumer hash kept in a group key
const GROUP_KEY_LEN: usize = 16;

/// A materialized group of contributing files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoalescingGroup<'a> {
    /// Stable key derived from the consumer set
    pub key: String,
    /// Contributing file ids in the group, sorted
    pub members: Vec<&'a str>,
}

/// How used contributing files are rendered
#[derive(Debug, Default)]
pub struct Coalescing<'a> {
    groups: Vec<CoalescingGroup<'a>>,
    coalesced: HashMap<&'a str, usize>,
    individual: BTreeSet<&'a str>,
}

impl<'a> Coalescing<'a> {
    /// Partition the dataset's contributing files that something in the
    /// selection derives from
    pub fn partition(
        dataset: &'a Dataset,
        derivations: &DerivationIndex<'_>,
        minimum: usize,
    ) -> Self {
        let used: BTreeSet<&'a str> = dataset
            .contributing_files
            .iter()
            .map(String::as_str)
            .filter(|id| derivations.is_derived_from(id))
            .collect();

        let mut by_consumers: BTreeMap<String, Vec<&'a str>> = BTreeMap::new();
        for id in used {
            let mut consumers: Vec<&str> = derivations
                .consumers(id)
                .iter()
                .map(|f| f.id.as_str())
                .collect();
            consumers.sort_unstable();
            consumers.dedup();
            by_consumers.entry(consumers.join(",")).or_default().push(id);
        }

        let mut result = Self::default();
        for (consumers, members) in by_consumers {
            if members.len() >= minimum {
                let idx = result.groups.len();
                result.coalesced.extend(members.iter().map(|m| (*m, idx)));
                result.groups.push(CoalescingGroup {
                    key: group_key(&consumers),
                    members,
                });
            } else {
                result.individual.extend(members);
            }
        }
        result
    }

    /// The group a contributing file was folded into
    pub fn group_of(&self, id: &str) -> Option<&CoalescingGroup<'a>> {
        self.coalesced.get(id).map(|&idx| &self.groups[idx])
    }

    pub fn is_coalesced(&self, id: &str) -> bool {
        self.coalesced.contains_key(id)
    }

    /// True for used contributing files rendered as their own node
    pub fn is_individual(&self, id: &str) -> bool {
        self.individual.contains(id)
    }

    pub fn groups(&self) -> &[CoalescingGroup<'a>] {
        &self.groups
    }

    pub fn individual(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.individual.iter().copied()
    }
}

/// Short hex digest of a joined consumer list
fn group_key(consumers: &str) -> String {
    let digest = Sha256::digest(consumers.as_bytes());
    let mut key: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    key.truncate(GROUP_KEY_LEN);
    key
}
