//! Assembly/annotation selection and the filter menu derived from a record set

use crate::record::{FileRecord, CATEGORY_RAW_DATA};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;

/// The assembly/annotation pair a graph is drawn for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssemblyFilter {
    pub assembly: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl AssemblyFilter {
    pub fn new(assembly: impl Into<String>) -> Self {
        Self {
            assembly: assembly.into(),
            annotation: None,
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        let annotation = annotation.into();
        self.annotation = (!annotation.is_empty()).then_some(annotation);
        self
    }

    /// Same assembly, and either both lack an annotation or both carry the
    /// same one
    pub fn matches(&self, file: &FileRecord) -> bool {
        let wanted = self.annotation.as_deref().filter(|a| !a.is_empty());
        file.assembly.as_deref() == Some(self.assembly.as_str()) && file.annotation() == wanted
    }
}

impl std::fmt::Display for AssemblyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.annotation {
            Some(annotation) => write!(f, "{} {}", self.assembly, annotation),
            None => write!(f, "{}", self.assembly),
        }
    }
}

/// Drop records that never enter a graph (archived files)
pub fn graph_candidates<'a>(
    files: impl IntoIterator<Item = &'a FileRecord>,
) -> impl Iterator<Item = &'a FileRecord> {
    files.into_iter().filter(|f| !f.is_archived())
}

/// Ordered, de-duplicated filter menu for a record set
///
/// Every processed file with an assembly contributes, archived ones
/// included. Assemblies
/// missing from `priority` come first (alphabetically), then the listed ones
/// in priority order. Within an assembly, numbered annotations (`V24`, `M4`)
/// come first, highest number first.
pub fn collect_filter_options<'a>(
    files: impl IntoIterator<Item = &'a FileRecord>,
    priority: &[String],
) -> Vec<AssemblyFilter> {
    let mut seen = HashSet::new();
    let mut options: Vec<AssemblyFilter> = files
        .into_iter()
        .filter(|f| f.output_category.as_deref() != Some(CATEGORY_RAW_DATA))
        .filter_map(|f| {
            let assembly = f.assembly.as_deref().filter(|a| !a.is_empty())?;
            let mut option = AssemblyFilter::new(assembly);
            if let Some(annotation) = f.annotation() {
                option = option.with_annotation(annotation);
            }
            Some(option)
        })
        .filter(|option| seen.insert(option.clone()))
        .collect();

    options.sort_by(|a, b| compare_options(a, b, priority));
    options
}

fn compare_options(a: &AssemblyFilter, b: &AssemblyFilter, priority: &[String]) -> Ordering {
    // None sorts before Some: unlisted assemblies lead
    let rank = |o: &AssemblyFilter| priority.iter().position(|p| p == &o.assembly);
    let annotation_rank = |o: &AssemblyFilter| match o.annotation.as_deref().and_then(annotation_number) {
        Some(n) => (0, Reverse(n)),
        None => (1, Reverse(0)),
    };

    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.assembly.cmp(&b.assembly))
        .then_with(|| annotation_rank(a).cmp(&annotation_rank(b)))
        .then_with(|| a.annotation.cmp(&b.annotation))
}

/// Release number of an annotation: the digits after an uppercase prefix
fn annotation_number(annotation: &str) -> Option<u64> {
    let rest = annotation.trim_start_matches(|c: char| c.is_ascii_uppercase());
    if rest.len() == annotation.len() {
        return None;
    }
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
