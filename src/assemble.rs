use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::classify::{Category, Classification};
use crate::config::GroupDef;
use crate::naming::{combined_name, group_file_name};
use crate::tools::{MergeError, Merger};

/// One staged input file of a run.
#[derive(Debug, Clone, Serialize)]
pub struct InputDocument {
    pub original_name: String,
    pub path: PathBuf,
    pub classification: Classification,
    /// Hex SHA-256 of the file bytes.
    pub sha256: String,
    #[serde(skip)]
    pub extracted_text: String,
    /// Set when the text layer could not be read.
    pub read_error: Option<String>,
}

impl InputDocument {
    fn sort_key(&self) -> (u32, &str) {
        (self.classification.rank, self.original_name.as_str())
    }
}

/// A group with its members in merge order; `output` is `None` when empty.
#[derive(Debug, Clone, Serialize)]
pub struct GroupMembership {
    pub index: u32,
    pub category: Category,
    pub label: String,
    pub members: Vec<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assembly {
    pub groups: Vec<GroupMembership>,
    pub combined: String,
    pub combined_order: Vec<String>,
}

/// Documents sorted by `(rank, original name)`.
pub fn merge_order(documents: &[InputDocument]) -> Vec<&InputDocument> {
    let mut sorted: Vec<&InputDocument> = documents.iter().collect();
    sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    sorted
}

/// Group membership in definition order without touching the filesystem.
pub fn group_members(documents: &[InputDocument], groups: &[GroupDef], base_name: &str) -> Vec<GroupMembership> {
    let mut ordered: Vec<&GroupDef> = groups.iter().collect();
    ordered.sort_by_key(|g| g.index);
    ordered
        .into_iter()
        .map(|g| {
            let members: Vec<String> = merge_order(documents)
                .into_iter()
                .filter(|d| d.classification.group == g.index)
                .map(|d| d.original_name.clone())
                .collect();
            let output = (!members.is_empty()).then(|| group_file_name(g.index, &g.label, base_name));
            GroupMembership { index: g.index, category: g.category, label: g.label.clone(), members, output }
        })
        .collect()
}

/// Merge every non-empty group and the combined document into `out_dir`.
/// The first failing merge aborts the whole assembly.
pub fn assemble(
    documents: &[InputDocument],
    groups: &[GroupDef],
    base_name: &str,
    out_dir: &Path,
    merger: &dyn Merger,
) -> Result<Assembly, MergeError> {
    let memberships = group_members(documents, groups, base_name);

    for group in &memberships {
        let Some(output) = &group.output else {
            info!(tool = "assemble", group = group.index, label = %group.label, "empty group, nothing to merge");
            continue;
        };
        let inputs: Vec<PathBuf> = merge_order(documents)
            .into_iter()
            .filter(|d| d.classification.group == group.index)
            .map(|d| d.path.clone())
            .collect();
        merger.merge(&inputs, &out_dir.join(output))?;
        info!(tool = "assemble", group = group.index, file = %output, members = inputs.len(), "group merged");
    }

    let ordered = merge_order(documents);
    let combined = combined_name(base_name);
    let inputs: Vec<PathBuf> = ordered.iter().map(|d| d.path.clone()).collect();
    merger.merge(&inputs, &out_dir.join(&combined))?;
    info!(tool = "assemble", file = %combined, members = inputs.len(), "combined document merged");

    Ok(Assembly {
        groups: memberships,
        combined,
        combined_order: ordered.into_iter().map(|d| d.original_name.clone()).collect(),
    })
}
