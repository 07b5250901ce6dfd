use serde::{Deserialize, Serialize};

use crate::config::{GroupDef, RankRule};
use crate::text::{fold_ascii, strip_whitespace};

/// Rank given to files no keyword rule recognises; they sort last.
pub const FALLBACK_RANK: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Instruction,
    ExpenseProof,
    StatementReconciliation,
    Declaration,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Instruction => "INSTRUCTION",
            Category::ExpenseProof => "EXPENSE_PROOF",
            Category::StatementReconciliation => "STATEMENT_RECONCILIATION",
            Category::Declaration => "DECLARATION",
            Category::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub rank: u32,
    pub category: Category,
    /// Index of the group the file is merged into.
    pub group: u32,
}

/// Keyword table with its keywords pre-normalised, plus the rank → group mapping.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(u32, Vec<String>)>,
    groups: Vec<GroupDef>,
}

impl Classifier {
    /// Rules are tested in ascending rank regardless of the order they were given in.
    pub fn new(rules: &[RankRule], groups: &[GroupDef]) -> Self {
        let mut rules: Vec<(u32, Vec<String>)> = rules
            .iter()
            .map(|r| (r.rank, r.keywords.iter().map(|k| normalize_name(k)).collect()))
            .collect();
        rules.sort_by_key(|(rank, _)| *rank);
        let mut groups = groups.to_vec();
        groups.sort_by_key(|g| g.index);
        Self { rules, groups }
    }

    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self::new(&cfg.rules, &cfg.groups)
    }

    /// Ordering rank of a filename: first rule with a keyword inside the name wins.
    pub fn rank(&self, filename: &str) -> u32 {
        let raw = strip_whitespace(&filename.to_lowercase());
        let folded = normalize_name(filename);
        for (rank, keywords) in &self.rules {
            if keywords.iter().any(|kw| raw.contains(kw.as_str()) || folded.contains(kw.as_str())) {
                return *rank;
            }
        }
        FALLBACK_RANK
    }

    /// The group owning `rank`, or the OTHER group when none does.
    pub fn group_for(&self, rank: u32) -> Option<&GroupDef> {
        self.groups
            .iter()
            .find(|g| g.ranks.contains(&rank))
            .or_else(|| self.groups.iter().find(|g| g.category == Category::Other))
    }

    pub fn classify(&self, filename: &str) -> Classification {
        let rank = self.rank(filename);
        match self.group_for(rank) {
            Some(g) => Classification { rank, category: g.category, group: g.index },
            None => Classification { rank, category: Category::Other, group: 0 },
        }
    }
}

/// Lower-case, strip diacritics and drop whitespace.
pub fn normalize_name(s: &str) -> String {
    strip_whitespace(&fold_ascii(&s.to_lowercase()))
}
