use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Category;

/// One entry of the ordered keyword table. Lower rank is tested first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankRule {
    pub rank: u32,
    pub keywords: Vec<String>,
}

/// A merge bucket. `index` fixes both the output prefix and report order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupDef {
    pub index: u32,
    pub category: Category,
    pub label: String,
    #[serde(default)]
    pub ranks: Vec<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    #[default]
    Upper,
    Lower,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signature {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Signature block under the approval opinion.
    pub opinion_signature: Signature,
    /// Signature block under the publication order.
    pub publication_signature: Signature,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            opinion_signature: Signature { lines: vec!["Gerente II".into()] },
            publication_signature: Signature { lines: vec!["Coordenador I".into(), "E/4a.CRE".into()] },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_rules")]
    pub rules: Vec<RankRule>,
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupDef>,
    #[serde(default)]
    pub name_case: NameCase,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            groups: default_groups(),
            name_case: NameCase::default(),
            city: default_city(),
            dispatch: DispatchConfig::default(),
        }
    }
}

fn default_city() -> String {
    "Rio de Janeiro".to_string()
}

fn rule(rank: u32, keywords: &[&str]) -> RankRule {
    RankRule { rank, keywords: keywords.iter().map(|k| k.to_string()).collect() }
}

pub fn default_rules() -> Vec<RankRule> {
    vec![
        rule(1, &["oficio"]),
        rule(2, &["demonstrativo"]),
        rule(3, &["conciliacao"]),
        rule(4, &["extrato conta corrente", "extratos conta corrente", "conta_corrente"]),
        rule(5, &["extrato aplicacao", "extratos aplicacao", "extratos aplicacoes", "aplicacao"]),
        rule(6, &["nf", "nota", "comprovante", "comprovantes", "orcamento", "orcamentos", "pagamento"]),
        rule(7, &["consolidacao", "pesquisa"]),
        rule(8, &["planejamento", "ata"]),
        rule(9, &["bb agil", "bb_agil", "declaracao", "agil"]),
        rule(10, &["parecer"]),
        rule(11, &["justificativa"]),
    ]
}

pub fn default_groups() -> Vec<GroupDef> {
    let group = |index: u32, category: Category, label: &str, ranks: &[u32]| GroupDef {
        index,
        category,
        label: label.to_string(),
        ranks: ranks.to_vec(),
    };
    vec![
        group(1, Category::Instruction, "PECAS_INSTRUCAO", &[1, 2, 11]),
        group(2, Category::ExpenseProof, "COMPROVACAO_DESPESA", &[6, 7]),
        group(3, Category::StatementReconciliation, "EXTRATOS_CONCILIACAO", &[3, 4, 5]),
        group(4, Category::Declaration, "DECLARACOES_PARECERES", &[9, 10]),
        group(5, Category::Other, "ATAS_RELATORIOS_CEC", &[8]),
    ]
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Load and validate a YAML config. Missing sections fall back to defaults.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        Config::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Config, ConfigError> {
        let cfg: Config = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::Invalid("rules must not be empty".into()));
        }
        let mut ranks = HashSet::new();
        for r in &self.rules {
            if r.rank == 0 || r.rank >= crate::classify::FALLBACK_RANK {
                return Err(ConfigError::Invalid(format!("rank {} out of range 1..=99", r.rank)));
            }
            if !ranks.insert(r.rank) {
                return Err(ConfigError::Invalid(format!("duplicate rank {}", r.rank)));
            }
            if r.keywords.is_empty() || r.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!("rank {} has an empty keyword", r.rank)));
            }
        }

        let mut indices = HashSet::new();
        let mut owned = HashSet::new();
        let mut others = 0usize;
        for g in &self.groups {
            if !indices.insert(g.index) {
                return Err(ConfigError::Invalid(format!("duplicate group index {}", g.index)));
            }
            if g.label.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("group {} has an empty label", g.index)));
            }
            if g.category == Category::Other {
                others += 1;
            }
            for rank in &g.ranks {
                if !owned.insert(*rank) {
                    return Err(ConfigError::Invalid(format!("rank {} owned by more than one group", rank)));
                }
            }
        }
        if others != 1 {
            return Err(ConfigError::Invalid("exactly one OTHER group is required".into()));
        }
        Ok(())
    }
}
