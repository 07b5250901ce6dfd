//! Metadata extraction from the concatenated text layer of a case.
//!
//! Every fact has an ordered list of rules. Rules are tried in order and the
//! first one producing a validated value wins; a fact no rule matches stays
//! `None`. A rule never yields a partial capture.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::text::collapse_lines;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedFacts {
    pub pdde_type: Option<String>,
    pub year: Option<String>,
    pub school_name: Option<String>,
    pub president_name: Option<String>,
    pub process_number: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    PddeType,
    Year,
    SchoolName,
    PresidentName,
    ProcessNumber,
    TaxId,
}

impl FactKind {
    pub const ALL: [FactKind; 6] = [
        FactKind::PddeType,
        FactKind::Year,
        FactKind::SchoolName,
        FactKind::PresidentName,
        FactKind::ProcessNumber,
        FactKind::TaxId,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FactKind::PddeType => "Tipo de PDDE",
            FactKind::Year => "Exercício",
            FactKind::SchoolName => "Unidade escolar",
            FactKind::PresidentName => "Presidente do CEC",
            FactKind::ProcessNumber => "Processo",
            FactKind::TaxId => "CNPJ",
        }
    }
}

impl ExtractedFacts {
    pub fn get(&self, kind: FactKind) -> Option<&str> {
        let slot = match kind {
            FactKind::PddeType => &self.pdde_type,
            FactKind::Year => &self.year,
            FactKind::SchoolName => &self.school_name,
            FactKind::PresidentName => &self.president_name,
            FactKind::ProcessNumber => &self.process_number,
            FactKind::TaxId => &self.tax_id,
        };
        slot.as_deref()
    }

    pub fn missing(&self) -> Vec<FactKind> {
        FactKind::ALL.into_iter().filter(|k| self.get(*k).is_none()).collect()
    }

    /// Replace extracted values with every non-blank manual value.
    pub fn merge_overrides(&mut self, overrides: &ExtractedFacts) {
        fn take(slot: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                *slot = Some(v.to_string());
            }
        }
        take(&mut self.pdde_type, &overrides.pdde_type.as_ref().map(|t| t.to_uppercase()));
        take(&mut self.year, &overrides.year);
        take(&mut self.school_name, &overrides.school_name);
        take(&mut self.president_name, &overrides.president_name);
        take(&mut self.process_number, &overrides.process_number);
        take(&mut self.tax_id, &overrides.tax_id);
    }
}

struct FieldRule {
    pattern: Regex,
    finish: fn(&Captures) -> Option<String>,
}

impl FieldRule {
    fn new(pattern: &str, finish: fn(&Captures) -> Option<String>) -> Self {
        Self { pattern: Regex::new(pattern).unwrap(), finish }
    }
}

fn first_match(rules: &[FieldRule], text: &str) -> Option<String> {
    rules
        .iter()
        .find_map(|rule| rule.pattern.captures_iter(text).find_map(|c| (rule.finish)(&c)))
}

fn group1(c: &Captures) -> Option<String> {
    c.get(1).map(|m| m.as_str().trim().to_string()).filter(|s| !s.is_empty())
}

const NAME_HEAD: &str = "A-ZÁÂÃÀÉÊÍÓÔÕÚÜÇ";

/// Tax ids are always emitted as `NN.NNN.NNN/NNNN-NN`, whatever separators the source used.
fn canonical_tax_id(c: &Captures) -> Option<String> {
    Some(format!("{}.{}.{}/{}-{}", &c[1], &c[2], &c[3], &c[4], &c[5]))
}

const TAX_ID_DIGITS: &str = r"(\d{2})[./\- ]?(\d{3})[./\- ]?(\d{3})[./\- ]?(\d{4})[./\- ]?(\d{2})(?:\D|$)";

static TAX_ID_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new(&format!(r"CNPJ\s*(?:N[º°O]?\.?\s*)?[:\-]?\s*{}", TAX_ID_DIGITS), canonical_tax_id),
        FieldRule::new(&format!(r"(?:^|\D){}", TAX_ID_DIGITS), canonical_tax_id),
    ]
});

static YEAR_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new(r"EXERC[IÍ]CIO(?:\s+FINANCEIRO)?\s*[:\-]?\s*(\d{4})(?:\D|$)", group1),
        FieldRule::new(r"EXERC\.\s*[:\-]?\s*(\d{4})(?:\D|$)", group1),
    ]
});

fn canonical_pdde_type(c: &Captures) -> Option<String> {
    let token = &c[1];
    let canonical = if token.starts_with('B') { "BÁSICO" } else { token };
    Some(canonical.to_string())
}

static PDDE_TYPE_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![FieldRule::new(
        r"PDDE\s*[-–:/]?\s*(B[AÁ]SICO|QUALIDADE|EQUIDADE|ESTRUTURA|EMERGENCIAL|INTEGRAL)\b",
        canonical_pdde_type,
    )]
});

static SCHOOL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:escola\s+municipal|creche\s+municipal|espa[çc]o\s+de\s+desenvolvimento\s+infantil|e\.\s*m\.|edi\b)\s*[-–]?\s*",
    )
    .unwrap()
});

fn finish_school(c: &Captures) -> Option<String> {
    let raw = c.get(1)?.as_str().trim();
    let stripped = SCHOOL_PREFIX.replace(raw, "");
    let name = stripped.trim().trim_end_matches(['.', ';', ':']).trim();
    if name.chars().filter(|ch| ch.is_alphabetic()).count() < 3 {
        return None;
    }
    Some(name.to_string())
}

static SCHOOL_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    let stop = r"\s*(?:,|\n|(?i:processo\s*:)|$)";
    vec![
        FieldRule::new(
            &format!(r"(?i:conselho\s+escolar\s+comunit[aá]rio)\s*(?:(?i:\(cec\))\s*)?(?i:d[ao])\s+([^,\n]+?){}", stop),
            finish_school,
        ),
        FieldRule::new(&format!(r"(?i:unidade\s+executora|escola)\s*:\s*([^,\n]+?){}", stop), finish_school),
    ]
});

/// Leading words that mark the rest of a caption, never a person's name.
const CAPTION_CONNECTORS: [&str; 5] = ["DO", "DA", "DE", "DOS", "DAS"];

fn finish_president(c: &Captures) -> Option<String> {
    let name = c.get(1)?.as_str().trim();
    if name.chars().count() < 5 {
        return None;
    }
    let first = name.split(' ').next().unwrap_or_default();
    if CAPTION_CONNECTORS.contains(&first) {
        return None;
    }
    Some(name.to_string())
}

static PRESIDENT_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    let name = format!(r"([{h}][{h} ]+) *(?:\n|$)", h = NAME_HEAD);
    vec![
        FieldRule::new(&format!(r"(?i:presidente)(?: +(?i:do +cec))? *[:\-–]? *{}", name), finish_president),
        FieldRule::new(&format!(r"(?i:assinatura)(?: +(?i:do +presidente))? *[:\-–]? *{}", name), finish_president),
        FieldRule::new(&format!(r"(?i:sob +a +presid[eê]ncia +de) +{}", name), finish_president),
    ]
});

static PROCESS_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new(r"(?:^|\D)(\d{7}\.\d{6}/\d{4}-\d{2})(?:\D|$)", group1),
        FieldRule::new(r"(?:^|\D)(\d{5}\.\d{6}/\d{4}-\d{2})(?:\D|$)", group1),
    ]
});

/// Derive every fact from the raw text of all documents of a case.
pub fn extract(text: &str) -> ExtractedFacts {
    let preserved = collapse_lines(text);
    let upper = preserved.to_uppercase();

    ExtractedFacts {
        pdde_type: first_match(&PDDE_TYPE_RULES, &upper),
        year: first_match(&YEAR_RULES, &upper),
        school_name: first_match(&SCHOOL_RULES, &preserved),
        president_name: first_match(&PRESIDENT_RULES, &preserved),
        process_number: first_match(&PROCESS_RULES, &upper),
        tax_id: first_match(&TAX_ID_RULES, &upper),
    }
}
