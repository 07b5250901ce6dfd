use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::assemble::{merge_order, GroupMembership, InputDocument};
use crate::facts::{ExtractedFacts, FactKind};

pub const MISSING_WARNING: &str = "⚠ NÃO ENCONTRADO";
pub const EMPTY_GROUP: &str = "(nenhum arquivo nesta categoria)";

/// Human-readable verification report. Output depends only on the arguments,
/// so identical inputs and timestamp give identical text.
pub fn build_report(
    facts: &ExtractedFacts,
    groups: &[GroupMembership],
    documents: &[InputDocument],
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();
    let rule = "=".repeat(64);

    let _ = writeln!(out, "RELATÓRIO DE VERIFICAÇÃO - PRESTAÇÃO DE CONTAS PDDE");
    let _ = writeln!(out, "Processado em: {}", generated_at.format("%d/%m/%Y %H:%M:%S"));
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out);

    let _ = writeln!(out, "DADOS EXTRAÍDOS");
    for kind in FactKind::ALL {
        let value = facts.get(kind).unwrap_or(MISSING_WARNING);
        let _ = writeln!(out, "  {:<20} {}", format!("{}:", kind.label()), value);
    }
    let missing = facts.missing();
    if !missing.is_empty() {
        let labels: Vec<&str> = missing.iter().map(|k| k.label()).collect();
        let _ = writeln!(out, "  Atenção: {} dado(s) não encontrado(s): {}", missing.len(), labels.join(", "));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "AGRUPAMENTO");
    let mut ordered: Vec<&GroupMembership> = groups.iter().collect();
    ordered.sort_by_key(|g| g.index);
    for group in ordered {
        let _ = writeln!(out, "[{:02}] {} ({})", group.index, group.label, group.category.as_str());
        if group.members.is_empty() {
            let _ = writeln!(out, "  {}", EMPTY_GROUP);
        } else {
            let mut members = group.members.clone();
            members.sort();
            for name in members {
                let _ = writeln!(out, "  - {}", name);
            }
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "CLASSIFICAÇÃO DOS ARQUIVOS (ordem do pacote completo)");
    for doc in merge_order(documents) {
        let _ = writeln!(
            out,
            "  {:>3}  grupo {:02}  {}  {}",
            doc.classification.rank,
            doc.classification.group,
            doc.sha256.get(..12).unwrap_or(&doc.sha256),
            doc.original_name
        );
    }

    let mut unreadable: Vec<&InputDocument> = documents.iter().filter(|d| d.read_error.is_some()).collect();
    if !unreadable.is_empty() {
        unreadable.sort_by(|a, b| a.original_name.cmp(&b.original_name));
        let _ = writeln!(out);
        let _ = writeln!(out, "ARQUIVOS SEM TEXTO LEGÍVEL");
        for doc in unreadable {
            let _ = writeln!(out, "  - {}: {}", doc.original_name, doc.read_error.as_deref().unwrap_or_default());
        }
    }

    out
}
