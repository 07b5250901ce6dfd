use crate::config::NameCase;
use crate::facts::ExtractedFacts;
use crate::text::fold_ascii;

/// Filesystem-safe token: ASCII only, spaces and hyphens become `_`,
/// anything else that is not alphanumeric is dropped.
pub fn slugify(value: &str, case: NameCase) -> String {
    let folded = fold_ascii(value).replace([' ', '-'], "_");
    let kept: String = folded.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
    match case {
        NameCase::Upper => kept.to_uppercase(),
        NameCase::Lower => kept.to_lowercase(),
    }
}

fn token(value: Option<&str>, case: NameCase) -> String {
    value.map(|v| slugify(v, case)).unwrap_or_default()
}

/// Stem shared by every artifact of a run: `PDDE_<type>_<year>_<school>_<taxid>`.
/// Absent facts contribute nothing; the tax id keeps its digits only.
pub fn derive_base_name(facts: &ExtractedFacts, case: NameCase) -> String {
    let tax_digits = facts
        .tax_id
        .as_deref()
        .map(|t| t.chars().filter(char::is_ascii_digit).collect::<String>());
    let tokens = [
        token(facts.pdde_type.as_deref(), case),
        token(facts.year.as_deref(), case),
        token(facts.school_name.as_deref(), case),
        tax_digits.unwrap_or_default(),
    ];
    let head = match case {
        NameCase::Upper => "PDDE",
        NameCase::Lower => "pdde",
    };
    let mut parts = vec![head.to_string()];
    parts.extend(tokens.into_iter().filter(|t| !t.is_empty()));
    parts.join("_")
}

pub fn combined_name(base: &str) -> String {
    format!("00_PACOTE_COMPLETO_{}.pdf", base)
}

pub fn group_file_name(index: u32, label: &str, base: &str) -> String {
    format!("{:02}_{}_{}.pdf", index, label, base)
}

pub fn dispatch_name(number: usize, base: &str) -> String {
    format!("despacho_{}_{}.docx", number, base)
}

pub fn report_name(base: &str) -> String {
    format!("relatorio_verificacao_{}.txt", base)
}

pub fn archive_name(base: &str) -> String {
    format!("pacote_{}.zip", base)
}
