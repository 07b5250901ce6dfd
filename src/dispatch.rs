//! Formal letters generated for every case, filled with the extracted facts.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::config::{Config, Signature};
use crate::facts::ExtractedFacts;
use crate::naming::dispatch_name;
use crate::text::escape_html;
use crate::tools::{ConvertError, Converter};

/// Marker substituted for every fact that could not be extracted.
pub const NOT_FOUND: &str = "[NÃO ENCONTRADO]";

const P_STYLE: &str = "text-align: justify; line-height: 1.5; font-family: Arial; font-size: 12pt;";
const SIGN_STYLE: &str = "font-family: Arial; font-size: 12pt;";

const FORWARDING: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"/></head><body>
<p style="{{P_STYLE}}">
Processo: {{PROCESSO}}<br/><br/>
À Gerência de Administração – E/CRE04/GAD,<br/><br/>
Encaminho a presente prestação de contas do Programa Dinheiro Direto na Escola – PDDE <strong>{{TIPO_PDDE}}/{{ANO}}</strong>, da <strong>{{ESCOLA}}</strong> (CNPJ {{CNPJ}}), e declaro, para os devidos fins, a autenticidade dos documentos anexados.<br/><br/>
{{CIDADE}}, {{DATA_POR_EXTENSO}}.
</p>
<p style="{{SIGN_STYLE}}">
<strong>{{PRESIDENTE}}</strong><br/>
<strong>Presidente do CEC</strong>
</p>
</body></html>
"#;

const OPINION: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"/></head><body>
<p style="{{P_STYLE}}">
Processo: {{PROCESSO}}<br/><br/>
À Srª COORDENADORA DA 4ª CRE,<br/><br/>
Após análise da documentação apresentada, informo que a prestação de contas referente ao Programa Dinheiro Direto na Escola – PDDE <strong>{{TIPO_PDDE}}/{{ANO}}</strong>, vinculada ao Conselho Escolar Comunitário (CEC) da <strong>{{ESCOLA}}</strong>, CNPJ <strong>{{CNPJ}}</strong>, sob a presidência de <strong>{{PRESIDENTE}}</strong>, encontra-se em <strong>condições de aprovação</strong>, por atender às normatizações e orientações vigentes do Fundo Nacional de Desenvolvimento da Educação – FNDE, aplicáveis à matéria.<br/><br/>
{{CIDADE}}, {{DATA_POR_EXTENSO}}.
</p>
<p style="{{SIGN_STYLE}}">
{{ASSINATURA}}
</p>
</body></html>
"#;

const PUBLICATION: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"/></head><body>
<p style="{{P_STYLE}}">
<strong>PUBLIQUE-SE.</strong><br/><br/>
Processo: {{PROCESSO}}<br/><br/>
Aprovo a prestação de contas referente ao Programa Dinheiro Direto na Escola – PDDE <strong>{{TIPO_PDDE}}/{{ANO}}</strong>, do Conselho Escolar Comunitário (CEC) da <strong>{{ESCOLA}}</strong>, CNPJ <strong>{{CNPJ}}</strong>, sob a presidência de <strong>{{PRESIDENTE}}</strong>.<br/><br/>
{{CIDADE}}, {{DATA_POR_EXTENSO}}.
</p>
<p style="{{SIGN_STYLE}}">
{{ASSINATURA}}
</p>
</body></html>
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchTemplate {
    /// School forwards the accountability to the administration.
    Forwarding,
    /// Administration opinion recommending approval.
    Opinion,
    /// Coordination approval order for publication.
    Publication,
}

impl DispatchTemplate {
    pub const ALL: [DispatchTemplate; 3] =
        [DispatchTemplate::Forwarding, DispatchTemplate::Opinion, DispatchTemplate::Publication];

    pub fn number(&self) -> usize {
        match self {
            DispatchTemplate::Forwarding => 1,
            DispatchTemplate::Opinion => 2,
            DispatchTemplate::Publication => 3,
        }
    }

    fn source(&self) -> &'static str {
        match self {
            DispatchTemplate::Forwarding => FORWARDING,
            DispatchTemplate::Opinion => OPINION,
            DispatchTemplate::Publication => PUBLICATION,
        }
    }

    fn signature<'a>(&self, cfg: &'a Config) -> Option<&'a Signature> {
        match self {
            DispatchTemplate::Forwarding => None,
            DispatchTemplate::Opinion => Some(&cfg.dispatch.opinion_signature),
            DispatchTemplate::Publication => Some(&cfg.dispatch.publication_signature),
        }
    }
}

const MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro", "outubro", "novembro",
    "dezembro",
];

/// `1º de março de 2025`, `19 de outubro de 2026`.
pub fn long_date_pt(date: NaiveDate) -> String {
    let day = if date.day() == 1 { "1º".to_string() } else { date.day().to_string() };
    format!("{} de {} de {}", day, MONTHS[date.month0() as usize], date.year())
}

fn signature_html(signature: Option<&Signature>) -> String {
    signature
        .map(|s| {
            s.lines
                .iter()
                .map(|line| format!("<strong>{}</strong>", escape_html(line)))
                .collect::<Vec<_>>()
                .join("<br/>\n")
        })
        .unwrap_or_default()
}

/// Single pass over `source`: every `{{KEY}}` is replaced by its value, so
/// substituted text is never scanned again. Unknown keys are kept verbatim.
fn fill(source: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Fill `template` with the facts. Absent facts render as [`NOT_FOUND`].
pub fn render(template: DispatchTemplate, facts: &ExtractedFacts, cfg: &Config, date: NaiveDate) -> String {
    let fact = |v: &Option<String>| escape_html(v.as_deref().unwrap_or(NOT_FOUND));
    let values = [
        ("P_STYLE", P_STYLE.to_string()),
        ("SIGN_STYLE", SIGN_STYLE.to_string()),
        ("TIPO_PDDE", fact(&facts.pdde_type)),
        ("ANO", fact(&facts.year)),
        ("ESCOLA", fact(&facts.school_name)),
        ("CNPJ", fact(&facts.tax_id)),
        ("PRESIDENTE", fact(&facts.president_name)),
        ("PROCESSO", fact(&facts.process_number)),
        ("CIDADE", escape_html(&cfg.city)),
        ("DATA_POR_EXTENSO", long_date_pt(date)),
        ("ASSINATURA", signature_html(template.signature(cfg))),
    ];
    fill(template.source(), &values)
}

/// Render every template into `html_dir` and convert each into `out_dir` as DOCX.
/// Returns the produced file names in template order.
pub fn generate(
    facts: &ExtractedFacts,
    cfg: &Config,
    date: NaiveDate,
    base_name: &str,
    html_dir: &Path,
    out_dir: &Path,
    converter: &dyn Converter,
) -> Result<Vec<String>, ConvertError> {
    let mut produced = Vec::with_capacity(DispatchTemplate::ALL.len());
    for template in DispatchTemplate::ALL {
        let html = render(template, facts, cfg, date);
        let html_path: PathBuf = html_dir.join(format!("despacho_{}.html", template.number()));
        std::fs::write(&html_path, html)
            .map_err(|e| ConvertError { source_path: html_path.clone(), reason: e.to_string() })?;
        let name = dispatch_name(template.number(), base_name);
        converter.convert(&html_path, "docx", &out_dir.join(&name))?;
        info!(tool = "dispatch", template = template.number(), file = %name, "dispatch converted");
        produced.push(name);
    }
    Ok(produced)
}
