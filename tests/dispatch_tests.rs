use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pdde_bundle::dispatch::generate;
use pdde_bundle::{long_date_pt, render, Config, ConvertError, Converter, DispatchTemplate, ExtractedFacts, NOT_FOUND};

fn facts() -> ExtractedFacts {
    ExtractedFacts {
        pdde_type: Some("BÁSICO".into()),
        year: Some("2024".into()),
        school_name: None,
        president_name: Some("MARIA DAS GRAÇAS SOUZA".into()),
        process_number: Some("23456.789012/2024-01".into()),
        tax_id: Some("12.345.678/0001-90".into()),
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[test]
fn long_date_in_portuguese() {
    assert_eq!(long_date_pt(date()), "19 de outubro de 2026");
    assert_eq!(long_date_pt(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()), "1º de março de 2025");
}

#[test]
fn missing_fact_renders_marker_in_every_letter() {
    let cfg = Config::default();
    for template in DispatchTemplate::ALL {
        let html = render(template, &facts(), &cfg, date());
        assert!(html.contains(NOT_FOUND), "letter {}", template.number());
        assert!(html.contains("BÁSICO/2024"));
        assert!(html.contains("23456.789012/2024-01"));
        assert!(html.contains("Rio de Janeiro, 19 de outubro de 2026."));
        assert!(!html.contains("{{"), "unfilled placeholder in letter {}", template.number());
    }
}

#[test]
fn signatures_follow_config() {
    let mut cfg = Config::default();
    assert!(render(DispatchTemplate::Opinion, &facts(), &cfg, date()).contains("<strong>Gerente II</strong>"));
    assert!(render(DispatchTemplate::Publication, &facts(), &cfg, date()).contains("E/4a.CRE"));

    cfg.dispatch.opinion_signature.lines = vec!["Fulana de Tal".into(), "Matrícula 123".into()];
    let html = render(DispatchTemplate::Opinion, &facts(), &cfg, date());
    assert!(html.contains("<strong>Fulana de Tal</strong><br/>\n<strong>Matrícula 123</strong>"));
}

#[test]
fn values_are_escaped_and_never_rescanned() {
    let mut f = facts();
    f.school_name = Some("Escola A & B {{CNPJ}}".into());
    let html = render(DispatchTemplate::Forwarding, &f, &Config::default(), date());
    assert!(html.contains("Escola A &amp; B {{CNPJ}}"));
}

#[derive(Default)]
struct Recording {
    calls: RefCell<Vec<(PathBuf, String, PathBuf)>>,
}

impl Converter for Recording {
    fn convert(&self, source: &Path, format: &str, dest: &Path) -> Result<(), ConvertError> {
        fs::copy(source, dest).map_err(|e| ConvertError { source_path: source.to_path_buf(), reason: e.to_string() })?;
        self.calls.borrow_mut().push((source.to_path_buf(), format.to_string(), dest.to_path_buf()));
        Ok(())
    }
}

struct Broken;

impl Converter for Broken {
    fn convert(&self, source: &Path, _format: &str, _dest: &Path) -> Result<(), ConvertError> {
        Err(ConvertError { source_path: source.to_path_buf(), reason: "pandoc exited with 1".into() })
    }
}

#[test]
fn generate_converts_three_letters_to_docx() {
    let td = tempfile::tempdir().unwrap();
    let html_dir = td.path().join("html");
    let out_dir = td.path().join("out");
    fs::create_dir_all(&html_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();

    let conv = Recording::default();
    let names = generate(&facts(), &Config::default(), date(), "PDDE_X", &html_dir, &out_dir, &conv).unwrap();
    assert_eq!(names, vec!["despacho_1_PDDE_X.docx", "despacho_2_PDDE_X.docx", "despacho_3_PDDE_X.docx"]);
    let calls = conv.calls.borrow();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|(_, fmt, _)| fmt == "docx"));
    assert!(fs::read_to_string(out_dir.join("despacho_2_PDDE_X.docx")).unwrap().contains("Gerente II"));
}

#[test]
fn conversion_failure_is_returned() {
    let td = tempfile::tempdir().unwrap();
    let err = generate(&facts(), &Config::default(), date(), "PDDE_X", td.path(), td.path(), &Broken).unwrap_err();
    assert!(err.to_string().contains("pandoc exited with 1"));
}
