use std::path::PathBuf;

use chrono::NaiveDate;
use pdde_bundle::{
    build_report, group_members, Classifier, Config, ExtractedFacts, InputDocument, EMPTY_GROUP, MISSING_WARNING,
};

fn doc(classifier: &Classifier, name: &str, read_error: Option<&str>) -> InputDocument {
    InputDocument {
        original_name: name.to_string(),
        path: PathBuf::from(name),
        classification: classifier.classify(name),
        sha256: "0123456789abcdef0123".to_string(),
        extracted_text: String::new(),
        read_error: read_error.map(str::to_string),
    }
}

fn fixture() -> (ExtractedFacts, Vec<InputDocument>) {
    let cfg = Config::default();
    let c = Classifier::from_config(&cfg);
    let docs = vec![
        doc(&c, "nota_fiscal.pdf", None),
        doc(&c, "fachada.pdf", Some("EncryptedPDF: fachada.pdf")),
        doc(&c, "oficio.pdf", None),
    ];
    let facts = ExtractedFacts {
        pdde_type: Some("BÁSICO".into()),
        year: Some("2024".into()),
        ..Default::default()
    };
    (facts, docs)
}

#[test]
fn report_flags_missing_facts_and_empty_groups() {
    let (facts, docs) = fixture();
    let groups = group_members(&docs, &Config::default().groups, "PDDE_BASICO_2024");
    let at = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(14, 30, 0).unwrap();
    let report = build_report(&facts, &groups, &docs, at);

    assert!(report.contains("Processado em: 19/10/2026 14:30:00"));
    assert!(report.lines().any(|l| l.contains("Tipo de PDDE:") && l.contains("BÁSICO")));
    assert!(report.lines().any(|l| l.contains("Unidade escolar:") && l.contains(MISSING_WARNING)));
    assert!(report.contains("4 dado(s) não encontrado(s)"));
    assert_eq!(report.matches(EMPTY_GROUP).count(), 2);

    let g1 = report.find("[01] PECAS_INSTRUCAO (INSTRUCTION)").unwrap();
    let g5 = report.find("[05] ATAS_RELATORIOS_CEC (OTHER)").unwrap();
    assert!(g1 < g5);

    let section = &report[report.find("CLASSIFICAÇÃO DOS ARQUIVOS").unwrap()..];
    let oficio = section.find("oficio.pdf").unwrap();
    let nota = section.find("nota_fiscal.pdf").unwrap();
    let fachada = section.find("fachada.pdf").unwrap();
    assert!(oficio < nota && nota < fachada);
    assert!(section.contains("100  grupo 05"));

    assert!(report.contains("ARQUIVOS SEM TEXTO LEGÍVEL"));
    assert!(report.contains("0123456789ab"));
}

#[test]
fn report_is_stable_for_same_inputs() {
    let (facts, docs) = fixture();
    let mut reversed = docs.clone();
    reversed.reverse();
    let at = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(9, 0, 0).unwrap();
    let groups = group_members(&docs, &Config::default().groups, "B");
    let groups_rev = group_members(&reversed, &Config::default().groups, "B");
    assert_eq!(build_report(&facts, &groups, &docs, at), build_report(&facts, &groups_rev, &reversed, at));
}
