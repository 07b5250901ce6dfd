use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use pdde_bundle::{collect_pdfs, sha256_hex, stage, unique_name, IntakeError};

#[test]
fn collect_pdfs_walks_directories_and_ignores_other_extensions() {
    let td = tempfile::tempdir().unwrap();
    let base = td.path();
    fs::create_dir_all(base.join("extratos")).unwrap();
    fs::write(base.join("Oficio.PDF"), b"%PDF-1.4\n").unwrap();
    fs::write(base.join("extratos/extrato_aplicacao.pdf"), b"%PDF-1.4\n").unwrap();
    fs::write(base.join("leia-me.txt"), b"nope").unwrap();

    let files = collect_pdfs(&[base.to_path_buf()]).expect("should find files");
    let files: Vec<PathBuf> = files.into_iter().map(|p| p.strip_prefix(base).unwrap().to_path_buf()).collect();
    assert_eq!(files, vec![PathBuf::from("Oficio.PDF"), PathBuf::from("extratos/extrato_aplicacao.pdf")]);
}

#[test]
fn explicit_files_need_pdf_extension() {
    let td = tempfile::tempdir().unwrap();
    let pdf = td.path().join("nota.pdf");
    let doc = td.path().join("nota.docx");
    fs::write(&pdf, b"%PDF-1.4\n").unwrap();
    fs::write(&doc, b"x").unwrap();

    let files = collect_pdfs(&[doc, pdf.clone(), pdf.clone()]).unwrap();
    assert_eq!(files, vec![pdf]);
}

#[test]
fn no_admissible_file_is_an_input_error() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("planilha.xlsx"), b"x").unwrap();
    let err = collect_pdfs(&[td.path().to_path_buf()]).err().expect("should be error");
    assert_eq!(format!("{}", err), "NoDocuments");
    match err {
        IntakeError::NoDocuments { guidance } => assert!(guidance.contains("pddebundle bundle")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unique_name_suffixes_repeated_names() {
    let mut used = HashSet::new();
    assert_eq!(unique_name("nota.pdf", &mut used), "nota.pdf");
    assert_eq!(unique_name("nota.pdf", &mut used), "nota-1.pdf");
    assert_eq!(unique_name("nota.pdf", &mut used), "nota-2.pdf");
    assert_eq!(unique_name("ata", &mut used), "ata");
    assert_eq!(unique_name("ata", &mut used), "ata-1");
}

#[test]
fn stage_copies_same_named_files_from_different_folders() {
    let td = tempfile::tempdir().unwrap();
    let a = td.path().join("a");
    let b = td.path().join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    fs::write(a.join("nota.pdf"), b"first").unwrap();
    fs::write(b.join("nota.pdf"), b"second").unwrap();

    let staged = stage(&[a.join("nota.pdf"), b.join("nota.pdf")], &td.path().join("uploads")).unwrap();
    let names: Vec<&str> = staged.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["nota.pdf", "nota-1.pdf"]);
    assert_eq!(fs::read(&staged[1].1).unwrap(), b"second");
}

#[test]
fn sha256_hex_known_value() {
    assert_eq!(sha256_hex(b"abc"), "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
}
