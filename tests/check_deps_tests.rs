use std::fs;
use std::os::unix::fs::PermissionsExt;

use pdde_bundle::{check_deps, install_help_for};

fn set_path(dir: &std::path::Path) {
    std::env::set_var("PATH", dir.display().to_string());
}

fn fake_bin(dir: &std::path::Path, name: &str) {
    let bin = dir.join(name);
    fs::write(&bin, "#!/bin/sh\nexit 0\n").unwrap();
    let mut perms = fs::metadata(&bin).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&bin, perms).unwrap();
}

#[test]
fn check_deps_ok_when_required_tools_present() {
    let td = tempfile::tempdir().unwrap();
    for name in ["pdftotext", "pdfunite", "pandoc"] {
        fake_bin(td.path(), name);
    }

    set_path(td.path());
    let res = check_deps();
    assert!(res.ok, "required tools present should yield ok");
    // pdfinfo is optional and absent here
    assert_eq!(res.missing, vec!["pdfinfo".to_string()]);

    // missing pandoc only
    fs::remove_file(td.path().join("pandoc")).unwrap();
    let res = check_deps();
    assert!(!res.ok);
    assert!(res.missing.iter().any(|m| m == "pandoc"));
    assert!(!res.missing.iter().any(|m| m == "pdftotext"));
}

#[test]
fn install_help_names_packages_for_missing_tools() {
    let help = install_help_for(&["pdfunite".to_string(), "pandoc".to_string()]);
    assert!(help.contains("poppler-utils"));
    assert!(help.contains("pandoc"));
    assert_eq!(install_help_for(&[]), "");
}
