use std::fs;
use std::process::Command;

fn pddebundle() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pddebundle"))
}

#[test]
fn health_ignores_a_broken_config() {
    let td = tempfile::tempdir().unwrap();
    let cfg = td.path().join("pdde.yaml");
    fs::write(&cfg, "rules: [").unwrap();

    let out = pddebundle().arg("--config").arg(&cfg).arg("health").output().unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "ok");

    let out = pddebundle().arg("--config").arg(&cfg).arg("classify").arg("oficio.pdf").output().unwrap();
    assert_eq!(out.status.code(), Some(3));
}
