use std::fs;
use std::io::Read;

use pdde_bundle::pack;

#[test]
fn members_are_sorted_and_archives_repeatable() {
    let td = tempfile::tempdir().unwrap();
    let out = td.path().join("out");
    fs::create_dir_all(out.join("nested")).unwrap();
    fs::write(out.join("relatorio.txt"), "relatorio").unwrap();
    fs::write(out.join("despacho_1.docx"), "despacho").unwrap();
    fs::write(out.join("00_PACOTE_COMPLETO.pdf"), "pdf").unwrap();

    let first = td.path().join("a.zip");
    let second = td.path().join("b.zip");
    let members = pack(&out, &first).unwrap();
    pack(&out, &second).unwrap();

    assert_eq!(members, vec!["00_PACOTE_COMPLETO.pdf", "despacho_1.docx", "relatorio.txt"]);
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());

    let mut zip = zip::ZipArchive::new(fs::File::open(&first).unwrap()).unwrap();
    let names: Vec<String> = (0..zip.len()).map(|i| zip.by_index(i).unwrap().name().to_string()).collect();
    assert_eq!(names, members);
    let mut body = String::new();
    zip.by_name("relatorio.txt").unwrap().read_to_string(&mut body).unwrap();
    assert_eq!(body, "relatorio");
}
