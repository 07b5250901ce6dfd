use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globwalk::GlobWalkerBuilder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("NoDocuments")]
    NoDocuments { guidance: String },
    #[error("failed to stage {name}: {reason}")]
    Stage { name: String, reason: String },
}

fn guidance() -> String {
    let guide = r#"No PDF found in the given inputs.
Pass one or more directories (walked recursively for *.pdf) or PDF files:
  pddebundle bundle ./prestacao_de_contas --out ./saida"#;
    guide.to_string()
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Collect admissible documents from directories and explicit files.
/// Directories are walked recursively; only `.pdf` files (any case) are kept.
/// Returns a sorted, de-duplicated list.
pub fn collect_pdfs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, IntakeError> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let walker = GlobWalkerBuilder::from_patterns(input, &["**/*.pdf"])
                .case_insensitive(true)
                .follow_links(false)
                .build()
                .map_err(|_| IntakeError::NoDocuments { guidance: guidance() })?;
            paths.extend(walker.filter_map(|e| e.ok()).map(|e| e.path().to_path_buf()));
        } else if is_pdf(input) {
            paths.push(input.clone());
        }
    }

    paths.retain(|p| p.is_file());
    paths.sort();
    paths.dedup();

    if paths.is_empty() {
        return Err(IntakeError::NoDocuments { guidance: guidance() });
    }
    Ok(paths)
}

/// Pick a staging name that has not been used in this run:
/// `nota.pdf`, then `nota-1.pdf`, `nota-2.pdf`, ...
pub fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let ext = path.extension().and_then(|s| s.to_str());
    let mut i = 1;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{}-{}.{}", stem, i, ext),
            None => format!("{}-{}", stem, i),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        i += 1;
    }
}

/// Copy every input into `dir` under a run-unique name.
/// Returns `(staged name, staged path)` pairs in input order.
pub fn stage(paths: &[PathBuf], dir: &Path) -> Result<Vec<(String, PathBuf)>, IntakeError> {
    std::fs::create_dir_all(dir).map_err(|e| IntakeError::Stage { name: dir.display().to_string(), reason: e.to_string() })?;
    let mut used = HashSet::new();
    let mut staged = Vec::with_capacity(paths.len());
    for path in paths {
        let original = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("documento.pdf")
            .to_string();
        let name = unique_name(&original, &mut used);
        let dest = dir.join(&name);
        std::fs::copy(path, &dest).map_err(|e| IntakeError::Stage { name: original.clone(), reason: e.to_string() })?;
        staged.push((name, dest));
    }
    Ok(staged)
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    out.iter().map(|b| format!("{:02x}", b)).collect()
}
