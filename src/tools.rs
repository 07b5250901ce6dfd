//! External executables the pipeline drives: poppler (`pdftotext`,
//! `pdfinfo`, `pdfunite`) and `pandoc`. Each concern sits behind a trait so
//! runs can be exercised without the binaries installed.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepsResult {
    pub ok: bool,
    pub missing: Vec<String>,
}

/// Check required/optional CLI dependencies.
/// - Required: pdftotext, pdfunite (Poppler) and pandoc
/// - Optional: pdfinfo (per-page extraction)
/// Returns a DepsResult. `ok` is true iff required deps are present.
pub fn check_deps() -> DepsResult {
    let mut missing = Vec::new();
    let mut ok = true;

    for required in ["pdftotext", "pdfunite", "pandoc"] {
        if which::which(required).is_err() {
            missing.push(required.to_string());
            ok = false;
        }
    }

    // optional
    if which::which("pdfinfo").is_err() {
        missing.push("pdfinfo".to_string());
    }

    DepsResult { ok, missing }
}

/// Render apt installation help for missing deps.
pub fn install_help_for(missing: &[String]) -> String {
    let mut pkgs: Vec<&str> = Vec::new();
    if missing.iter().any(|m| m == "pdftotext" || m == "pdfunite" || m == "pdfinfo") {
        pkgs.push("poppler-utils");
    }
    if missing.iter().any(|m| m == "pandoc") {
        pkgs.push("pandoc");
    }

    if pkgs.is_empty() {
        return String::new();
    }

    format!("Dependency missing. Install via apt:\n  sudo apt install {}", pkgs.join(" "))
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("FileNotFound: {0}")]
    FileNotFound(String),
    #[error("EncryptedPDF: {0}")]
    EncryptedPDF(String),
    #[error("PopplerError: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
#[error("merge into {dest} failed: {reason}")]
pub struct MergeError {
    pub dest: PathBuf,
    pub reason: String,
}

#[derive(Debug, Error)]
#[error("conversion of {source_path} failed: {reason}")]
pub struct ConvertError {
    pub source_path: PathBuf,
    pub reason: String,
}

/// Reads the text layer of a PDF, one string per page.
pub trait TextExtractor {
    fn pages(&self, path: &Path) -> Result<Vec<String>, ExtractError>;

    /// Whole-document text, pages separated by a blank line.
    fn text(&self, path: &Path) -> Result<String, ExtractError> {
        Ok(self.pages(path)?.join("\n\n"))
    }
}

/// Writes `inputs`, in order, into one PDF at `dest`.
pub trait Merger {
    fn merge(&self, inputs: &[PathBuf], dest: &Path) -> Result<(), MergeError>;
}

/// Converts a styled HTML document into `format` at `dest`.
pub trait Converter {
    fn convert(&self, source: &Path, format: &str, dest: &Path) -> Result<(), ConvertError>;
}

#[derive(Debug, Clone, Default)]
pub struct Poppler;

impl TextExtractor for Poppler {
    fn pages(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        poppler_extract(path)
    }
}

fn looks_encrypted(stderr: &[u8]) -> bool {
    let err = String::from_utf8_lossy(stderr).to_lowercase();
    err.contains("encrypt") || err.contains("password")
}

/// Extract text pages using Poppler's pdftotext.
/// Prefers per-page extraction when pdfinfo is available for the page count.
/// Falls back to a single pass split on form feed when pdfinfo is missing.
pub fn poppler_extract(path: &Path) -> Result<Vec<String>, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound(path.display().to_string()));
    }

    let pages_count = if which::which("pdfinfo").is_ok() {
        match Command::new("pdfinfo").arg(path).output() {
            Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
                .lines()
                .find_map(|line| line.strip_prefix("Pages:"))
                .and_then(|rest| rest.trim().parse::<usize>().ok()),
            Ok(out) => {
                if looks_encrypted(&out.stderr) {
                    return Err(ExtractError::EncryptedPDF(path.display().to_string()));
                }
                None
            }
            Err(_) => None,
        }
    } else {
        None
    };

    if let Some(n_pages) = pages_count {
        let mut pages: Vec<String> = Vec::with_capacity(n_pages);
        for i in 1..=n_pages {
            let out = Command::new("pdftotext")
                .arg("-layout")
                .arg("-nopgbrk")
                .arg("-q")
                .arg("-f")
                .arg(i.to_string())
                .arg("-l")
                .arg(i.to_string())
                .arg(path)
                .arg("-")
                .output()
                .map_err(|e| ExtractError::Other(e.to_string()))?;
            if !out.status.success() {
                if looks_encrypted(&out.stderr) {
                    return Err(ExtractError::EncryptedPDF(path.display().to_string()));
                }
                return Err(ExtractError::Other(format!("pdftotext failed on page {}", i)));
            }
            pages.push(String::from_utf8_lossy(&out.stdout).to_string());
        }
        Ok(pages)
    } else {
        // No -nopgbrk here so form feeds mark the page breaks
        let out = Command::new("pdftotext")
            .arg("-layout")
            .arg("-q")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|e| ExtractError::Other(e.to_string()))?;
        if !out.status.success() {
            if looks_encrypted(&out.stderr) {
                return Err(ExtractError::EncryptedPDF(path.display().to_string()));
            }
            return Err(ExtractError::Other("pdftotext failed".into()));
        }
        let s = String::from_utf8_lossy(&out.stdout);
        let mut pages: Vec<String> = s.split('\u{000C}').map(|x| x.to_string()).collect();
        while matches!(pages.last(), Some(last) if last.trim().is_empty()) {
            pages.pop();
        }
        Ok(pages)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PdfUnite;

impl Merger for PdfUnite {
    fn merge(&self, inputs: &[PathBuf], dest: &Path) -> Result<(), MergeError> {
        let fail = |reason: String| MergeError { dest: dest.to_path_buf(), reason };
        if inputs.is_empty() {
            return Err(fail("no input documents".into()));
        }
        let out = Command::new("pdfunite")
            .args(inputs)
            .arg(dest)
            .output()
            .map_err(|e| fail(e.to_string()))?;
        if !out.status.success() {
            return Err(fail(String::from_utf8_lossy(&out.stderr).trim().to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pandoc;

impl Converter for Pandoc {
    fn convert(&self, source: &Path, format: &str, dest: &Path) -> Result<(), ConvertError> {
        let fail = |reason: String| ConvertError { source_path: source.to_path_buf(), reason };
        let out = Command::new("pandoc")
            .arg(source)
            .arg("-f")
            .arg("html")
            .arg("-t")
            .arg(format)
            .arg("-o")
            .arg(dest)
            .output()
            .map_err(|e| fail(e.to_string()))?;
        if !out.status.success() {
            return Err(fail(String::from_utf8_lossy(&out.stderr).trim().to_string()));
        }
        Ok(())
    }
}
