//! One bundling run: intake, text, facts, classification, merges, letters,
//! report and archive. All intermediate files live in a scratch directory
//! owned by the run and removed when it ends, whether it succeeds or not.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::assemble::{assemble, merge_order, GroupMembership, InputDocument};
use crate::classify::Classifier;
use crate::config::Config;
use crate::dispatch;
use crate::facts::{extract, ExtractedFacts, FactKind};
use crate::intake::{collect_pdfs, sha256_hex, stage, IntakeError};
use crate::naming::{archive_name, derive_base_name, report_name};
use crate::pack::{pack, PackError};
use crate::report::build_report;
use crate::tools::{ConvertError, Converter, MergeError, Merger, TextExtractor};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Pack(#[from] PackError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True when the caller supplied nothing usable; the run never started.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::Intake(IntakeError::NoDocuments { .. }))
    }
}

/// The external programs a run drives.
pub struct Capabilities<'a> {
    pub text: &'a dyn TextExtractor,
    pub merger: &'a dyn Merger,
    pub converter: &'a dyn Converter,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Manual values that win over extracted ones.
    pub overrides: ExtractedFacts,
    /// Report timestamp; its date is also the letters' date.
    pub generated_at: NaiveDateTime,
    /// Where the finished archive is delivered.
    pub dest_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct BundleOutcome {
    pub archive: PathBuf,
    pub base_name: String,
    pub facts: ExtractedFacts,
    pub missing: Vec<FactKind>,
    pub groups: Vec<GroupMembership>,
    pub combined: String,
    pub combined_order: Vec<String>,
    pub dispatches: Vec<String>,
    pub report: String,
    pub members: Vec<String>,
}

/// Classify each `(name, path)` and read its text layer.
/// Unreadable documents are kept with empty text and the error recorded.
pub fn read_documents(files: &[(String, PathBuf)], classifier: &Classifier, text: &dyn TextExtractor) -> Vec<InputDocument> {
    files
        .iter()
        .map(|(name, path)| {
            let classification = classifier.classify(name);
            let (sha256, hash_error) = match std::fs::read(path) {
                Ok(bytes) => (sha256_hex(&bytes), None),
                Err(e) => {
                    warn!(tool = "fingerprint", file = %name, error = %e, "file unreadable, no fingerprint");
                    (String::new(), Some(format!("unreadable: {}", e)))
                }
            };
            let (extracted_text, read_error) = match text.text(path) {
                Ok(t) => (t, hash_error),
                Err(e) => {
                    warn!(tool = "extract_text", file = %name, error = %e, "no text layer, continuing without it");
                    (String::new(), Some(e.to_string()))
                }
            };
            info!(tool = "classify", file = %name, rank = classification.rank, group = classification.group, "classified");
            InputDocument {
                original_name: name.clone(),
                path: path.clone(),
                classification,
                sha256,
                extracted_text,
                read_error,
            }
        })
        .collect()
}

/// Text of the whole case, documents in merge order so results do not
/// depend on the order files were supplied in.
pub fn case_text(documents: &[InputDocument]) -> String {
    merge_order(documents)
        .into_iter()
        .map(|d| d.extracted_text.as_str())
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn log_facts(facts: &ExtractedFacts) {
    for kind in FactKind::ALL {
        match facts.get(kind) {
            Some(value) => info!(tool = "extract_facts", fact = kind.label(), value, "fact found"),
            None => warn!(tool = "extract_facts", fact = kind.label(), "fact not found"),
        }
    }
}

/// Build the bundle for `inputs` and deliver the archive into `opts.dest_dir`.
pub fn run(inputs: &[PathBuf], cfg: &Config, caps: &Capabilities, opts: &RunOptions) -> Result<BundleOutcome, PipelineError> {
    let paths = collect_pdfs(inputs)?;
    info!(tool = "intake", count = paths.len(), "documents admitted");

    let scratch = tempfile::Builder::new().prefix("pdde-bundle-").tempdir()?;
    let staged = stage(&paths, &scratch.path().join("uploads"))?;

    let classifier = Classifier::from_config(cfg);
    let documents = read_documents(&staged, &classifier, caps.text);

    let mut facts = extract(&case_text(&documents));
    facts.merge_overrides(&opts.overrides);
    log_facts(&facts);

    let base_name = derive_base_name(&facts, cfg.name_case);
    info!(tool = "naming", base_name = %base_name, "base name derived");

    let out_dir = scratch.path().join("out");
    let html_dir = scratch.path().join("html");
    std::fs::create_dir_all(&out_dir)?;
    std::fs::create_dir_all(&html_dir)?;

    let assembly = assemble(&documents, &cfg.groups, &base_name, &out_dir, caps.merger)?;
    let dispatches = dispatch::generate(
        &facts,
        cfg,
        opts.generated_at.date(),
        &base_name,
        &html_dir,
        &out_dir,
        caps.converter,
    )?;

    let report = report_name(&base_name);
    let report_text = build_report(&facts, &assembly.groups, &documents, opts.generated_at);
    std::fs::write(out_dir.join(&report), report_text)?;

    let archive_file = archive_name(&base_name);
    let scratch_archive = scratch.path().join(&archive_file);
    let members = pack(&out_dir, &scratch_archive)?;
    info!(tool = "pack", file = %archive_file, members = members.len(), "archive written");

    let archive = deliver(&scratch_archive, &opts.dest_dir, &archive_file)?;

    Ok(BundleOutcome {
        archive,
        base_name,
        missing: facts.missing(),
        facts,
        groups: assembly.groups,
        combined: assembly.combined,
        combined_order: assembly.combined_order,
        dispatches,
        report,
        members,
    })
}

fn deliver(archive: &Path, dest_dir: &Path, name: &str) -> Result<PathBuf, std::io::Error> {
    std::fs::create_dir_all(dest_dir)?;
    let dest = dest_dir.join(name);
    std::fs::copy(archive, &dest)?;
    Ok(dest)
}
