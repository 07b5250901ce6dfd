//! Classification, fact extraction and deterministic packaging of PDDE
//! accountability documents.

pub mod assemble;
pub mod classify;
pub mod config;
pub mod dispatch;
pub mod facts;
pub mod intake;
pub mod naming;
pub mod pack;
pub mod pipeline;
pub mod report;
pub mod text;
pub mod tools;

pub use assemble::{assemble, group_members, merge_order, Assembly, GroupMembership, InputDocument};
pub use classify::{normalize_name, Category, Classification, Classifier, FALLBACK_RANK};
pub use config::{Config, ConfigError, DispatchConfig, GroupDef, NameCase, RankRule, Signature};
pub use dispatch::{long_date_pt, render, DispatchTemplate, NOT_FOUND};
pub use facts::{extract, ExtractedFacts, FactKind};
pub use intake::{collect_pdfs, sha256_hex, stage, unique_name, IntakeError};
pub use naming::{derive_base_name, slugify};
pub use pack::{pack, PackError};
pub use pipeline::{case_text, read_documents, run, BundleOutcome, Capabilities, PipelineError, RunOptions};
pub use report::{build_report, EMPTY_GROUP, MISSING_WARNING};
pub use tools::{
    check_deps, install_help_for, poppler_extract, ConvertError, Converter, DepsResult, ExtractError, MergeError,
    Merger, Pandoc, PdfUnite, Poppler, TextExtractor,
};
