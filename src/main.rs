use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use pdde_bundle::{
    case_text, check_deps, collect_pdfs, extract, install_help_for, read_documents, run, Capabilities, Classifier,
    Config, ExtractedFacts, IntakeError, Pandoc, PdfUnite, PipelineError, Poppler, RunOptions,
};
use tracing::error;

#[derive(Parser)]
#[command(name = "pddebundle", about = "Classify, merge and package PDDE accountability documents")]
struct Cli {
    /// YAML file overriding the keyword table, groups, naming case, city or signatures
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Default)]
struct Overrides {
    /// PDDE type (e.g. BASICO, QUALIDADE)
    #[arg(long)]
    tipo: Option<String>,
    /// Fiscal year
    #[arg(long)]
    ano: Option<String>,
    /// School name
    #[arg(long)]
    escola: Option<String>,
    /// CEC president name
    #[arg(long)]
    presidente: Option<String>,
    /// Process number
    #[arg(long)]
    processo: Option<String>,
    /// School tax id (CNPJ)
    #[arg(long)]
    cnpj: Option<String>,
}

impl From<Overrides> for ExtractedFacts {
    fn from(o: Overrides) -> Self {
        ExtractedFacts {
            pdde_type: o.tipo,
            year: o.ano,
            school_name: o.escola,
            president_name: o.presidente,
            process_number: o.processo,
            tax_id: o.cnpj,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full bundle archive from directories and/or PDF files
    Bundle {
        /// Input directories (walked for *.pdf) or PDF files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory receiving the archive
        #[arg(short, long, default_value = "./output")]
        out: PathBuf,
        /// Date used for the report header and the letters (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print the rank and category of each file name
    Classify {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print the facts extracted from the documents' text
    Extract {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Report missing external programs
    CheckDeps,
    /// Liveness probe
    Health,
}

fn load_config(path: Option<&PathBuf>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    match Config::load(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", serde_json::json!({ "tool": "config", "file": path, "error": e.to_string() }));
            std::process::exit(3);
        }
    }
}

fn require_deps() {
    let deps = check_deps();
    if !deps.ok {
        eprintln!("{}", serde_json::json!({ "tool": "check_deps", "missing": deps.missing, "error_code": 2 }));
        let help = install_help_for(&deps.missing);
        if !help.is_empty() {
            eprintln!("{}", help);
        }
        std::process::exit(2);
    }
}

fn stamp(date: Option<NaiveDate>) -> NaiveDateTime {
    match date {
        Some(d) => d.and_hms_opt(0, 0, 0).unwrap_or_default(),
        None => Local::now().naive_local(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Commands::Health = cli.command {
        println!("ok");
        return;
    }
    let cfg = load_config(cli.config.as_ref());

    match cli.command {
        Commands::Health => {}
        Commands::CheckDeps => {
            let deps = check_deps();
            println!("{}", serde_json::json!({ "tool": "check_deps", "ok": deps.ok, "missing": deps.missing }));
            let help = install_help_for(&deps.missing);
            if !help.is_empty() {
                eprintln!("{}", help);
            }
            if !deps.ok {
                std::process::exit(2);
            }
        }
        Commands::Classify { inputs } => {
            let classifier = Classifier::from_config(&cfg);
            let rows: Vec<serde_json::Value> = inputs
                .iter()
                .map(|p| {
                    let name = p.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
                    let c = classifier.classify(&name);
                    serde_json::json!({ "file": name, "rank": c.rank, "category": c.category, "group": c.group })
                })
                .collect();
            println!("{}", serde_json::Value::Array(rows));
        }
        Commands::Extract { inputs } => {
            let paths = match collect_pdfs(&inputs) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("{}", serde_json::json!({ "tool": "intake", "error": e.to_string(), "error_code": 1 }));
                    std::process::exit(1);
                }
            };
            let files: Vec<(String, PathBuf)> = paths
                .into_iter()
                .map(|p| (p.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(), p))
                .collect();
            let documents = read_documents(&files, &Classifier::from_config(&cfg), &Poppler);
            let facts = extract(&case_text(&documents));
            println!("{}", serde_json::json!({ "facts": facts, "missing": facts.missing() }));
        }
        Commands::Bundle { inputs, out, date, overrides } => {
            require_deps();
            let caps = Capabilities { text: &Poppler, merger: &PdfUnite, converter: &Pandoc };
            let opts = RunOptions { overrides: overrides.into(), generated_at: stamp(date), dest_dir: out };
            match run(&inputs, &cfg, &caps, &opts) {
                Ok(outcome) => println!("{}", serde_json::json!(outcome)),
                Err(e) => {
                    let code = if e.is_client_error() { 1 } else { 4 };
                    error!(tool = "bundle", error = %e, "run aborted");
                    if let PipelineError::Intake(IntakeError::NoDocuments { guidance }) = &e {
                        eprintln!("{}", guidance);
                    }
                    eprintln!("{}", serde_json::json!({ "tool": "bundle", "error": e.to_string(), "error_code": code }));
                    std::process::exit(code);
                }
            }
        }
    }
}
