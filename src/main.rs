//! # Resume Harness CLI (`rex`)
//!
//! The `rex` binary is the primary interface for Resume Harness. It
//! ingests PDF/DOCX resumes, reports their segmented experience sections,
//! runs model-assisted extraction, cross-searches cached sections by
//! keyword, and can serve the whole session over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! rex --config ./config/rex.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rex scan <paths...>` | Ingest resumes and report normalized/segmented state |
//! | `rex section <paths...>` | Print each resume's bounded experience section |
//! | `rex extract <paths...>` | Run model extraction and print the structured record |
//! | `rex match <keywords> <paths...>` | Keyword cross-search over experience sections |
//! | `rex serve` | Start the JSON HTTP session server |
//!
//! ## Examples
//!
//! ```bash
//! # Ingest a directory of resumes (globs from config apply)
//! rex scan ./resumes
//!
//! # Show the experience section boundary the heuristics found
//! rex section resume.pdf
//!
//! # Extract a structured record via the configured Ollama model
//! rex extract resume.pdf
//!
//! # Which of these candidates mention python or kubernetes?
//! rex match "python, kubernetes" ./resumes
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use resume_harness::config::{self, Config};
use resume_harness::contract::run_extraction;
use resume_harness::infer::OllamaClient;
use resume_harness::ingest::{ingest_file, scan_paths};
use resume_harness::models::{CacheEntry, ExtractionOutcome};
use resume_harness::search::{search_session, SearchQuery};
use resume_harness::server::run_server;
use resume_harness::session::SessionStore;

/// Resume Harness CLI — decode resumes, bound their experience sections,
/// extract structured career records, and cross-search them by keyword.
#[derive(Parser)]
#[command(
    name = "rex",
    about = "Resume Harness — a local-first resume extraction and keyword cross-search toolkit",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults apply when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/rex.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest resumes and report their normalized and segmented state.
    ///
    /// Directories are walked recursively and filtered by the configured
    /// include globs; explicit files are taken as-is.
    Scan {
        /// Files and/or directories to ingest.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print each resume's bounded experience section.
    Section {
        /// Files and/or directories to ingest.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Run model extraction and print the structured record.
    ///
    /// Output is the decoded record as pretty JSON, or — when the model's
    /// response cannot be decoded — the raw response text, flagged as
    /// unparsed. One resume's failure never aborts the rest.
    Extract {
        /// Files and/or directories to ingest and extract.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Keyword cross-search over cached experience sections.
    Match {
        /// Comma-separated keywords, e.g. "python, kubernetes".
        keywords: String,

        /// Files and/or directories to search across.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Start the JSON HTTP session server.
    ///
    /// Serves upload, per-document extraction, and keyword search over
    /// one in-memory session. Binds to `[server].bind`.
    Serve,
}

/// Ingest every candidate file, printing per-file failures and
/// continuing; returns successfully cached entries.
fn ingest_batch(store: &SessionStore, config: &Config, paths: &[PathBuf]) -> Result<Vec<CacheEntry>> {
    let files = scan_paths(paths, &config.ingest.include_globs)?;
    let mut entries = Vec::new();
    for file in &files {
        match ingest_file(store, file) {
            Ok(entry) => entries.push(entry),
            Err(err) => println!("skipped {}: {}", file.display(), err),
        }
    }
    Ok(entries)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let store = SessionStore::new(cfg.segmenter.vocab());

    match cli.command {
        Commands::Scan { paths } => {
            let entries = ingest_batch(&store, &cfg, &paths)?;
            for entry in &entries {
                let section = match &entry.section {
                    Some(s) => format!("experience section: lines {}..{}", s.start, s.end),
                    None => "experience section: not found".to_string(),
                };
                println!(
                    "{}  {}  ({}, {} lines)  {}",
                    entry.document.id,
                    entry.document.name,
                    entry.document.format,
                    entry.document.lines.len(),
                    section
                );
            }
            println!("ingested {} document(s)", entries.len());
        }
        Commands::Section { paths } => {
            let entries = ingest_batch(&store, &cfg, &paths)?;
            for entry in &entries {
                println!("== {}", entry.document.name);
                match &entry.section {
                    Some(section) => println!("{}", section.text),
                    None => println!("No experience section found."),
                }
            }
        }
        Commands::Extract { paths } => {
            let entries = ingest_batch(&store, &cfg, &paths)?;
            let client = OllamaClient::new(&cfg.model)?;
            for entry in &entries {
                println!("== {}", entry.document.name);
                match run_extraction(&store, &client, &entry.document.id).await {
                    Ok(ExtractionOutcome::Parsed(record)) => {
                        println!("{}", serde_json::to_string_pretty(&record)?);
                    }
                    Ok(ExtractionOutcome::Unparsed(raw)) => {
                        println!("(model response could not be decoded; raw output follows)");
                        println!("{}", raw);
                    }
                    Err(err) => println!("extraction failed: {}", err),
                }
            }
        }
        Commands::Match { keywords, paths } => {
            let query = SearchQuery::parse(&keywords);
            if query.is_empty() {
                println!("No keywords.");
                return Ok(());
            }
            let entries = ingest_batch(&store, &cfg, &paths)?;
            if entries.is_empty() {
                println!("No documents.");
                return Ok(());
            }
            for result in search_session(&store, &query) {
                if !result.section_found {
                    println!("{}: no experience section", result.name);
                    continue;
                }
                println!(
                    "{}: matched [{}], unmatched [{}]",
                    result.name,
                    result.matched.join(", "),
                    result.unmatched.join(", ")
                );
            }
        }
        Commands::Serve => {
            let client = Arc::new(OllamaClient::new(&cfg.model)?);
            run_server(&cfg, Arc::new(store), client).await?;
        }
    }

    Ok(())
}
