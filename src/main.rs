use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;
use serde_json::{json, Map, Value};

use sparse_linker::{Catalog, Phrase, SparseLinker};

#[derive(Parser)]
#[command(name = "sparse-linker", version, about = "Train and query a sparse entity linker.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a model from tab-separated corpora with a `targets` column
    Train {
        #[arg(long)]
        model_dir: PathBuf,
        /// Candidate catalog (`name`, `text`, optional `wiki`, `uris`, `aliases`)
        #[arg(long)]
        catalog: PathBuf,
        /// Weight terms by raw counts instead of TF-IDF
        #[arg(long)]
        count: bool,
        /// Rank by context similarity only
        #[arg(long)]
        no_overlap: bool,
        #[arg(long)]
        description: Option<String>,
        #[arg(required = true)]
        corpus: Vec<PathBuf>,
    },
    /// Link phrases found in a context; prints one JSON object per phrase
    Link {
        #[arg(long)]
        model_dir: PathBuf,
        #[arg(long)]
        context: String,
        #[arg(required = true)]
        phrases: Vec<String>,
    },
}

fn run(cli: Cli) -> sparse_linker::Result<()> {
    match cli.command {
        Command::Train {
            model_dir,
            catalog,
            count,
            no_overlap,
            description,
            corpus,
        } => {
            let catalog = Catalog::from_tsv(&catalog)?;
            let mut linker = SparseLinker::open(&model_dir)?;

            let mut overrides = Map::new();
            overrides.insert("tfidf".to_string(), Value::Bool(!count));
            overrides.insert("use_overlap".to_string(), Value::Bool(!no_overlap));
            if let Some(description) = description {
                overrides.insert("description".to_string(), Value::String(description));
            }
            linker.set_params(&overrides)?;

            let stats = linker.train(&corpus, &catalog)?;
            println!(
                "{}",
                json!({
                    "phrases": stats.phrases,
                    "indexed_phrases": stats.indexed_phrases,
                    "failed_phrases": stats.failed_phrases,
                    "candidates": stats.candidates,
                })
            );
        }
        Command::Link {
            model_dir,
            context,
            phrases,
        } => {
            let linker = SparseLinker::open(&model_dir)?;
            let phrases: Vec<Phrase> = phrases.iter().map(|p| Phrase::default_for(p)).collect();
            for result in linker.link(&context, &phrases)? {
                let status = result.status();
                let (phrase, linked) = result.into_pair();
                println!(
                    "{}",
                    json!({
                        "phrase": phrase.text(),
                        "name": linked.candidate.name(),
                        "score": linked.score,
                        "link": linked.link,
                        "status": status,
                    })
                );
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
