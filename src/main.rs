use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use semdex::probe::{probe_dimensions, DEFAULT_PROBES};
use semdex::search::PREVIEW_CHARS;
use semdex::{load_documents, AppConfig, IngestOptions, Pipeline, SearchHit, TopK};
use serde_json::Value;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Queries run by `semdex explore`.
const SAMPLE_QUERIES: [&str; 6] = [
    "villain with orange tracksuit and bowl cut hair",
    "stealing the moon with shrink ray technology",
    "yellow helpers who speak gibberish and love bananas",
    "three orphaned sisters adopted by supervillain",
    "1980s nostalgia disco dancing former child star",
    "secret agent with lipstick weapons",
];

/// Characters searched by `semdex explore`.
const SAMPLE_CHARACTERS: [&str; 4] = ["Vector", "Gru", "Minions", "Lucy"];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a JSON array of {text, metadata} documents
    Ingest {
        /// Path to the documents file
        #[arg(default_value = "data/sample_docs.json")]
        file: PathBuf,

        /// Do not copy document text into the stored metadata
        #[arg(long)]
        omit_text: bool,
    },

    /// Semantic search
    Search {
        query: String,

        /// Number of results (clamped to 1..=50)
        #[arg(short, long, default_value_t = 5, allow_negative_numbers = true)]
        k: i64,
    },

    /// Search for documents about a character
    Character {
        name: String,

        #[arg(short, long, default_value_t = 3)]
        k: usize,
    },

    /// Run the built-in sample queries and character searches
    Explore,

    /// Embed probe texts and report the model's output dimension
    CheckDims {
        /// Texts to embed instead of the built-in probes
        texts: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level.as_str().into()))
        .with(fmt::layer().compact())
        .init();

    let config = AppConfig::load().context("configuration is incomplete")?;
    let mut pipeline = Pipeline::from_config(&config)
        .await
        .context("failed to initialise embedding endpoint or vector store")?;

    match cli.command {
        Commands::Ingest { file, omit_text } => {
            if omit_text {
                pipeline = pipeline.with_options(IngestOptions { include_text: false });
            }
            run_ingest(&pipeline, file).await
        }
        Commands::Search { query, k } => {
            run_search(&pipeline, &query, TopK::clamped(k)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Character { name, k } => {
            run_character(&pipeline, &name, k).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Explore => {
            println!("Bucket: {}", config.vector_bucket);
            println!("Index:  {}", config.index_name);
            println!("Model:  {}", config.sagemaker_endpoint);
            let two = TopK::clamped(2);
            for query in SAMPLE_QUERIES {
                run_search(&pipeline, query, two).await?;
            }
            for name in SAMPLE_CHARACTERS {
                run_character(&pipeline, name, 2).await?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckDims { texts } => run_check_dims(&pipeline, texts, &config).await,
    }
}

async fn run_ingest(pipeline: &Pipeline, file: PathBuf) -> anyhow::Result<ExitCode> {
    let docs = load_documents(&file)?;
    println!("Loaded {} documents from {}", docs.len(), file.display());

    let summary = pipeline
        .ingest_batch_with_progress(docs, |position, total, outcome| match outcome {
            Ok(receipt) => println!("[{position}/{total}] ok   {}", receipt.document_id),
            Err(err) => println!("[{position}/{total}] FAIL {err}"),
        })
        .await;

    println!(
        "Finished: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    Ok(if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_search(pipeline: &Pipeline, query: &str, k: TopK) -> anyhow::Result<()> {
    println!("\nQuery: {query}");
    let hits = pipeline.search(query, k).await?;
    if hits.is_empty() {
        println!("  no results");
    }
    for (rank, hit) in hits.iter().enumerate() {
        print_hit(rank + 1, hit);
    }
    Ok(())
}

async fn run_character(pipeline: &Pipeline, name: &str, k: usize) -> anyhow::Result<()> {
    println!("\nCharacter: {name}");
    let result = pipeline.search_by_character(name, k).await?;
    if !result.filter_applied {
        println!("  no exact matches for '{name}', showing semantic results");
    }
    for (rank, hit) in result.hits.iter().enumerate() {
        print_hit(rank + 1, hit);
    }
    Ok(())
}

fn print_hit(rank: usize, hit: &SearchHit) {
    let or_unknown = |v: Option<&str>| v.unwrap_or("Unknown").to_string();
    println!("{rank}. similarity {:.4}  ({})", hit.score, hit.id);
    println!("   title:     {}", or_unknown(hit.title()));
    println!("   character: {}", or_unknown(hit.character()));
    println!("   movie:     {}", or_unknown(hit.movie()));
    println!("   category:  {}", or_unknown(hit.category()));
    if !hit.text.is_empty() {
        println!("   {}", semdex::search::preview(&hit.text, PREVIEW_CHARS));
    }
}

async fn run_check_dims(
    pipeline: &Pipeline,
    texts: Vec<String>,
    config: &AppConfig,
) -> anyhow::Result<ExitCode> {
    let texts = if texts.is_empty() {
        DEFAULT_PROBES.iter().map(|t| t.to_string()).collect()
    } else {
        texts
    };

    println!("Endpoint: {}", config.sagemaker_endpoint);
    let report = probe_dimensions(pipeline.embedder(), &texts).await;

    for (idx, probe) in report.probes.iter().enumerate() {
        println!("{}. '{}'", idx + 1, semdex::search::preview(&probe.text, 50));
        match &probe.outcome {
            Ok(stats) => {
                println!("   dimensions:    {}", stats.dimension);
                println!("   sample values: {}", Value::from(stats.head.clone()));
                println!("   value range:   [{:.3}, {:.3}]", stats.min, stats.max);
            }
            Err(err) => println!("   error: {err}"),
        }
    }

    match report.consistent_dimension() {
        Some(dim) => {
            println!("Consistent dimensions: true ({dim})");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!(
                "Consistent dimensions: false (observed {:?})",
                report.dimensions()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
