use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tracing::info;

use ct_core::{DocumentStore, InferenceModel, Result};
use ct_inference::Config;
use ct_markdown::{export, records};
use ct_reconcile::{batch, buckets, Collections, Reconciler};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = "memory")]
    storage: String,
    #[arg(
        long,
        default_value = "ollama",
        help = "Model to use for generation. Available models: ollama (default), dummy"
    )]
    model: String,
    #[arg(long, help = "Override the model endpoint URL")]
    model_url: Option<String>,
    #[arg(long, help = "Override the underlying model variant, e.g. llama3.2:1b")]
    model_variant: Option<String>,
    #[arg(long, default_value_t = 4, help = "Maximum concurrent generation calls")]
    concurrency: usize,
    #[arg(long, default_value = "news")]
    articles_collection: String,
    #[arg(long, default_value = "summaries")]
    summaries_collection: String,
    #[arg(long, default_value = "tips")]
    tips_collection: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Import an article feed markdown file into the article collection
    Ingest { input: PathBuf },
    /// Generate summaries for a markdown article feed
    Summarize {
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate do/don't security tips for a markdown article feed
    Tips {
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Store generated summaries/tips markdown into their collections
    Store {
        #[arg(long)]
        summaries: Option<PathBuf>,
        #[arg(long)]
        tips: Option<PathBuf>,
    },
    /// Store a tips markdown file into date-bucketed collections
    StoreDated {
        input: PathBuf,
        #[arg(long, default_value = "tips")]
        prefix: String,
    },
    /// Report coverage of the derived collections against the article set
    Check,
    /// Repair missing, malformed and placeholder derived records
    Fix {
        #[arg(long, help = "Repair without a live model (placeholders and heuristics only)")]
        offline: bool,
    },
    /// Export stored articles to a markdown feed
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn collections(cli: &Cli) -> Collections {
    Collections {
        articles: cli.articles_collection.clone(),
        summaries: cli.summaries_collection.clone(),
        tips: cli.tips_collection.clone(),
    }
}

async fn create_model(cli: &Cli) -> Result<Arc<dyn InferenceModel>> {
    let config = Config {
        model_name: Some(cli.model.clone()),
        model_variant: cli.model_variant.clone(),
        model_url: cli.model_url.clone(),
    };
    let model = ct_inference::create_model(Some(config)).await?;
    info!("🧠 Inference model initialized successfully (using {})", model.name());
    Ok(model)
}

fn timestamped(stem: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}.md",
        stem,
        Utc::now().format("%Y%m%d_%H%M%S")
    ))
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    info!("📄 Output written to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let store: Arc<dyn DocumentStore> = ct_storage::create_storage(cli.storage.as_str()).await?;
    info!("💾 Storage initialized successfully (using {})", cli.storage);

    let generated_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    match &cli.command {
        Commands::Ingest { input } => {
            let content = fs::read_to_string(input)?;
            let articles = records::parse_articles(&content);
            let total = articles.len();
            for article in &articles {
                let mut doc = match serde_json::to_value(article)? {
                    serde_json::Value::Object(map) => map,
                    _ => continue,
                };
                doc.insert(
                    "_id".to_string(),
                    serde_json::Value::String(article.id.clone()),
                );
                store.insert_one(&cli.articles_collection, doc).await?;
            }
            info!(
                "📰 Imported {} articles into '{}'",
                total, cli.articles_collection
            );
        }
        Commands::Summarize { input, output } => {
            let content = fs::read_to_string(input)?;
            let articles = records::parse_articles(&content);
            info!("📰 Summarizing {} articles", articles.len());

            let model = create_model(&cli).await?;
            let result =
                batch::generate_summaries(model, &articles, cli.concurrency, &generated_at).await;
            info!(
                "✨ Summarized {}/{} articles",
                result.tally.succeeded,
                result.records.len()
            );

            let markdown = export::summaries_to_markdown(&result.records, &generated_at);
            let path = output
                .clone()
                .unwrap_or_else(|| timestamped("article_summaries"));
            write_output(&path, &markdown)?;
        }
        Commands::Tips { input, output } => {
            let content = fs::read_to_string(input)?;
            let articles = records::parse_articles(&content);
            info!("📰 Generating tips for {} articles", articles.len());

            let model = create_model(&cli).await?;
            let result =
                batch::generate_tips(model, &articles, cli.concurrency, &generated_at).await;
            info!(
                "✨ Generated tips for {}/{} articles ({} heuristic fallbacks)",
                result.tally.succeeded,
                result.records.len(),
                result.tally.failed
            );

            let markdown = export::tips_to_markdown(&result.records, &generated_at);
            let path = output.clone().unwrap_or_else(|| timestamped("ciso_tips"));
            write_output(&path, &markdown)?;
        }
        Commands::Store { summaries, tips } => {
            if summaries.is_none() && tips.is_none() {
                info!("No input files specified. Use --summaries or --tips to provide input files.");
            }
            if let Some(path) = summaries {
                let content = fs::read_to_string(path)?;
                let parsed = records::parse_summaries(&content)?;
                let mut stored = 0;
                for record in &parsed {
                    store
                        .insert_one(&cli.summaries_collection, record.to_document())
                        .await?;
                    stored += 1;
                }
                info!(
                    "💾 Stored {} summaries in collection '{}'",
                    stored, cli.summaries_collection
                );
            }
            if let Some(path) = tips {
                let content = fs::read_to_string(path)?;
                let parsed = records::parse_tips(&content)?;
                let mut stored = 0;
                for record in &parsed {
                    store
                        .insert_one(&cli.tips_collection, record.to_document())
                        .await?;
                    stored += 1;
                }
                info!(
                    "💾 Stored {} tips in collection '{}'",
                    stored, cli.tips_collection
                );
            }
        }
        Commands::StoreDated { input, prefix } => {
            let content = fs::read_to_string(input)?;
            let doc = ct_markdown::splitter::split_document(&content);
            let generation_date = doc.generation_date()?;
            let parsed = records::parse_tips(&content)?;
            let stored =
                buckets::store_tips_by_date(store.as_ref(), &parsed, prefix, generation_date)
                    .await?;
            info!("💾 Stored {} tips into date-bucketed collections", stored);
        }
        Commands::Check => {
            let engine = Reconciler::new(store.clone(), collections(&cli));
            let report = engine.check().await?;
            if report.malformed_tips == 0 && report.placeholder_tips == 0 {
                info!("✅ All tips documents have correct structure");
            } else {
                info!("⚠️ Run 'ct fix' to repair the reported issues");
            }
        }
        Commands::Fix { offline } => {
            let mut engine = Reconciler::new(store.clone(), collections(&cli));
            if !offline {
                engine = engine.with_model(create_model(&cli).await?);
            }
            let report = engine.repair().await?;
            info!(
                "✅ Repair complete: {} summaries written, {} tips written, {} salvaged, {} placeholders remaining, {} failures",
                report.summaries_written,
                report.tips_written,
                report.salvaged_summaries,
                report.placeholders_remaining,
                report.failures
            );
        }
        Commands::Export { output, limit } => {
            let docs = store
                .find(&cli.articles_collection, None, None, *limit)
                .await?;
            let articles: Vec<_> = docs
                .iter()
                .filter_map(ct_core::Article::from_document)
                .collect();
            let markdown = export::articles_to_markdown(&articles, &generated_at);
            let path = output
                .clone()
                .unwrap_or_else(|| timestamped("cybersecurity_articles"));
            write_output(&path, &markdown)?;
            info!("📦 Exported {} articles", articles.len());
        }
    }

    Ok(())
}
