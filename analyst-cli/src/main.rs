use analyst_core::{BusinessSummary, DatasetSchema};
use analyst_data_services::{
    ChunkingConfig, CorpusBuilder, CorpusConfig, DatasetLoader, DocumentGranularity,
    SentenceModel,
};
use analyst_responder::{
    create_embedder, create_generator, AnswerStrategy, EmbedderKind, GenerationParams, LlmConfig,
    LlmProvider, ResponderConfig, ResponderFactory,
};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Business Analyst CLI
///
/// Loads a CSV of monthly business data, builds an embedded corpus from it,
/// and answers free-text questions over the retrieved records.
#[derive(Parser, Debug)]
#[command(name = "analyst", author, version, about, long_about = None)]
struct Args {
    /// CSV dataset with Month, Sales, Expenses, Customers, Inventory Cost and Marketing Spend columns
    #[arg(short, long, default_value = "business_data.csv")]
    data: PathBuf,

    /// Document granularity
    #[arg(short, long, value_enum, default_value = "per-row")]
    granularity: Granularity,

    /// Maximum chunk size in characters
    #[arg(long, default_value = "500")]
    chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[arg(long, default_value = "50")]
    chunk_overlap: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the business summary metrics
    Summary,

    /// Print the corpus chunks that would be embedded
    Chunks,

    /// Answer a question about the dataset
    Ask(AskArgs),
}

#[derive(clap::Args, Debug)]
struct AskArgs {
    /// Question to answer
    query: String,

    /// Number of records retrieved as context
    #[arg(short = 'k', long, default_value = "3")]
    top_k: usize,

    /// Answer strategy
    #[arg(short, long, value_enum, default_value = "extractive")]
    strategy: Strategy,

    /// Embedding backend
    #[arg(long, value_enum, default_value = "fastembed")]
    embedder: EmbedderBackend,

    /// Sentence-embedding model
    #[arg(long, value_enum, default_value = "all-minilm-l6-v2")]
    embedding_model: EmbeddingModel,

    /// Generation provider (generative strategy only)
    #[arg(long, value_enum, default_value = "openai")]
    llm_provider: Provider,

    /// Generation model
    #[arg(long, default_value = "gpt-4o-mini")]
    llm_model: String,

    /// Generation endpoint (required for tgi)
    #[arg(long)]
    llm_base_url: Option<String>,

    /// API key for the generation provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Granularity {
    PerRow,
    WholeDataset,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Strategy {
    Extractive,
    Generative,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum EmbedderBackend {
    Fastembed,
    Hashing,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum EmbeddingModel {
    #[value(name = "all-minilm-l6-v2")]
    AllMiniLmL6V2,
    #[value(name = "bge-small-en-v1.5")]
    BgeSmallEnV15,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Provider {
    Openai,
    Tgi,
}

impl Args {
    fn corpus_config(&self) -> CorpusConfig {
        CorpusConfig {
            schema: DatasetSchema::default(),
            granularity: match self.granularity {
                Granularity::PerRow => DocumentGranularity::PerRow,
                Granularity::WholeDataset => DocumentGranularity::WholeDataset,
            },
            chunking: ChunkingConfig {
                chunk_size: self.chunk_size,
                chunk_overlap: self.chunk_overlap,
                ..Default::default()
            },
        }
    }
}

impl AskArgs {
    fn strategy(&self) -> AnswerStrategy {
        match self.strategy {
            Strategy::Extractive => AnswerStrategy::Extractive,
            Strategy::Generative => AnswerStrategy::Generative,
        }
    }

    fn embedder_kind(&self) -> EmbedderKind {
        match self.embedder {
            EmbedderBackend::Fastembed => EmbedderKind::FastEmbed,
            EmbedderBackend::Hashing => EmbedderKind::Hashing,
        }
    }

    fn sentence_model(&self) -> SentenceModel {
        match self.embedding_model {
            EmbeddingModel::AllMiniLmL6V2 => SentenceModel::AllMiniLmL6V2,
            EmbeddingModel::BgeSmallEnV15 => SentenceModel::BgeSmallEnV15,
        }
    }

    fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            provider: match self.llm_provider {
                Provider::Openai => LlmProvider::OpenAI,
                Provider::Tgi => LlmProvider::TextGenerationInference,
            },
            model: self.llm_model.clone(),
            base_url: self.llm_base_url.clone(),
            ..Default::default()
        }
    }

    fn responder_config(&self) -> ResponderConfig {
        ResponderConfig {
            top_k: self.top_k,
            strategy: self.strategy(),
            generation: GenerationParams::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "analyst={},analyst_data_services={},analyst_responder={}",
                args.log_level, args.log_level, args.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Dataset: {}", args.data.display());

    match &args.command {
        Command::Summary => run_summary(&args),
        Command::Chunks => run_chunks(&args),
        Command::Ask(ask) => run_ask(&args, ask).await,
    }
}

fn run_summary(args: &Args) -> Result<()> {
    let dataset = DatasetLoader::from_path(&args.data)?;
    let records = dataset.to_records(&DatasetSchema::default())?;
    let summary = BusinessSummary::from_records(&records)?;

    println!("{}", summary.overview());
    println!();
    println!("Average Sales:    {:.2}", summary.avg_sales);
    println!("Average Expenses: {:.2}", summary.avg_expenses);
    println!("Average Profit:   {:.2}", summary.avg_profit);
    println!("Marketing ROI:    {:.2}%", summary.avg_roi_pct);
    println!(
        "Best Month:       {} ({:.2})",
        summary.best_period, summary.best_profit
    );

    Ok(())
}

fn run_chunks(args: &Args) -> Result<()> {
    let dataset = DatasetLoader::from_path(&args.data)?;
    let builder = CorpusBuilder::new(args.corpus_config())?;
    let (records, chunks) = builder.build_chunks(&dataset)?;

    info!("{} records, {} chunks", records.len(), chunks.len());

    for chunk in &chunks {
        println!(
            "--- document {} chunk {} [{}..{}] ---",
            chunk.document_index, chunk.chunk_index, chunk.start, chunk.end
        );
        println!("{}", chunk.text);
    }

    Ok(())
}

async fn run_ask(args: &Args, ask: &AskArgs) -> Result<()> {
    let embedder = create_embedder(ask.embedder_kind(), ask.sentence_model())?;
    let generator = create_generator(ask.strategy(), ask.llm_config(), ask.api_key.clone())?;

    let factory = ResponderFactory::new(
        args.corpus_config(),
        ask.responder_config(),
        embedder,
        generator,
    );
    let loaded = factory.load_path(&args.data)?;

    info!(
        "Corpus ready: {} records, {} chunks",
        loaded.stats.records, loaded.stats.chunks
    );

    let answer = loaded.responder.answer(&ask.query).await?;

    println!("{}", answer.text);

    if answer.show_trend_chart {
        println!();
        println!("{:<10} {:>14} {:>14} {:>14}", "Month", "Sales", "Expenses", "Profit");
        for record in &loaded.records {
            println!(
                "{:<10} {:>14.2} {:>14.2} {:>14.2}",
                record.period,
                record.sales,
                record.expenses,
                record.profit()
            );
        }
    }

    Ok(())
}
