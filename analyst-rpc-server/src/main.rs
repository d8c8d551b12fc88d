use analyst_data_services::{ChunkingConfig, CorpusConfig, DocumentGranularity, SentenceModel};
use analyst_responder::{
    AnswerStrategy, EmbedderKind, GenerationParams, LlmConfig, LlmProvider, ResponderConfig,
};
use analyst_rpc_server::{RpcServer, ServerConfig};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "analyst-rpc-server")]
#[command(about = "JSON-RPC server answering questions over business data")]
struct Cli {
    /// Server host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to bind to
    #[arg(long, default_value = "7880")]
    port: u16,

    /// CSV dataset indexed at startup
    #[arg(long, default_value = "business_data.csv")]
    data: PathBuf,

    /// Document granularity
    #[arg(long, value_enum, default_value = "per-row")]
    granularity: Granularity,

    /// Maximum chunk size in characters
    #[arg(long, default_value = "500")]
    chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[arg(long, default_value = "50")]
    chunk_overlap: usize,

    /// Default number of records retrieved per query
    #[arg(long, default_value = "3")]
    top_k: usize,

    /// Answer strategy
    #[arg(long, value_enum, default_value = "extractive")]
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

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Granularity {
    PerRow,
    WholeDataset,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Strategy {
    Extractive,
    Generative,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EmbedderBackend {
    Fastembed,
    Hashing,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EmbeddingModel {
    #[value(name = "all-minilm-l6-v2")]
    AllMiniLmL6V2,
    #[value(name = "bge-small-en-v1.5")]
    BgeSmallEnV15,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Provider {
    Openai,
    Tgi,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            data_path: self.data,
            corpus: CorpusConfig {
                granularity: match self.granularity {
                    Granularity::PerRow => DocumentGranularity::PerRow,
                    Granularity::WholeDataset => DocumentGranularity::WholeDataset,
                },
                chunking: ChunkingConfig {
                    chunk_size: self.chunk_size,
                    chunk_overlap: self.chunk_overlap,
                    ..Default::default()
                },
                ..Default::default()
            },
            responder: ResponderConfig {
                top_k: self.top_k,
                strategy: match self.strategy {
                    Strategy::Extractive => AnswerStrategy::Extractive,
                    Strategy::Generative => AnswerStrategy::Generative,
                },
                generation: GenerationParams::default(),
            },
            embedder: match self.embedder {
                EmbedderBackend::Fastembed => EmbedderKind::FastEmbed,
                EmbedderBackend::Hashing => EmbedderKind::Hashing,
            },
            embedding_model: match self.embedding_model {
                EmbeddingModel::AllMiniLmL6V2 => SentenceModel::AllMiniLmL6V2,
                EmbeddingModel::BgeSmallEnV15 => SentenceModel::BgeSmallEnV15,
            },
            llm: LlmConfig {
                provider: match self.llm_provider {
                    Provider::Openai => LlmProvider::OpenAI,
                    Provider::Tgi => LlmProvider::TextGenerationInference,
                },
                model: self.llm_model,
                base_url: self.llm_base_url,
                ..Default::default()
            },
            api_key: self.api_key,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "analyst_rpc_server={},analyst_responder={},analyst_data_services={}",
                cli.log_level, cli.log_level, cli.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.into_config();

    tracing::info!("Analyst JSON-RPC Server Starting");
    tracing::info!("Configuration:");
    tracing::info!("  Bind: {}", config.bind_addr());
    tracing::info!("  Dataset: {}", config.data_path.display());
    tracing::info!("  Strategy: {}", config.responder.strategy.as_str());
    tracing::info!("  Top K: {}", config.responder.top_k);
    tracing::info!("  Embedding Model: {}", config.embedding_model.name());

    let server = RpcServer::new(config).await?;
    server.run().await?;

    Ok(())
}
