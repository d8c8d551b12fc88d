use analyst_data_services::{CorpusConfig, SentenceModel};
use analyst_responder::{EmbedderKind, LlmConfig, ResponderConfig};
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// CSV dataset indexed at startup
    pub data_path: PathBuf,

    pub corpus: CorpusConfig,
    pub responder: ResponderConfig,

    pub embedder: EmbedderKind,
    pub embedding_model: SentenceModel,

    /// Generation client settings (generative strategy only)
    pub llm: LlmConfig,
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7880,
            data_path: PathBuf::from("business_data.csv"),
            corpus: CorpusConfig::default(),
            responder: ResponderConfig::default(),
            embedder: EmbedderKind::FastEmbed,
            embedding_model: SentenceModel::AllMiniLmL6V2,
            llm: LlmConfig::default(),
            api_key: String::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
