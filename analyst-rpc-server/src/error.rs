use analyst_core::AnalystError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Empty corpus: the dataset contains no rows")]
    EmptyCorpus,

    #[error("Formatting error at row {row}, field '{field}': {reason}")]
    Formatting {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Dimension mismatch: corpus has {expected}, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Dataset error: {0}")]
    DatasetError(String),
}

impl RpcError {
    /// Get the JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        use crate::protocol::*;
        match self {
            RpcError::ParseError(_) => PARSE_ERROR,
            RpcError::InvalidRequest(_) => INVALID_REQUEST,
            RpcError::MethodNotFound(_) => METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => INVALID_PARAMS,
            RpcError::InternalError(_) => INTERNAL_ERROR,
            RpcError::EmptyCorpus => EMPTY_CORPUS,
            RpcError::Formatting { .. } => FORMATTING_ERROR,
            RpcError::GenerationUnavailable(_) => GENERATION_UNAVAILABLE,
            RpcError::DimensionMismatch { .. } => DIMENSION_MISMATCH,
            RpcError::EmbeddingError(_) => EMBEDDING_ERROR,
            RpcError::DatasetError(_) => DATASET_ERROR,
        }
    }

    /// Get additional error data (optional)
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            RpcError::Formatting { row, field, .. } => Some(serde_json::json!({
                "row": row,
                "field": field,
                "suggestion": "Check that every row has numeric values for all required columns"
            })),
            RpcError::DimensionMismatch { expected, actual } => Some(serde_json::json!({
                "expected": expected,
                "actual": actual,
                "suggestion": "Query and corpus must use the same embedding model"
            })),
            _ => None,
        }
    }
}

impl From<AnalystError> for RpcError {
    fn from(err: AnalystError) -> Self {
        match err {
            AnalystError::EmptyCorpus => RpcError::EmptyCorpus,
            AnalystError::Formatting { row, field, reason } => {
                RpcError::Formatting { row, field, reason }
            }
            AnalystError::GenerationUnavailable(msg) => RpcError::GenerationUnavailable(msg),
            AnalystError::DimensionMismatch { expected, actual } => {
                RpcError::DimensionMismatch { expected, actual }
            }
            AnalystError::Embedding(msg) => RpcError::EmbeddingError(msg),
            AnalystError::Dataset(msg) => RpcError::DatasetError(msg),
            AnalystError::InvalidConfig(msg) => RpcError::InvalidParams(msg),
        }
    }
}

// Convert anyhow errors to RpcError
impl From<anyhow::Error> for RpcError {
    fn from(err: anyhow::Error) -> Self {
        RpcError::InternalError(err.to_string())
    }
}
