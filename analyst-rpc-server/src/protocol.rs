use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 Success Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub result: Value,
}

/// JSON-RPC 2.0 Error Response
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub error: ErrorObject,
}

/// JSON-RPC Error Object
#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Custom error codes for analyst operations
pub const EMPTY_CORPUS: i32 = -32001;
pub const FORMATTING_ERROR: i32 = -32002;
pub const GENERATION_UNAVAILABLE: i32 = -32003;
pub const DIMENSION_MISMATCH: i32 = -32004;
pub const EMBEDDING_ERROR: i32 = -32005;
pub const DATASET_ERROR: i32 = -32006;

// Method names
pub const METHOD_ASK: &str = "analyst.ask";
pub const METHOD_SUMMARY: &str = "analyst.summary";
pub const METHOD_RELOAD: &str = "analyst.reload";

/// analyst.ask parameters
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
    /// Overrides the configured top_k for this query
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// analyst.ask result
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub strategy: String,
    pub matches: Vec<MatchJson>,
    pub show_trend_chart: bool,
    /// Per-period series, present when the query asks for a trend view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Vec<TrendPoint>>,
    pub metadata: Metadata,
}

/// Retrieved chunk in JSON format
#[derive(Debug, Serialize)]
pub struct MatchJson {
    /// 1-based rank, best first
    pub rank: usize,
    pub similarity: f32,
    pub text: String,
    pub document_index: usize,
    pub chunk_index: usize,
}

/// One period of the trend series
#[derive(Debug, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub sales: f64,
    pub expenses: f64,
    pub profit: f64,
}

/// Query metadata
#[derive(Debug, Serialize)]
pub struct Metadata {
    pub query_duration_ms: u64,
    pub embedding_duration_ms: u64,
    pub retrieval_duration_ms: u64,
    pub generation_duration_ms: u64,
    pub corpus_size: usize,
    pub embedding_model: String,
}

/// analyst.summary result
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub periods: usize,
    pub avg_sales: f64,
    pub avg_expenses: f64,
    pub avg_profit: f64,
    pub avg_roi_pct: f64,
    pub best_period: String,
    pub best_profit: f64,
    pub overview: String,
}

/// analyst.reload parameters
///
/// Exactly one source must be given: a CSV file on the server host, or the
/// CSV content itself.
#[derive(Debug, Default, Deserialize)]
pub struct ReloadRequest {
    pub path: Option<String>,
    pub csv: Option<String>,
}

/// Where a reload reads its dataset from
#[derive(Debug, PartialEq)]
pub enum ReloadSource {
    Path(String),
    Inline(String),
}

impl ReloadRequest {
    pub fn into_source(self) -> Result<ReloadSource, RpcError> {
        match (self.path, self.csv) {
            (Some(path), None) => Ok(ReloadSource::Path(path)),
            (None, Some(csv)) => Ok(ReloadSource::Inline(csv)),
            (Some(_), Some(_)) => Err(RpcError::InvalidParams(
                "give either path or csv, not both".to_string(),
            )),
            (None, None) => Err(RpcError::InvalidParams(
                "reload needs a path or csv".to_string(),
            )),
        }
    }
}

/// analyst.reload result
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub records: usize,
    pub chunks: usize,
    pub embedding_model: String,

    /// When the new index finished building (RFC 3339)
    pub indexed_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_request_defaults() {
        let req: AskRequest =
            serde_json::from_str(r#"{"query": "What were January sales?"}"#).unwrap();
        assert_eq!(req.query, "What were January sales?");
        assert_eq!(req.top_k, None);
    }

    #[test]
    fn test_parse_jsonrpc_request() {
        let json = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "method": "analyst.ask",
            "params": {"query": "sales", "top_k": 2}
        }"#;

        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.jsonrpc, "2.0");
        assert_eq!(req.method, METHOD_ASK);

        let params: AskRequest = serde_json::from_value(req.params.unwrap()).unwrap();
        assert_eq!(params.top_k, Some(2));
    }

    #[test]
    fn test_trend_omitted_when_absent() {
        let response = AskResponse {
            answer: "a".to_string(),
            strategy: "extractive".to_string(),
            matches: vec![],
            show_trend_chart: false,
            trend: None,
            metadata: Metadata {
                query_duration_ms: 1,
                embedding_duration_ms: 0,
                retrieval_duration_ms: 0,
                generation_duration_ms: 0,
                corpus_size: 0,
                embedding_model: "feature-hashing-384".to_string(),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("trend").is_none());
        assert_eq!(json["metadata"]["query_duration_ms"], 1);
    }

    #[test]
    fn test_reload_source() {
        let req: ReloadRequest = serde_json::from_str(r#"{"path": "/data/q1.csv"}"#).unwrap();
        assert_eq!(
            req.into_source().unwrap(),
            ReloadSource::Path("/data/q1.csv".to_string())
        );

        let req: ReloadRequest = serde_json::from_str(r#"{"csv": "Month\nJan\n"}"#).unwrap();
        assert_eq!(
            req.into_source().unwrap(),
            ReloadSource::Inline("Month\nJan\n".to_string())
        );
    }

    #[test]
    fn test_reload_source_must_be_unique() {
        let both: ReloadRequest =
            serde_json::from_str(r#"{"path": "/data/q1.csv", "csv": "Month\n"}"#).unwrap();
        assert_eq!(both.into_source().unwrap_err().code(), INVALID_PARAMS);

        let neither: ReloadRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(neither.into_source().unwrap_err().code(), INVALID_PARAMS);
    }
}
