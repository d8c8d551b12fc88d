use analyst_responder::{create_embedder, create_generator, ResponderFactory};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::error::RpcError;
use crate::handler::AnalystQueryHandler;
use crate::protocol::*;

/// JSON-RPC server for analyst queries
pub struct RpcServer {
    config: ServerConfig,
    handler: Arc<AnalystQueryHandler>,
}

impl RpcServer {
    /// Create a new RPC server, loading models and indexing the startup dataset
    pub async fn new(config: ServerConfig) -> Result<Self> {
        tracing::info!("Initializing analyst components...");

        let embedder = create_embedder(config.embedder, config.embedding_model)
            .context("Failed to load embedding model")?;
        let generator = create_generator(
            config.responder.strategy,
            config.llm.clone(),
            config.api_key.clone(),
        )
        .context("Failed to initialize generation client")?;

        let factory = ResponderFactory::new(
            config.corpus.clone(),
            config.responder.clone(),
            embedder,
            generator,
        );

        let data_path = config.data_path.clone();
        let build_factory = factory.clone();
        let initial = tokio::task::spawn_blocking(move || build_factory.load_path(&data_path))
            .await?
            .with_context(|| format!("Failed to index {}", config.data_path.display()))?;

        tracing::info!(
            "Corpus ready: {} records, {} chunks, model={}",
            initial.stats.records,
            initial.stats.chunks,
            initial.responder.index().embedding_model()
        );

        let handler = Arc::new(AnalystQueryHandler::new(factory, initial));

        Ok(Self::with_handler(config, handler))
    }

    /// Create a server around an existing handler
    pub fn with_handler(config: ServerConfig, handler: Arc<AnalystQueryHandler>) -> Self {
        Self { config, handler }
    }

    /// Bind the configured address and serve until the process exits
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .context(format!("Failed to bind to {}", addr))?;

        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr: SocketAddr = listener.local_addr()?;
        tracing::info!("Analyst JSON-RPC server listening on {}", local_addr);

        loop {
            match listener.accept().await {
                Ok((socket, addr)) => {
                    tracing::debug!("New connection from {}", addr);
                    let handler = Arc::clone(&self.handler);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(socket, handler).await {
                            tracing::error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Handle a single TCP connection
async fn handle_connection(mut socket: TcpStream, handler: Arc<AnalystQueryHandler>) -> Result<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // Connection closed
            break;
        }

        if line.trim().is_empty() {
            continue;
        }

        tracing::debug!("Received request: {}", line.trim());

        let response = process_request(&line, &handler).await;

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        tracing::debug!("Sent response");
    }

    Ok(())
}

/// Process a JSON-RPC request line
pub async fn process_request(line: &str, handler: &AnalystQueryHandler) -> Value {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(req) => req,
        Err(e) => {
            return create_error_response(None, RpcError::ParseError(e.to_string()));
        }
    };

    if request.jsonrpc != "2.0" {
        return create_error_response(
            request.id,
            RpcError::InvalidRequest("JSON-RPC version must be 2.0".to_string()),
        );
    }

    let id = request.id.clone();

    let result = match request.method.as_str() {
        METHOD_ASK => match parse_params::<AskRequest>(request.params) {
            Ok(params) => to_result(handler.handle_ask(params).await),
            Err(e) => Err(e),
        },
        METHOD_SUMMARY => to_result(handler.handle_summary().await),
        METHOD_RELOAD => match parse_params::<ReloadRequest>(request.params) {
            Ok(params) => to_result(handler.handle_reload(params).await),
            Err(e) => Err(e),
        },
        other => Err(RpcError::MethodNotFound(other.to_string())),
    };

    match result {
        Ok(result) => create_success_response(id, result),
        Err(e) => {
            tracing::warn!("Request failed: code={}, {}", e.code(), e);
            create_error_response(id, e)
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, RpcError> {
    let params = params.ok_or_else(|| RpcError::InvalidParams("Missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| RpcError::InvalidParams(e.to_string()))
}

fn to_result<T: Serialize>(result: Result<T, RpcError>) -> Result<Value, RpcError> {
    let value = result?;
    serde_json::to_value(value).map_err(|e| RpcError::InternalError(e.to_string()))
}

fn create_success_response(id: Option<Value>, result: Value) -> Value {
    serde_json::json!(JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result,
    })
}

/// Create an error response
fn create_error_response(id: Option<Value>, error: RpcError) -> Value {
    serde_json::json!(JsonRpcError {
        jsonrpc: "2.0".to_string(),
        id,
        error: ErrorObject {
            code: error.code(),
            message: error.to_string(),
            data: error.data(),
        },
    })
}
