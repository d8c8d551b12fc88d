//! Newline-delimited JSON-RPC 2.0 server answering business-data questions

pub mod config;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod server;

pub use config::ServerConfig;
pub use error::RpcError;
pub use handler::AnalystQueryHandler;
pub use server::RpcServer;
