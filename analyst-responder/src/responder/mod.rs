/// Query answering over a built corpus index
pub mod analyst_responder;
pub mod factory;

pub use analyst_responder::{Answer, AnswerStrategy, Responder, ResponderConfig};
pub use factory::{create_embedder, create_generator, EmbedderKind, LoadedCorpus, ResponderFactory};
