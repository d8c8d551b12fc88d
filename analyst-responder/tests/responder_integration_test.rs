/// Integration tests for the retrieval-augmented responder
///
/// These tests verify that the responder correctly integrates:
/// - Corpus construction from CSV data
/// - Query embedding and ranking
/// - Extractive and Generative answer production
/// - Error propagation from embedding and generation
use analyst_core::{AnalystError, Result};
use analyst_data_services::rag::IndexedChunk;
use analyst_data_services::{
    Chunk, CorpusBuilder, CorpusConfig, CorpusIndex, DatasetLoader, Embedder, HashingEmbedder,
};
use analyst_responder::{
    AnswerStrategy, GenerationParams, Responder, ResponderConfig, TextGenerator,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

const HEADER: &str =
    "Month,Sales (INR),Expenses (INR),Customers,Inventory Cost (INR),Marketing Spend (INR)\n";

/// Generator that records the prompt and echoes it back before its answer
struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        assert_eq!(params.max_new_tokens, 150);
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!("{}\nJanuary sales were 1000.", prompt))
    }
}

struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
        Err(AnalystError::GenerationUnavailable(
            "connection refused".to_string(),
        ))
    }
}

fn build_index(csv: &str, embedder: &HashingEmbedder) -> Arc<CorpusIndex> {
    let dataset = DatasetLoader::from_reader(csv.as_bytes()).unwrap();
    let builder = CorpusBuilder::new(CorpusConfig::default()).unwrap();
    Arc::new(builder.build(&dataset, embedder).unwrap().index)
}

fn single_row() -> String {
    format!("{}Jan,1000,400,50,100,200\n", HEADER)
}

fn quarter() -> String {
    format!(
        "{}Jan,1000,400,50,100,200\nFeb,900,500,45,120,150\nMar,1500,450,70,90,300\n",
        HEADER
    )
}

#[tokio::test]
async fn test_single_row_extractive_answer() {
    let embedder = HashingEmbedder::default();
    let index = build_index(&single_row(), &embedder);
    let responder = Responder::new(
        ResponderConfig::default(),
        index,
        Arc::new(embedder),
        None,
    )
    .unwrap();

    let answer = responder.answer("What were January sales?").await.unwrap();

    assert_eq!(answer.matches.len(), 1);
    assert!(answer.text.contains("Sales: 1000"));
    assert!(answer.text.contains("Month: Jan"));
}

#[tokio::test]
async fn test_extractive_answers_are_byte_identical() {
    let embedder = HashingEmbedder::default();
    let index = build_index(&quarter(), &embedder);
    let responder = Responder::new(
        ResponderConfig::default(),
        index,
        Arc::new(embedder),
        None,
    )
    .unwrap();

    let first = responder.answer_text("Which month had the best profit?").await.unwrap();
    // Unrelated query in between must not affect later answers
    responder.answer_text("marketing spend").await.unwrap();
    let second = responder.answer_text("Which month had the best profit?").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_generative_answer_without_prompt_echo() {
    let embedder = HashingEmbedder::default();
    let index = build_index(&single_row(), &embedder);
    let generator = Arc::new(RecordingGenerator {
        prompts: Mutex::new(Vec::new()),
    });
    let config = ResponderConfig {
        strategy: AnswerStrategy::Generative,
        ..Default::default()
    };
    let responder = Responder::new(
        config,
        index,
        Arc::new(embedder),
        Some(generator.clone() as Arc<dyn TextGenerator>),
    )
    .unwrap();

    let answer = responder.answer("What were January sales?").await.unwrap();

    assert_eq!(answer.text, "January sales were 1000.");

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Month: Jan, Sales: 1000"));
    assert!(prompts[0].contains("Question: What were January sales?"));
    assert!(!answer.text.contains(&prompts[0]));
}

#[tokio::test]
async fn test_generation_failure_is_surfaced() {
    let embedder = HashingEmbedder::default();
    let index = build_index(&quarter(), &embedder);
    let config = ResponderConfig {
        strategy: AnswerStrategy::Generative,
        ..Default::default()
    };
    let responder = Responder::new(
        config,
        index,
        Arc::new(embedder),
        Some(Arc::new(FailingGenerator)),
    )
    .unwrap();

    let err = responder.answer("What were January sales?").await.unwrap_err();
    assert_eq!(
        err,
        AnalystError::GenerationUnavailable("connection refused".to_string())
    );
}

#[tokio::test]
async fn test_query_dimension_mismatch() {
    let corpus_embedder = HashingEmbedder::new(512);
    let entries = vec![IndexedChunk {
        chunk: Chunk {
            text: "Month: Jan, Sales: 1000".to_string(),
            document_index: 0,
            chunk_index: 0,
            start: 0,
            end: 23,
            overlap: 0,
        },
        embedding: corpus_embedder.embed_one("Month: Jan, Sales: 1000").unwrap(),
    }];
    let index = Arc::new(CorpusIndex::from_entries(entries, corpus_embedder.model_name()).unwrap());

    let responder = Responder::new(
        ResponderConfig::default(),
        index,
        Arc::new(HashingEmbedder::new(384)),
        None,
    )
    .unwrap();

    let err = responder.answer("What were January sales?").await.unwrap_err();
    assert_eq!(
        err,
        AnalystError::DimensionMismatch {
            expected: 512,
            actual: 384
        }
    );
}

#[tokio::test]
async fn test_top_k_exceeding_corpus_returns_all() {
    let embedder = HashingEmbedder::default();
    let index = build_index(&quarter(), &embedder);
    let config = ResponderConfig {
        top_k: 10,
        ..Default::default()
    };
    let responder = Responder::new(config, index, Arc::new(embedder), None).unwrap();

    let answer = responder.answer("sales").await.unwrap();
    assert_eq!(answer.matches.len(), 3);
    assert!(answer
        .matches
        .windows(2)
        .all(|w| w[0].similarity >= w[1].similarity));
}
