use domain::providers::DocumentQa;
use application::rag_service::RagService;
use infrastructure::config::{Config, RagSettings};
use shared::error::AssistantError;
use std::io::Write;
use tests::{resume_document, BagOfWordsEmbedder, GroundedModel};

fn settings() -> RagSettings {
    let mut rag = Config::new("groq", "jina").rag;
    rag.chunk_size = 100;
    rag.chunk_overlap = 10;
    rag.top_k = 2;
    rag
}

#[tokio::test]
async fn test_fact_chunk_is_retrieved_and_answered() {
    let model = GroundedModel::default();
    let rag = RagService::build(
        &settings(),
        &resume_document(),
        BagOfWordsEmbedder::default(),
        model.clone(),
    )
    .await
    .unwrap();
    assert!(rag.index().len() > 2);

    let hits = rag.retrieve("What is the candidate name?").await.unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().any(|h| h.chunk.text.contains("Jane Doe")));
    assert!(hits[0].chunk.text.contains("Jane Doe"));

    let answer = rag.answer("What is the candidate name?").await.unwrap();
    assert!(answer.contains("Jane Doe"), "answer was: {}", answer);
}

#[tokio::test]
async fn test_context_is_joined_in_rank_order() {
    let model = GroundedModel::default();
    let rag = RagService::build(
        &settings(),
        &resume_document(),
        BagOfWordsEmbedder::default(),
        model.clone(),
    )
    .await
    .unwrap();

    let question = "What is the candidate name?";
    let hits = rag.retrieve(question).await.unwrap();
    rag.answer(question).await.unwrap();

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    let expected_context = hits
        .iter()
        .map(|h| h.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    assert!(prompts[0].contains(&format!("Context: {}\n\nQuestion: {}", expected_context, question)));
}

#[tokio::test]
async fn test_absent_fact_is_declined() {
    let rag = RagService::build(
        &settings(),
        &resume_document(),
        BagOfWordsEmbedder::default(),
        GroundedModel::default(),
    )
    .await
    .unwrap();

    let answer = rag
        .answer("Which university awarded the doctorate?")
        .await
        .unwrap()
        .to_lowercase();
    assert!(answer.contains("cannot answer") || answer.contains("not"), "{}", answer);
    assert!(!answer.contains("jane"));
}

#[tokio::test]
async fn test_empty_question_is_invalid_input() {
    let model = GroundedModel::default();
    let rag = RagService::build(
        &settings(),
        &resume_document(),
        BagOfWordsEmbedder::default(),
        model.clone(),
    )
    .await
    .unwrap();

    let err = rag.answer("   ").await.unwrap_err();
    assert!(matches!(err, AssistantError::InvalidInput(_)));
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_pipeline_from_text_file() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write!(
        file,
        "Summary: backend engineer.\n\nCandidate name: Jane Doe\n\nCity: Berlin"
    )
    .unwrap();

    let mut rag_settings = settings();
    rag_settings.document_path = file.path().to_path_buf();
    let rag = RagService::from_path(
        &rag_settings,
        BagOfWordsEmbedder::default(),
        GroundedModel::default(),
    )
    .await
    .unwrap();

    let answer = rag.answer("Which city is listed?").await.unwrap();
    assert!(answer.contains("Berlin"), "{}", answer);
}

#[tokio::test]
async fn test_missing_document_fails_to_build() {
    let mut rag_settings = settings();
    rag_settings.document_path = "/no/such/resume.pdf".into();
    let result = RagService::from_path(
        &rag_settings,
        BagOfWordsEmbedder::default(),
        GroundedModel::default(),
    )
    .await;
    assert!(matches!(result, Err(AssistantError::Document(_))));
}
