use application::agent_service::AgentService;
use application::assistant_service::AssistantService;
use application::rag_service::RagService;
use domain::providers::WebTools;
use infrastructure::config::Config;
use infrastructure::http::build_client;
use infrastructure::jina_client::JinaClient;
use shared::error::AssistantError;
use tests::{
    action, resume_document, BagOfWordsEmbedder, GroundedModel, RecordingWeb, ScriptedModel,
    UnreachableWeb,
};

type Qa = RagService<BagOfWordsEmbedder, GroundedModel>;

async fn assistant<W>(model: &ScriptedModel, web: W) -> AssistantService<ScriptedModel, W, Qa>
where
    W: WebTools + Sync,
{
    let config = Config::new("groq", "jina");
    let mut rag = config.rag.clone();
    rag.chunk_size = 100;
    rag.chunk_overlap = 10;
    let qa = RagService::build(
        &rag,
        &resume_document(),
        BagOfWordsEmbedder::default(),
        GroundedModel::default(),
    )
    .await
    .unwrap();
    let agent = AgentService::new(model.clone(), web, qa, &config.agent);
    AssistantService::new(agent, config.agent.max_query_length)
}

#[tokio::test]
async fn test_long_query_is_truncated_before_submission() {
    let model = ScriptedModel::new(["Final Answer: done"]);
    let assistant = assistant(&model, RecordingWeb::default()).await;

    assert_eq!(assistant.run(&"x".repeat(250)).await, "done");

    let submitted = model.user_turn(0);
    assert!(submitted.contains(&format!("{}...", "x".repeat(200))));
    assert!(!submitted.contains(&"x".repeat(201)));
}

#[tokio::test]
async fn test_complex_query_plans_first() {
    let model = ScriptedModel::new([
        "1. Use QA to find the name\n2. Use QA to find the city",
        "Final Answer: Jane Doe lives in Berlin.",
    ]);
    let assistant = assistant(&model, RecordingWeb::default()).await;

    let answer = assistant
        .run("What is the name and city of the candidate in the resume?")
        .await;
    assert_eq!(answer, "Jane Doe lives in Berlin.");

    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].len(), 1);
    assert!(calls[0][0]
        .content
        .starts_with("Break down this complex query"));
    let enhanced = model.user_turn(1);
    assert!(enhanced.starts_with("Plan: 1. Use QA to find the name\n2. Use QA to find the city"));
    assert!(enhanced.contains("at least 150 words"));
}

#[tokio::test]
async fn test_second_question_mark_plans_first() {
    let model = ScriptedModel::new(["plan", "Final Answer: ok"]);
    let assistant = assistant(&model, RecordingWeb::default()).await;

    assert_eq!(assistant.run("Who is she? Where is she from?").await, "ok");
    assert!(model
        .user_turn(0)
        .starts_with("Break down this complex query"));
}

#[tokio::test]
async fn test_simple_query_goes_straight_to_agent() {
    let model = ScriptedModel::new(["Final Answer: a short bio"]);
    let assistant = assistant(&model, RecordingWeb::default()).await;

    assert_eq!(assistant.run("Who is the applicant?").await, "a short bio");
    assert_eq!(model.calls().len(), 1);
    assert_eq!(model.calls()[0][0].role, "system");
    let turn = model.user_turn(0);
    assert!(turn.starts_with("Answer the following query: Who is the applicant?"));
    assert!(turn.contains("at least 100 words"));
}

#[tokio::test]
async fn test_planning_failure_becomes_error_string() {
    let model = ScriptedModel::new(Vec::<String>::new());
    let assistant = assistant(&model, RecordingWeb::default()).await;

    let answer = assistant.run("salt and pepper").await;
    assert!(answer.starts_with("Error: provider error"), "{}", answer);
    assert!(answer.ends_with("Please try rephrasing your question."));
}

#[tokio::test]
async fn test_empty_query_becomes_error_string() {
    let model = ScriptedModel::new(["Final Answer: unused"]);
    let assistant = assistant(&model, RecordingWeb::default()).await;

    let answer = assistant.run("   ").await;
    assert!(answer.starts_with("Error processing query: invalid input"));
    assert!(model.calls().is_empty());
    assert!(matches!(
        assistant.try_run("").await,
        Err(AssistantError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_tool_transport_failure() {
    let model = ScriptedModel::new([
        action("Search", "weather in Berlin"),
        action("Search", "weather in Berlin"),
    ]);
    let assistant = assistant(&model, UnreachableWeb).await;

    let answer = assistant.run("Weather in Berlin?").await;
    assert!(answer.starts_with("Error processing query"), "{}", answer);
    assert!(answer.contains("connection refused"));

    let err = assistant.try_run("Weather in Berlin?").await.unwrap_err();
    assert!(matches!(err, AssistantError::Transport(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_search_endpoint_becomes_error_string() {
    let mut config = Config::new("groq", "jina");
    config.tools.search_base_url = "http://127.0.0.1:9".to_string();
    let web = JinaClient::new(build_client(config.http_timeout).unwrap(), config.tools);
    let model = ScriptedModel::new([action("Search", "rust")]);
    let assistant = assistant(&model, web).await;

    let answer = assistant.run("Tell me about rust").await;
    assert!(
        answer.starts_with("Error processing query: transport failure"),
        "{}",
        answer
    );
}
