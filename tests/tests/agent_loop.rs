use application::agent_service::AgentService;
use application::rag_service::RagService;
use infrastructure::config::{Config, EarlyStopping};
use shared::error::AssistantError;
use tests::{action, resume_document, BagOfWordsEmbedder, GroundedModel, RecordingWeb, ScriptedModel};

type Qa = RagService<BagOfWordsEmbedder, GroundedModel>;

async fn document_qa() -> Qa {
    let mut rag = Config::new("groq", "jina").rag;
    rag.chunk_size = 100;
    rag.chunk_overlap = 10;
    rag.top_k = 2;
    RagService::build(
        &rag,
        &resume_document(),
        BagOfWordsEmbedder::default(),
        GroundedModel::default(),
    )
    .await
    .unwrap()
}

async fn agent(
    model: &ScriptedModel,
    web: &RecordingWeb,
    max_iterations: usize,
    early_stopping: EarlyStopping,
) -> AgentService<ScriptedModel, RecordingWeb, Qa> {
    let mut settings = Config::new("groq", "jina").agent;
    settings.max_iterations = max_iterations;
    settings.early_stopping = early_stopping;
    AgentService::new(model.clone(), web.clone(), document_qa().await, &settings)
}

#[tokio::test]
async fn test_document_tool_then_final_answer() {
    let model = ScriptedModel::new([
        action("QA", "What is the candidate name?"),
        "Thought: I now know the final answer\nFinal Answer: The candidate is Jane Doe.".to_string(),
    ]);
    let agent = agent(&model, &RecordingWeb::default(), 2, EarlyStopping::Generate).await;

    let answer = agent.run("Who is the candidate?").await.unwrap();
    assert_eq!(answer, "The candidate is Jane Doe.");

    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0][0].role, "system");
    assert!(calls[0][0]
        .content
        .contains("QA: For questions about loaded documents"));
    let second = model.user_turn(1);
    assert!(second.contains("Observation: According to the document: Candidate name: Jane Doe"));
    assert!(second.trim_end().ends_with("Thought:"));
}

#[tokio::test]
async fn test_search_and_reader_dispatch() {
    let web = RecordingWeb::new("result: rust 1.80 released", "# Release notes");
    let model = ScriptedModel::new([
        action("Search", "latest rust release"),
        action("Reader", "https://blog.rust-lang.org"),
        "Final Answer: Rust 1.80 is out.".to_string(),
    ]);
    let agent = agent(&model, &web, 3, EarlyStopping::Generate).await;

    assert_eq!(
        agent.run("What's new in Rust?").await.unwrap(),
        "Rust 1.80 is out."
    );
    assert_eq!(web.searches(), vec!["latest rust release"]);
    assert_eq!(web.reads(), vec!["https://blog.rust-lang.org"]);
    let last = model.user_turn(2);
    assert!(last.contains("Observation: result: rust 1.80 released"));
    assert!(last.contains("Observation: # Release notes"));
}

#[tokio::test]
async fn test_iteration_cap_generates_best_effort_answer() {
    let web = RecordingWeb::new("nothing useful", "");
    let model = ScriptedModel::new([
        action("Search", "first try"),
        action("Search", "second try"),
        "Final Answer: best effort from what I found".to_string(),
    ]);
    let agent = agent(&model, &web, 2, EarlyStopping::Generate).await;

    let answer = agent.run("An impossible question").await.unwrap();
    assert_eq!(answer, "best effort from what I found");
    assert_eq!(web.searches().len(), 2);
    assert_eq!(model.calls().len(), 3);
    assert!(model
        .user_turn(2)
        .contains("I now need to return a final answer based on the previous steps:"));
}

#[tokio::test]
async fn test_iteration_cap_with_force_is_budget_exceeded() {
    let model = ScriptedModel::new([action("Search", "a"), action("Search", "b")]);
    let agent = agent(&model, &RecordingWeb::new("x", ""), 2, EarlyStopping::Force).await;

    let err = agent.run("loop forever").await.unwrap_err();
    assert!(matches!(err, AssistantError::BudgetExceeded { iterations: 2 }));
    assert_eq!(model.calls().len(), 2);
}

#[tokio::test]
async fn test_malformed_output_is_fed_back() {
    let model = ScriptedModel::new([
        "I would rather just chat.".to_string(),
        "Final Answer: fine, here it is".to_string(),
    ]);
    let agent = agent(&model, &RecordingWeb::default(), 2, EarlyStopping::Generate).await;

    assert_eq!(agent.run("hi").await.unwrap(), "fine, here it is");
    assert!(model
        .user_turn(1)
        .contains("Observation: Invalid or incomplete response"));
}

#[tokio::test]
async fn test_unknown_tool_is_fed_back() {
    let model = ScriptedModel::new([action("Calculator", "2+2"), "Final Answer: 4".to_string()]);
    let agent = agent(&model, &RecordingWeb::default(), 2, EarlyStopping::Generate).await;

    assert_eq!(agent.run("2+2?").await.unwrap(), "4");
    assert!(model
        .user_turn(1)
        .contains("Calculator is not a valid tool, try one of [Search, Reader, QA]."));
}

#[tokio::test]
async fn test_model_failure_propagates() {
    let model = ScriptedModel::new(Vec::<String>::new());
    let agent = agent(&model, &RecordingWeb::default(), 2, EarlyStopping::Generate).await;

    let err = agent.run("anything").await.unwrap_err();
    assert!(matches!(err, AssistantError::Provider { status: 500, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_action_with_premature_final_answer_is_retried() {
    let web = RecordingWeb::new("Jane Doe is based in Berlin", "");
    let model = ScriptedModel::new([
        format!(
            "{}\nFinal Answer: The candidate lives in Paris.",
            action("Search", "candidate city")
        ),
        action("Search", "candidate city"),
        "Final Answer: Berlin".to_string(),
    ]);
    let agent = agent(&model, &web, 3, EarlyStopping::Force).await;

    assert_eq!(agent.run("Where does the candidate live?").await.unwrap(), "Berlin");
    assert_eq!(web.searches(), vec!["candidate city"]);
    assert!(model
        .user_turn(1)
        .contains("Observation: Invalid or incomplete response"));
}
