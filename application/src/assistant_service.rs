use crate::agent_service::AgentService;
use domain::prompts::{render_enhanced_query, render_planning_prompt, render_simple_query};
use domain::providers::{DocumentQa, LanguageModel, WebTools};
use domain::session::Message;
use shared::error::{AssistantError, Result};
use shared::utils::truncate_query;
use tracing::{info, warn};

/// How a query is handed to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Plan first, then run the agent on the plan-enhanced query.
    Planned,
    /// Wrap the query in the instructional template and run the agent.
    Direct,
}

/// Treat a query as multi-part if it mentions "and" anywhere (so "sand" counts too)
/// or has a second question mark.
pub fn is_complex_query(query: &str) -> bool {
    if query.to_lowercase().contains("and") {
        return true;
    }
    match query.find('?') {
        Some(pos) => query[pos + 1..].contains('?'),
        None => false,
    }
}

pub fn route_for(query: &str) -> Route {
    if is_complex_query(query) {
        Route::Planned
    } else {
        Route::Direct
    }
}

/// Turn a failure into the user-facing string. Always starts with "Error".
pub fn render_error(route: Route, err: &AssistantError) -> String {
    match route {
        Route::Planned => format!("Error: {}. Please try rephrasing your question.", err),
        Route::Direct => format!(
            "Error processing query: {}. Please try a shorter or simpler query.",
            err
        ),
    }
}

pub struct AssistantService<M, W, Q> {
    agent: AgentService<M, W, Q>,
    max_query_length: usize,
}

impl<M, W, Q> AssistantService<M, W, Q>
where
    M: LanguageModel + Sync,
    W: WebTools + Sync,
    Q: DocumentQa + Sync,
{
    pub fn new(agent: AgentService<M, W, Q>, max_query_length: usize) -> Self {
        Self {
            agent,
            max_query_length,
        }
    }

    /// Answer `query`, rendering any failure as a string beginning with "Error".
    pub async fn run(&self, query: &str) -> String {
        let query = truncate_query(query, self.max_query_length);
        let route = route_for(&query);
        match self.execute(&query, route).await {
            Ok(answer) => answer,
            Err(err) => {
                warn!(?route, retryable = err.is_retryable(), error = %err, "query failed");
                render_error(route, &err)
            }
        }
    }

    /// Same as `run` but keeps the typed error.
    pub async fn try_run(&self, query: &str) -> Result<String> {
        let query = truncate_query(query, self.max_query_length);
        let route = route_for(&query);
        self.execute(&query, route).await
    }

    async fn execute(&self, query: &str, route: Route) -> Result<String> {
        if query.trim().is_empty() {
            return Err(AssistantError::InvalidInput("query must not be empty".into()));
        }
        info!(?route, query, "routing query");
        match route {
            Route::Planned => self.process_complex_query(query).await,
            Route::Direct => self.agent.run(&render_simple_query(query)).await,
        }
    }

    async fn process_complex_query(&self, query: &str) -> Result<String> {
        let plan = self
            .agent
            .model()
            .complete(&[Message::user(render_planning_prompt(query))], &[])
            .await?;
        info!(plan = %plan.trim(), "query plan");
        self.agent
            .run(&render_enhanced_query(plan.trim(), query))
            .await
    }
}
