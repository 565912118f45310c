use domain::agent::{
    format_scratchpad, parse_agent_output, AgentAction, AgentParseError, AgentStep, OBSERVATION,
};
use domain::prompts::{render_agent_system_prompt, render_agent_turn, render_early_stop_turn};
use domain::providers::{DocumentQa, LanguageModel, WebTools};
use domain::session::Message;
use domain::tools::ToolKind;
use infrastructure::config::{AgentSettings, EarlyStopping};
use shared::error::{AssistantError, Result};
use tracing::{info, warn};

/// Bounded Thought / Action / Observation loop over the fixed tool set.
pub struct AgentService<M, W, Q> {
    model: M,
    web: W,
    qa: Q,
    max_iterations: usize,
    early_stopping: EarlyStopping,
}

impl<M, W, Q> AgentService<M, W, Q>
where
    M: LanguageModel + Sync,
    W: WebTools + Sync,
    Q: DocumentQa + Sync,
{
    pub fn new(model: M, web: W, qa: Q, settings: &AgentSettings) -> Self {
        Self {
            model,
            web,
            qa,
            max_iterations: settings.max_iterations.max(1),
            early_stopping: settings.early_stopping,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub async fn run(&self, input: &str) -> Result<String> {
        let system = Message::system(render_agent_system_prompt());
        let stop = vec![OBSERVATION.to_string()];
        let mut steps: Vec<AgentStep> = Vec::new();

        for iteration in 1..=self.max_iterations {
            let messages = [
                system.clone(),
                Message::user(render_agent_turn(input, &format_scratchpad(&steps))),
            ];
            let output = self.model.complete(&messages, &stop).await?;

            match parse_agent_output(&output) {
                Ok(AgentAction::Finish { answer }) => {
                    info!(iteration, "agent finished");
                    return Ok(answer);
                }
                Ok(AgentAction::UseTool { tool, input: tool_input, log }) => {
                    info!(iteration, tool = %tool, input = %tool_input, "agent action");
                    let observation = self.invoke(tool, &tool_input).await?;
                    info!(iteration, chars = observation.len(), "observation received");
                    steps.push(AgentStep { log, observation });
                }
                Err(err) => {
                    warn!(iteration, error = %err, "unparseable agent output");
                    let observation = match err {
                        AgentParseError::UnknownTool(unknown) => unknown.to_string(),
                        AgentParseError::Malformed(_) => "Invalid or incomplete response. Reply with a single JSON action blob or with `Final Answer:`.".to_string(),
                    };
                    steps.push(AgentStep {
                        log: output.trim().to_string(),
                        observation,
                    });
                }
            }
        }

        match self.early_stopping {
            EarlyStopping::Force => Err(AssistantError::BudgetExceeded {
                iterations: self.max_iterations,
            }),
            EarlyStopping::Generate => {
                info!(
                    iterations = self.max_iterations,
                    "iteration limit reached, generating best-effort answer"
                );
                let messages = [
                    system,
                    Message::user(render_early_stop_turn(input, &format_scratchpad(&steps))),
                ];
                let output = self.model.complete(&messages, &[]).await?;
                Ok(match parse_agent_output(&output) {
                    Ok(AgentAction::Finish { answer }) => answer,
                    _ => output.trim().to_string(),
                })
            }
        }
    }

    async fn invoke(&self, tool: ToolKind, input: &str) -> Result<String> {
        match tool {
            ToolKind::Search => self.web.search(input).await,
            ToolKind::Reader => self.web.read(input).await,
            ToolKind::Qa => self.qa.answer(input).await,
        }
    }
}
