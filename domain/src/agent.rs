use crate::tools::{ToolKind, UnknownTool};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const FINAL_ANSWER: &str = "Final Answer:";
pub const OBSERVATION: &str = "Observation:";

/// What the model asked for on one turn of the tool loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentAction {
    UseTool {
        tool: ToolKind,
        input: String,
        log: String,
    },
    Finish {
        answer: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentParseError {
    #[error("{0}")]
    UnknownTool(UnknownTool),

    #[error("Could not parse LLM output: `{0}`")]
    Malformed(String),
}

/// A completed tool call and what it returned.
#[derive(Debug, Clone)]
pub struct AgentStep {
    pub log: String,
    pub observation: String,
}

#[derive(Deserialize)]
struct ActionBlob {
    action: String,
    #[serde(default)]
    action_input: Value,
}

/// Parse one model turn written in the Thought / Action / Final Answer format.
///
/// A turn holding both a tool action and `Final Answer:` is rejected so the
/// model is asked again instead of answering without the tool result.
pub fn parse_agent_output(text: &str) -> Result<AgentAction, AgentParseError> {
    let final_answer = text
        .rfind(FINAL_ANSWER)
        .map(|pos| text[pos + FINAL_ANSWER.len()..].trim().to_string());
    let blob = extract_json_object(text).and_then(|json| serde_json::from_str::<ActionBlob>(json).ok());

    let blob = match (blob, final_answer) {
        (Some(blob), None) => blob,
        (Some(blob), Some(_)) if !is_finish_action(&blob.action) => {
            return Err(AgentParseError::Malformed(format!(
                "produced both a final answer and a parse-able action: {}",
                text.trim()
            )));
        }
        (_, Some(answer)) => return Ok(AgentAction::Finish { answer }),
        (None, None) => return Err(AgentParseError::Malformed(text.trim().to_string())),
    };

    let input = match blob.action_input {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    };

    if is_finish_action(&blob.action) {
        return Ok(AgentAction::Finish { answer: input });
    }

    let tool = blob
        .action
        .parse::<ToolKind>()
        .map_err(AgentParseError::UnknownTool)?;
    Ok(AgentAction::UseTool {
        tool,
        input,
        log: text.trim().to_string(),
    })
}

fn is_finish_action(action: &str) -> bool {
    action.trim().eq_ignore_ascii_case("final answer")
}

/// Render completed steps as the running transcript the model continues from.
pub fn format_scratchpad(steps: &[AgentStep]) -> String {
    let mut out = String::new();
    for step in steps {
        out.push_str(&step.log);
        out.push('\n');
        out.push_str(OBSERVATION);
        out.push(' ');
        out.push_str(&step.observation);
        out.push_str("\nThought:");
    }
    out
}

/// Extract the first balanced JSON object from noisy model output
fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match b {
            b'\\' if in_string => escape_next = true,
            b'"' if start.is_some() => in_string = !in_string,
            b'{' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if !in_string && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        return Some(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    None
}
