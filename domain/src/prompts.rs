//! Fixed prompt templates.

use crate::tools::ToolKind;

const QA_TEMPLATE: &str = "Answer the following question in a detailed manner based only on the provided context:

Context: {context}

Question: {question}

Answer the question using only the information from the provided context. If you cannot answer the question based on the context, please say so.";

const PLANNING_TEMPLATE: &str = "Break down this complex query into steps and determine which tools to use for each step:
Query: {query}

Think about this step by step:
1. What are the main components of this query?
2. Which tools would be best for each component?
3. How should the results be combined?

Provide your plan in a clear format.";

const ENHANCED_TEMPLATE: &str = "Plan: {plan}

Based on this plan, please answer the following query: {query}

Remember to:
1. Follow the plan step by step
2. Use appropriate tools for each step
3. Combine the results coherently

Your final answer must be at least 150 words long and organised into clearly labelled sections, one per part of the query, followed by a short summary.";

const SIMPLE_TEMPLATE: &str = "Answer the following query: {query}

Your final answer must be at least 100 words long, start with a direct answer, and follow it with supporting details organised into short paragraphs or bullet points.";

const AGENT_PREFIX: &str =
    "Answer the following questions as best you can. You have access to the following tools:";

const AGENT_FORMAT: &str = "Use a tool by writing a JSON blob with an `action` key (the tool name) and an `action_input` key (the input for the tool).

The only valid values for \"action\" are: {tool_names}

The JSON blob must contain a SINGLE action, never a list. For example:

```
{
  \"action\": \"Search\",
  \"action_input\": \"latest rust release\"
}
```

ALWAYS use this format:

Question: the input question you must answer
Thought: what you should do next
Action:
```
$JSON_BLOB
```
Observation: the result of the action
... (Thought/Action/Observation can repeat)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin! Always use the exact characters `Final Answer` when responding.";

const EARLY_STOP_INSTRUCTION: &str =
    "\n\nI now need to return a final answer based on the previous steps:";

pub fn render_qa_prompt(context: &str, question: &str) -> String {
    QA_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}

pub fn render_planning_prompt(query: &str) -> String {
    PLANNING_TEMPLATE.replace("{query}", query)
}

/// Embed a free-text plan verbatim ahead of the user query.
pub fn render_enhanced_query(plan: &str, query: &str) -> String {
    ENHANCED_TEMPLATE
        .replace("{plan}", plan)
        .replace("{query}", query)
}

pub fn render_simple_query(query: &str) -> String {
    SIMPLE_TEMPLATE.replace("{query}", query)
}

pub fn render_agent_system_prompt() -> String {
    let tools = ToolKind::ALL
        .iter()
        .map(|t| format!("{}: {}", t.name(), t.description()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\n{}\n\n{}",
        AGENT_PREFIX,
        tools,
        AGENT_FORMAT.replace("{tool_names}", &ToolKind::names())
    )
}

pub fn render_agent_turn(input: &str, scratchpad: &str) -> String {
    format!("{}\n\n{}", input, scratchpad)
}

pub fn render_early_stop_turn(input: &str, scratchpad: &str) -> String {
    format!(
        "{}{}",
        render_agent_turn(input, scratchpad),
        EARLY_STOP_INSTRUCTION
    )
}
