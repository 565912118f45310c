use std::fmt;
use std::str::FromStr;

/// The fixed set of capabilities the agent loop may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Search,
    Reader,
    Qa,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Search, ToolKind::Reader, ToolKind::Qa];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Search => "Search",
            ToolKind::Reader => "Reader",
            ToolKind::Qa => "QA",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::Search => {
                "For general web searches. Use for current events, facts, or general information. Input: search query"
            }
            ToolKind::Reader => {
                "For reading webpage content. ONLY use with valid URLs starting with http:// or https://. Input: URL"
            }
            ToolKind::Qa => {
                "For questions about loaded documents (like resumes). Use for specific document queries. Input: question"
            }
        }
    }

    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTool(pub String);

impl fmt::Display for UnknownTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is not a valid tool, try one of [{}].",
            self.0,
            ToolKind::names()
        )
    }
}

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ToolKind::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownTool(trimmed.to_string()))
    }
}
