use application::agent_service::AgentService;
use application::assistant_service::AssistantService;
use application::rag_service::RagService;
use clap::Parser;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use domain::providers::{DocumentQa, WebTools};
use infrastructure::config::Config;
use infrastructure::embedder::OllamaEmbedder;
use infrastructure::http::build_client;
use infrastructure::jina_client::JinaClient;
use infrastructure::llm_client::ChatClient;
use shared::error::AssistantError;
use shared::types::Result;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::info;

/// Asked when no query is given on the command line.
pub const EXAMPLE_QUERY: &str = "What is the name and city of the candidate in the resume?";

type DocumentPipeline = RagService<OllamaEmbedder, ChatClient>;
type Assistant = AssistantService<ChatClient, JinaClient, DocumentPipeline>;

#[derive(Parser, Debug)]
#[command(name = "decision-assistant")]
#[command(about = "Assistant that combines web search, page reading and document QA")]
pub struct Cli {
    /// Answer from the loaded document only
    #[arg(long)]
    pub qa: bool,

    /// Print raw web search results for the query
    #[arg(long)]
    pub search: bool,

    /// Print the markdown content of a web page
    #[arg(long, value_name = "URL")]
    pub read: Option<String>,

    /// Enter interactive chat mode
    #[arg(long)]
    pub chat: bool,

    /// Document to index instead of DOCUMENT_PATH
    #[arg(long, value_name = "PATH")]
    pub document: Option<PathBuf>,

    /// The query to process
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

pub struct CliApp {
    config: Config,
}

impl CliApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn from_env() -> std::result::Result<Self, AssistantError> {
        Ok(Self::new(Config::from_env()?))
    }

    pub async fn run(&self, cli: Cli) -> Result<()> {
        let mut config = self.config.clone();
        if let Some(document) = cli.document {
            config.rag.document_path = document;
        }
        let query = cli.args.join(" ");
        let http = build_client(config.http_timeout)?;
        let web = JinaClient::new(http.clone(), config.tools.clone());

        if let Some(url) = cli.read {
            let page = web.read(&url).await?;
            println!("{}", page);
            return Ok(());
        }
        if cli.search {
            if query.trim().is_empty() {
                return Err(AssistantError::InvalidInput("--search needs a query".into()).into());
            }
            let results = web.search(&query).await?;
            println!("{}", results);
            return Ok(());
        }

        let mut llm = ChatClient::new(http.clone(), &config.llm);
        if config.llm.stream {
            llm = llm.with_token_sink(spawn_token_printer());
        }
        info!(
            document = %config.rag.document_path.display(),
            model = llm.model(),
            "building document index"
        );
        let rag = RagService::from_path(
            &config.rag,
            OllamaEmbedder::new(http, &config.embedding),
            llm.clone(),
        )
        .await?;

        if cli.qa {
            let question = if query.trim().is_empty() {
                EXAMPLE_QUERY
            } else {
                query.as_str()
            };
            let answer = rag.answer(question).await?;
            print_answer(&answer);
            return Ok(());
        }

        let assistant = AssistantService::new(
            AgentService::new(llm, web, rag, &config.agent),
            config.agent.max_query_length,
        );

        if cli.chat {
            return self.handle_chat(&assistant).await;
        }

        let query = if query.trim().is_empty() {
            EXAMPLE_QUERY.to_string()
        } else {
            query
        };
        println!("{} {}", "Query:".cyan().bold(), query);
        print_answer(&assistant.run(&query).await);
        Ok(())
    }

    async fn handle_chat(&self, assistant: &Assistant) -> Result<()> {
        println!("Assistant chat mode. Type 'exit' to quit.");
        loop {
            let input: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Query")
                .allow_empty(true)
                .interact_text()?;
            let input = input.trim();
            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
                break;
            }
            eprintln!("{}", "Thinking...".dimmed());
            print_answer(&assistant.run(input).await);
        }
        Ok(())
    }
}

/// Echo streamed tokens to stdout as they arrive.
fn spawn_token_printer() -> UnboundedSender<String> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(token) = rx.recv().await {
            let _ = write!(stdout, "{}", token.dimmed());
            let _ = stdout.flush();
        }
    });
    tx
}

fn print_answer(answer: &str) {
    if answer.starts_with("Error") {
        println!("{}", answer.red());
    } else {
        println!("{}\n{}", "Answer:".green().bold(), answer);
    }
}

/// Fatal startup failure, e.g. a missing API key.
pub fn report_config_error(err: &AssistantError) {
    eprintln!("{} {}", "Configuration error:".red().bold(), err);
}

pub fn report_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);
}
