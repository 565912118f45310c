use crate::config::LlmSettings;
use crate::http::read_body;
use domain::providers::LanguageModel;
use domain::session::Message;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::error::{AssistantError, Result};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
    stream: bool,
}

fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completion client (Groq by default).
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    tokens: Option<UnboundedSender<String>>,
}

impl ChatClient {
    pub fn new(client: Client, settings: &LlmSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            stream: settings.stream,
            tokens: None,
        }
    }

    /// Forward streamed tokens to `sink` as they arrive. Only used when streaming is enabled.
    pub fn with_token_sink(mut self, sink: UnboundedSender<String>) -> Self {
        self.tokens = Some(sink);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete_streaming(&self, response: reqwest::Response) -> Result<String> {
        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::default();
        let mut text = String::new();

        'read: while let Some(item) = stream.next().await {
            let bytes = item.map_err(AssistantError::transport)?;
            for event in decoder.push(&bytes) {
                match event {
                    SseEvent::Done => break 'read,
                    SseEvent::Data(data) => {
                        if let Some(token) = parse_stream_delta(&data)? {
                            if let Some(sink) = &self.tokens {
                                // A closed receiver only means nobody is printing.
                                let _ = sink.send(token.clone());
                            }
                            text.push_str(&token);
                        }
                    }
                }
            }
        }
        Ok(text)
    }
}

/// Pull the first choice's text out of a completion body.
fn parse_completion(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| AssistantError::Provider {
        status: 200,
        message: format!("malformed completion response: {}", e),
    })?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or_else(|| AssistantError::Provider {
            status: 200,
            message: "completion response contained no choices".to_string(),
        })
}

/// The content token carried by one streamed chunk, if any.
fn parse_stream_delta(data: &str) -> Result<Option<String>> {
    let chunk: StreamChunk = serde_json::from_str(data).map_err(|e| AssistantError::Provider {
        status: 200,
        message: format!("malformed stream chunk: {}", e),
    })?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|t| !t.is_empty()))
}

#[derive(Debug, PartialEq)]
enum SseEvent {
    Data(String),
    Done,
}

/// Line-buffered server-sent-events reader. Bytes may split lines (and UTF-8
/// sequences) anywhere, so only complete lines are decoded.
#[derive(Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data == "[DONE]" {
                events.push(SseEvent::Done);
            } else if !data.is_empty() {
                events.push(SseEvent::Data(data.to_string()));
            }
        }
        events
    }
}

impl LanguageModel for ChatClient {
    async fn complete(&self, messages: &[Message], stop: &[String]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop,
            stream: self.stream,
        };
        debug!(model = %self.model, messages = messages.len(), stream = self.stream, "chat completion request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(AssistantError::transport)?;

        if self.stream && response.status().is_success() {
            return self.complete_streaming(response).await;
        }
        let body = read_body(response).await?;
        parse_completion(&body)
    }
}
