use crate::config::ToolSettings;
use crate::http::read_body;
use domain::providers::WebTools;
use reqwest::{Client, RequestBuilder, Url};
use shared::error::{AssistantError, Result};
use shared::utils::truncate_tokens;
use tracing::info;

/// Jina search (`s.jina.ai`) and reader (`r.jina.ai`) endpoints.
#[derive(Clone)]
pub struct JinaClient {
    client: Client,
    settings: ToolSettings,
}

impl JinaClient {
    pub fn new(client: Client, settings: ToolSettings) -> Self {
        Self { client, settings }
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = Url::parse(&self.settings.search_base_url)
            .map_err(|e| AssistantError::Config(format!("invalid SEARCH_BASE_URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AssistantError::Config("SEARCH_BASE_URL cannot be a base".into()))?
            .pop_if_empty()
            .push(query);
        Ok(url)
    }

    fn reader_url(&self, target: &str) -> String {
        // The target URL is appended verbatim; the reader resolves it.
        format!(
            "{}/{}",
            self.settings.reader_base_url.trim_end_matches('/'),
            target.trim()
        )
    }

    fn search_request(&self, query: &str) -> Result<RequestBuilder> {
        let mut request = self
            .client
            .get(self.search_url(query)?)
            .bearer_auth(&self.settings.api_key);
        if let Some(engine) = &self.settings.engine {
            request = request.header("X-Engine", engine);
        }
        if let Some(retain) = &self.settings.retain_images {
            request = request.header("X-Retain-Images", retain);
        }
        if let Some(budget) = self.settings.search_token_budget {
            request = request.header("X-Token-Budget", budget.to_string());
        }
        Ok(request)
    }

    fn reader_request(&self, target: &str) -> RequestBuilder {
        let mut request = self
            .client
            .get(self.reader_url(target))
            .bearer_auth(&self.settings.api_key)
            .header("X-Return-Format", "markdown");
        if let Some(budget) = self.settings.reader_token_budget {
            request = request.header("X-Token-Budget", budget.to_string());
        }
        request
    }
}

impl WebTools for JinaClient {
    async fn search(&self, query: &str) -> Result<String> {
        info!(query, "web search");
        let response = self
            .search_request(query)?
            .send()
            .await
            .map_err(AssistantError::transport)?;
        let body = read_body(response).await?;
        Ok(truncate_tokens(&body, self.settings.search_max_tokens))
    }

    async fn read(&self, url: &str) -> Result<String> {
        info!(url, "reading page");
        let response = self
            .reader_request(url)
            .send()
            .await
            .map_err(AssistantError::transport)?;
        read_body(response).await
    }
}
