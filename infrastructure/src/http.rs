use reqwest::{Client, Response};
use shared::error::{AssistantError, Result};
use std::time::Duration;

/// Build the shared client. No timeout unless one is configured.
pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(AssistantError::transport)
}

/// Read the body, turning a non-success status into a provider error carrying that body.
pub async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    let text = response.text().await.map_err(AssistantError::transport)?;
    if !status.is_success() {
        return Err(AssistantError::Provider {
            status: status.as_u16(),
            message: text,
        });
    }
    Ok(text)
}
