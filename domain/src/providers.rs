//! Seams between the pipeline and its external collaborators.
//!
//! Concrete HTTP clients live in `infrastructure`; tests substitute scripted fakes.

use crate::session::Message;
use shared::error::Result;
use std::future::Future;

/// A chat-completion endpoint.
pub trait LanguageModel {
    /// Generate one completion. Generation halts before any string in `stop`.
    fn complete(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> impl Future<Output = Result<String>> + Send;
}

/// A sentence-embedding model producing fixed-dimension vectors.
pub trait EmbeddingModel {
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>>> + Send;
}

/// Web search and page reading.
pub trait WebTools {
    fn search(&self, query: &str) -> impl Future<Output = Result<String>> + Send;

    fn read(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Question answering over the loaded document.
pub trait DocumentQa {
    fn answer(&self, question: &str) -> impl Future<Output = Result<String>> + Send;
}
