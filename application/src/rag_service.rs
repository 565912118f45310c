use domain::models::{Document, ScoredChunk};
use domain::prompts::render_qa_prompt;
use domain::providers::{DocumentQa, EmbeddingModel, LanguageModel};
use domain::session::Message;
use infrastructure::{
    config::RagSettings, document_loader::load_document, embedder::Embedder,
    text_splitter::RecursiveTextSplitter, vector_index::VectorIndex,
};
use shared::error::{AssistantError, Result};
use shared::telemetry::Telemetry;
use tracing::{debug, info};

/// Retrieval-augmented answering over a single document.
pub struct RagService<E, M> {
    embedder: Embedder<E>,
    index: VectorIndex,
    model: M,
    top_k: usize,
}

impl<E, M> RagService<E, M>
where
    E: EmbeddingModel + Sync,
    M: LanguageModel + Sync,
{
    /// Load the configured document, then split, embed and index it.
    pub async fn from_path(settings: &RagSettings, embedding_model: E, model: M) -> Result<Self> {
        let document = load_document(&settings.document_path)?;
        Self::build(settings, &document, embedding_model, model).await
    }

    pub async fn build(
        settings: &RagSettings,
        document: &Document,
        embedding_model: E,
        model: M,
    ) -> Result<Self> {
        let telemetry = Telemetry::new();
        let splitter = RecursiveTextSplitter::new(settings.chunk_size, settings.chunk_overlap);
        let chunks = splitter.split_document(document);
        if chunks.is_empty() {
            return Err(AssistantError::Document(format!(
                "{} produced no chunks",
                document.source().display()
            )));
        }
        info!(chunks = chunks.len(), "split document");

        let embedder = Embedder::new(embedding_model);
        let embeddings = embedder.embed_chunks(&chunks).await?;
        let index = VectorIndex::build(embeddings.into_iter().zip(chunks).collect())?;
        info!(
            entries = index.len(),
            dimension = index.dimension(),
            elapsed_ms = telemetry.elapsed().as_millis() as u64,
            "built vector index"
        );

        Ok(Self {
            embedder,
            index,
            model,
            top_k: settings.top_k,
        })
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// The `top_k` chunks most similar to `question`, best first.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed_query(question).await?;
        self.index.search(&query_embedding, self.top_k)
    }
}

impl<E, M> DocumentQa for RagService<E, M>
where
    E: EmbeddingModel + Sync,
    M: LanguageModel + Sync,
{
    async fn answer(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(AssistantError::InvalidInput(
                "question must not be empty".into(),
            ));
        }
        let telemetry = Telemetry::new();
        let hits = self.retrieve(question).await?;
        for hit in &hits {
            debug!(page = hit.chunk.page, index = hit.chunk.index, score = hit.score, "retrieved chunk");
        }
        let context = hits
            .iter()
            .map(|hit| hit.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = render_qa_prompt(&context, question);
        let answer = self.model.complete(&[Message::user(prompt)], &[]).await?;
        info!(
            retrieved = hits.len(),
            elapsed_ms = telemetry.elapsed().as_millis() as u64,
            "answered document question"
        );
        Ok(answer.trim().to_string())
    }
}
