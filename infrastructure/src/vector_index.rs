use domain::models::{Chunk, Embedding, ScoredChunk};
use shared::error::{AssistantError, Result};

/// In-memory (embedding, chunk) pairs searched by cosine similarity.
/// Built once; there is no insert after construction.
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<(Embedding, Chunk)>,
}

impl VectorIndex {
    pub fn build(entries: Vec<(Embedding, Chunk)>) -> Result<Self> {
        let dimension = entries.first().map(|(e, _)| e.vector.len()).unwrap_or(0);
        if dimension == 0 && !entries.is_empty() {
            return Err(AssistantError::InvalidInput(
                "embeddings must not be empty".into(),
            ));
        }
        if let Some((bad, _)) = entries.iter().find(|(e, _)| e.vector.len() != dimension) {
            return Err(AssistantError::InvalidInput(format!(
                "embedding {} has dimension {}, expected {}",
                bad.id,
                bad.vector.len(),
                dimension
            )));
        }
        Ok(Self { dimension, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;
        if denom <= f32::EPSILON {
            return 0.0;
        }
        let score = dot_product / denom;
        if score.is_nan() {
            0.0
        } else {
            score
        }
    }

    /// The `top_k` most similar chunks, best first. Ties keep insertion order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(AssistantError::InvalidInput(format!(
                "query vector has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let mut similarities: Vec<(f32, &Chunk)> = self
            .entries
            .iter()
            .map(|(emb, chunk)| (Self::cosine_similarity(query, &emb.vector), chunk))
            .collect();

        similarities.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(similarities
            .into_iter()
            .take(top_k)
            .map(|(score, chunk)| ScoredChunk {
                chunk: chunk.clone(),
                score,
            })
            .collect())
    }
}
