use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number within the source document.
    pub number: usize,
    pub text: String,
}

/// A loaded source document. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    source: PathBuf,
    pages: Vec<Page>,
}

impl Document {
    pub fn new(source: impl Into<PathBuf>, pages: Vec<Page>) -> Self {
        Self {
            source: source.into(),
            pages,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub page: usize,
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(source: &Path, page: usize, index: usize, text: String) -> Self {
        let key = format!("{}:{}:{}", source.display(), page, index);
        Self {
            id: format!("{:x}", md5::compute(key.as_bytes())),
            page,
            index,
            text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}
