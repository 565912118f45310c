pub mod config;
pub mod document_loader;
pub mod embedder;
pub mod http;
pub mod jina_client;
pub mod llm_client;
pub mod text_splitter;
pub mod vector_index;
