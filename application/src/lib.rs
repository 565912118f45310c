pub mod agent_service;
pub mod assistant_service;
pub mod rag_service;
