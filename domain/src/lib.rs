pub mod agent;
pub mod models;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod tools;
