pub mod chunking;
pub mod config;
pub mod embedding;
pub mod llm;
