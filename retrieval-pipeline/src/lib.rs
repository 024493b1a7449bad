pub mod answer_retrieval;

pub use answer_retrieval::{AnswerConfig, AnswerResponse, RetrievalAnswerer, NO_CONTEXT_ANSWER};
