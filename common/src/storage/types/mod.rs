pub mod chunk;
pub mod vector_index;
