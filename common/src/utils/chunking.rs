use text_splitter::{ChunkConfig, TextSplitter};

use crate::{error::AppError, storage::types::chunk::Chunk};

/// Splits `text` into chunks of at most `size` characters with `overlap`
/// characters shared between consecutive chunks. The splitter prefers
/// paragraph and sentence boundaries before falling back to hard cuts.
///
/// Empty or whitespace-only input yields an empty sequence; that is a valid
/// "nothing to do" signal, not an error.
pub fn chunk_text(
    text: &str,
    size: usize,
    overlap: usize,
    source_hint: Option<&str>,
) -> Result<Vec<Chunk>, AppError> {
    if size == 0 {
        return Err(AppError::InvalidConfiguration(
            "chunk size must be greater than zero".into(),
        ));
    }

    if overlap >= size {
        return Err(AppError::InvalidConfiguration(format!(
            "chunk overlap of {overlap} must be smaller than the chunk size of {size}"
        )));
    }

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chunk_config = ChunkConfig::new(size)
        .with_overlap(overlap)
        .map_err(|e| AppError::InvalidConfiguration(format!("invalid chunk overlap: {e}")))?;
    let splitter = TextSplitter::new(chunk_config);

    Ok(splitter
        .chunks(text)
        .map(|chunk| Chunk::new(chunk, source_hint.map(str::to_owned)))
        .collect())
}
