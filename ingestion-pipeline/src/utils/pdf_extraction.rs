use common::error::AppError;
use lopdf::Document;

/// Extracts the text layer of a PDF along with its page count. The parsing
/// work runs off the async executor.
pub async fn extract_pdf_text(pdf_bytes: Vec<u8>) -> Result<(String, usize), AppError> {
    let page_count = load_page_count(pdf_bytes.clone()).await?;

    let text = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&pdf_bytes).map(|s| s.trim().to_string())
    })
    .await?
    .map_err(|err| AppError::Extraction(format!("failed to extract text from PDF: {err}")))?;

    Ok((text, page_count))
}

async fn load_page_count(pdf_bytes: Vec<u8>) -> Result<usize, AppError> {
    tokio::task::spawn_blocking(move || -> Result<usize, AppError> {
        let document = Document::load_mem(&pdf_bytes)
            .map_err(|err| AppError::Extraction(format!("failed to parse PDF: {err}")))?;
        Ok(document.get_pages().len())
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn garbage_bytes_are_an_extraction_error() {
        let err = extract_pdf_text(b"definitely not a pdf".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
