//! Digital text layer extraction with `lopdf`.

use super::error::{PdfError, Result};
use lopdf::Document;

/// Load a document from memory, mapping encryption to `PasswordRequired`.
pub fn load_document(pdf_bytes: &[u8]) -> Result<Document> {
    let document = Document::load_mem(pdf_bytes)?;
    if document.is_encrypted() {
        return Err(PdfError::PasswordRequired);
    }
    Ok(document)
}

pub fn page_count(pdf_bytes: &[u8]) -> Result<usize> {
    let document = load_document(pdf_bytes)?;
    match document.get_pages().len() {
        0 => Err(PdfError::EmptyDocument),
        n => Ok(n),
    }
}

/// Raw text of each page, in page order.
///
/// A page whose content stream cannot be decoded yields an empty string so
/// that page numbering stays aligned.
pub fn extract_page_texts(pdf_bytes: &[u8]) -> Result<Vec<String>> {
    let document = load_document(pdf_bytes)?;
    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(PdfError::EmptyDocument);
    }

    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => texts.push(text),
            Err(e) => {
                tracing::debug!(page = page_number, error = %e, "page text layer unreadable");
                texts.push(String::new());
            }
        }
    }

    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bytes_are_rejected() {
        let result = extract_page_texts(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::InvalidPdf(_))));
    }

    #[test]
    fn test_empty_bytes_are_rejected() {
        assert!(page_count(&[]).is_err());
    }
}
