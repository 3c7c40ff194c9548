use std::collections::BTreeMap;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, error, trace};

use crate::error::{CategorizerError, Result};
use crate::logging::PDF_EXTRACT;

pub fn load_pdf<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    Document::load(path).map_err(|e| {
        CategorizerError::Extraction(format!("cannot open {}: {}", path.display(), e))
    })
}

/// Text of every page, keyed by 1-based page number.
pub fn get_pdf_text(doc: &Document) -> Result<BTreeMap<u32, String>> {
    let mut pages_map: BTreeMap<u32, String> = BTreeMap::new();

    for page_num in doc.get_pages().into_keys() {
        let text = doc.extract_text(&[page_num]).map_err(|e| {
            CategorizerError::Extraction(format!(
                "failed to extract text from page {page_num}: {e}"
            ))
        })?;
        trace!(target: PDF_EXTRACT, page = page_num, chars = text.len(), "Extracted page");
        pages_map.insert(page_num, text);
    }

    Ok(pages_map)
}

/// Open `path` and return its text page by page. The document is dropped
/// before returning on both paths.
pub fn extract_pages<P: AsRef<Path>>(path: P) -> Result<BTreeMap<u32, String>> {
    let path = path.as_ref();
    let result = load_pdf(path).and_then(|doc| get_pdf_text(&doc));

    match &result {
        Ok(pages) => debug!(
            target: PDF_EXTRACT,
            path = %path.display(),
            pages = pages.len(),
            "Extracted PDF text"
        ),
        Err(e) => error!(target: PDF_EXTRACT, "Error extracting text from PDF: {}", e),
    }

    result
}

/// All page text in page order, joined without separators.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(extract_pages(path)?.into_values().collect())
}
