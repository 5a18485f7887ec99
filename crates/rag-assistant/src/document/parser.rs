use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use lopdf::Document as PdfDocument;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::utils::error::{AssistantError, Result};

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub content: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub file_type: String,
    pub pages: Option<usize>,
    pub char_count: usize,
    pub encoding: String,
}

pub struct DocumentParser;

impl DocumentParser {
    /// PDFs go through lopdf, anything else is read as text.
    pub fn parse(path: &Path) -> Result<ParsedDocument> {
        if !path.is_file() {
            return Err(AssistantError::ResourceNotFound(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        debug!("Parsing file: {:?} (type: {})", path, extension);

        let (content, metadata) = match extension.as_str() {
            "pdf" => Self::parse_pdf(path)?,
            _ => Self::parse_text(path)?,
        };

        if content.trim().is_empty() {
            return Err(AssistantError::Document(format!(
                "no text could be extracted from {}",
                path.display()
            )));
        }

        debug!("Parsed {} characters from {:?}", metadata.char_count, path);

        Ok(ParsedDocument { content, metadata })
    }

    /// Parse PDF using lopdf, page by page in read order
    fn parse_pdf(path: &Path) -> Result<(String, DocumentMetadata)> {
        let doc = PdfDocument::load(path).map_err(|e| {
            AssistantError::Document(format!("Failed to load PDF {}: {}", path.display(), e))
        })?;
        let pages = doc.get_pages();
        let page_count = pages.len();

        let mut content = String::new();

        // get_pages is a BTreeMap keyed by page number
        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) => {
                    content.push_str(&text);
                    content.push('\n');
                }
                Err(e) => {
                    warn!("Failed to extract text from page {}: {}", page_num, e);
                }
            }
        }

        let metadata = DocumentMetadata {
            file_type: "application/pdf".to_string(),
            pages: Some(page_count),
            char_count: content.chars().count(),
            encoding: "UTF-8".to_string(),
        };

        Ok((content, metadata))
    }

    fn parse_text(path: &Path) -> Result<(String, DocumentMetadata)> {
        let raw_content = fs::read(path).map_err(|e| {
            AssistantError::Document(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let (content, encoding) = Self::decode_text(&raw_content);

        let metadata = DocumentMetadata {
            file_type: "text/plain".to_string(),
            pages: None,
            char_count: content.chars().count(),
            encoding: encoding.name().to_string(),
        };

        Ok((content, metadata))
    }

    /// BOM first, then strict UTF-8, then Windows-1252 for legacy single-byte files.
    fn decode_text(bytes: &[u8]) -> (String, &'static Encoding) {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            let (decoded, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            if had_errors {
                warn!("Malformed {} input, invalid sequences were replaced", encoding.name());
            }
            return (decoded.into_owned(), encoding);
        }

        if let Ok(text) = std::str::from_utf8(bytes) {
            return (text.to_string(), UTF_8);
        }

        debug!("Input is not valid UTF-8, decoding as windows-1252");
        let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
        (decoded.into_owned(), WINDOWS_1252)
    }
}
