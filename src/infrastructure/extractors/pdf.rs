//! PDF extractor

use async_trait::async_trait;

use crate::domain::document::SourceType;
use crate::domain::ingestion::{
    chunk_text, ExtractRequest, ExtractSource, ProcessedDocument, SourceExtractor,
};
use crate::domain::DomainError;

/// Extractor for uploaded PDF files
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Best-effort document info: page count and embedded title/author.
    /// A document whose text extracted fine but whose info dictionary is
    /// unreadable still ingests.
    fn document_info(data: &[u8]) -> PdfInfo {
        let Ok(doc) = lopdf::Document::load_mem(data) else {
            return PdfInfo::default();
        };

        let mut info = PdfInfo {
            page_count: Some(doc.get_pages().len()),
            ..Default::default()
        };

        if let Ok(dict) = doc
            .trailer
            .get(b"Info")
            .and_then(|obj| obj.as_reference())
            .and_then(|id| doc.get_dictionary(id))
        {
            info.title = Self::info_string(dict, b"Title");
            info.author = Self::info_string(dict, b"Author");
        }

        info
    }

    fn info_string(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
        dict.get(key)
            .ok()
            .and_then(|obj| obj.as_str().ok())
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Default)]
struct PdfInfo {
    page_count: Option<usize>,
    title: Option<String>,
    author: Option<String>,
}

#[async_trait]
impl SourceExtractor for PdfExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::Pdf
    }

    async fn extract(&self, request: ExtractRequest) -> Result<ProcessedDocument, DomainError> {
        let (data, filename) = match &request.source {
            ExtractSource::Bytes { data, filename } => (
                data.clone(),
                filename.clone().unwrap_or_else(|| "document.pdf".to_string()),
            ),
            _ => {
                return Err(DomainError::validation(
                    "pdf extractor expects raw file bytes",
                ));
            }
        };

        // pdf-extract walks the page tree; corrupt or encrypted files fail
        // here and the document is marked failed with the parser's message.
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
            .await
            .map_err(|e| DomainError::internal(format!("pdf task panicked: {}", e)))?
            .map_err(|e| DomainError::pdf_parse(e.to_string()))?;

        let info = match &request.source {
            ExtractSource::Bytes { data, .. } => Self::document_info(data),
            _ => PdfInfo::default(),
        };

        let title = request
            .title
            .clone()
            .or_else(|| info.title.clone())
            .unwrap_or_else(|| filename.clone());

        let source = format!("pdf:{}", filename);
        let chunks = chunk_text(&text, &source, &request.metadata, &request.chunking)?;

        let mut processed =
            ProcessedDocument::new(SourceType::Pdf, Some(title), text, chunks)
                .with_metadata("extraction_method", serde_json::json!("pdf"))
                .with_metadata("filename", serde_json::json!(filename));

        if let Some(pages) = info.page_count {
            processed = processed.with_metadata("page_count", serde_json::json!(pages));
        }

        if let Some(author) = info.author {
            processed = processed.with_metadata("author", serde_json::json!(author));
        }

        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Minimal single-page PDF with a "Hello PDF World" text object.
    fn minimal_pdf() -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(lopdf::dictionary! {
            "Font" => lopdf::dictionary! { "F1" => font_id },
        });
        let content = lopdf::content::Content {
            operations: vec![
                lopdf::content::Operation::new("BT", vec![]),
                lopdf::content::Operation::new("Tf", vec!["F1".into(), 24.into()]),
                lopdf::content::Operation::new("Td", vec![100.into(), 600.into()]),
                lopdf::content::Operation::new(
                    "Tj",
                    vec![lopdf::Object::string_literal("Hello PDF World")],
                ),
                lopdf::content::Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(lopdf::Stream::new(
            lopdf::dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            lopdf::Object::Dictionary(lopdf::dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_extract_minimal_pdf() {
        let extractor = PdfExtractor::new();
        let request = ExtractRequest::from_bytes(minimal_pdf(), Some("hello.pdf".to_string()));

        let processed = extractor.extract(request).await.unwrap();

        assert_eq!(processed.source_type, SourceType::Pdf);
        assert!(processed.content.contains("Hello PDF World"));
        assert_eq!(processed.chunks[0].metadata.source, "pdf:hello.pdf");
        assert_eq!(
            processed.metadata.get("page_count"),
            Some(&serde_json::json!(1))
        );
    }

    #[tokio::test]
    async fn test_title_falls_back_to_filename() {
        let extractor = PdfExtractor::new();
        let request = ExtractRequest::from_bytes(minimal_pdf(), Some("report.pdf".to_string()));

        let processed = extractor.extract(request).await.unwrap();

        assert_eq!(processed.title.as_deref(), Some("report.pdf"));
    }

    #[tokio::test]
    async fn test_malformed_buffer_is_a_parse_error() {
        let extractor = PdfExtractor::new();
        let request =
            ExtractRequest::from_bytes(b"not a pdf at all".to_vec(), Some("bad.pdf".to_string()));

        let result = extractor.extract(request).await;

        assert!(matches!(result, Err(DomainError::PdfParse { .. })));
    }

    #[tokio::test]
    async fn test_inline_text_rejected() {
        let extractor = PdfExtractor::new();
        let request = ExtractRequest::from_text("plain text");

        assert!(extractor.extract(request).await.is_err());
    }
}
