//! SharePoint file extractor (client-credential OAuth + download + dispatch)

use async_trait::async_trait;

use super::pdf::PdfExtractor;
use crate::domain::document::SourceType;
use crate::domain::ingestion::{
    chunk_text, ExtractRequest, ExtractSource, ProcessedDocument, SourceExtractor,
};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

const WORD_MIME_TYPES: [&str; 2] = [
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Azure AD application credentials for SharePoint access
#[derive(Debug, Clone)]
pub struct SharePointConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

impl SharePointConfig {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: "https://graph.microsoft.com/.default".to_string(),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.tenant_id
        )
    }
}

/// Extractor for files stored in SharePoint
#[derive(Debug, Clone)]
pub struct SharePointExtractor<C: HttpClientTrait> {
    client: C,
    config: SharePointConfig,
}

impl<C: HttpClientTrait> SharePointExtractor<C> {
    pub fn new(client: C, config: SharePointConfig) -> Self {
        Self { client, config }
    }

    async fn access_token(&self) -> Result<String, DomainError> {
        let response = self
            .client
            .post_form(
                &self.config.token_url(),
                vec![],
                &[
                    ("grant_type", "client_credentials"),
                    ("client_id", &self.config.client_id),
                    ("client_secret", &self.config.client_secret),
                    ("scope", &self.config.scope),
                ],
            )
            .await
            .map_err(|e| {
                DomainError::extraction("sharepoint", format!("token request failed: {}", e))
            })?;

        response
            .get("access_token")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                DomainError::extraction("sharepoint", "token response missing access_token")
            })
    }

    fn filename_from_url(url: &str) -> String {
        url.split('?')
            .next()
            .unwrap_or(url)
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("file")
            .to_string()
    }
}

#[async_trait]
impl<C: HttpClientTrait> SourceExtractor for SharePointExtractor<C> {
    fn source_type(&self) -> SourceType {
        SourceType::Sharepoint
    }

    async fn extract(&self, request: ExtractRequest) -> Result<ProcessedDocument, DomainError> {
        let url = request.url()?.to_string();
        let filename = Self::filename_from_url(&url);

        let token = self.access_token().await?;
        let auth_header = format!("Bearer {}", token);

        let data = self
            .client
            .get_bytes(&url, vec![("Authorization", auth_header.as_str())])
            .await
            .map_err(|e| {
                DomainError::extraction("sharepoint", format!("download failed: {}", e))
            })?;

        // Downloaded bytes land on a temp path for extraction; the file is
        // removed when `temp` drops, on every exit path.
        let temp = tempfile::NamedTempFile::new().map_err(|e| {
            DomainError::extraction("sharepoint", format!("temp file failed: {}", e))
        })?;

        tokio::fs::write(temp.path(), &data).await.map_err(|e| {
            DomainError::extraction("sharepoint", format!("temp write failed: {}", e))
        })?;

        let mime = mime_guess::from_path(&filename).first_or_octet_stream();

        let bytes = tokio::fs::read(temp.path()).await.map_err(|e| {
            DomainError::extraction("sharepoint", format!("temp read failed: {}", e))
        })?;

        let mut processed = if mime.essence_str() == "application/pdf" {
            let inner_request = ExtractRequest {
                source: ExtractSource::Bytes {
                    data: bytes,
                    filename: Some(filename.clone()),
                },
                title: request.title.clone(),
                metadata: request.metadata.clone(),
                chunking: request.chunking.clone(),
            };

            PdfExtractor::new().extract(inner_request).await?
        } else if mime.type_() == mime_guess::mime::TEXT {
            let text = String::from_utf8_lossy(&bytes).into_owned();

            if text.trim().is_empty() {
                return Err(DomainError::empty_input(format!(
                    "downloaded file {} is blank",
                    filename
                )));
            }

            let source = format!("sharepoint:{}", filename);
            let chunks = chunk_text(&text, &source, &request.metadata, &request.chunking)?;

            ProcessedDocument::new(
                SourceType::Sharepoint,
                request.title.clone().or_else(|| Some(filename.clone())),
                text,
                chunks,
            )
        } else if WORD_MIME_TYPES.contains(&mime.essence_str()) {
            // Full OOXML parsing is deliberately not implemented; the marker
            // keeps the document visible in the knowledge base.
            let text = format!("[Word document: {}]", filename);
            let source = format!("sharepoint:{}", filename);
            let chunks = chunk_text(&text, &source, &request.metadata, &request.chunking)?;

            ProcessedDocument::new(
                SourceType::Sharepoint,
                request.title.clone().or_else(|| Some(filename.clone())),
                text,
                chunks,
            )
            .with_metadata("placeholder", serde_json::json!(true))
        } else {
            return Err(DomainError::unsupported_source(format!(
                "unsupported SharePoint file type '{}' for {}",
                mime.essence_str(),
                filename
            )));
        };

        processed.source_type = SourceType::Sharepoint;
        processed
            .metadata
            .insert("url".to_string(), serde_json::json!(url));
        processed
            .metadata
            .insert("filename".to_string(), serde_json::json!(filename));
        processed.metadata.insert(
            "mime_type".to_string(),
            serde_json::json!(mime.essence_str()),
        );
        processed.metadata.insert(
            "extraction_method".to_string(),
            serde_json::json!("sharepoint"),
        );

        Ok(processed)
    }
}
