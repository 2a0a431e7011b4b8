//! Static HTML extractor (plain fetch + scrape, no JavaScript execution)

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::domain::document::SourceType;
use crate::domain::ingestion::{
    chunk_text, ExtractRequest, ProcessedDocument, SourceExtractor,
};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

/// Browser-like User-Agent; some sites refuse default client strings
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Tags whose text is never content
const UNWANTED_TAGS: [&str; 7] = [
    "script", "style", "nav", "footer", "iframe", "noscript", "head",
];

/// Markers of client-rendered pages that need a real browser
const SPA_MARKERS: [&str; 7] = [
    "id=\"root\"",
    "id='root'",
    "id=\"app\"",
    "id='app'",
    "type=\"module\"",
    "data-reactroot",
    "ng-app",
];

static CONTENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6, p, article, section")
        .expect("static content selector"));

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("static title selector"));

/// Extractor for server-rendered web pages
#[derive(Debug, Clone)]
pub struct StaticHtmlExtractor<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> StaticHtmlExtractor<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    fn page_title(document: &Html) -> Option<String> {
        document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Concatenated text of content elements, in document order.
    ///
    /// Elements nested inside an article/section are skipped because the
    /// container's own text already covers them; unwanted tags are stripped
    /// during the per-element walk.
    fn page_text(document: &Html) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for element in document.select(&CONTENT_SELECTOR) {
            if Self::inside_container_or_chrome(&element) {
                continue;
            }

            let text = normalize_fragment(&Self::element_text(&element));

            if text.is_empty() || !seen.insert(text.clone()) {
                continue;
            }

            parts.push(text);
        }

        parts.join("\n\n")
    }

    fn inside_container_or_chrome(element: &ElementRef) -> bool {
        element.ancestors().any(|node| {
            ElementRef::wrap(node)
                .map(|el| {
                    let name = el.value().name();
                    name == "article" || name == "section" || UNWANTED_TAGS.contains(&name)
                })
                .unwrap_or(false)
        })
    }

    /// Text of an element with unwanted descendant tags stripped.
    fn element_text(element: &ElementRef) -> String {
        let mut text = String::new();

        for node in element.children() {
            if let Some(el) = ElementRef::wrap(node) {
                if UNWANTED_TAGS.contains(&el.value().name()) {
                    continue;
                }

                text.push_str(&Self::element_text(&el));
                text.push(' ');
            } else if let Some(fragment) = node.value().as_text() {
                text.push_str(fragment);
            }
        }

        text
    }

    fn looks_like_spa(html: &str) -> bool {
        SPA_MARKERS.iter().any(|marker| html.contains(marker))
    }
}

fn normalize_fragment(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl<C: HttpClientTrait> SourceExtractor for StaticHtmlExtractor<C> {
    fn source_type(&self) -> SourceType {
        SourceType::Url
    }

    async fn extract(&self, request: ExtractRequest) -> Result<ProcessedDocument, DomainError> {
        let url = request.url()?.to_string();

        let html = self
            .client
            .get_text(&url, vec![("User-Agent", USER_AGENT)])
            .await
            .map_err(|e| DomainError::extraction("static", e.to_string()))?;

        let (text, title) = {
            let document = Html::parse_document(&html);
            (Self::page_text(&document), Self::page_title(&document))
        };

        if text.trim().is_empty() {
            // An empty SPA shell is retried with the browser; a genuinely
            // empty page is not.
            if Self::looks_like_spa(&html) {
                return Err(DomainError::spa_detected(url));
            }

            return Err(DomainError::empty_input(format!(
                "no content extracted from {}",
                url
            )));
        }

        let title = request.title.clone().or(title);
        let chunks = chunk_text(&text, &url, &request.metadata, &request.chunking)?;

        Ok(
            ProcessedDocument::new(SourceType::Url, title, text, chunks)
                .with_metadata("extraction_method", serde_json::json!("static"))
                .with_metadata("url", serde_json::json!(url)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::MockHttpClient;

    const PAGE_URL: &str = "https://example.com/page";

    async fn extract_page(html: &str) -> Result<ProcessedDocument, DomainError> {
        let client = MockHttpClient::new().with_text(PAGE_URL, html);
        let extractor = StaticHtmlExtractor::new(client);

        extractor.extract(ExtractRequest::from_url(PAGE_URL)).await
    }

    #[tokio::test]
    async fn test_extracts_paragraph_content() {
        let html = r#"
            <html>
            <head><title>Example Page</title></head>
            <body>
                <h1>Welcome</h1>
                <p>This is the first paragraph of real content on the page.</p>
                <p>And a second paragraph with more content.</p>
            </body>
            </html>
        "#;

        let processed = extract_page(html).await.unwrap();

        assert!(processed.content.contains("first paragraph"));
        assert!(processed.content.contains("second paragraph"));
        assert_eq!(processed.title.as_deref(), Some("Example Page"));
        assert_eq!(
            processed.metadata.get("extraction_method"),
            Some(&serde_json::json!("static"))
        );
        assert!(!processed.chunks.is_empty());
    }

    #[tokio::test]
    async fn test_strips_scripts_and_chrome() {
        let html = r#"
            <html><body>
                <nav><p>Navigation links everywhere in this menu</p></nav>
                <p>Visible article text that should survive extraction.</p>
                <script>var hidden = 'should not appear';</script>
                <footer><p>Footer copyright notice text here</p></footer>
            </body></html>
        "#;

        let processed = extract_page(html).await.unwrap();

        assert!(processed.content.contains("Visible article text"));
        assert!(!processed.content.contains("should not appear"));
        assert!(!processed.content.contains("Navigation links"));
        assert!(!processed.content.contains("copyright"));
    }

    #[tokio::test]
    async fn test_article_children_not_duplicated() {
        let html = r#"
            <html><body>
                <article>
                    <p>The only paragraph of the only article on this page.</p>
                </article>
            </body></html>
        "#;

        let processed = extract_page(html).await.unwrap();

        assert_eq!(
            processed
                .content
                .matches("only paragraph of the only article")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_empty_spa_shell_raises_spa_detected() {
        let html = r#"<html><body><div id="root"></div></body></html>"#;

        let result = extract_page(html).await;

        assert!(matches!(result, Err(DomainError::SpaDetected { .. })));
    }

    #[tokio::test]
    async fn test_empty_plain_page_raises_empty_input() {
        let html = "<html><body><div>short</div></body></html>";

        let result = extract_page(html).await;

        assert!(matches!(result, Err(DomainError::EmptyInput { .. })));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_extraction_error() {
        let client = MockHttpClient::new().with_error(PAGE_URL, "connection refused");
        let extractor = StaticHtmlExtractor::new(client);

        let result = extractor.extract(ExtractRequest::from_url(PAGE_URL)).await;

        assert!(matches!(result, Err(DomainError::Extraction { .. })));
    }
}
