//! Source-specific content extractors

mod dynamic;
mod pdf;
mod registry;
mod sharepoint;
mod static_html;
mod text;
mod url;
mod youtube;

pub use dynamic::DynamicExtractor;
pub use pdf::PdfExtractor;
pub use registry::ExtractorRegistry;
pub use sharepoint::{SharePointConfig, SharePointExtractor};
pub use static_html::StaticHtmlExtractor;
pub use text::TextExtractor;
pub use url::UrlExtractor;
pub use youtube::YoutubeExtractor;
