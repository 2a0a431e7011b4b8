//! Operator CLI for driving the ingestion pipeline

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::domain::document::{Document, DocumentRepository, SourceType};
use crate::domain::ingestion::ExtractSource;
use crate::domain::vector::VectorStore;
use crate::infrastructure::services::ProcessOptions;
use crate::IngestionStack;

#[derive(Debug, Parser)]
#[command(name = "kb-ingest", about = "Document ingestion and embedding pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest raw text into a knowledge base
    IngestText {
        #[arg(long)]
        kb: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        title: String,
        /// The text to ingest
        text: String,
    },
    /// Ingest a local file (PDF or plain text)
    IngestFile {
        #[arg(long)]
        kb: String,
        #[arg(long)]
        user: String,
        /// Path to the file
        path: PathBuf,
    },
    /// Ingest a web page (static scrape with browser fallback)
    IngestUrl {
        #[arg(long)]
        kb: String,
        #[arg(long)]
        user: String,
        url: String,
    },
    /// Ingest a YouTube video transcript
    IngestYoutube {
        #[arg(long)]
        kb: String,
        #[arg(long)]
        user: String,
        url: String,
    },
    /// Show vector index stats and recorded token usage
    Stats,
}

pub async fn run(stack: &IngestionStack, command: Command) -> anyhow::Result<()> {
    match command {
        Command::IngestText {
            kb,
            user,
            title,
            text,
        } => {
            let document = Document::new(new_id(), &kb, &user, title, SourceType::Text)
                .with_content(text);
            ingest(stack, document, None).await
        }
        Command::IngestFile { kb, user, path } => {
            let data = tokio::fs::read(&path).await?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());

            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

            let (source_type, payload) = if is_pdf {
                (
                    SourceType::Pdf,
                    Some(ExtractSource::Bytes {
                        data,
                        filename: Some(filename.clone()),
                    }),
                )
            } else {
                (
                    SourceType::Text,
                    Some(ExtractSource::Text(
                        String::from_utf8_lossy(&data).into_owned(),
                    )),
                )
            };

            let document = Document::new(new_id(), &kb, &user, &filename, source_type)
                .with_file_path(path.to_string_lossy());
            ingest(stack, document, payload).await
        }
        Command::IngestUrl { kb, user, url } => {
            let document = Document::new(new_id(), &kb, &user, "", SourceType::Url)
                .with_source_url(&url);
            ingest(stack, document, None).await
        }
        Command::IngestYoutube { kb, user, url } => {
            let document = Document::new(new_id(), &kb, &user, "", SourceType::Youtube)
                .with_source_url(&url);
            ingest(stack, document, None).await
        }
        Command::Stats => {
            let stats = stack.vectors.describe_stats().await?;
            println!("index vectors: {}", stats.total_vector_count);
            if let Some(dimension) = stats.dimension {
                println!("dimension: {}", dimension);
            }

            for (key, row) in stack.usage.rows().await {
                println!(
                    "{} user={} {}/{} tokens={} calls={}",
                    key.date, key.user_id, key.provider, key.model, row.tokens, row.calls
                );
            }

            Ok(())
        }
    }
}

async fn ingest(
    stack: &IngestionStack,
    document: Document,
    payload: Option<ExtractSource>,
) -> anyhow::Result<()> {
    let id = document.id.clone();
    stack.documents.put(document).await?;

    let result = stack
        .service
        .process_document(&id, payload, ProcessOptions::default())
        .await;

    match result {
        Ok(outcome) => println!("{}: {:?}", id, outcome),
        Err(error) => {
            // The document row now carries the failure details.
            eprintln!("{}: failed: {}", id, error);
        }
    }

    if let Some(doc) = stack.documents.get(&id).await? {
        println!(
            "status={:?} chunks={} content={}",
            doc.status,
            doc.embedding_ids.len(),
            if doc.has_content() { "saved" } else { "none" }
        );
    }

    Ok(())
}

fn new_id() -> String {
    format!("doc-{}", Uuid::new_v4())
}
