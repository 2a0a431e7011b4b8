//! Orchestrating service layer

mod ingestion_service;

pub use ingestion_service::{
    IngestionService, PipelineConfig, ProcessOptions, ProcessOutcome,
};
