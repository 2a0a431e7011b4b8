//! Document entity, status machine, and repository boundary

mod entity;
mod repository;

pub use entity::{
    Document, DocumentStatus, ProcessingInfo, ProcessingInfoPatch, ProcessingStep, SourceType,
};
pub use repository::{DocumentRepository, DocumentUpdate};
