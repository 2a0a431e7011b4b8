//! Vector index adapters

mod remote;

pub use remote::RemoteVectorStore;
