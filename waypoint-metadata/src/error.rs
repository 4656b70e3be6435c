//! Metadata error types

use thiserror::Error;
use waypoint_client::ClientError;

pub type Result<T> = std::result::Result<T, MetadataError>;

#[derive(Debug, Error)]
pub enum MetadataError {
    /// Transport, auth or API failure from the document store
    #[error("Document store request failed: {0}")]
    Store(#[from] ClientError),

    /// Every attempt to write the document lost to a concurrent writer
    #[error(
        "Document {document_id} in collection {collection} was changed concurrently \
         ({attempts} attempt(s))"
    )]
    Conflict {
        collection: String,
        document_id: String,
        attempts: u32,
    },
}

impl MetadataError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
