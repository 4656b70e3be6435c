//! View error types

use thiserror::Error;
use waypoint_client::ClientError;
use waypoint_metadata::MetadataError;

pub type Result<T> = std::result::Result<T, ViewError>;

#[derive(Debug, Error)]
pub enum ViewError {
    /// Project, pipeline or environment listing failed
    #[error("Listing request failed: {0}")]
    Catalog(#[from] ClientError),

    /// Reading pipeline metadata failed
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}
