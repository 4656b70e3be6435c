//! Waypoint Metadata
//!
//! The persistence protocol for "which build reached which environment":
//! - [`MetadataWriter`]: read-modify-write of one environment document,
//!   guarded by the store's concurrency token
//! - [`MetadataReader`]: batched read of many pipelines' collections,
//!   reshaped into one aggregate per pipeline definition

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{MetadataError, Result};
pub use reader::MetadataReader;
pub use writer::{MetadataWriter, PublishContext, PublishOutcome};
