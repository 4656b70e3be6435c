//! Data Transfer Objects
//!
//! Wire shapes for the document store and the organization's listing
//! endpoints. Field names follow the remote JSON, hence the serde renames.

pub mod document;
pub mod listing;
