//! Core domain types
//!
//! These types are shared between the metadata reader/writer (which talk to
//! the document store) and the view layer (which turns them into a table).

pub mod metadata;
pub mod pipeline;
pub mod status;
pub mod version;
