//! Waypoint Core
//!
//! Core types and abstractions for tracking which build reached which
//! deployment environment.
//!
//! This crate contains:
//! - Collection naming: the codec between (project, pipeline) and a store collection
//! - Domain types: read-side metadata, pipelines, environments, version matrix rows
//! - DTOs: wire shapes exchanged with the document store and listing APIs

pub mod collection;
pub mod domain;
pub mod dto;

pub use collection::{COLLECTION_TAG, CollectionKey, FormatError};
