//! Document store abstraction
//!
//! The metadata reader and writer only need three operations from the
//! store. Keeping them behind a trait lets the same code run against the
//! hosted service and against [`crate::InMemoryDocumentStore`].

use async_trait::async_trait;
use std::sync::Arc;
use waypoint_core::dto::document::{DocumentCollection, EnvironmentMetadataDocument};

use crate::error::Result;

/// Key/value document store with single-document optimistic concurrency
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by collection and id
    ///
    /// A missing document (or missing collection) is `Ok(None)`.
    async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<EnvironmentMetadataDocument>>;

    /// Create or replace a document
    ///
    /// The document's `etag` must match the stored token (or be absent when
    /// no document exists yet), otherwise the store rejects the write with
    /// [`crate::ClientError::Conflict`] and leaves the stored document as it
    /// was. Returns the stored document carrying its new token.
    async fn set_document(
        &self,
        collection: &str,
        document: EnvironmentMetadataDocument,
    ) -> Result<EnvironmentMetadataDocument>;

    /// Fetch several collections in one request
    ///
    /// Collections the store has never seen may be missing from the result.
    async fn query_collections(&self, names: &[String]) -> Result<Vec<DocumentCollection>>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<EnvironmentMetadataDocument>> {
        (**self).get_document(collection, document_id).await
    }

    async fn set_document(
        &self,
        collection: &str,
        document: EnvironmentMetadataDocument,
    ) -> Result<EnvironmentMetadataDocument> {
        (**self).set_document(collection, document).await
    }

    async fn query_collections(&self, names: &[String]) -> Result<Vec<DocumentCollection>> {
        (**self).query_collections(names).await
    }
}
