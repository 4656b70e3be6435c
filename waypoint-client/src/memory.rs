//! In-memory document store
//!
//! Applies the same token rules as the hosted service: tokens are numbers
//! starting at 1 and incremented on every successful write; a write whose
//! token differs from the stored one is rejected without touching the
//! stored document. Used by tests and for dry runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use waypoint_core::dto::document::{DocumentCollection, EnvironmentMetadataDocument};

use crate::error::{ClientError, Result};
use crate::store::DocumentStore;

type Collection = BTreeMap<String, EnvironmentMetadataDocument>;

/// Number of calls made against an [`InMemoryDocumentStore`], per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub gets: usize,
    pub sets: usize,
    pub queries: usize,
}

/// Process-local [`DocumentStore`]
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<BTreeMap<String, Collection>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    queries: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty collection
    ///
    /// A collection created this way is returned by queries with no
    /// documents, unlike a collection that was never written.
    pub fn create_collection(&self, collection: &str) {
        self.lock().entry(collection.to_string()).or_default();
    }

    /// Store a document as-is, bypassing token checks
    ///
    /// The stored copy gets the next token for its id. Returns that token.
    pub fn seed(&self, collection: &str, mut document: EnvironmentMetadataDocument) -> u64 {
        let mut collections = self.lock();
        let documents = collections.entry(collection.to_string()).or_default();
        let etag = next_etag(documents.get(&document.id));
        document.etag = Some(etag);
        documents.insert(document.id.clone(), document);
        etag
    }

    /// Current stored copy of a document
    pub fn document(&self, collection: &str, document_id: &str) -> Option<EnvironmentMetadataDocument> {
        self.lock()
            .get(collection)
            .and_then(|documents| documents.get(document_id))
            .cloned()
    }

    /// Number of documents stored in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().values().all(BTreeMap::is_empty)
    }

    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            gets: self.gets.load(Ordering::SeqCst),
            sets: self.sets.load(Ordering::SeqCst),
            queries: self.queries.load(Ordering::SeqCst),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Collection>> {
        self.collections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn next_etag(current: Option<&EnvironmentMetadataDocument>) -> u64 {
    current.and_then(|doc| doc.etag).map_or(1, |etag| etag + 1)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<EnvironmentMetadataDocument>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.document(collection, document_id))
    }

    async fn set_document(
        &self,
        collection: &str,
        mut document: EnvironmentMetadataDocument,
    ) -> Result<EnvironmentMetadataDocument> {
        self.sets.fetch_add(1, Ordering::SeqCst);

        let mut collections = self.lock();
        let documents = collections.entry(collection.to_string()).or_default();
        let current = documents.get(&document.id);
        let current_etag = current.and_then(|doc| doc.etag);

        if current_etag != document.etag {
            return Err(ClientError::Conflict(format!(
                "document {} in collection {}: expected etag {:?}, got {:?}",
                document.id, collection, current_etag, document.etag
            )));
        }

        document.etag = Some(next_etag(current));
        debug!(
            "Stored document {} in collection {} (etag: {:?})",
            document.id, collection, document.etag
        );
        documents.insert(document.id.clone(), document.clone());

        Ok(document)
    }

    async fn query_collections(&self, names: &[String]) -> Result<Vec<DocumentCollection>> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let collections = self.lock();
        Ok(names
            .iter()
            .filter_map(|name| {
                collections.get(name).map(|documents| DocumentCollection {
                    collection_name: name.clone(),
                    documents: documents.values().cloned().collect(),
                })
            })
            .collect())
    }
}
