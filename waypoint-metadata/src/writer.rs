//! Metadata writer
//!
//! Runs once per deployment stage. Records the current build as the latest
//! one to reach the stage's environment by rewriting that environment's
//! document in the pipeline's collection.
//!
//! The store refuses a write whose token is stale. A refused write is
//! retried from a fresh read a bounded number of times; anything else the
//! store reports fails the run.

use tracing::{debug, info, warn};
use waypoint_client::DocumentStore;
use waypoint_core::CollectionKey;
use waypoint_core::dto::document::EnvironmentMetadataDocument;

use crate::error::{MetadataError, Result};

/// One initial attempt plus one retry after a conflict
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// What the running pipeline knows about itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishContext {
    pub project_id: String,
    pub definition_id: u32,
    pub build_id: u64,
    pub build_number: String,
    /// Only used for diagnostics
    pub stage_name: String,
    /// Absent outside deployment jobs; publishing is then skipped
    pub environment_id: Option<u32>,
    pub resource_id: Option<u32>,
}

/// Result of a publish run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// No environment was targeted, nothing was written
    Skipped,
    /// The stored document, carrying its new token
    Published(EnvironmentMetadataDocument),
}

/// Writes per-environment build documents
pub struct MetadataWriter<S> {
    store: S,
    max_attempts: u32,
}

impl<S: DocumentStore> MetadataWriter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override how many read-modify-write rounds a conflict may trigger
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Record the context's build against its environment
    ///
    /// # Errors
    /// - [`MetadataError::Store`] for any transport or API failure
    /// - [`MetadataError::Conflict`] when every attempt hit a stale token
    pub async fn publish(&self, context: &PublishContext) -> Result<PublishOutcome> {
        let Some(environment_id) = context.environment_id else {
            info!(
                "No environment targeted by stage '{}', skipping publish",
                context.stage_name
            );
            return Ok(PublishOutcome::Skipped);
        };

        let collection = CollectionKey::construct(&context.project_id, context.definition_id);
        let document_id = environment_id.to_string();

        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.write_once(&collection, &document_id, context).await {
                Ok(stored) => {
                    info!(
                        "Published build {} ({}) to environment {} in collection {}",
                        stored.build_number, stored.build_id, document_id, collection
                    );
                    return Ok(PublishOutcome::Published(stored));
                }
                Err(e) if e.is_conflict() => {
                    if attempt >= self.max_attempts {
                        warn!(
                            "Giving up on document {} after {} attempt(s): {}",
                            document_id, attempt, e
                        );
                        return Err(MetadataError::Conflict {
                            collection,
                            document_id,
                            attempts: attempt,
                        });
                    }

                    warn!(
                        "Document {} changed concurrently (attempt {}/{}), re-reading",
                        document_id, attempt, self.max_attempts
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// One read-modify-write round
    async fn write_once(
        &self,
        collection: &str,
        document_id: &str,
        context: &PublishContext,
    ) -> waypoint_client::Result<EnvironmentMetadataDocument> {
        let existing = self.store.get_document(collection, document_id).await?;
        let etag = existing.as_ref().and_then(|doc| doc.etag);

        debug!(
            "Read document {} from {} (exists: {}, etag: {:?})",
            document_id,
            collection,
            existing.is_some(),
            etag
        );

        let document = EnvironmentMetadataDocument {
            id: document_id.to_string(),
            build_id: context.build_id,
            build_number: context.build_number.clone(),
            resource_id: context.resource_id,
            status: None,
            etag,
        };

        self.store.set_document(collection, document).await
    }
}
