//! Metadata reader
//!
//! Fetches the metadata collections of many pipelines in a single store
//! query and reshapes each collection into a [`PipelineMetadata`] limited to
//! the environments its selector asked for.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use waypoint_client::DocumentStore;
use waypoint_core::CollectionKey;
use waypoint_core::domain::metadata::{
    EnvironmentMetadata, PipelineMetadata, PipelineMetadataSelector,
};
use waypoint_core::dto::document::DocumentCollection;

use crate::error::Result;

/// Reads and aggregates per-environment documents
pub struct MetadataReader<S> {
    store: S,
}

impl<S: DocumentStore> MetadataReader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Aggregate the metadata of every selected pipeline
    ///
    /// Output order is unspecified; index the result by
    /// `(project_id, definition_id)`. A pipeline whose collection the store
    /// did not return has no entry at all, while a returned collection with no
    /// matching documents yields an entry with no environments.
    ///
    /// When two selectors name the same collection, the later one's
    /// environment list wins.
    pub async fn get_pipelines_metadata(
        &self,
        selectors: &[PipelineMetadataSelector],
    ) -> Result<Vec<PipelineMetadata>> {
        if selectors.is_empty() {
            return Ok(Vec::new());
        }

        let mut names = Vec::with_capacity(selectors.len());
        let mut requested: HashMap<String, HashSet<u32>> = HashMap::new();

        for selector in selectors {
            let name = CollectionKey::construct(&selector.project_id, selector.definition_id);
            let environments = selector.environments.iter().copied().collect();
            if requested.insert(name.clone(), environments).is_none() {
                names.push(name);
            }
        }

        let collections = self.store.query_collections(&names).await?;
        debug!(
            "Store returned {} of {} requested collection(s)",
            collections.len(),
            names.len()
        );

        Ok(collections
            .into_iter()
            .filter_map(|collection| {
                let Some(environments) = requested.get(&collection.collection_name) else {
                    debug!(
                        "Ignoring unrequested collection {}",
                        collection.collection_name
                    );
                    return None;
                };
                aggregate(collection, environments)
            })
            .collect())
    }
}

/// Shape one collection, or `None` when its name cannot be decoded
fn aggregate(
    collection: DocumentCollection,
    environments: &HashSet<u32>,
) -> Option<PipelineMetadata> {
    let decoded = CollectionKey::deconstruct(&collection.collection_name)
        .and_then(|key| key.definition_number().map(|id| (key.project_id, id)));

    let (project_id, definition_id) = match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Skipping collection: {}", e);
            return None;
        }
    };

    let environments = collection
        .documents
        .into_iter()
        .filter(|doc| {
            doc.environment_id()
                .is_some_and(|id| environments.contains(&id))
        })
        .filter_map(EnvironmentMetadata::from_document)
        .collect();

    Some(PipelineMetadata {
        project_id,
        definition_id,
        environments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use waypoint_client::InMemoryDocumentStore;
    use waypoint_core::domain::status::PipelineStatus;
    use waypoint_core::dto::document::EnvironmentMetadataDocument;

    fn document(id: &str, build_number: &str) -> EnvironmentMetadataDocument {
        EnvironmentMetadataDocument {
            id: id.to_string(),
            build_id: 10,
            build_number: build_number.to_string(),
            resource_id: None,
            status: None,
            etag: None,
        }
    }

    fn selector(project_id: &str, definition_id: u32, environments: &[u32]) -> PipelineMetadataSelector {
        PipelineMetadataSelector {
            project_id: project_id.to_string(),
            definition_id,
            environments: environments.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_only_requested_environments_are_kept() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.seed("P:pipeline-metadata:7", document("1", "1.0"));
        store.seed("P:pipeline-metadata:7", document("3", "3.0"));
        let reader = MetadataReader::new(store);

        let result = reader
            .get_pipelines_metadata(&[selector("P", 7, &[1, 2])])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].project_id, "P");
        assert_eq!(result[0].definition_id, 7);
        assert_eq!(result[0].environments.len(), 1);
        assert_eq!(result[0].environments[0].id, 1);
        assert_eq!(result[0].environments[0].build_number, "1.0");
    }

    #[tokio::test]
    async fn test_absent_collection_has_no_entry() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.create_collection("P:pipeline-metadata:8");
        let reader = MetadataReader::new(store);

        let result = reader
            .get_pipelines_metadata(&[selector("P", 7, &[1]), selector("P", 8, &[1])])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].definition_id, 8);
        assert!(result[0].environments.is_empty());
    }

    #[tokio::test]
    async fn test_single_query_for_all_collections() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.seed("P:pipeline-metadata:1", document("1", "a"));
        store.seed("P:pipeline-metadata:2", document("1", "b"));
        let reader = MetadataReader::new(store.clone());

        let mut result = reader
            .get_pipelines_metadata(&[selector("P", 1, &[1]), selector("P", 2, &[1])])
            .await
            .unwrap();
        result.sort_by_key(|p| p.definition_id);

        assert_eq!(store.calls().queries, 1);
        assert_eq!(result[0].environments[0].build_number, "a");
        assert_eq!(result[1].environments[0].build_number, "b");
    }

    #[tokio::test]
    async fn test_duplicate_selectors_last_one_wins() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.seed("P:pipeline-metadata:7", document("1", "1.0"));
        store.seed("P:pipeline-metadata:7", document("2", "2.0"));
        let reader = MetadataReader::new(store);

        let result = reader
            .get_pipelines_metadata(&[selector("P", 7, &[1]), selector("P", 7, &[2])])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].environments.len(), 1);
        assert_eq!(result[0].environments[0].id, 2);
    }

    #[tokio::test]
    async fn test_undecodable_collection_is_skipped() {
        let store = Arc::new(InMemoryDocumentStore::new());
        // A colon in the project id produces a name that cannot be decoded
        store.seed("a:b:pipeline-metadata:1", document("1", "bad"));
        store.seed("P:pipeline-metadata:2", document("1", "good"));
        let reader = MetadataReader::new(store);

        let result = reader
            .get_pipelines_metadata(&[selector("a:b", 1, &[1]), selector("P", 2, &[1])])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].environments[0].build_number, "good");
    }

    #[tokio::test]
    async fn test_status_and_resource_are_carried() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let mut doc = document("4", "4.0");
        doc.resource_id = Some(9);
        doc.status = Some(PipelineStatus::Failed);
        store.seed("P:pipeline-metadata:7", doc);
        store.seed("P:pipeline-metadata:7", document("not-a-number", "x"));
        let reader = MetadataReader::new(store);

        let result = reader
            .get_pipelines_metadata(&[selector("P", 7, &[4])])
            .await
            .unwrap();

        let env = &result[0].environments[0];
        assert_eq!(result[0].environments.len(), 1);
        assert_eq!(env.resource_id, Some(9));
        assert_eq!(env.status, Some(PipelineStatus::Failed));
    }

    #[tokio::test]
    async fn test_stage_keyed_documents_do_not_break_the_batch() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.seed("P:pipeline-metadata:7", document("deploy_dev", "old"));
        store.seed("P:pipeline-metadata:7", document("1", "1.0"));
        store.seed("P:pipeline-metadata:8", document("1", "2.0"));
        let reader = MetadataReader::new(store);

        let mut result = reader
            .get_pipelines_metadata(&[selector("P", 7, &[1]), selector("P", 8, &[1])])
            .await
            .unwrap();
        result.sort_by_key(|p| p.definition_id);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].environments.len(), 1);
        assert_eq!(result[0].environments[0].build_number, "1.0");
        assert_eq!(result[1].environments[0].build_number, "2.0");
    }

    #[tokio::test]
    async fn test_no_selectors_skips_the_store() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let reader = MetadataReader::new(store.clone());

        let result = reader.get_pipelines_metadata(&[]).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(store.calls().queries, 0);
    }
}
