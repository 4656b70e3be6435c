//! Extension data service endpoints
//!
//! The document store is scoped to one installed extension. Documents are
//! addressed by (scope, collection name, document id) and carry an `__etag`
//! the service checks on every overwrite.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use waypoint_core::dto::document::{DocumentCollection, EnvironmentMetadataDocument};
use waypoint_core::dto::listing::ListResponse;

use crate::DevOpsClient;
use crate::error::{ClientError, Result};
use crate::store::DocumentStore;

const API_VERSION: &str = "7.1-preview.1";

/// Identifies which extension's data a request touches and at what scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreScope {
    /// Publisher of the extension that owns the data
    pub publisher: String,
    /// Extension id within the publisher
    pub extension_id: String,
    /// "Default" for collection-wide data, "User" for per-user data
    pub scope_type: String,
    /// "Current" for the current collection or user
    pub scope_value: String,
}

impl StoreScope {
    /// Scope over the whole organization (`Default`/`Current`)
    pub fn new(publisher: impl Into<String>, extension_id: impl Into<String>) -> Self {
        Self {
            publisher: publisher.into(),
            extension_id: extension_id.into(),
            scope_type: "Default".to_string(),
            scope_value: "Current".to_string(),
        }
    }
}

/// Document store backed by the hosted extension data service
#[derive(Debug, Clone)]
pub struct ExtensionDataClient {
    api: DevOpsClient,
    scope: StoreScope,
}

impl ExtensionDataClient {
    pub fn new(api: DevOpsClient, scope: StoreScope) -> Self {
        Self { api, scope }
    }

    pub fn scope(&self) -> &StoreScope {
        &self.scope
    }

    /// URL of the extension data service this client talks to
    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    fn extension_segments(&self) -> [&str; 5] {
        [
            "_apis",
            "ExtensionManagement",
            "InstalledExtensions",
            self.scope.publisher.as_str(),
            self.scope.extension_id.as_str(),
        ]
    }

    fn documents_segments<'a>(&'a self, collection: &'a str) -> Vec<&'a str> {
        let mut segments = self.extension_segments().to_vec();
        segments.extend([
            "Data",
            "Scopes",
            self.scope.scope_type.as_str(),
            self.scope.scope_value.as_str(),
            "Collections",
            collection,
            "Documents",
        ]);
        segments
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionQuery<'a> {
    collections: Vec<CollectionQueryItem<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionQueryItem<'a> {
    collection_name: &'a str,
    scope_type: &'a str,
    scope_value: &'a str,
}

/// A queried collection before its documents are decoded
///
/// Documents are decoded one by one so that a malformed or foreign document
/// only drops itself, not the whole response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCollection {
    collection_name: String,
    #[serde(default)]
    documents: Vec<Value>,
}

impl RawCollection {
    fn decode(self) -> DocumentCollection {
        let collection_name = self.collection_name;
        let documents: Vec<EnvironmentMetadataDocument> = self
            .documents
            .into_iter()
            .filter_map(|raw| match serde_json::from_value(raw) {
                Ok(document) => Some(document),
                Err(e) => {
                    warn!(
                        "Skipping unreadable document in collection {}: {}",
                        collection_name, e
                    );
                    None
                }
            })
            .collect();

        DocumentCollection {
            collection_name,
            documents,
        }
    }
}

#[async_trait]
impl DocumentStore for ExtensionDataClient {
    async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<EnvironmentMetadataDocument>> {
        let mut segments = self.documents_segments(collection);
        segments.push(document_id);
        let url = self.api.endpoint(segments)?;

        debug!("GET document {} from collection {}", document_id, collection);

        let response = self
            .api
            .client
            .get(url)
            .bearer_auth(&self.api.token)
            .query(&[("api-version", API_VERSION)])
            .send()
            .await?;

        match self.api.handle_response(response).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_document(
        &self,
        collection: &str,
        document: EnvironmentMetadataDocument,
    ) -> Result<EnvironmentMetadataDocument> {
        let url = self.api.endpoint(self.documents_segments(collection))?;

        debug!(
            "PUT document {} into collection {} (etag: {:?})",
            document.id, collection, document.etag
        );

        let response = self
            .api
            .client
            .put(url)
            .bearer_auth(&self.api.token)
            .query(&[("api-version", API_VERSION)])
            .json(&document)
            .send()
            .await?;

        self.api
            .handle_response(response)
            .await
            .map_err(|e| match e {
                ClientError::Conflict(message) => ClientError::Conflict(format!(
                    "document {} in collection {}: {}",
                    document.id, collection, message
                )),
                other => other,
            })
    }

    async fn query_collections(&self, names: &[String]) -> Result<Vec<DocumentCollection>> {
        let mut segments = self.extension_segments().to_vec();
        segments.push("ExtensionDataCollectionQuery");
        let url = self.api.endpoint(segments)?;

        let query = CollectionQuery {
            collections: names
                .iter()
                .map(|name| CollectionQueryItem {
                    collection_name: name,
                    scope_type: &self.scope.scope_type,
                    scope_value: &self.scope.scope_value,
                })
                .collect(),
        };

        debug!("Querying {} collection(s)", names.len());

        let response = self
            .api
            .client
            .post(url)
            .bearer_auth(&self.api.token)
            .query(&[("api-version", API_VERSION)])
            .json(&query)
            .send()
            .await?;

        let collections: ListResponse<RawCollection> = self.api.handle_response(response).await?;

        Ok(collections
            .into_inner()
            .into_iter()
            .map(RawCollection::decode)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ExtensionDataClient {
        ExtensionDataClient::new(
            DevOpsClient::new("https://extmgmt.dev.azure.com/contoso", "t"),
            StoreScope::new("contoso", "waypoint"),
        )
    }

    #[test]
    fn test_default_scope() {
        let scope = StoreScope::new("contoso", "waypoint");
        assert_eq!(scope.scope_type, "Default");
        assert_eq!(scope.scope_value, "Current");
    }

    #[test]
    fn test_document_route() {
        let store = store();
        let mut segments = store.documents_segments("P:pipeline-metadata:7");
        segments.push("2");
        let url = store.api.endpoint(segments).unwrap();

        assert_eq!(
            url.as_str(),
            "https://extmgmt.dev.azure.com/contoso/_apis/ExtensionManagement/InstalledExtensions/\
             contoso/waypoint/Data/Scopes/Default/Current/Collections/P:pipeline-metadata:7/Documents/2"
        );
    }

    #[test]
    fn test_unreadable_documents_are_dropped_individually() {
        let response: ListResponse<RawCollection> = serde_json::from_value(serde_json::json!({
            "count": 2,
            "value": [
                {
                    "collectionName": "P:pipeline-metadata:7",
                    "documents": [
                        { "id": "deploy_dev", "buildId": "4711", "buildNumber": "1.0" },
                        { "id": "3", "buildNumber": "no build id" },
                        { "id": "2", "buildId": 12, "buildNumber": "1.1", "__etag": 4 }
                    ]
                },
                {
                    "collectionName": "P:pipeline-metadata:8",
                    "documents": [
                        { "id": "2", "buildId": 13, "buildNumber": "2.0", "status": "canceled" }
                    ]
                }
            ]
        }))
        .unwrap();

        let collections: Vec<DocumentCollection> = response
            .into_inner()
            .into_iter()
            .map(RawCollection::decode)
            .collect();

        assert_eq!(collections.len(), 2);
        let ids: Vec<&str> = collections[0]
            .documents
            .iter()
            .map(|doc| doc.id.as_str())
            .collect();
        assert_eq!(ids, ["deploy_dev", "2"]);
        assert_eq!(collections[1].documents[0].build_number, "2.0");
    }

    #[test]
    fn test_collection_query_body() {
        let query = CollectionQuery {
            collections: vec![CollectionQueryItem {
                collection_name: "P:pipeline-metadata:7",
                scope_type: "Default",
                scope_value: "Current",
            }],
        };

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({
                "collections": [{
                    "collectionName": "P:pipeline-metadata:7",
                    "scopeType": "Default",
                    "scopeValue": "Current",
                }]
            })
        );
    }
}
