//! Read-side pipeline metadata

use serde::{Deserialize, Serialize};

use crate::domain::status::PipelineStatus;
use crate::dto::document::EnvironmentMetadataDocument;

/// Request for one pipeline's metadata, limited to some environments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineMetadataSelector {
    pub project_id: String,
    pub definition_id: u32,
    pub environments: Vec<u32>,
}

/// Aggregated metadata for one pipeline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub project_id: String,
    pub definition_id: u32,
    pub environments: Vec<EnvironmentMetadata>,
}

/// Latest build known to have reached one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentMetadata {
    pub id: u32,
    pub build_id: u64,
    pub build_number: String,
    pub resource_id: Option<u32>,
    pub status: Option<PipelineStatus>,
}

impl EnvironmentMetadata {
    /// Convert a stored document; `None` when its id is not numeric
    pub fn from_document(document: EnvironmentMetadataDocument) -> Option<Self> {
        let id = document.environment_id()?;
        Some(Self {
            id,
            build_id: document.build_id,
            build_number: document.build_number,
            resource_id: document.resource_id,
            status: document.status,
        })
    }
}
