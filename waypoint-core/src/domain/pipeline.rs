//! Pipeline, environment and project types
//!
//! These come from the organization's listing endpoints and only carry the
//! fields the version matrix needs.

use serde::{Deserialize, Serialize};

/// Project the pipelines belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Pipeline definition (one row of the version matrix)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub folder: Option<String>,
}

/// Deployment environment (one column of the version matrix)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInstance {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: Vec<EnvironmentResourceReference>,
}

/// Concrete target inside an environment, e.g. a cluster namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentResourceReference {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type", default)]
    pub resource_type: EnvironmentResourceType,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvironmentResourceType {
    Generic,
    Kubernetes,
    #[default]
    Undefined,
    VirtualMachine,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_listing_json() {
        let env: EnvironmentInstance = serde_json::from_value(serde_json::json!({
            "id": 2,
            "name": "test",
            "createdOn": "2024-05-01T10:00:00Z",
            "resources": [
                { "id": 7, "name": "aks-test", "type": "kubernetes", "tags": ["blue"] }
            ]
        }))
        .unwrap();

        assert_eq!(env.id, 2);
        assert_eq!(env.description, None);
        assert_eq!(env.resources[0].resource_type, EnvironmentResourceType::Kubernetes);
    }
}
