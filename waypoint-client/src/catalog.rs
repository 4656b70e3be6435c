//! Listing collaborators used by the read path
//!
//! The version matrix needs the project, its pipelines (rows) and its
//! environments (columns). [`PipelineCatalog`] groups those lookups so the
//! loading logic can be tested without a network.

use async_trait::async_trait;
use waypoint_core::domain::pipeline::{EnvironmentInstance, PipelineDefinition, Project};

use crate::DevOpsClient;
use crate::error::Result;

/// Source of projects, pipeline definitions and environments
#[async_trait]
pub trait PipelineCatalog: Send + Sync {
    /// Resolve a project by id or name
    async fn get_project(&self, project: &str) -> Result<Project>;

    /// Pipeline definitions of a project
    async fn list_pipelines(&self, project_id: &str) -> Result<Vec<PipelineDefinition>>;

    /// Deployment environments of a project
    async fn list_environments(&self, project_id: &str) -> Result<Vec<EnvironmentInstance>>;
}

#[async_trait]
impl PipelineCatalog for DevOpsClient {
    async fn get_project(&self, project: &str) -> Result<Project> {
        DevOpsClient::get_project(self, project).await
    }

    async fn list_pipelines(&self, project_id: &str) -> Result<Vec<PipelineDefinition>> {
        DevOpsClient::list_pipelines(self, project_id).await
    }

    async fn list_environments(&self, project_id: &str) -> Result<Vec<EnvironmentInstance>> {
        DevOpsClient::list_environments(self, project_id).await
    }
}
