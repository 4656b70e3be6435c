//! Pipeline listing endpoints

use tracing::debug;
use waypoint_core::domain::pipeline::PipelineDefinition;
use waypoint_core::dto::listing::ListResponse;

use crate::DevOpsClient;
use crate::error::Result;

const API_VERSION: &str = "7.1";

impl DevOpsClient {
    // =============================================================================
    // Pipeline Listing
    // =============================================================================

    /// List all pipeline definitions in a project
    ///
    /// # Arguments
    /// * `project` - Project id or name
    ///
    /// # Returns
    /// Pipeline definitions (id and name)
    pub async fn list_pipelines(&self, project: &str) -> Result<Vec<PipelineDefinition>> {
        let url = self.endpoint([project, "_apis", "pipelines"])?;
        debug!("Listing pipelines for project {}", project);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("api-version", API_VERSION)])
            .send()
            .await?;

        let pipelines: ListResponse<PipelineDefinition> = self.handle_response(response).await?;
        Ok(pipelines.into_inner())
    }
}
