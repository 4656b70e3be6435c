//! Environment listing endpoint

use tracing::debug;
use waypoint_core::domain::pipeline::EnvironmentInstance;
use waypoint_core::dto::listing::ListResponse;

use crate::DevOpsClient;
use crate::error::Result;

const API_VERSION: &str = "7.2-preview.1";

impl DevOpsClient {
    /// List the deployment environments of a project
    ///
    /// # Arguments
    /// * `project` - Project id or name
    pub async fn list_environments(&self, project: &str) -> Result<Vec<EnvironmentInstance>> {
        let url = self.endpoint([project, "_apis", "pipelines", "environments"])?;
        debug!("Listing environments for project {}", project);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("api-version", API_VERSION)])
            .send()
            .await?;

        let environments: ListResponse<EnvironmentInstance> =
            self.handle_response(response).await?;
        Ok(environments.into_inner())
    }
}
