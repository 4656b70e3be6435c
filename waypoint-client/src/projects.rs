//! Project lookup endpoint

use waypoint_core::domain::pipeline::Project;

use crate::DevOpsClient;
use crate::error::Result;

const API_VERSION: &str = "7.1";

impl DevOpsClient {
    /// Get a project by id or name
    pub async fn get_project(&self, project: &str) -> Result<Project> {
        let url = self.endpoint(["_apis", "projects", project])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("api-version", API_VERSION)])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
