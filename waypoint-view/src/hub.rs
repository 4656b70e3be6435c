//! Versions hub
//!
//! Loads everything the version matrix of one project needs.

use tracing::{debug, info};
use waypoint_client::{DocumentStore, PipelineCatalog};
use waypoint_core::domain::metadata::PipelineMetadataSelector;
use waypoint_core::domain::pipeline::{EnvironmentInstance, Project};
use waypoint_core::domain::version::VersionItem;
use waypoint_metadata::MetadataReader;

use crate::error::Result;
use crate::matrix::build_version_matrix;

/// A loaded version matrix
#[derive(Debug, Clone)]
pub struct VersionsData {
    pub project: Project,
    /// Matrix columns, in listing order
    pub environments: Vec<EnvironmentInstance>,
    /// Matrix rows, in pipeline listing order
    pub items: Vec<VersionItem>,
}

pub struct VersionsHub<C, S> {
    catalog: C,
    reader: MetadataReader<S>,
}

impl<C: PipelineCatalog, S: DocumentStore> VersionsHub<C, S> {
    pub fn new(catalog: C, store: S) -> Self {
        Self {
            catalog,
            reader: MetadataReader::new(store),
        }
    }

    /// Load the version matrix of a project
    ///
    /// `project` may be an id or a name. Every pipeline is asked about every
    /// environment; the store is queried once.
    pub async fn load(&self, project: &str) -> Result<VersionsData> {
        let project = self.catalog.get_project(project).await?;
        debug!("Resolved project {} ({})", project.name, project.id);

        let (pipelines, environments) = tokio::try_join!(
            self.catalog.list_pipelines(&project.id),
            self.catalog.list_environments(&project.id),
        )?;

        let environment_ids: Vec<u32> = environments.iter().map(|env| env.id).collect();
        let selectors: Vec<PipelineMetadataSelector> = pipelines
            .iter()
            .map(|pipeline| PipelineMetadataSelector {
                project_id: project.id.clone(),
                definition_id: pipeline.id,
                environments: environment_ids.clone(),
            })
            .collect();

        let metadata = self.reader.get_pipelines_metadata(&selectors).await?;
        let items = build_version_matrix(&project.id, &pipelines, &metadata);

        info!(
            "Loaded {} pipeline(s) across {} environment(s) for {}",
            items.len(),
            environments.len(),
            project.name
        );

        Ok(VersionsData {
            project,
            environments,
            items,
        })
    }
}
