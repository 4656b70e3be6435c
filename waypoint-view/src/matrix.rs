//! Version matrix builder

use std::collections::HashMap;
use waypoint_core::domain::metadata::PipelineMetadata;
use waypoint_core::domain::pipeline::PipelineDefinition;
use waypoint_core::domain::status::PipelineStatus;
use waypoint_core::domain::version::{EnvironmentVersion, VersionItem};

/// Status shown while documents do not carry one
pub const PLACEHOLDER_STATUS: PipelineStatus = PipelineStatus::Succeeded;

/// Build one row per pipeline, in listing order
///
/// Metadata is matched on `(project_id, definition_id)`. A pipeline without
/// metadata still gets a row, with no environments. Metadata for pipelines
/// missing from the listing is dropped.
pub fn build_version_matrix(
    project_id: &str,
    pipelines: &[PipelineDefinition],
    metadata: &[PipelineMetadata],
) -> Vec<VersionItem> {
    let by_definition: HashMap<u32, &PipelineMetadata> = metadata
        .iter()
        .filter(|m| m.project_id == project_id)
        .map(|m| (m.definition_id, m))
        .collect();

    pipelines
        .iter()
        .map(|pipeline| VersionItem {
            name: pipeline.name.clone(),
            definition_id: pipeline.id,
            environments: by_definition
                .get(&pipeline.id)
                .map(|m| {
                    m.environments
                        .iter()
                        .map(|env| {
                            (
                                env.id,
                                EnvironmentVersion {
                                    status: env.status.unwrap_or(PLACEHOLDER_STATUS),
                                    build_id: env.build_id,
                                    build_number: env.build_number.clone(),
                                },
                            )
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect()
}
