//! Version matrix rows

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::status::PipelineStatus;

/// One row of the version matrix: a pipeline and what it deployed where
///
/// `environments` is keyed by environment id. A missing key means the
/// pipeline never reached that environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionItem {
    pub name: String,
    pub definition_id: u32,
    pub environments: BTreeMap<u32, EnvironmentVersion>,
}

impl VersionItem {
    pub fn environment(&self, environment_id: u32) -> Option<&EnvironmentVersion> {
        self.environments.get(&environment_id)
    }
}

/// One cell of the version matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVersion {
    pub status: PipelineStatus,
    pub build_id: u64,
    pub build_number: String,
}
