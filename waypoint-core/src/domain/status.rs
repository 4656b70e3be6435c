//! Pipeline status domain type

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome shown for one pipeline in one environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Running,
    Succeeded,
    Failed,
    Warning,
}

impl PipelineStatus {
    pub const ALL: [PipelineStatus; 4] = [
        PipelineStatus::Succeeded,
        PipelineStatus::Failed,
        PipelineStatus::Running,
        PipelineStatus::Warning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Running => "running",
            PipelineStatus::Succeeded => "succeeded",
            PipelineStatus::Failed => "failed",
            PipelineStatus::Warning => "warning",
        }
    }

    /// Parse loosely: case-insensitive, anything unrecognized is `Succeeded`
    pub fn from_lenient(value: &str) -> Self {
        value.parse().unwrap_or(PipelineStatus::Succeeded)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "running" => Ok(PipelineStatus::Running),
            "succeeded" => Ok(PipelineStatus::Succeeded),
            "failed" => Ok(PipelineStatus::Failed),
            "warning" => Ok(PipelineStatus::Warning),
            other => Err(format!("unknown pipeline status '{}'", other)),
        }
    }
}
