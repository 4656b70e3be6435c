//! Document store DTOs

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::status::PipelineStatus;

/// Per-environment record stored in a pipeline's metadata collection
///
/// `id` is the environment id rendered as a decimal string. `etag` is the
/// store's concurrency token: absent on first creation, and on every later
/// write it must equal the token seen by the most recent read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentMetadataDocument {
    pub id: String,
    /// Older publishers stored the raw variable text; both forms are read
    #[serde(deserialize_with = "number_or_text")]
    pub build_id: u64,
    pub build_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u32>,
    /// Not written by any publisher yet; read through when present.
    /// Unrecognized text reads as `Succeeded`.
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<PipelineStatus>,
    #[serde(rename = "__etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<u64>,
}

impl EnvironmentMetadataDocument {
    /// Numeric environment id, if the stored id is a number
    pub fn environment_id(&self) -> Option<u32> {
        self.id.parse().ok()
    }
}

fn number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid build id '{}'", text))),
    }
}

fn lenient_status<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PipelineStatus>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|status| PipelineStatus::from_lenient(&status)))
}

/// One collection as returned by a batched collection query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCollection {
    pub collection_name: String,
    #[serde(default)]
    pub documents: Vec<EnvironmentMetadataDocument>,
}
