//! Collection naming for pipeline metadata
//!
//! Every (project, pipeline definition) pair owns one collection in the
//! document store. The collection name is the only link between stored
//! documents and the pipeline they describe, so it must decode back to
//! exactly the pair it was built from.

use thiserror::Error;

/// Literal tag stored in the middle field of every collection name
pub const COLLECTION_TAG: &str = "pipeline-metadata";

const SEPARATOR: char = ':';

/// A collection name that does not follow `<project>:pipeline-metadata:<definition>`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid collection name format: {collection_name}")]
pub struct FormatError {
    pub collection_name: String,
}

impl FormatError {
    fn new(collection_name: &str) -> Self {
        Self {
            collection_name: collection_name.to_string(),
        }
    }
}

/// The two halves of a decoded collection name
///
/// `definition_id` stays textual here; see [`CollectionKey::definition_number`]
/// for the numeric form used everywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionKey {
    pub project_id: String,
    pub definition_id: String,
}

impl CollectionKey {
    /// Build the collection name for a project and pipeline definition
    ///
    /// `project_id` must not contain a colon, otherwise the name cannot be
    /// decoded again. This is not checked.
    pub fn construct(project_id: &str, definition_id: u32) -> String {
        join(project_id, &definition_id.to_string())
    }

    /// Split a collection name back into its project and definition ids
    ///
    /// # Errors
    /// Returns [`FormatError`] unless the name has exactly three
    /// colon-separated fields and the middle one is [`COLLECTION_TAG`].
    pub fn deconstruct(collection_name: &str) -> Result<Self, FormatError> {
        let parts: Vec<&str> = collection_name.split(SEPARATOR).collect();

        match parts.as_slice() {
            [project_id, tag, definition_id] if *tag == COLLECTION_TAG => Ok(Self {
                project_id: project_id.to_string(),
                definition_id: definition_id.to_string(),
            }),
            _ => Err(FormatError::new(collection_name)),
        }
    }

    /// Numeric pipeline definition id
    ///
    /// # Errors
    /// Returns [`FormatError`] when the definition field is not a number.
    pub fn definition_number(&self) -> Result<u32, FormatError> {
        self.definition_id
            .parse()
            .map_err(|_| FormatError::new(&join(&self.project_id, &self.definition_id)))
    }
}

fn join(project_id: &str, definition_id: &str) -> String {
    format!("{project_id}{SEPARATOR}{COLLECTION_TAG}{SEPARATOR}{definition_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct() {
        assert_eq!(
            CollectionKey::construct("P", 7),
            "P:pipeline-metadata:7".to_string()
        );
    }

    #[test]
    fn test_deconstruct_round_trip() {
        let project = "6ce954b1-ce1f-45d1-b94d-e6bf2464ba2c";
        let name = CollectionKey::construct(project, 42);

        let key = CollectionKey::deconstruct(&name).unwrap();
        assert_eq!(key.project_id, project);
        assert_eq!(key.definition_id, "42");
        assert_eq!(key.definition_number(), Ok(42));
    }

    #[test]
    fn test_deconstruct_wrong_part_count() {
        assert!(CollectionKey::deconstruct("a:b").is_err());
        assert!(CollectionKey::deconstruct("a:pipeline-metadata:1:2").is_err());
        assert!(CollectionKey::deconstruct("").is_err());
    }

    #[test]
    fn test_deconstruct_wrong_tag() {
        let err = CollectionKey::deconstruct("a:wrong-tag:1").unwrap_err();
        assert_eq!(err.collection_name, "a:wrong-tag:1");
    }

    #[test]
    fn test_non_numeric_definition() {
        let key = CollectionKey::deconstruct("a:pipeline-metadata:abc").unwrap();
        assert_eq!(key.definition_id, "abc");
        assert!(key.definition_number().is_err());
    }
}
