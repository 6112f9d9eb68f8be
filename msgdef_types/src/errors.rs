use std::path::PathBuf;
use thiserror::Error;

/// Failure to parse the textual form of a version range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version range '{text}': {reason}")]
pub struct ParseVersionRangeError {
    pub text: String,
    pub reason: String,
}

/// Errors raised while loading or resolving a message schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document is not valid JSON (after comment stripping).
    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema file could not be read.
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required attribute is absent.
    #[error("{context}: missing required attribute '{attribute}'")]
    MissingAttribute {
        context: String,
        attribute: &'static str,
    },

    /// An attribute is present but its value is unusable.
    #[error("{context}: invalid attribute '{attribute}': {reason}")]
    InvalidAttribute {
        context: String,
        attribute: &'static str,
        reason: String,
    },

    #[error("{context}: {source}")]
    VersionRange {
        context: String,
        #[source]
        source: ParseVersionRangeError,
    },

    /// `validVersions` has no finite upper bound.
    #[error("message {message} does not specify a maximum version (validVersions '{range}')")]
    OpenEndedVersions { message: String, range: String },

    /// A field is never present inside its enclosing struct.
    #[error("{context}: field '{field}' versions {versions} do not overlap struct versions {struct_versions}")]
    FieldOutsideStruct {
        context: String,
        field: String,
        versions: String,
        struct_versions: String,
    },

    #[error("{context}: field '{field}' has invalid tagged versions: {reason}")]
    InvalidTaggedVersions {
        context: String,
        field: String,
        reason: String,
    },

    #[error("{context}: field '{field}' is declared more than once")]
    DuplicateField { context: String, field: String },

    #[error("{context}: tag {tag} is used by more than one field")]
    DuplicateTag { context: String, tag: i32 },

    /// Two inline definitions share a struct name but not a shape.
    #[error("struct '{name}' is defined twice with different fields")]
    ConflictingStruct { name: String },

    /// A struct-typed field refers to a name no definition provides.
    #[error("field '{field}' references unknown struct type '{type_name}'")]
    UnresolvedType { field: String, type_name: String },

    #[error("field '{field}' of type '{field_type}' is not struct-typed")]
    NotAStruct { field: String, field_type: String },

    #[error("message {message} does not support version {version} (validVersions {valid})")]
    UnsupportedVersion {
        message: String,
        version: i16,
        valid: String,
    },

    /// The reserved unknown-tagged-fields entry of a fixture has the wrong shape.
    #[error("malformed _unknown_tagged_fields: {reason}")]
    MalformedTaggedFields { reason: String },
}
