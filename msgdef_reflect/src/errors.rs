use msgdef_types::SchemaError;
use thiserror::Error;

/// Result alias used across the materialization crate.
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Errors produced while materializing a fixture.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// The schema itself is unusable, or a reserved fixture entry is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The field's data kind has no materialization rule.
    #[error("{message} v{version}: field '{field}' has unsupported kind '{kind}'")]
    UnsupportedType {
        message: String,
        version: i16,
        field: String,
        kind: String,
    },

    /// A fixture value violates the field's kind, nullability or versions.
    #[error("{message} v{version}: field '{field}': {reason}")]
    Value {
        message: String,
        version: i16,
        field: String,
        reason: String,
    },

    /// No normalization stage maps the fixture key onto a declared field.
    #[error("no declared field matches fixture key '{external}' (tried {})", .tried.join(", "))]
    Naming { external: String, tried: Vec<String> },

    #[error("field '{field}' not found in struct '{struct_name}'")]
    FieldNotFound { field: String, struct_name: String },
}
