use msgdef_types::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Errors produced while resolving and emitting message structures.
#[derive(Debug, Error)]
pub enum CodegenError {
  #[error(transparent)]
  Schema(#[from] SchemaError),

  /// The active backend has no rendering for a field's data kind.
  #[error("{backend} backend cannot render field '{field}' of kind '{kind}' ({message} v{version})")]
  UnsupportedType {
    backend: &'static str,
    message: String,
    version: i16,
    field: String,
    kind: String,
  },

  /// An import path without a module separator.
  #[error("malformed import '{path}': expected 'module::Symbol'")]
  MalformedImport { path: String },

  #[error("failed to write {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
