//! Message Definition Types
//!
//! This crate contains the schema IR for versioned wire-format messages:
//! version ranges, message/struct/field specs and the loader that turns a
//! schema document into them. It has no code generation or fixture logic.

pub mod errors;
pub mod naming;
pub mod schema;
pub mod types;
pub mod version;

// Re-export commonly used types at the crate root
pub use errors::{ParseVersionRangeError, SchemaError};
pub use schema::{load_message_spec, load_message_spec_file, strip_comments};
pub use types::*;
pub use version::VersionRange;
