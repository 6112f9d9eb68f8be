pub mod codegen;
pub mod errors;
pub mod imports;
pub mod output;
pub mod registry;
pub mod resolve;

pub use errors::{CodegenError, CodegenResult};
pub use registry::StructRegistry;
pub use resolve::{project_fields, resolve_message, ResolvedField, ResolvedMessage, ResolvedStruct};
