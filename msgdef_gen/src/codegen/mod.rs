pub mod rust;

use crate::errors::CodegenResult;
use crate::imports::ImportAggregator;
use crate::registry::StructRegistry;
use crate::resolve::{resolve_message, ResolvedMessage, ResolvedStruct};
use msgdef_types::MessageSpec;

/// A target language. Backends only render resolved views; which fields and
/// structs exist at a version is decided before they are called.
pub trait Backend {
  fn name(&self) -> &'static str;

  fn file_extension(&self) -> &'static str;

  /* Render one struct declaration, registering the imports it needs */
  fn emit_struct(
    &self,
    message: &ResolvedMessage,
    resolved: &ResolvedStruct,
    imports: &mut ImportAggregator,
  ) -> CodegenResult<String>;

  fn emit_imports(&self, imports: &ImportAggregator) -> String {
    imports.generate()
  }

  fn emit_test_scaffold(&self, _message: &ResolvedMessage) -> String {
    String::new()
  }

  fn unit_file_name(&self, version: i16) -> String {
    format!("v{}.{}", version, self.file_extension())
  }

  /* File listing the modules of a directory */
  fn manifest_file_name(&self) -> &'static str;

  fn emit_manifest(&self, modules: &[String]) -> String;
}

/// Produce the full text of one (message, version) unit: imports, struct
/// declarations in resolution order, then the test scaffold.
pub fn generate_unit(
  backend: &dyn Backend,
  spec: &MessageSpec,
  registry: &StructRegistry,
  version: i16,
) -> CodegenResult<String> {
  let resolved = resolve_message(spec, registry, version)?;

  let mut imports = ImportAggregator::new();
  let mut declarations = Vec::with_capacity(resolved.structs.len());
  for resolved_struct in &resolved.structs {
    declarations.push(backend.emit_struct(&resolved, resolved_struct, &mut imports)?);
  }

  let mut parts = Vec::with_capacity(declarations.len() + 2);
  let header = backend.emit_imports(&imports);
  if !header.is_empty() {
    parts.push(header);
  }
  parts.extend(declarations);
  let scaffold = backend.emit_test_scaffold(&resolved);
  if !scaffold.is_empty() {
    parts.push(scaffold);
  }

  Ok(parts.join("\n"))
}
