/* Rust backend
 *
 * Emits serde-derived plain structs. Struct and marker imports go through the
 * unit's ImportAggregator so every file carries one sorted import block.
 */

use super::Backend;
use crate::errors::{CodegenError, CodegenResult};
use crate::imports::ImportAggregator;
use crate::resolve::{ResolvedField, ResolvedMessage, ResolvedStruct};
use msgdef_types::naming::to_snake_case;
use msgdef_types::{FieldType, MessageType};

const DERIVES: &str = "Serialize, Deserialize, Debug, Clone, PartialEq, Default";
const UNKNOWN_TAGGED_FIELDS: &str = "_unknown_tagged_fields";

pub struct RustBackend {
  options: RustBackendOptions,
}

pub struct RustBackendOptions {
  pub emit_test_scaffold: bool,
}

impl Default for RustBackendOptions {
  fn default() -> Self {
    Self {
      emit_test_scaffold: true,
    }
  }
}

impl Default for RustBackend {
  fn default() -> Self {
    Self::new(RustBackendOptions::default())
  }
}

impl RustBackend {
  pub fn new(options: RustBackendOptions) -> Self {
    Self { options }
  }
}

pub fn escape_rust_keyword(name: &str) -> String {
  const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "static", "struct",
    "trait", "true", "type", "unsafe", "use", "where", "while",
    "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
  ];
  /* Path keywords cannot be raw identifiers */
  const PATH_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

  if RUST_KEYWORDS.contains(&name) {
    format!("r#{}", name)
  } else if PATH_KEYWORDS.contains(&name) {
    format!("{}_", name)
  } else {
    name.to_string()
  }
}

/* Rust identifier for a schema field name */
pub fn rust_field_name(name: &str) -> String {
  escape_rust_keyword(&to_snake_case(name))
}

/* Rust type for a field kind plus the import it needs, None if unrenderable */
pub fn rust_type(field_type: &FieldType) -> Option<(String, Option<&'static str>)> {
  let plain = |ty: &str| -> Option<(String, Option<&'static str>)> { Some((ty.to_string(), None)) };
  match field_type {
    FieldType::Bool => plain("bool"),
    FieldType::Int8 => plain("i8"),
    FieldType::Int16 => plain("i16"),
    FieldType::Uint16 => plain("u16"),
    FieldType::Int32 => plain("i32"),
    FieldType::Uint32 => plain("u32"),
    FieldType::Int64 => plain("i64"),
    FieldType::Float64 => plain("f64"),
    FieldType::String => plain("String"),
    FieldType::Bytes | FieldType::Records => plain("Vec<u8>"),
    FieldType::Uuid => Some(("Uuid".to_string(), Some("uuid::Uuid"))),
    FieldType::Struct(name) => plain(name.as_str()),
    FieldType::Array(element) => {
      let (inner, import) = rust_type(element)?;
      Some((format!("Vec<{}>", inner), import))
    }
    FieldType::Unsupported(_) => None,
  }
}

fn marker_trait(message_type: MessageType) -> &'static str {
  match message_type {
    MessageType::Request => "Request",
    MessageType::Response => "Response",
    MessageType::Header => "Header",
    MessageType::Data | MessageType::Metadata => "Data",
  }
}

impl RustBackend {
  fn emit_field(
    &self,
    message: &ResolvedMessage,
    field: &ResolvedField,
    imports: &mut ImportAggregator,
    out: &mut String,
  ) -> CodegenResult<()> {
    let (ty, import) = rust_type(&field.field_type).ok_or_else(|| CodegenError::UnsupportedType {
      backend: self.name(),
      message: message.name.clone(),
      version: message.version,
      field: field.name.clone(),
      kind: field.field_type.to_string(),
    })?;
    if let Some(import) = import {
      imports.add(import)?;
    }
    let ty = if field.nullable { format!("Option<{}>", ty) } else { ty };

    if let Some(about) = &field.about {
      for line in about.lines() {
        out.push_str(&format!("    /// {}\n", line.trim_end()));
      }
    }
    if field.tagged {
      if let Some(tag) = field.tag {
        out.push_str(&format!("    // tag {}\n", tag));
      }
      out.push_str("    #[serde(default)]\n");
    }
    out.push_str(&format!("    pub {}: {},\n", rust_field_name(&field.name), ty));
    Ok(())
  }
}

impl Backend for RustBackend {
  fn name(&self) -> &'static str {
    "rust"
  }

  fn file_extension(&self) -> &'static str {
    "rs"
  }

  fn emit_struct(
    &self,
    message: &ResolvedMessage,
    resolved: &ResolvedStruct,
    imports: &mut ImportAggregator,
  ) -> CodegenResult<String> {
    imports.add("serde::Serialize")?;
    imports.add("serde::Deserialize")?;

    let mut out = String::new();
    out.push_str(&format!("#[derive({})]\n", DERIVES));
    out.push_str(&format!("pub struct {} {{\n", resolved.name));
    for field in &resolved.fields {
      self.emit_field(message, field, imports, &mut out)?;
    }
    if resolved.has_unknown_tagged_fields {
      imports.add("crate::tagged_fields::RawTaggedField")?;
      out.push_str("    #[serde(default)]\n");
      out.push_str(&format!("    pub {}: Vec<RawTaggedField>,\n", UNKNOWN_TAGGED_FIELDS));
    }
    out.push_str("}\n");

    if resolved.is_top_level {
      let marker = marker_trait(message.message_type);
      imports.add("crate::markers::ApiMessage")?;
      imports.add(&format!("crate::markers::{}", marker))?;
      out.push('\n');
      out.push_str(&format!("impl ApiMessage for {} {{}}\n", resolved.name));
      out.push('\n');
      out.push_str(&format!("impl {} for {} {{}}\n", marker, resolved.name));
    }
    Ok(out)
  }

  fn emit_test_scaffold(&self, message: &ResolvedMessage) -> String {
    if !self.options.emit_test_scaffold {
      return String::new();
    }
    let Some(top) = message.top_level() else {
      return String::new();
    };
    let mut out = String::new();
    out.push_str("#[cfg(test)]\n");
    out.push_str("mod tests {\n");
    out.push_str("    use super::*;\n");
    out.push('\n');
    out.push_str("    #[test]\n");
    out.push_str("    fn default_is_constructible() {\n");
    out.push_str(&format!("        let _ = {}::default();\n", top.name));
    out.push_str("    }\n");
    out.push_str("}\n");
    out
  }

  fn manifest_file_name(&self) -> &'static str {
    "mod.rs"
  }

  fn emit_manifest(&self, modules: &[String]) -> String {
    modules
      .iter()
      .map(|module| format!("pub mod {};\n", escape_rust_keyword(module)))
      .collect()
  }
}
