/* Version resolution
 *
 * `project_fields` is the one rule for which fields exist in a struct at a
 * given version. Code generation and fixture materialization both call it.
 */

use crate::registry::StructRegistry;
use msgdef_types::{FieldSpec, FieldType, MessageSpec, MessageType, SchemaError, StructSpec};
use std::collections::HashSet;

/// Fields of `spec` present at `version`, in declaration order.
pub fn project_fields(spec: &StructSpec, version: i16) -> Vec<&FieldSpec> {
  spec
    .fields
    .iter()
    .filter(|field| field.versions.contains(version))
    .collect()
}

/// Reject messages without a finite version range and versions outside it.
pub fn check_version(spec: &MessageSpec, version: i16) -> Result<(), SchemaError> {
  if spec.valid_versions.is_open_ended() {
    return Err(SchemaError::OpenEndedVersions {
      message: spec.name.clone(),
      range: spec.valid_versions.to_string(),
    });
  }
  if !spec.valid_versions.contains(version) {
    return Err(SchemaError::UnsupportedVersion {
      message: spec.name.clone(),
      version,
      valid: spec.valid_versions.to_string(),
    });
  }
  Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
  pub name: String,
  pub field_type: FieldType,
  pub tagged: bool,
  pub tag: Option<i32>,
  pub nullable: bool,
  pub default: Option<String>,
  pub about: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStruct {
  pub name: String,
  pub fields: Vec<ResolvedField>,
  pub is_top_level: bool,
  pub is_common: bool,
  /* True at flexible versions */
  pub has_unknown_tagged_fields: bool,
}

/// Every struct declaration one (message, version) unit needs, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMessage {
  pub name: String,
  pub message_type: MessageType,
  pub version: i16,
  pub structs: Vec<ResolvedStruct>,
}

impl ResolvedMessage {
  pub fn top_level(&self) -> Option<&ResolvedStruct> {
    self.structs.iter().find(|s| s.is_top_level)
  }
}

fn resolve_struct(
  spec: &StructSpec,
  version: i16,
  flexible: bool,
  is_top_level: bool,
  is_common: bool,
) -> ResolvedStruct {
  let fields = project_fields(spec, version)
    .into_iter()
    .map(|field| ResolvedField {
      name: field.name.clone(),
      field_type: field.field_type.clone(),
      tagged: field.is_tagged_at(version),
      tag: field.tag,
      nullable: field.is_nullable_at(version),
      default: field.default.clone(),
      about: field.about.clone(),
    })
    .collect();
  ResolvedStruct {
    name: spec.name.clone(),
    fields,
    is_top_level,
    is_common,
    has_unknown_tagged_fields: flexible,
  }
}

struct Walk<'a> {
  registry: &'a StructRegistry,
  version: i16,
  flexible: bool,
  emitted: HashSet<String>,
  structs: Vec<ResolvedStruct>,
}

impl<'a> Walk<'a> {
  /* Pre-order: a nested struct is placed before its own children */
  fn nested(&mut self, parent: &StructSpec) -> Result<(), SchemaError> {
    for field in project_fields(parent, self.version) {
      if field.field_type.struct_name().is_none() {
        continue;
      }
      let child = self.registry.find_struct(field)?;
      if self.registry.is_common(&child.name) || !self.emitted.insert(child.name.clone()) {
        continue;
      }
      self
        .structs
        .push(resolve_struct(child, self.version, self.flexible, false, false));
      self.nested(child)?;
    }
    Ok(())
  }
}

/// Resolve `spec` at `version`: the top-level struct, then message-specific
/// nested structs depth-first, then each common struct once.
pub fn resolve_message(
  spec: &MessageSpec,
  registry: &StructRegistry,
  version: i16,
) -> Result<ResolvedMessage, SchemaError> {
  check_version(spec, version)?;
  let flexible = spec.flexible_versions.contains(version);

  let mut walk = Walk {
    registry,
    version,
    flexible,
    emitted: HashSet::from([spec.struct_spec.name.clone()]),
    structs: vec![resolve_struct(&spec.struct_spec, version, flexible, true, false)],
  };
  walk.nested(&spec.struct_spec)?;

  for common in registry.common_structs() {
    if !walk.emitted.insert(common.name.clone()) {
      continue;
    }
    walk
      .structs
      .push(resolve_struct(common, version, flexible, false, true));
    walk.nested(common)?;
  }

  Ok(ResolvedMessage {
    name: spec.name.clone(),
    message_type: spec.message_type,
    version,
    structs: walk.structs,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use msgdef_types::load_message_spec;

  fn foo_request() -> MessageSpec {
    load_message_spec(
      r#"{ "name": "FooRequest", "type": "request", "validVersions": "0-2", "flexibleVersions": "2+",
           "fields": [
             { "name": "bar", "type": "int32", "versions": "0+" },
             { "name": "baz", "type": "int32", "versions": "1+", "taggedVersions": "2+", "tag": 0 } ] }"#,
    )
    .unwrap()
  }

  fn names(fields: &[&FieldSpec]) -> Vec<String> {
    fields.iter().map(|f| f.name.clone()).collect()
  }

  #[test]
  fn projection_keeps_declaration_order() {
    let spec = foo_request();
    assert_eq!(names(&project_fields(&spec.struct_spec, 0)), vec!["bar"]);
    assert_eq!(names(&project_fields(&spec.struct_spec, 1)), vec!["bar", "baz"]);
    assert_eq!(names(&project_fields(&spec.struct_spec, 2)), vec!["bar", "baz"]);
  }

  #[test]
  fn versions_outside_the_range_are_rejected() {
    let spec = foo_request();
    assert!(check_version(&spec, 2).is_ok());
    assert!(matches!(
      check_version(&spec, 3),
      Err(SchemaError::UnsupportedVersion { version: 3, .. })
    ));
  }

  #[test]
  fn tagged_and_flexible_flags_follow_the_version() {
    let spec = foo_request();
    let registry = StructRegistry::for_message(&spec).unwrap();

    let v1 = resolve_message(&spec, &registry, 1).unwrap();
    let top = v1.top_level().unwrap();
    assert!(!top.has_unknown_tagged_fields);
    assert!(!top.fields[1].tagged);

    let v2 = resolve_message(&spec, &registry, 2).unwrap();
    let top = v2.top_level().unwrap();
    assert!(top.has_unknown_tagged_fields);
    assert!(top.fields[1].tagged);
    assert_eq!(top.fields[1].tag, Some(0));
  }

  #[test]
  fn nested_structs_precede_common_structs() {
    let spec = load_message_spec(
      r#"{ "name": "Outer", "validVersions": "0-1", "fields": [
           { "name": "First", "type": "Addr", "versions": "0+", "fields": [
             { "name": "Host", "type": "string", "versions": "0+" } ] },
           { "name": "Items", "type": "[]Item", "versions": "0+", "fields": [
             { "name": "Detail", "type": "Detail", "versions": "0+", "fields": [
               { "name": "Note", "type": "string", "versions": "0+" } ] },
             { "name": "Where", "type": "Addr", "versions": "1+", "fields": [
               { "name": "Host", "type": "string", "versions": "0+" } ] } ] },
           { "name": "Tail", "type": "Tail", "versions": "1+", "fields": [
             { "name": "Z", "type": "int8", "versions": "1+" } ] } ] }"#,
    )
    .unwrap();
    let registry = StructRegistry::for_message(&spec).unwrap();

    let order = |version| -> Vec<String> {
      resolve_message(&spec, &registry, version)
        .unwrap()
        .structs
        .into_iter()
        .map(|s| s.name)
        .collect()
    };
    assert_eq!(order(0), vec!["Outer", "Item", "Detail", "Addr"]);
    assert_eq!(order(1), vec!["Outer", "Item", "Detail", "Tail", "Addr"]);
  }
}
