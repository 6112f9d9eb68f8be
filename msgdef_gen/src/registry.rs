/* Struct registry
 *
 * Collects every struct reachable from a message and decides which of them
 * are shared. A struct type seen from a second call site is promoted to the
 * common set; promoted structs are emitted once per unit and referenced by
 * name everywhere else. One registry is built per message type.
 */

use indexmap::{IndexMap, IndexSet};
use msgdef_types::{FieldSpec, MessageSpec, SchemaError, StructSpec};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/* A place a struct type is referenced from: (message, parent struct, field) */
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CallSite {
  message: String,
  parent: String,
  field: String,
}

#[derive(Debug, Default)]
pub struct StructRegistry {
  structs: IndexMap<String, StructSpec>,
  first_sites: HashMap<String, CallSite>,
  visited: HashSet<CallSite>,
  common: IndexSet<String>,
}

impl StructRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /* Build a registry holding a single message */
  pub fn for_message(spec: &MessageSpec) -> Result<Self, SchemaError> {
    let mut registry = Self::new();
    registry.register(spec)?;
    Ok(registry)
  }

  /// Walk the struct tree of `spec` depth-first and record every struct it
  /// references. Registering the same message again changes nothing.
  pub fn register(&mut self, spec: &MessageSpec) -> Result<(), SchemaError> {
    /* Declared common structs are shared from the start */
    for common in &spec.common_structs {
      self.define(common)?;
      if self.common.insert(common.name.clone()) {
        debug!("seeded common struct {}", common.name);
      }
    }
    for common in &spec.common_structs {
      self.walk(&spec.name, common)?;
    }
    self.walk(&spec.name, &spec.struct_spec)
  }

  fn walk(&mut self, message: &str, parent: &StructSpec) -> Result<(), SchemaError> {
    for field in &parent.fields {
      let Some(type_name) = field.field_type.struct_name() else {
        continue;
      };
      let site = CallSite {
        message: message.to_string(),
        parent: parent.name.clone(),
        field: field.name.clone(),
      };
      if !self.visited.insert(site.clone()) {
        continue;
      }

      if let Some(inline) = &field.inline_struct {
        self.define(inline)?;
      }

      if !self.common.contains(type_name) {
        match self.first_sites.get(type_name) {
          None => {
            self.first_sites.insert(type_name.to_string(), site);
          }
          Some(first) if *first != site => {
            debug!(
              "promoting struct {} to common (first seen at {}.{}, again at {}.{})",
              type_name, first.parent, first.field, site.parent, site.field
            );
            self.common.insert(type_name.to_string());
          }
          Some(_) => {}
        }
      }

      if let Some(inline) = &field.inline_struct {
        self.walk(message, inline)?;
      }
    }
    Ok(())
  }

  fn define(&mut self, spec: &StructSpec) -> Result<(), SchemaError> {
    match self.structs.get(&spec.name) {
      Some(existing) if !existing.same_shape(spec) => Err(SchemaError::ConflictingStruct {
        name: spec.name.clone(),
      }),
      Some(_) => Ok(()),
      None => {
        self.structs.insert(spec.name.clone(), spec.clone());
        Ok(())
      }
    }
  }

  /// Definition of the struct a struct-typed (or array-of-struct) field refers to.
  pub fn find_struct(&self, field: &FieldSpec) -> Result<&StructSpec, SchemaError> {
    let type_name = field
      .field_type
      .struct_name()
      .ok_or_else(|| SchemaError::NotAStruct {
        field: field.name.clone(),
        field_type: field.field_type.to_string(),
      })?;
    self
      .structs
      .get(type_name)
      .ok_or_else(|| SchemaError::UnresolvedType {
        field: field.name.clone(),
        type_name: type_name.to_string(),
      })
  }

  pub fn common_struct_names(&self) -> BTreeSet<&str> {
    self.common.iter().map(String::as_str).collect()
  }

  /// Common structs in first-promotion order.
  pub fn common_structs(&self) -> impl Iterator<Item = &StructSpec> + '_ {
    self.common.iter().filter_map(|name| self.structs.get(name))
  }

  pub fn is_common(&self, name: &str) -> bool {
    self.common.contains(name)
  }
}
