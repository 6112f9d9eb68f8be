/* Schema walker
 *
 * A SchemaNode is a position in a message's struct tree: either the root
 * struct or one declared field, with the struct it refers to resolved
 * through the shared registry.
 */

use crate::errors::{ReflectError, ReflectResult};
use msgdef_gen::StructRegistry;
use msgdef_types::{FieldSpec, FieldType, MessageSpec, StructSpec};

/// Fallback spellings for fields whose declared name does not follow the
/// PascalCase convention. Consulted only after a direct lookup fails.
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("TimeoutMs", "timeoutMs"),
    ("ValidateOnly", "validateOnly"),
    ("MemberAssignment", "memberAssignment"),
    ("GroupId", "groupId"),
    ("IsKRaftController", "isKRaftController"),
];

pub fn field_alias(name: &str) -> Option<&'static str> {
    FIELD_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    registry: &'a StructRegistry,
    field: Option<&'a FieldSpec>,
    struct_spec: Option<&'a StructSpec>,
}

impl<'a> SchemaNode<'a> {
    /// Node for the top-level struct of a message.
    pub fn root(spec: &'a MessageSpec, registry: &'a StructRegistry) -> Self {
        Self {
            registry,
            field: None,
            struct_spec: Some(&spec.struct_spec),
        }
    }

    /// Node for one field; struct-typed fields get their struct resolved.
    pub fn for_field(registry: &'a StructRegistry, field: &'a FieldSpec) -> ReflectResult<Self> {
        let struct_spec = match field.field_type.struct_name() {
            Some(_) => Some(registry.find_struct(field)?),
            None => None,
        };
        Ok(Self {
            registry,
            field: Some(field),
            struct_spec,
        })
    }

    pub fn registry(&self) -> &'a StructRegistry {
        self.registry
    }

    pub fn field(&self) -> Option<&'a FieldSpec> {
        self.field
    }

    pub fn struct_spec(&self) -> Option<&'a StructSpec> {
        self.struct_spec
    }

    /// Element kind when this node is an array field.
    pub fn element(&self) -> Option<&'a FieldType> {
        match self.field.map(|field| &field.field_type) {
            Some(FieldType::Array(element)) => Some(element.as_ref()),
            _ => None,
        }
    }

    /// Name used in diagnostics: the field name, or the struct name at the root.
    pub fn name(&self) -> &'a str {
        match (self.field, self.struct_spec) {
            (Some(field), _) => &field.name,
            (None, Some(spec)) => &spec.name,
            (None, None) => "",
        }
    }

    pub fn is_tagged_at(&self, version: i16) -> bool {
        self.field.is_some_and(|field| field.is_tagged_at(version))
    }

    fn lookup(&self, name: &str) -> Option<&'a FieldSpec> {
        self.struct_spec.and_then(|spec| spec.field(name))
    }

    /// Declared field identifiers of this node's struct, in order.
    pub fn known_field_names(&self) -> Vec<&'a str> {
        self.struct_spec
            .map(|spec| spec.fields.iter().map(|field| field.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Child node for a canonical field name.
    pub fn field_schema(&self, canonical: &str) -> ReflectResult<SchemaNode<'a>> {
        let field = self
            .lookup(canonical)
            .or_else(|| field_alias(canonical).and_then(|alias| self.lookup(alias)))
            .ok_or_else(|| ReflectError::FieldNotFound {
                field: canonical.to_string(),
                struct_name: self
                    .struct_spec
                    .map(|spec| spec.name.clone())
                    .unwrap_or_else(|| self.name().to_string()),
            })?;
        SchemaNode::for_field(self.registry, field)
    }
}
