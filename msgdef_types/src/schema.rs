/* Schema document loading
 *
 * Turns one JSON schema document (line comments allowed) into a validated
 * MessageSpec. All structural invariants of the IR are checked here so the
 * generator and the materializer can rely on them.
 */

use crate::errors::SchemaError;
use crate::types::{FieldSpec, FieldType, MessageSpec, MessageType, StructSpec};
use crate::version::VersionRange;
use serde_derive::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    name: Option<String>,
    api_key: Option<i16>,
    #[serde(rename = "type", default)]
    message_type: MessageType,
    valid_versions: Option<String>,
    flexible_versions: Option<String>,
    fields: Option<Vec<RawField>>,
    #[serde(default)]
    common_structs: Vec<RawStruct>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawStruct {
    name: Option<String>,
    versions: Option<String>,
    fields: Option<Vec<RawField>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawField {
    name: Option<String>,
    #[serde(rename = "type")]
    field_type: Option<String>,
    versions: Option<String>,
    tagged_versions: Option<String>,
    tag: Option<i32>,
    nullable_versions: Option<String>,
    default: Option<serde_json::Value>,
    about: Option<String>,
    fields: Option<Vec<RawField>>,
}

/// Parse and validate a schema document.
pub fn load_message_spec(text: &str) -> Result<MessageSpec, SchemaError> {
    let stripped = strip_comments(text);
    let raw: RawMessage = serde_json::from_str(&stripped)?;
    build_message(raw)
}

/// Read, parse and validate a schema file.
pub fn load_message_spec_file(path: &Path) -> Result<MessageSpec, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_message_spec(&text)
}

/// Remove `//` line comments outside of string literals.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                /* Skip to end of line, keep the newline so line numbers in errors stay right */
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn build_message(raw: RawMessage) -> Result<MessageSpec, SchemaError> {
    let name = raw.name.ok_or_else(|| SchemaError::MissingAttribute {
        context: "message".to_string(),
        attribute: "name",
    })?;
    let context = format!("message {}", name);

    let valid_text = raw
        .valid_versions
        .ok_or_else(|| SchemaError::MissingAttribute {
            context: context.clone(),
            attribute: "validVersions",
        })?;
    let valid_versions = parse_range(&valid_text, &context)?;
    if valid_versions.is_open_ended() {
        return Err(SchemaError::OpenEndedVersions {
            message: name,
            range: valid_text,
        });
    }
    if valid_versions.is_empty() {
        return Err(SchemaError::InvalidAttribute {
            context,
            attribute: "validVersions",
            reason: "a message must support at least one version".to_string(),
        });
    }

    let flexible_versions = match raw.flexible_versions {
        Some(text) => parse_range(&text, &context)?,
        None => VersionRange::none(),
    };

    let raw_fields = raw.fields.ok_or_else(|| SchemaError::MissingAttribute {
        context: context.clone(),
        attribute: "fields",
    })?;
    let fields = build_fields(raw_fields, &name, valid_versions)?;

    let mut common_structs = Vec::with_capacity(raw.common_structs.len());
    for raw_struct in raw.common_structs {
        common_structs.push(build_common_struct(raw_struct, &context)?);
    }

    Ok(MessageSpec {
        api_key: raw.api_key,
        message_type: raw.message_type,
        valid_versions,
        flexible_versions,
        struct_spec: StructSpec {
            name: name.clone(),
            versions: valid_versions,
            fields,
        },
        common_structs,
        name,
    })
}

fn build_common_struct(raw: RawStruct, context: &str) -> Result<StructSpec, SchemaError> {
    let name = raw.name.ok_or_else(|| SchemaError::MissingAttribute {
        context: format!("{}: common struct", context),
        attribute: "name",
    })?;
    let struct_context = format!("common struct {}", name);
    let versions_text = raw
        .versions
        .ok_or_else(|| SchemaError::MissingAttribute {
            context: struct_context.clone(),
            attribute: "versions",
        })?;
    let versions = parse_range(&versions_text, &struct_context)?;
    let raw_fields = raw.fields.ok_or_else(|| SchemaError::MissingAttribute {
        context: struct_context,
        attribute: "fields",
    })?;
    let fields = build_fields(raw_fields, &name, versions)?;
    Ok(StructSpec {
        name,
        versions,
        fields,
    })
}

fn build_fields(
    raw_fields: Vec<RawField>,
    struct_name: &str,
    struct_versions: VersionRange,
) -> Result<Vec<FieldSpec>, SchemaError> {
    let context = format!("struct {}", struct_name);
    let mut names = HashSet::new();
    let mut tags = HashSet::new();
    let mut fields = Vec::with_capacity(raw_fields.len());

    for raw in raw_fields {
        let field = build_field(raw, &context, struct_versions)?;
        if !names.insert(field.name.clone()) {
            return Err(SchemaError::DuplicateField {
                context,
                field: field.name,
            });
        }
        if let Some(tag) = field.tag {
            if !tags.insert(tag) {
                return Err(SchemaError::DuplicateTag { context, tag });
            }
        }
        fields.push(field);
    }
    Ok(fields)
}

fn build_field(
    raw: RawField,
    context: &str,
    struct_versions: VersionRange,
) -> Result<FieldSpec, SchemaError> {
    let name = raw.name.ok_or_else(|| SchemaError::MissingAttribute {
        context: format!("{}: field", context),
        attribute: "name",
    })?;
    let field_context = format!("{}.{}", context, name);

    let type_text = raw
        .field_type
        .ok_or_else(|| SchemaError::MissingAttribute {
            context: field_context.clone(),
            attribute: "type",
        })?;
    let field_type = FieldType::parse(&type_text);

    let versions_text = raw
        .versions
        .ok_or_else(|| SchemaError::MissingAttribute {
            context: field_context.clone(),
            attribute: "versions",
        })?;
    let declared = parse_range(&versions_text, &field_context)?;
    let versions = declared.intersect(&struct_versions);
    if !declared.is_empty() && versions.is_empty() {
        return Err(SchemaError::FieldOutsideStruct {
            context: context.to_string(),
            field: name,
            versions: declared.to_string(),
            struct_versions: struct_versions.to_string(),
        });
    }

    let tagged_versions = match raw.tagged_versions {
        Some(text) => {
            let tagged = parse_range(&text, &field_context)?;
            if tagged.is_empty() || tagged.lowest() < declared.lowest() {
                return Err(SchemaError::InvalidTaggedVersions {
                    context: context.to_string(),
                    field: name,
                    reason: format!(
                        "taggedVersions {} must start at or after versions {}",
                        tagged, declared
                    ),
                });
            }
            if !tagged.is_subset_of(&declared) {
                return Err(SchemaError::InvalidTaggedVersions {
                    context: context.to_string(),
                    field: name,
                    reason: format!("taggedVersions {} is not within versions {}", tagged, declared),
                });
            }
            Some(tagged.intersect(&versions))
        }
        None => None,
    };
    match (tagged_versions.is_some(), raw.tag) {
        (true, None) => {
            return Err(SchemaError::InvalidTaggedVersions {
                context: context.to_string(),
                field: name,
                reason: "tagged fields must declare a tag".to_string(),
            })
        }
        (false, Some(tag)) => {
            return Err(SchemaError::InvalidTaggedVersions {
                context: context.to_string(),
                field: name,
                reason: format!("tag {} given without taggedVersions", tag),
            })
        }
        (_, Some(tag)) if tag < 0 => {
            return Err(SchemaError::InvalidTaggedVersions {
                context: context.to_string(),
                field: name,
                reason: format!("tag {} is negative", tag),
            })
        }
        _ => {}
    }

    let nullable_versions = match raw.nullable_versions {
        Some(text) => parse_range(&text, &field_context)?,
        None => VersionRange::none(),
    };

    let default = raw.default.map(|value| match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });

    let inline_struct = match (raw.fields, field_type.struct_name()) {
        (Some(raw_children), Some(struct_name)) => {
            let children = build_fields(raw_children, struct_name, versions)?;
            Some(StructSpec {
                name: struct_name.to_string(),
                versions,
                fields: children,
            })
        }
        (Some(_), None) => {
            return Err(SchemaError::InvalidAttribute {
                context: field_context,
                attribute: "fields",
                reason: format!("type '{}' cannot declare nested fields", type_text),
            })
        }
        (None, _) => None,
    };

    Ok(FieldSpec {
        name,
        field_type,
        versions,
        tagged_versions,
        tag: raw.tag,
        nullable_versions,
        default,
        about: raw.about,
        inline_struct,
    })
}

fn parse_range(text: &str, context: &str) -> Result<VersionRange, SchemaError> {
    text.parse().map_err(|source| SchemaError::VersionRange {
        context: context.to_string(),
        source,
    })
}
