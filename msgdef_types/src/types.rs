use crate::version::VersionRange;
use serde_derive::Deserialize;
use std::fmt;

/// Role of a message in the protocol; selects the marker trait emitted for it.
#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Request,
    Response,
    Header,
    #[default]
    Data,
    Metadata,
}

/// Declared data kind of a field.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum FieldType {
    Bool,
    Int8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Float64,
    String,
    Bytes,
    Uuid,
    /// Opaque record batch payload.
    Records,
    Struct(String),
    Array(Box<FieldType>),
    /// A type string none of the consumers understand. Kept so the failure
    /// surfaces only where a field of this type is actually used.
    Unsupported(String),
}

const ARRAY_PREFIX: &str = "[]";
const ARRAY_SUFFIX: &str = "[]";

impl FieldType {
    /// Parse the `type` attribute of a schema field.
    pub fn parse(text: &str) -> FieldType {
        let text = text.trim();
        let element = text
            .strip_prefix(ARRAY_PREFIX)
            .or_else(|| text.strip_suffix(ARRAY_SUFFIX));
        if let Some(element) = element {
            return match FieldType::parse(element) {
                FieldType::Array(_) | FieldType::Unsupported(_) => {
                    FieldType::Unsupported(text.to_string())
                }
                element => FieldType::Array(Box::new(element)),
            };
        }
        match text {
            "bool" => FieldType::Bool,
            "int8" => FieldType::Int8,
            "int16" => FieldType::Int16,
            "uint16" => FieldType::Uint16,
            "int32" => FieldType::Int32,
            "uint32" => FieldType::Uint32,
            "int64" => FieldType::Int64,
            "float64" => FieldType::Float64,
            "string" => FieldType::String,
            "bytes" => FieldType::Bytes,
            "uuid" => FieldType::Uuid,
            "records" => FieldType::Records,
            other if other.starts_with(|c: char| c.is_ascii_uppercase()) => {
                FieldType::Struct(other.to_string())
            }
            other => FieldType::Unsupported(other.to_string()),
        }
    }

    /// Non-array value kinds that have no null representation.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            FieldType::Bool
                | FieldType::Int8
                | FieldType::Int16
                | FieldType::Uint16
                | FieldType::Int32
                | FieldType::Uint32
                | FieldType::Int64
                | FieldType::Float64
        )
    }

    /// Name of the struct this type refers to, directly or as array element.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            FieldType::Struct(name) => Some(name),
            FieldType::Array(element) => element.struct_name(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "bool"),
            FieldType::Int8 => write!(f, "int8"),
            FieldType::Int16 => write!(f, "int16"),
            FieldType::Uint16 => write!(f, "uint16"),
            FieldType::Int32 => write!(f, "int32"),
            FieldType::Uint32 => write!(f, "uint32"),
            FieldType::Int64 => write!(f, "int64"),
            FieldType::Float64 => write!(f, "float64"),
            FieldType::String => write!(f, "string"),
            FieldType::Bytes => write!(f, "bytes"),
            FieldType::Uuid => write!(f, "uuid"),
            FieldType::Records => write!(f, "records"),
            FieldType::Struct(name) => write!(f, "{}", name),
            FieldType::Array(element) => write!(f, "[]{}", element),
            FieldType::Unsupported(raw) => write!(f, "{}", raw),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    /// Already clamped to the enclosing struct's versions.
    pub versions: VersionRange,
    pub tagged_versions: Option<VersionRange>,
    pub tag: Option<i32>,
    pub nullable_versions: VersionRange,
    /// Declared default, in its textual schema form.
    pub default: Option<String>,
    pub about: Option<String>,
    /// Inline definition of the struct this field refers to, if the field declares one.
    pub inline_struct: Option<StructSpec>,
}

impl FieldSpec {
    pub fn is_tagged_at(&self, version: i16) -> bool {
        self.tagged_versions
            .map(|tagged| tagged.contains(version))
            .unwrap_or(false)
    }

    pub fn is_nullable_at(&self, version: i16) -> bool {
        self.nullable_versions.contains(version)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct StructSpec {
    pub name: String,
    pub versions: VersionRange,
    pub fields: Vec<FieldSpec>,
}

impl StructSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Same field names and types in the same order.
    pub fn same_shape(&self, other: &StructSpec) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.name == b.name && a.field_type == b.field_type)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct MessageSpec {
    pub name: String,
    pub api_key: Option<i16>,
    pub message_type: MessageType,
    pub valid_versions: VersionRange,
    pub flexible_versions: VersionRange,
    /// Top-level struct; named after the message.
    pub struct_spec: StructSpec,
    /// Structs declared once at the document level and shared by name.
    pub common_structs: Vec<StructSpec>,
}

impl MessageSpec {
    /// Display name with a generic `Data` suffix removed.
    pub fn display_name(&self) -> &str {
        match self.name.strip_suffix("Data") {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => &self.name,
        }
    }

    /// Name of the output module for this message type.
    pub fn module_name(&self) -> String {
        crate::naming::to_snake_case(self.display_name())
    }
}
