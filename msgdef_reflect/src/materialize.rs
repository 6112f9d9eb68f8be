/* Tagged-field-aware materializer
 *
 * Builds an Instance from a JSON fixture for one message version. Instances
 * start out holding every field of the version projection at its default,
 * then fixture properties overwrite them one by one.
 *
 * Null policy: a null for a bool/integer/float field is only accepted when
 * the field is tagged at the target version (it keeps its default). Null
 * UUIDs keep the default nil UUID. Every other kind takes null as absent.
 */

use crate::collection::CollectionBuilder;
use crate::errors::{ReflectError, ReflectResult};
use crate::naming::normalize;
use crate::schema::SchemaNode;
use crate::value::{Instance, RawTaggedField, Value, UNKNOWN_TAGGED_FIELDS};
use msgdef_gen::resolve::{check_version, project_fields};
use msgdef_gen::StructRegistry;
use msgdef_types::{FieldSpec, FieldType, MessageSpec, SchemaError, StructSpec};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

pub struct Materializer<'a> {
    spec: &'a MessageSpec,
    registry: &'a StructRegistry,
    version: i16,
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Parse the reserved `_unknown_tagged_fields` entry: an array of
/// `[tag, "hex"]` pairs or `{"tag": .., "data": "hex"}` objects.
pub fn parse_unknown_tagged_fields(value: &JsonValue) -> Result<Vec<RawTaggedField>, SchemaError> {
    let malformed = |reason: String| SchemaError::MalformedTaggedFields { reason };
    let entries = value
        .as_array()
        .ok_or_else(|| malformed(format!("expected an array, found {}", json_kind(value))))?;

    let mut fields = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let (tag, data) = match entry {
            JsonValue::Array(pair) if pair.len() == 2 => (&pair[0], &pair[1]),
            JsonValue::Object(object) => match (object.get("tag"), object.get("data")) {
                (Some(tag), Some(data)) => (tag, data),
                _ => return Err(malformed(format!("entry {} needs 'tag' and 'data'", index))),
            },
            other => {
                return Err(malformed(format!(
                    "entry {} must be a [tag, data] pair, found {}",
                    index,
                    json_kind(other)
                )))
            }
        };
        let tag = tag
            .as_i64()
            .and_then(|tag| i32::try_from(tag).ok())
            .filter(|tag| *tag >= 0)
            .ok_or_else(|| malformed(format!("entry {} has invalid tag {}", index, tag)))?;
        let data = data
            .as_str()
            .ok_or_else(|| malformed(format!("entry {} data must be a hex string", index)))
            .and_then(|text| {
                hex::decode(text).map_err(|e| malformed(format!("entry {} data is not hex: {}", index, e)))
            })?;
        fields.push(RawTaggedField { tag, data });
    }
    Ok(fields)
}

impl<'a> Materializer<'a> {
    pub fn new(spec: &'a MessageSpec, registry: &'a StructRegistry, version: i16) -> ReflectResult<Self> {
        check_version(spec, version)?;
        Ok(Self {
            spec,
            registry,
            version,
        })
    }

    pub fn version(&self) -> i16 {
        self.version
    }

    pub fn root(&self) -> SchemaNode<'a> {
        SchemaNode::root(self.spec, self.registry)
    }

    pub(crate) fn value_error(&self, field: &str, reason: impl Into<String>) -> ReflectError {
        ReflectError::Value {
            message: self.spec.name.clone(),
            version: self.version,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn unsupported(&self, field: &str, kind: &FieldType) -> ReflectError {
        ReflectError::UnsupportedType {
            message: self.spec.name.clone(),
            version: self.version,
            field: field.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Materialize a whole fixture. The top level must be an object.
    pub fn materialize_root(&self, fixture: &JsonValue) -> ReflectResult<Instance> {
        if !fixture.is_object() {
            return Err(self.value_error(
                &self.spec.name,
                format!("top-level fixture must be an object, found {}", json_kind(fixture)),
            ));
        }
        let root = self.root();
        match self.materialize(&root, fixture)? {
            Some(instance) => Ok(instance),
            None => Err(self.value_error(&self.spec.name, "top-level fixture is null")),
        }
    }

    /// Materialize `json` against a struct node. `null` yields `None`.
    pub fn materialize(&self, node: &SchemaNode<'a>, json: &JsonValue) -> ReflectResult<Option<Instance>> {
        if json.is_null() {
            return Ok(None);
        }
        let struct_spec = node
            .struct_spec()
            .ok_or_else(|| self.value_error(node.name(), "not a struct-typed field"))?;
        let object = json.as_object().ok_or_else(|| {
            self.value_error(node.name(), format!("expected an object, found {}", json_kind(json)))
        })?;

        let mut instance = self.default_instance(struct_spec, &mut Vec::new())?;
        let known = node.known_field_names();

        for (key, value) in object {
            if key == UNKNOWN_TAGGED_FIELDS {
                let fields = parse_unknown_tagged_fields(value)?;
                debug!("{}: {} unknown tagged field(s)", struct_spec.name, fields.len());
                instance.unknown_tagged_fields.extend(fields);
                continue;
            }

            let canonical = normalize(key, &known)?;
            let child = node.field_schema(&canonical)?;
            let Some(field) = child.field() else {
                return Err(ReflectError::FieldNotFound {
                    field: canonical,
                    struct_name: struct_spec.name.clone(),
                });
            };
            if !field.versions.contains(self.version) {
                return Err(self.value_error(
                    &field.name,
                    format!("field is not present at this version (versions {})", field.versions),
                ));
            }

            trace!("{}.{} <- fixture key '{}'", struct_spec.name, field.name, key);
            if let Some(materialized) = self.dispatch(&child, field, value)? {
                instance.set(&field.name, materialized);
            }
        }
        Ok(Some(instance))
    }

    /* None leaves the pre-populated default in place */
    fn dispatch(&self, node: &SchemaNode<'a>, field: &FieldSpec, value: &JsonValue) -> ReflectResult<Option<Value>> {
        let kind = &field.field_type;
        if value.is_null() {
            if kind.is_scalar() {
                if node.is_tagged_at(self.version) {
                    debug!("{}: null for tagged field, keeping default", field.name);
                    return Ok(None);
                }
                return Err(self.value_error(&field.name, "null is only allowed for fields tagged at this version"));
            }
            return match kind {
                FieldType::Uuid => Ok(None),
                FieldType::Unsupported(_) => Err(self.unsupported(&field.name, kind)),
                _ => Ok(Some(Value::Null)),
            };
        }
        self.convert(node, kind, &field.name, value).map(Some)
    }

    /// Convert one non-null JSON value of the given kind.
    pub fn convert(&self, node: &SchemaNode<'a>, kind: &FieldType, field: &str, value: &JsonValue) -> ReflectResult<Value> {
        let mismatch = |expected: &str| self.value_error(field, format!("expected {}, found {}", expected, json_kind(value)));

        let integer = |min: i64, max: i64| -> ReflectResult<i64> {
            let number = value.as_i64().ok_or_else(|| mismatch("an integer"))?;
            if number < min || number > max {
                return Err(self.value_error(field, format!("{} is out of range for {}", number, kind)));
            }
            Ok(number)
        };

        let converted = match kind {
            FieldType::Bool => Value::Bool(value.as_bool().ok_or_else(|| mismatch("a boolean"))?),
            FieldType::Int8 => Value::Int8(integer(i8::MIN.into(), i8::MAX.into())? as i8),
            FieldType::Int16 => Value::Int16(integer(i16::MIN.into(), i16::MAX.into())? as i16),
            FieldType::Uint16 => Value::Uint16(integer(0, u16::MAX.into())? as u16),
            FieldType::Int32 => Value::Int32(integer(i32::MIN.into(), i32::MAX.into())? as i32),
            FieldType::Uint32 => Value::Uint32(integer(0, u32::MAX.into())? as u32),
            FieldType::Int64 => Value::Int64(integer(i64::MIN, i64::MAX)?),
            FieldType::Float64 => Value::Float64(value.as_f64().ok_or_else(|| mismatch("a number"))?),
            FieldType::String => Value::String(value.as_str().ok_or_else(|| mismatch("a string"))?.to_string()),
            FieldType::Bytes => Value::Bytes(self.hex_bytes(field, value)?),
            FieldType::Records => Value::Records(Arc::from(self.hex_bytes(field, value)?)),
            FieldType::Uuid => {
                let text = value.as_str().ok_or_else(|| mismatch("a UUID string"))?;
                let uuid = Uuid::parse_str(text)
                    .map_err(|e| self.value_error(field, format!("invalid UUID '{}': {}", text, e)))?;
                Value::Uuid(uuid)
            }
            FieldType::Struct(_) => match self.materialize(node, value)? {
                Some(instance) => Value::Struct(instance),
                None => Value::Null,
            },
            FieldType::Array(_) => CollectionBuilder::new(self, *node, field).build(value)?,
            FieldType::Unsupported(_) => return Err(self.unsupported(field, kind)),
        };
        Ok(converted)
    }

    fn hex_bytes(&self, field: &str, value: &JsonValue) -> ReflectResult<Vec<u8>> {
        let text = value.as_str().ok_or_else(|| {
            self.value_error(field, format!("expected a hex string, found {}", json_kind(value)))
        })?;
        hex::decode(text).map_err(|e| self.value_error(field, format!("invalid hex: {}", e)))
    }

    /// Materialize one array element; nulls follow the same policy as fields,
    /// except that elements are never tagged.
    pub fn element(&self, node: &SchemaNode<'a>, kind: &FieldType, field: &str, value: &JsonValue) -> ReflectResult<Value> {
        if value.is_null() {
            return match kind {
                kind if kind.is_scalar() => Err(self.value_error(field, "array elements of this kind cannot be null")),
                FieldType::Uuid => Ok(Value::Uuid(Uuid::nil())),
                FieldType::Unsupported(_) => Err(self.unsupported(field, kind)),
                _ => Ok(Value::Null),
            };
        }
        self.convert(node, kind, field, value)
    }

    /// The instance a fixture of `{}` produces: every projected field at its
    /// declared or type default.
    pub fn default_instance(&self, spec: &StructSpec, stack: &mut Vec<String>) -> ReflectResult<Instance> {
        stack.push(spec.name.clone());
        let mut instance = Instance::new(spec.name.clone());
        for field in project_fields(spec, self.version) {
            let value = self.default_value(field, stack)?;
            instance.fields.push((field.name.clone(), value));
        }
        stack.pop();
        Ok(instance)
    }

    fn default_value(&self, field: &FieldSpec, stack: &mut Vec<String>) -> ReflectResult<Value> {
        if let Some(text) = field.default.as_deref() {
            if text == "null" && field.is_nullable_at(self.version) {
                return Ok(Value::Null);
            }
            if let Some(value) = self.parse_default(field, text)? {
                return Ok(value);
            }
        }

        let value = match &field.field_type {
            FieldType::Bool => Value::Bool(false),
            FieldType::Int8 => Value::Int8(0),
            FieldType::Int16 => Value::Int16(0),
            FieldType::Uint16 => Value::Uint16(0),
            FieldType::Int32 => Value::Int32(0),
            FieldType::Uint32 => Value::Uint32(0),
            FieldType::Int64 => Value::Int64(0),
            FieldType::Float64 => Value::Float64(0.0),
            FieldType::String => Value::String(String::new()),
            FieldType::Bytes => Value::Bytes(Vec::new()),
            FieldType::Records => Value::Records(Arc::from(Vec::new())),
            FieldType::Uuid => Value::Uuid(Uuid::nil()),
            FieldType::Array(_) => Value::Array(Vec::new()),
            FieldType::Struct(name) => {
                if stack.contains(name) {
                    Value::Null
                } else {
                    let child = self.registry.find_struct(field)?;
                    Value::Struct(self.default_instance(child, stack)?)
                }
            }
            FieldType::Unsupported(_) => return Err(self.unsupported(&field.name, &field.field_type)),
        };
        Ok(value)
    }

    /* Declared defaults; kinds without a textual default fall back to the type default */
    fn parse_default(&self, field: &FieldSpec, text: &str) -> ReflectResult<Option<Value>> {
        let invalid = |reason: String| SchemaError::InvalidAttribute {
            context: format!("{}.{}", self.spec.name, field.name),
            attribute: "default",
            reason,
        };
        let integer = || -> Result<i64, SchemaError> {
            let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(digits) => i64::from_str_radix(digits, 16),
                None => text.parse::<i64>(),
            };
            parsed.map_err(|e| invalid(format!("'{}' is not an integer: {}", text, e)))
        };
        let narrow = |number: i64| -> Result<(), SchemaError> {
            match self.range_of(&field.field_type) {
                Some((min, max)) if number < min || number > max => {
                    Err(invalid(format!("{} is out of range for {}", number, field.field_type)))
                }
                _ => Ok(()),
            }
        };

        let value = match &field.field_type {
            FieldType::Bool => match text {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(invalid(format!("'{}' is not a boolean", text)).into()),
            },
            FieldType::Int8 | FieldType::Int16 | FieldType::Uint16 | FieldType::Int32 | FieldType::Uint32 | FieldType::Int64 => {
                let number = integer()?;
                narrow(number)?;
                match field.field_type {
                    FieldType::Int8 => Value::Int8(number as i8),
                    FieldType::Int16 => Value::Int16(number as i16),
                    FieldType::Uint16 => Value::Uint16(number as u16),
                    FieldType::Int32 => Value::Int32(number as i32),
                    FieldType::Uint32 => Value::Uint32(number as u32),
                    _ => Value::Int64(number),
                }
            }
            FieldType::Float64 => Value::Float64(
                text.parse::<f64>()
                    .map_err(|e| invalid(format!("'{}' is not a number: {}", text, e)))?,
            ),
            FieldType::String => Value::String(text.to_string()),
            FieldType::Uuid => Value::Uuid(
                Uuid::parse_str(text).map_err(|e| invalid(format!("'{}' is not a UUID: {}", text, e)))?,
            ),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn range_of(&self, kind: &FieldType) -> Option<(i64, i64)> {
        match kind {
            FieldType::Int8 => Some((i8::MIN.into(), i8::MAX.into())),
            FieldType::Int16 => Some((i16::MIN.into(), i16::MAX.into())),
            FieldType::Uint16 => Some((0, u16::MAX.into())),
            FieldType::Int32 => Some((i32::MIN.into(), i32::MAX.into())),
            FieldType::Uint32 => Some((0, u32::MAX.into())),
            _ => None,
        }
    }
}

/// Load-free entry point: build the registry for `spec` and materialize a
/// fixture at `version`.
pub fn materialize_fixture(spec: &MessageSpec, version: i16, fixture: &JsonValue) -> ReflectResult<Instance> {
    let registry = StructRegistry::for_message(spec)?;
    let materializer = Materializer::new(spec, &registry, version)?;
    materializer.materialize_root(fixture)
}
