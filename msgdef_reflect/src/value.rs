/* Materialized values
 *
 * One Value variant per field data kind. Values serialize to plain JSON:
 * byte payloads as hex strings, structs as objects keyed by declared field
 * name.
 */

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const UNKNOWN_TAGGED_FIELDS: &str = "_unknown_tagged_fields";

fn serialize_hex<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&hex::encode(bytes.as_ref()))
}

/// A tagged field the schema does not declare, kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTaggedField {
    pub tag: i32,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /* Absent reference value (string, bytes, records, struct or array) */
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(#[serde(serialize_with = "serialize_hex")] Vec<u8>),
    Uuid(Uuid),
    /* Opaque record batch payload, shared and immutable */
    Records(#[serde(serialize_with = "serialize_hex")] Arc<[u8]>),
    Struct(Instance),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_struct(&self) -> Option<&Instance> {
        match self {
            Value::Struct(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(elements) => Some(elements),
            _ => None,
        }
    }
}

/// A materialized struct. `fields` holds exactly the fields present at the
/// materialized version, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub name: String,
    pub fields: Vec<(String, Value)>,
    pub unknown_tagged_fields: Vec<RawTaggedField>,
}

impl Instance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            unknown_tagged_fields: Vec::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /* Replace an existing field's value; false if the field is not present */
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(slot) => {
                slot.1 = value;
                true
            }
            None => false,
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(!self.unknown_tagged_fields.is_empty());
        let mut map = serializer.serialize_map(Some(self.fields.len() + extra))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        if !self.unknown_tagged_fields.is_empty() {
            map.serialize_entry(UNKNOWN_TAGGED_FIELDS, &self.unknown_tagged_fields)?;
        }
        map.end()
    }
}
