//! Firestore REST v1 wire types and value conversion.
//!
//! Firestore encodes every document field as a typed value
//! (`stringValue`, `integerValue`, `doubleValue`, ...). The helpers here
//! convert between that encoding and plain `serde_json` values so the rest
//! of the service works with ordinary JSON objects. Integers cross the wire
//! as strings per the Firestore API.

use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;

use super::StoreError;

/// A JSON object as handled by the API layer.
pub type JsonMap = Map<String, JsonValue>;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    #[serde(default)]
    pub create_time: String,
    #[serde(default)]
    pub update_time: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(flatten)]
    pub value_type: ValueType,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    StringValue(String),
    IntegerValue(String),
    DoubleValue(f64),
    BooleanValue(bool),
    MapValue(MapValue),
    ArrayValue(ArrayValue),
    NullValue(()),
    // Read-side only: this service never produces the variants below, but
    // documents written by other clients may carry them.
    TimestampValue(String),
    GeoPointValue(GeoPoint),
    BytesValue(String),
    ReferenceValue(String),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MapValue {
    pub fields: HashMap<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ArrayValue {
    pub values: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub next_page_token: Option<String>,
}

/// Decodes a Firestore field map into a plain JSON object.
pub fn fields_to_json(fields: HashMap<String, Value>) -> Result<JsonMap, StoreError> {
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key, value_to_json(value)?);
    }
    Ok(map)
}

fn value_to_json(value: Value) -> Result<JsonValue, StoreError> {
    Ok(match value.value_type {
        ValueType::StringValue(s) => JsonValue::String(s),
        ValueType::IntegerValue(s) => {
            let i: i64 = s.parse().map_err(|e| {
                <serde_json::Error as DeError>::custom(format!(
                    "invalid integer string '{s}': {e}"
                ))
            })?;
            JsonValue::Number(i.into())
        }
        ValueType::DoubleValue(d) => {
            JsonValue::Number(serde_json::Number::from_f64(d).ok_or_else(|| {
                <serde_json::Error as DeError>::custom(format!("non-finite double: {d}"))
            })?)
        }
        ValueType::BooleanValue(b) => JsonValue::Bool(b),
        ValueType::MapValue(map_value) => JsonValue::Object(fields_to_json(map_value.fields)?),
        ValueType::ArrayValue(array_value) => {
            let values = array_value
                .values
                .into_iter()
                .map(value_to_json)
                .collect::<Result<Vec<_>, _>>()?;
            JsonValue::Array(values)
        }
        ValueType::NullValue(()) => JsonValue::Null,
        ValueType::TimestampValue(s) => JsonValue::String(s),
        ValueType::GeoPointValue(gp) => {
            json!({ "latitude": gp.latitude, "longitude": gp.longitude })
        }
        ValueType::BytesValue(s) => JsonValue::String(s),
        ValueType::ReferenceValue(s) => JsonValue::String(s),
    })
}

/// Encodes a plain JSON object as a Firestore field map.
pub fn json_to_fields(map: &JsonMap) -> Result<HashMap<String, Value>, StoreError> {
    let mut fields = HashMap::new();
    for (key, value) in map {
        fields.insert(key.clone(), json_to_value(value)?);
    }
    Ok(fields)
}

fn json_to_value(value: &JsonValue) -> Result<Value, StoreError> {
    let value_type = match value {
        JsonValue::Null => ValueType::NullValue(()),
        JsonValue::Bool(b) => ValueType::BooleanValue(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                ValueType::IntegerValue(i.to_string())
            } else if let Some(f) = n.as_f64() {
                ValueType::DoubleValue(f)
            } else {
                return Err(StoreError::Serialization(SerError::custom(format!(
                    "unsupported number: {n}"
                ))));
            }
        }
        JsonValue::String(s) => ValueType::StringValue(s.clone()),
        JsonValue::Array(items) => {
            let values = items
                .iter()
                .map(json_to_value)
                .collect::<Result<Vec<_>, _>>()?;
            ValueType::ArrayValue(ArrayValue { values })
        }
        JsonValue::Object(map) => ValueType::MapValue(MapValue {
            fields: json_to_fields(map)?,
        }),
    };
    Ok(Value { value_type })
}
