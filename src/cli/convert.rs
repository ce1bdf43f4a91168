//! JSON <-> Value conversion utilities

use rust_decimal::prelude::ToPrimitive;
use serde_json::Map;

use super::CliError;
use crate::{Entity, InMemoryManager, Value};

/// Convert serde_json::Value to a query Value
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => {
            Value::Object(obj.into_iter().map(|(k, v)| (k, json_to_value(v))).collect())
        }
    }
}

/// Convert a query Value to serde_json::Value
///
/// Dates are written in ISO form; decimals become JSON numbers.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Decimal(d) => d
            .to_f64()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(d.to_string())),
        Value::String(s) => serde_json::Value::String(s),
        Value::Date(d) => serde_json::Value::String(d.to_string()),
        Value::DateTime(dt) => {
            serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        }
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Object(obj) => {
            serde_json::Value::Object(obj.into_iter().map(|(k, v)| (k, value_to_json(v))).collect())
        }
    }
}

/// Entity as a JSON object of its fields
pub fn entity_to_json(entity: Entity) -> serde_json::Value {
    let fields: Map<String, serde_json::Value> = entity
        .fields
        .into_iter()
        .map(|(k, v)| (k, value_to_json(v)))
        .collect();
    serde_json::Value::Object(fields)
}

fn json_to_entity(name: &str, v: serde_json::Value) -> Result<Entity, CliError> {
    match json_to_value(v) {
        Value::Object(fields) => Ok(Entity {
            name: name.to_string(),
            fields,
        }),
        other => Err(CliError::InvalidData(format!(
            "entities of '{}' must be objects, found {}",
            name,
            other.type_name()
        ))),
    }
}

/// Load a manager from a data document
///
/// ```json
/// {
///   "bucket": { "Diana": { "name": "Diana" } },
///   "collections": { "Person": [ { "name": "Ada", "age": 36 } ] }
/// }
/// ```
///
/// Bucket keys are strings; both sections are optional.
pub fn load_data(json: &str) -> Result<InMemoryManager, CliError> {
    let document: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Object(mut document) = document else {
        return Err(CliError::InvalidData("expected a JSON object".to_string()));
    };

    let manager = InMemoryManager::new();

    if let Some(bucket) = document.remove("bucket") {
        let serde_json::Value::Object(bucket) = bucket else {
            return Err(CliError::InvalidData("'bucket' must be an object".to_string()));
        };
        for (key, v) in bucket {
            let entity = json_to_entity(&key, v)?;
            manager.put(key, entity);
        }
    }

    if let Some(collections) = document.remove("collections") {
        let serde_json::Value::Object(collections) = collections else {
            return Err(CliError::InvalidData("'collections' must be an object".to_string()));
        };
        for (name, entities) in collections {
            let serde_json::Value::Array(entities) = entities else {
                return Err(CliError::InvalidData(format!("'{}' must be an array", name)));
            };
            for v in entities {
                manager.add(json_to_entity(&name, v)?);
            }
        }
    }

    Ok(manager)
}
