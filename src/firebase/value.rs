//! Codec between loose JSON field maps and Firestore's typed value wire
//! format (`stringValue`, `integerValue`, `mapValue`, ...).

use crate::domain::model::FieldMap;
use serde_json::{json, Map, Value};

pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        // integerValue is string-encoded on the wire
        Value::Number(n) => {
            if n.is_f64() {
                json!({ "doubleValue": n })
            } else {
                json!({ "integerValue": n.to_string() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), to_firestore_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

pub fn from_firestore_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(from_firestore_value).collect())
                .unwrap_or_default();
            Value::Array(values)
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(|map| {
                    map.iter()
                        .map(|(k, v)| (k.clone(), from_firestore_value(v)))
                        .collect()
                })
                .unwrap_or_default();
            Value::Object(fields)
        }
        _ => inner.clone(),
    }
}

/// Wraps a field map into a `{ "fields": { ... } }` document body.
pub fn encode_fields(fields: &FieldMap) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(v)))
        .collect();
    json!({ "fields": encoded })
}

pub fn decode_fields(fields: Option<&Value>) -> FieldMap {
    fields
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(k, v)| (k.clone(), from_firestore_value(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// Document ids are the last path segment of the full resource name
/// (`projects/p/databases/d/documents/col/ID`).
pub fn doc_id_from_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_values_round_trip() {
        for value in [
            json!(null),
            json!(true),
            json!(42),
            json!(-7),
            json!(2.5),
            json!("hello"),
        ] {
            let encoded = to_firestore_value(&value);
            assert_eq!(from_firestore_value(&encoded), value);
        }
    }

    #[test]
    fn test_integer_is_string_encoded() {
        assert_eq!(to_firestore_value(&json!(42)), json!({"integerValue": "42"}));
    }

    #[test]
    fn test_nested_array_and_map_round_trip() {
        let value = json!({
            "tags": ["a", "b"],
            "nested": { "count": 3, "ok": true }
        });
        let encoded = to_firestore_value(&value);
        assert_eq!(from_firestore_value(&encoded), value);
    }

    #[test]
    fn test_timestamp_decodes_to_string() {
        let encoded = json!({"timestampValue": "2024-05-01T12:00:00Z"});
        assert_eq!(
            from_firestore_value(&encoded),
            json!("2024-05-01T12:00:00Z")
        );
    }

    #[test]
    fn test_decode_fields_tolerates_missing_fields() {
        assert!(decode_fields(None).is_empty());
        assert!(decode_fields(Some(&json!({}))).is_empty());
    }

    #[test]
    fn test_doc_id_from_name() {
        assert_eq!(
            doc_id_from_name("projects/p/databases/(default)/documents/posts/abc123"),
            "abc123"
        );
        assert_eq!(doc_id_from_name("abc123"), "abc123");
    }
}
