//! Structured parsing: JSON text materialized into a target type.
//!
//! Conversions are tolerant in the usual JSON-binding way: numbers and
//! booleans may be read into strings, numeric strings into numbers, enum
//! members by name or integer value, and object keys match struct fields
//! case-insensitively. Unknown keys are ignored and missing fields keep
//! their defaults.

use crate::error::CoerceError;
use crate::target::{ConstructError, CustomShape, CustomType, EnumType, PrimitiveType, TargetType};
use crate::value::Value;
use indexmap::IndexMap;
use rowcast_sheet::CellValue;
use serde_json::Value as JsonValue;

/// Parse `text` as JSON and materialize it as `target`.
pub fn parse_structured(text: &str, target: &TargetType) -> Result<Value, CoerceError> {
    let json: JsonValue = serde_json::from_str(text).map_err(|e| {
        CoerceError::structured(text, target.to_string(), format!("invalid JSON: {e}"))
    })?;

    materialize(&json, target, "$")
        .map_err(|message| CoerceError::structured(text, target.to_string(), message))
}

type Materialized = std::result::Result<Value, String>;

fn materialize(json: &JsonValue, target: &TargetType, path: &str) -> Materialized {
    match target {
        TargetType::Nullable(inner) => match json {
            JsonValue::Null => Ok(Value::Null),
            _ => materialize(json, inner, path),
        },
        TargetType::Primitive(p) => primitive(json, *p, path),
        TargetType::Enum(e) => enum_member(json, e, path),
        TargetType::Collection(element) => match json {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| materialize(item, element, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            other => Err(mismatch(path, "an array", other)),
        },
        TargetType::Map(value_type) => match json {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Object(entries) => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    let value = materialize(item, value_type, &format!("{path}.{key}"))?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::Map(map))
            }
            other => Err(mismatch(path, "an object", other)),
        },
        TargetType::Custom(custom) => custom_value(json, custom, path),
    }
}

fn primitive(json: &JsonValue, p: PrimitiveType, path: &str) -> Materialized {
    if json.is_null() {
        return if p.is_value_type() {
            Err(format!("{path}: null is not a valid {}", p.name()))
        } else {
            Ok(Value::Null)
        };
    }

    if let Some((min, max)) = p.int_bounds() {
        let n = json_integer(json).ok_or_else(|| mismatch(path, p.name(), json))?;
        if n < min || n > max {
            return Err(format!("{path}: {n} is out of range for {}", p.name()));
        }
        return Ok(if min < 0 {
            Value::Int(n as i64)
        } else {
            Value::UInt(n as u64)
        });
    }

    match (p, json) {
        (PrimitiveType::Bool, JsonValue::Bool(b)) => Ok(Value::Bool(*b)),
        (PrimitiveType::Bool, JsonValue::String(s)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(mismatch(path, "bool", json)),
            }
        }
        (PrimitiveType::Bool, JsonValue::Number(n)) => Ok(Value::Bool(n.as_f64() != Some(0.0))),
        (PrimitiveType::F32 | PrimitiveType::F64, JsonValue::Number(n)) => n
            .as_f64()
            .map(|f| float_value(p, f))
            .ok_or_else(|| mismatch(path, p.name(), json)),
        (PrimitiveType::F32 | PrimitiveType::F64, JsonValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| float_value(p, f))
            .map_err(|_| mismatch(path, p.name(), json)),
        (PrimitiveType::Char, JsonValue::String(s)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(format!("{path}: '{s}' is not a single character")),
            }
        }
        (PrimitiveType::String, JsonValue::String(s)) => Ok(Value::String(s.clone())),
        (PrimitiveType::String, JsonValue::Number(n)) => Ok(Value::String(n.to_string())),
        (PrimitiveType::String, JsonValue::Bool(b)) => Ok(Value::String(b.to_string())),
        _ => Err(mismatch(path, p.name(), json)),
    }
}

fn float_value(p: PrimitiveType, f: f64) -> Value {
    match p {
        PrimitiveType::F32 => Value::Float(f64::from(f as f32)),
        _ => Value::Float(f),
    }
}

/// Read a JSON number or numeric string as an integer, rejecting fractions.
fn json_integer(json: &JsonValue) -> Option<i128> {
    match json {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i128::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(i128::from(u))
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < 1.0e38)
                    .map(|f| f as i128)
            }
        }
        JsonValue::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    }
}

fn enum_member(json: &JsonValue, e: &EnumType, path: &str) -> Materialized {
    let found = match json {
        JsonValue::String(s) => e.member(s).or_else(|| {
            e.members
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(s))
                .and_then(|(name, _)| e.member(name))
        }),
        JsonValue::Number(n) => n.as_i64().and_then(|v| e.member_by_value(v)),
        _ => None,
    };
    found.ok_or_else(|| format!("{path}: {json} is not a member of enum {}", e.name))
}

fn custom_value(json: &JsonValue, custom: &CustomType, path: &str) -> Materialized {
    let entries = match json {
        JsonValue::Object(entries) => entries,
        JsonValue::Null if !matches!(custom.shape, CustomShape::Value(_)) => return Ok(Value::Null),
        scalar => return construct_from_scalar(scalar, custom, path),
    };
    let Some(fields) = custom.fields() else {
        return Err(format!("{path}: {} has no structured form", custom.name));
    };

    let mut values = custom.default_fields();
    for field in fields.iter().filter(|f| f.accessible) {
        let item = entries.get(&field.name).or_else(|| {
            entries
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&field.name))
                .map(|(_, v)| v)
        });
        if let Some(item) = item {
            let value = materialize(item, &field.ty, &format!("{path}.{}", field.name))?;
            values.insert(field.name.clone(), value);
        }
    }

    Ok(Value::Object {
        type_name: custom.name.clone(),
        fields: values,
    })
}

/// A scalar JSON value is only acceptable through a registered constructor.
fn construct_from_scalar(json: &JsonValue, custom: &CustomType, path: &str) -> Materialized {
    let cell = match json {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Bool(b) => CellValue::Boolean(*b),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) => CellValue::Number(f),
            None => return Err(mismatch(path, &custom.name, json)),
        },
        _ => return Err(mismatch(path, &custom.name, json)),
    };

    let constructor = custom
        .constructor_for(cell.kind())
        .ok_or_else(|| mismatch(path, &custom.name, json))?;
    constructor.invoke(&cell).map_err(|err| match err {
        ConstructError::Conversion(e) => format!("{path}: {e}"),
        ConstructError::Other(message) => format!("{path}: {message}"),
    })
}

fn mismatch(path: &str, expected: &str, got: &JsonValue) -> String {
    let kind = match got {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    };
    format!("{path}: expected {expected}, found {kind}")
}
