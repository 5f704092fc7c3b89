//! The coercion engine: one raw cell value into one target type.
//!
//! Strategies are tried in a fixed order and the first applicable one is
//! final:
//!
//! 1. nullable unwrap (blank is absent, anything else recurses on the inner type)
//! 2. enum resolution by member name
//! 3. collection resolution (bare `1,2,3` is framed as `[1,2,3]` and parsed)
//! 4. direct scalar conversion
//! 5. constructor fallback, keyed by the source's own kind
//! 6. structured (JSON) fallback
//!
//! Steps 5 and 6 only run after a step-4 [`ConversionError`].

use crate::error::{CoerceError, ConversionError, ConversionKind};
use crate::structured::parse_structured;
use crate::target::{ConstructError, CustomShape, EnumType, PrimitiveType, TargetType};
use crate::value::Value;
use rowcast_sheet::CellValue;

/// Coerce one cell value into `target`.
///
/// # Examples
///
/// ```
/// use rowcast_core::{coerce_value, PrimitiveType, TargetType, Value};
/// use rowcast_sheet::CellValue;
///
/// let ints = TargetType::list(PrimitiveType::I32.into());
/// let value = coerce_value(&CellValue::text("1,2,3"), &ints).unwrap();
/// assert_eq!(value, Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
/// ```
pub fn coerce_value(value: &CellValue, target: &TargetType) -> Result<Value, CoerceError> {
    match target {
        TargetType::Nullable(inner) => {
            if value.is_blank() {
                Ok(Value::Null)
            } else {
                coerce_value(value, inner)
            }
        }
        TargetType::Enum(enum_type) => resolve_enum(value, enum_type),
        TargetType::Collection(_) => resolve_collection(value, target),
        _ => convert_with_fallback(value, target),
    }
}

fn resolve_enum(value: &CellValue, enum_type: &EnumType) -> Result<Value, CoerceError> {
    let enum_parse = |name: &str| CoerceError::EnumParse {
        name: name.to_string(),
        enum_type: enum_type.name.clone(),
    };

    if value.is_blank() {
        return Err(enum_parse(""));
    }
    let text = value.to_text();
    let name = text.trim();
    enum_type.member(name).ok_or_else(|| enum_parse(name))
}

fn resolve_collection(value: &CellValue, target: &TargetType) -> Result<Value, CoerceError> {
    let text = value.to_text();
    let trimmed = text.trim();
    let framed = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        format!("[{trimmed}]")
    };
    parse_structured(&framed, target)
}

fn convert_with_fallback(value: &CellValue, target: &TargetType) -> Result<Value, CoerceError> {
    let conversion_error = match convert_direct(value, target) {
        Ok(converted) => return Ok(converted),
        Err(err) => err,
    };
    tracing::trace!(error = %conversion_error, "direct conversion failed, trying fallbacks");

    let mut constructor_failure = None;
    if let TargetType::Custom(custom) = target {
        if let Some(constructor) = custom.constructor_for(value.kind()) {
            match constructor.invoke(value) {
                Ok(constructed) => return Ok(constructed),
                Err(ConstructError::Conversion(err)) => constructor_failure = Some(err),
                Err(ConstructError::Other(message)) => {
                    return Err(CoerceError::Constructor {
                        target_type: custom.name.clone(),
                        message,
                    });
                }
            }
        }
        if matches!(custom.shape, CustomShape::Abstract) {
            return Err(conversion_error.into());
        }
    }

    let text = value.to_text();
    parse_structured(&text, target).map_err(|err| match err {
        CoerceError::StructuredParse {
            text,
            target_type,
            message,
            ..
        } => CoerceError::StructuredParse {
            text,
            target_type,
            message,
            cause: Some(conversion_error),
            constructor_failure,
        },
        other => other,
    })
}

/// Direct scalar conversion (strategy 4).
///
/// A blank source yields the target's default value without conversion.
pub fn convert_direct(value: &CellValue, target: &TargetType) -> Result<Value, ConversionError> {
    if value.is_blank() {
        return Ok(target.default_value());
    }
    match target {
        TargetType::Primitive(p) => convert_primitive(value, *p),
        _ => Err(ConversionError::new(
            value.to_text(),
            target.to_string(),
            ConversionKind::InvalidCast,
        )),
    }
}

fn convert_primitive(value: &CellValue, p: PrimitiveType) -> Result<Value, ConversionError> {
    let fail = |kind| ConversionError::new(value.to_text(), p.name(), kind);

    if let Some((min, max)) = p.int_bounds() {
        let n = match value {
            CellValue::Number(n) if !n.is_finite() => return Err(fail(ConversionKind::Argument)),
            CellValue::Number(n) => {
                number_to_integer(*n).ok_or_else(|| fail(ConversionKind::Overflow))?
            }
            CellValue::Text(s) => parse_integer(s).map_err(fail)?,
            CellValue::Boolean(b) => i128::from(*b),
            CellValue::Blank => 0,
        };
        if n < min || n > max {
            return Err(fail(ConversionKind::Overflow));
        }
        return Ok(if min < 0 {
            Value::Int(n as i64)
        } else {
            Value::UInt(n as u64)
        });
    }

    match (p, value) {
        (PrimitiveType::String, _) => Ok(Value::String(value.to_text())),
        (PrimitiveType::Bool, CellValue::Boolean(b)) => Ok(Value::Bool(*b)),
        (PrimitiveType::Bool, CellValue::Number(n)) => Ok(Value::Bool(*n != 0.0)),
        (PrimitiveType::Bool, CellValue::Text(s)) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if s.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(fail(ConversionKind::Format))
            }
        }
        (PrimitiveType::F32 | PrimitiveType::F64, _) => {
            let f = match value {
                CellValue::Number(n) => *n,
                CellValue::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| fail(ConversionKind::Format))?,
                CellValue::Boolean(b) => f64::from(u8::from(*b)),
                CellValue::Blank => 0.0,
            };
            Ok(if p == PrimitiveType::F32 {
                Value::Float(f64::from(f as f32))
            } else {
                Value::Float(f)
            })
        }
        (PrimitiveType::Char, CellValue::Text(s)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(fail(ConversionKind::Format)),
            }
        }
        _ => Err(fail(ConversionKind::InvalidCast)),
    }
}

/// Round half to even, as spreadsheet runtimes do when narrowing doubles.
fn number_to_integer(n: f64) -> Option<i128> {
    let rounded = n.round_ties_even();
    if rounded.abs() >= 1.0e38 {
        return None;
    }
    Some(rounded as i128)
}

fn parse_integer(s: &str) -> Result<i128, ConversionKind> {
    let s = s.trim();
    s.parse::<i128>().map_err(|_| {
        let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            ConversionKind::Overflow
        } else {
            ConversionKind::Format
        }
    })
}
