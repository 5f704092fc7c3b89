//! Resolution of declared type names into [`TargetType`]s.
//!
//! The type row of a sheet names field types as text. The registry knows the
//! scalar spellings, the generic wrappers, a few built-in custom types and
//! whatever enums and custom types the caller registers.

use crate::error::{ConversionError, ConversionKind, TypeError};
use crate::schema::FieldDescriptor;
use crate::target::{
    ConstructError, CustomType, EnumType, FieldDef, PrimitiveType, RecordType, TargetType,
};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use indexmap::IndexMap;
use rowcast_sheet::CellKind;

/// Named types available to the type row.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: IndexMap<String, TargetType>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry with the built-in custom types (`DateTime`, `Vector2`, `Vector3`).
    #[must_use]
    pub fn new() -> Self {
        let mut types = IndexMap::new();
        for custom in [
            date_time_type(),
            vector_type("Vector2", &["x", "y"]),
            vector_type("Vector3", &["x", "y", "z"]),
        ] {
            types.insert(custom.name.clone(), TargetType::Custom(custom));
        }
        Self { types }
    }

    /// A registry knowing only the scalar and generic forms.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    pub fn register_enum(&mut self, enum_type: EnumType) -> Result<(), TypeError> {
        let name = enum_type.name.clone();
        self.register(name, TargetType::Enum(enum_type))
    }

    pub fn register_custom(&mut self, custom: CustomType) -> Result<(), TypeError> {
        let name = custom.name.clone();
        self.register(name, TargetType::Custom(custom))
    }

    fn register(&mut self, name: String, ty: TargetType) -> Result<(), TypeError> {
        if primitive(&name).is_some() || self.types.contains_key(&name) {
            return Err(TypeError::Duplicate(name));
        }
        tracing::debug!(name = %name, "registered type");
        self.types.insert(name, ty);
        Ok(())
    }

    /// Look up a registered named type.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TargetType> {
        self.types.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Names of the registered types, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Resolve a declared type token such as `int`, `List<Point>` or `long?`.
    pub fn resolve(&self, token: &str) -> Result<TargetType, TypeError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(malformed(token, "empty type name"));
        }

        if let Some(inner) = token.strip_suffix('?') {
            return Ok(TargetType::nullable(self.resolve(inner)?));
        }
        if let Some(inner) = token.strip_suffix("[]") {
            return Ok(TargetType::list(self.resolve(inner)?));
        }

        if let Some(open) = token.find('<') {
            let Some(args) = token[open + 1..].strip_suffix('>') else {
                return Err(malformed(token, "unbalanced '<'"));
            };
            return self.resolve_generic(token, token[..open].trim(), args);
        }

        if let Some(p) = primitive(token) {
            return Ok(p.into());
        }
        self.types
            .get(token)
            .cloned()
            .ok_or_else(|| TypeError::Unknown(token.to_string()))
    }

    fn resolve_generic(
        &self,
        token: &str,
        name: &str,
        args: &str,
    ) -> Result<TargetType, TypeError> {
        let args = split_arguments(args).ok_or_else(|| malformed(token, "unbalanced '<'"))?;

        match (name, args.as_slice()) {
            ("Nullable" | "Option", [inner]) => Ok(TargetType::nullable(self.resolve(inner)?)),
            ("List" | "Vec" | "IList" | "IEnumerable", [element]) => {
                Ok(TargetType::list(self.resolve(element)?))
            }
            ("Dictionary" | "HashMap" | "IndexMap", [key, value]) => {
                if primitive(key.trim()) != Some(PrimitiveType::String) {
                    return Err(malformed(token, "dictionary keys must be strings"));
                }
                Ok(TargetType::map(self.resolve(value)?))
            }
            ("Nullable" | "Option" | "List" | "Vec" | "IList" | "IEnumerable" | "Dictionary"
            | "HashMap" | "IndexMap", _) => Err(malformed(
                token,
                &format!("wrong number of type arguments for {name}"),
            )),
            _ => Err(TypeError::Unknown(token.to_string())),
        }
    }
}

fn malformed(token: &str, message: &str) -> TypeError {
    TypeError::Malformed {
        token: token.to_string(),
        message: message.to_string(),
    }
}

fn primitive(token: &str) -> Option<PrimitiveType> {
    let p = match token {
        "bool" | "boolean" | "Boolean" => PrimitiveType::Bool,
        "sbyte" | "i8" | "SByte" => PrimitiveType::I8,
        "short" | "i16" | "Int16" => PrimitiveType::I16,
        "int" | "i32" | "Int32" => PrimitiveType::I32,
        "long" | "i64" | "Int64" => PrimitiveType::I64,
        "byte" | "u8" | "Byte" => PrimitiveType::U8,
        "ushort" | "u16" | "UInt16" => PrimitiveType::U16,
        "uint" | "u32" | "UInt32" => PrimitiveType::U32,
        "ulong" | "u64" | "UInt64" => PrimitiveType::U64,
        "float" | "f32" | "Single" => PrimitiveType::F32,
        "double" | "decimal" | "f64" | "Double" | "Decimal" => PrimitiveType::F64,
        "char" | "Char" => PrimitiveType::Char,
        "string" | "String" | "str" => PrimitiveType::String,
        _ => return None,
    };
    Some(p)
}

/// Split generic arguments at top-level commas.
fn split_arguments(args: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&args[start..]);
    Some(parts)
}

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Timestamps are abstract: no structured form, constructed from text or
/// from an Excel serial date number.
fn date_time_type() -> CustomType {
    CustomType::abstract_type("DateTime")
        .with_constructor(CellKind::Text, |value| {
            let text = value.to_text();
            parse_date_time(text.trim())
                .ok_or_else(|| date_time_error(&text, ConversionKind::Format))
        })
        .with_constructor(CellKind::Number, |value| {
            let serial = value.as_number().unwrap_or(f64::NAN);
            from_excel_serial(serial)
                .ok_or_else(|| date_time_error(&value.to_text(), ConversionKind::Argument))
        })
}

fn date_time_error(text: &str, kind: ConversionKind) -> ConstructError {
    ConversionError::new(text, "DateTime", kind).into()
}

fn parse_date_time(text: &str) -> Option<Value> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Value::String(dt.to_rfc3339()));
    }
    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)
        })?;
    Some(Value::String(naive.format(DATE_TIME_FORMAT).to_string()))
}

/// Excel serial dates count days from 1899-12-30, fractions being the time of day.
fn from_excel_serial(serial: f64) -> Option<Value> {
    if !serial.is_finite() || !(0.0..=2_958_465.999_999).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let dt = epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)?;
    Some(Value::String(dt.format(DATE_TIME_FORMAT).to_string()))
}

/// Float vectors, also constructible from `"x,y[,z]"` text.
fn vector_type(name: &'static str, axes: &'static [&'static str]) -> CustomType {
    let fields = axes
        .iter()
        .map(|axis| FieldDef::new(*axis, PrimitiveType::F32.into()))
        .collect();
    CustomType::value(name, fields).with_constructor(CellKind::Text, move |value| {
        let text = value.to_text();
        let parts: Vec<_> = text.split(',').map(str::trim).collect();
        let format_error =
            || ConstructError::from(ConversionError::new(&text, name, ConversionKind::Format));
        if parts.len() != axes.len() {
            return Err(format_error());
        }

        let mut fields = IndexMap::with_capacity(axes.len());
        for (axis, part) in axes.iter().zip(parts) {
            let n: f32 = part.parse().map_err(|_| format_error())?;
            fields.insert((*axis).to_string(), Value::Float(f64::from(n)));
        }
        Ok(Value::Object {
            type_name: name.to_string(),
            fields,
        })
    })
}

impl RecordType {
    /// Build a record type from the declared types of a sheet header.
    pub fn from_schema(
        name: impl Into<String>,
        schema: &[FieldDescriptor],
        registry: &TypeRegistry,
    ) -> Result<Self, TypeError> {
        let fields = schema
            .iter()
            .map(|descriptor| {
                registry
                    .resolve(&descriptor.declared_type)
                    .map(|ty| FieldDef::new(&descriptor.name, ty))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::coerce_value;
    use rowcast_sheet::CellValue;

    #[test]
    fn test_scalar_tokens() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.resolve("int").unwrap().to_string(), "i32");
        assert_eq!(registry.resolve("ulong").unwrap().to_string(), "u64");
        assert_eq!(registry.resolve(" decimal ").unwrap().to_string(), "f64");
        assert_eq!(registry.resolve("String").unwrap().to_string(), "string");
    }

    #[test]
    fn test_generic_tokens() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.resolve("int?").unwrap().to_string(), "i32?");
        assert_eq!(registry.resolve("float[]").unwrap().to_string(), "List<f32>");
        assert_eq!(
            registry.resolve("Nullable<long>").unwrap().to_string(),
            "i64?"
        );
        assert_eq!(
            registry.resolve("List<List<int>>").unwrap().to_string(),
            "List<List<i32>>"
        );
        assert_eq!(
            registry
                .resolve("Dictionary<string, List<int>>")
                .unwrap()
                .to_string(),
            "Dictionary<string,List<i32>>"
        );
        assert_eq!(
            registry.resolve("HashMap<String,Vector2>").unwrap().to_string(),
            "Dictionary<string,Vector2>"
        );
    }

    #[test]
    fn test_bad_tokens() {
        let registry = TypeRegistry::new();
        assert_eq!(
            registry.resolve("Widget").unwrap_err(),
            TypeError::Unknown("Widget".to_string())
        );
        assert!(matches!(
            registry.resolve("List<int"),
            Err(TypeError::Malformed { .. })
        ));
        assert!(matches!(
            registry.resolve("Dictionary<int,int>"),
            Err(TypeError::Malformed { .. })
        ));
        assert!(matches!(
            registry.resolve("List<int,int>"),
            Err(TypeError::Malformed { .. })
        ));
        assert!(matches!(registry.resolve(""), Err(TypeError::Malformed { .. })));
    }

    #[test]
    fn test_registration() {
        let mut registry = TypeRegistry::empty();
        registry
            .register_enum(EnumType::new("ItemCategory", ["Weapon", "Armor"]))
            .unwrap();
        assert!(registry.contains("ItemCategory"));
        assert_eq!(
            registry.resolve("ItemCategory[]").unwrap().to_string(),
            "List<ItemCategory>"
        );

        assert_eq!(
            registry.register_enum(EnumType::new("ItemCategory", ["X"])),
            Err(TypeError::Duplicate("ItemCategory".to_string()))
        );
        assert!(registry
            .register_custom(CustomType::abstract_type("int"))
            .is_err());
        assert!(registry.resolve("DateTime").is_err());
    }

    #[test]
    fn test_date_time_from_text_and_serial() {
        let registry = TypeRegistry::new();
        let ty = registry.resolve("DateTime").unwrap();

        let value = coerce_value(&CellValue::text("2024-03-01"), &ty).unwrap();
        assert_eq!(value, Value::from("2024-03-01T00:00:00"));

        let value = coerce_value(&CellValue::text("2024-03-01 12:30:00"), &ty).unwrap();
        assert_eq!(value, Value::from("2024-03-01T12:30:00"));

        let value = coerce_value(&CellValue::Number(45_352.5), &ty).unwrap();
        assert_eq!(value, Value::from("2024-03-01T12:00:00"));

        assert!(coerce_value(&CellValue::text("soon"), &ty).is_err());
        assert_eq!(coerce_value(&CellValue::Blank, &ty).unwrap(), Value::Null);
    }

    #[test]
    fn test_vector_from_text_or_json() {
        let registry = TypeRegistry::new();
        let ty = registry.resolve("Vector3").unwrap();

        let value = coerce_value(&CellValue::text("1, 2.5, -3"), &ty).unwrap();
        assert_eq!(value.to_string(), r#"{"x":1.0,"y":2.5,"z":-3.0}"#);

        let value = coerce_value(&CellValue::text(r#"{"x":4}"#), &ty).unwrap();
        assert_eq!(value.to_string(), r#"{"x":4.0,"y":0.0,"z":0.0}"#);

        let points = registry.resolve("List<Vector2>").unwrap();
        let value =
            coerce_value(&CellValue::text(r#"[{"x":1,"y":2},{"x":3,"y":4}]"#), &points).unwrap();
        assert_eq!(value.as_list().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_record_type_from_schema() {
        let registry = TypeRegistry::new();
        let schema = vec![
            FieldDescriptor {
                name: "id".to_string(),
                declared_type: "int".to_string(),
                comment: String::new(),
                column: 0,
            },
            FieldDescriptor {
                name: "tags".to_string(),
                declared_type: "string[]".to_string(),
                comment: String::new(),
                column: 2,
            },
        ];

        let record_type = RecordType::from_schema("Item", &schema, &registry).unwrap();
        assert_eq!(record_type.name, "Item");
        assert_eq!(record_type.fields.len(), 2);
        assert_eq!(record_type.get("tags").unwrap().ty.to_string(), "List<string>");

        let mut bad = schema;
        bad[0].declared_type = "Widget".to_string();
        assert!(RecordType::from_schema("Item", &bad, &registry).is_err());
    }
}
