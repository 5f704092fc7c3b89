//! Target types that cell values are coerced into.
//!
//! A [`TargetType`] is the runtime description of a record field's declared
//! type. Custom types carry their own construction rules, so the coercion
//! engine never needs to know about them ahead of time.

use crate::error::ConversionError;
use crate::value::Value;
use indexmap::IndexMap;
use rowcast_sheet::{CellKind, CellValue};
use std::fmt;
use std::sync::Arc;

/// Scalar types with a direct conversion from cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
}

impl PrimitiveType {
    /// Display name of the type.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
            PrimitiveType::Char => "char",
            PrimitiveType::String => "string",
        }
    }

    /// Whether values of this type are zero-initialized rather than absent.
    #[must_use]
    pub fn is_value_type(self) -> bool {
        !matches!(self, PrimitiveType::String)
    }

    /// Inclusive integer bounds, for integer types.
    pub(crate) fn int_bounds(self) -> Option<(i128, i128)> {
        let bounds = match self {
            PrimitiveType::I8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
            PrimitiveType::I16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
            PrimitiveType::I32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
            PrimitiveType::I64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
            PrimitiveType::U8 => (0, i128::from(u8::MAX)),
            PrimitiveType::U16 => (0, i128::from(u16::MAX)),
            PrimitiveType::U32 => (0, i128::from(u32::MAX)),
            PrimitiveType::U64 => (0, i128::from(u64::MAX)),
            _ => return None,
        };
        Some(bounds)
    }

    /// Zero value of the type; `Null` for strings.
    #[must_use]
    pub fn default_value(self) -> Value {
        match self {
            PrimitiveType::Bool => Value::Bool(false),
            PrimitiveType::I8 | PrimitiveType::I16 | PrimitiveType::I32 | PrimitiveType::I64 => {
                Value::Int(0)
            }
            PrimitiveType::U8 | PrimitiveType::U16 | PrimitiveType::U32 | PrimitiveType::U64 => {
                Value::UInt(0)
            }
            PrimitiveType::F32 | PrimitiveType::F64 => Value::Float(0.0),
            PrimitiveType::Char => Value::Char('\0'),
            PrimitiveType::String => Value::Null,
        }
    }
}

/// An enum type: ordered member names with their integer values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub members: Vec<(String, i64)>,
}

impl EnumType {
    /// Create an enum whose members are numbered from zero.
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members
                .into_iter()
                .zip(0i64..)
                .map(|(member, value)| (member.into(), value))
                .collect(),
        }
    }

    /// Create an enum with explicit member values.
    pub fn with_values<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(|(m, v)| (m.into(), v)).collect(),
        }
    }

    /// Case-sensitive lookup by member name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<Value> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(member, value)| Value::Enum {
                name: member.clone(),
                value: *value,
            })
    }

    /// Lookup by member value.
    #[must_use]
    pub fn member_by_value(&self, value: i64) -> Option<Value> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(member, v)| Value::Enum {
                name: member.clone(),
                value: *v,
            })
    }

    /// The member with value 0, or the first member.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.member_by_value(0)
            .or_else(|| {
                self.members.first().map(|(name, value)| Value::Enum {
                    name: name.clone(),
                    value: *value,
                })
            })
            .unwrap_or(Value::Null)
    }
}

/// A named field of a record or custom struct type.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: TargetType,
    /// Inaccessible fields are never written by the importer.
    pub accessible: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TargetType) -> Self {
        Self {
            name: name.into(),
            ty,
            accessible: true,
        }
    }

    /// A field the importer must leave alone.
    pub fn hidden(name: impl Into<String>, ty: TargetType) -> Self {
        Self {
            accessible: false,
            ..Self::new(name, ty)
        }
    }
}

/// How a custom type is laid out for structured parsing.
#[derive(Debug, Clone)]
pub enum CustomShape {
    /// A reference type with named fields; defaults to absent.
    Object(Vec<FieldDef>),
    /// A value type with named fields; defaults to all-zero fields.
    Value(Vec<FieldDef>),
    /// A type with no structured representation (e.g. an interface).
    Abstract,
}

/// Builds a custom value from one raw cell value.
pub type ConstructFn = dyn Fn(&CellValue) -> Result<Value, ConstructError> + Send + Sync;

/// Failure of a registered constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructError {
    /// A conversion-class failure; the coercion chain may still try
    /// structured parsing.
    Conversion(ConversionError),
    /// Any other failure; fatal.
    Other(String),
}

impl From<ConversionError> for ConstructError {
    fn from(err: ConversionError) -> Self {
        ConstructError::Conversion(err)
    }
}

/// A single-argument construction rule accepting one source kind.
#[derive(Clone)]
pub struct Constructor {
    pub accepts: CellKind,
    build: Arc<ConstructFn>,
}

impl Constructor {
    pub fn new<F>(accepts: CellKind, build: F) -> Self
    where
        F: Fn(&CellValue) -> Result<Value, ConstructError> + Send + Sync + 'static,
    {
        Self {
            accepts,
            build: Arc::new(build),
        }
    }

    /// Invoke the constructor with the raw source value.
    pub fn invoke(&self, value: &CellValue) -> Result<Value, ConstructError> {
        (self.build)(value)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("accepts", &self.accepts)
            .finish_non_exhaustive()
    }
}

/// A user-defined type: a struct shape plus optional constructors.
#[derive(Debug, Clone)]
pub struct CustomType {
    pub name: String,
    pub shape: CustomShape,
    pub constructors: Vec<Constructor>,
}

impl CustomType {
    /// A reference-type struct.
    pub fn object(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            shape: CustomShape::Object(fields),
            constructors: Vec::new(),
        }
    }

    /// A value-type struct.
    pub fn value(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            shape: CustomShape::Value(fields),
            constructors: Vec::new(),
        }
    }

    /// A type that cannot be parsed structurally.
    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: CustomShape::Abstract,
            constructors: Vec::new(),
        }
    }

    /// Register a constructor for one source kind.
    #[must_use]
    pub fn with_constructor<F>(mut self, accepts: CellKind, build: F) -> Self
    where
        F: Fn(&CellValue) -> Result<Value, ConstructError> + Send + Sync + 'static,
    {
        self.constructors.push(Constructor::new(accepts, build));
        self
    }

    /// The constructor whose parameter matches `kind`, if any.
    #[must_use]
    pub fn constructor_for(&self, kind: CellKind) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.accepts == kind)
    }

    /// Fields of a struct-shaped type.
    #[must_use]
    pub fn fields(&self) -> Option<&[FieldDef]> {
        match &self.shape {
            CustomShape::Object(fields) | CustomShape::Value(fields) => Some(fields),
            CustomShape::Abstract => None,
        }
    }

    /// All fields at their defaults.
    #[must_use]
    pub fn default_fields(&self) -> IndexMap<String, Value> {
        self.fields()
            .unwrap_or_default()
            .iter()
            .map(|field| (field.name.clone(), field.ty.default_value()))
            .collect()
    }
}

/// The declared type of a record field.
#[derive(Debug, Clone)]
pub enum TargetType {
    Primitive(PrimitiveType),
    Nullable(Box<TargetType>),
    Enum(EnumType),
    /// An ordered sequence of elements.
    Collection(Box<TargetType>),
    /// A string-keyed dictionary; never treated as a collection.
    Map(Box<TargetType>),
    Custom(CustomType),
}

impl TargetType {
    pub fn nullable(inner: TargetType) -> Self {
        TargetType::Nullable(Box::new(inner))
    }

    pub fn list(element: TargetType) -> Self {
        TargetType::Collection(Box::new(element))
    }

    pub fn map(value: TargetType) -> Self {
        TargetType::Map(Box::new(value))
    }

    /// Whether the type defaults to a zero value rather than absent.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            TargetType::Primitive(p) => p.is_value_type(),
            TargetType::Enum(_) => true,
            TargetType::Custom(custom) => matches!(custom.shape, CustomShape::Value(_)),
            TargetType::Nullable(_) | TargetType::Collection(_) | TargetType::Map(_) => false,
        }
    }

    /// The value a field of this type holds before anything is assigned.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            TargetType::Primitive(p) => p.default_value(),
            TargetType::Enum(e) => e.default_value(),
            TargetType::Custom(custom) if matches!(custom.shape, CustomShape::Value(_)) => {
                Value::Object {
                    type_name: custom.name.clone(),
                    fields: custom.default_fields(),
                }
            }
            _ => Value::Null,
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Primitive(p) => f.write_str(p.name()),
            TargetType::Nullable(inner) => write!(f, "{inner}?"),
            TargetType::Enum(e) => f.write_str(&e.name),
            TargetType::Collection(element) => write!(f, "List<{element}>"),
            TargetType::Map(value) => write!(f, "Dictionary<string,{value}>"),
            TargetType::Custom(custom) => f.write_str(&custom.name),
        }
    }
}

impl From<PrimitiveType> for TargetType {
    fn from(p: PrimitiveType) -> Self {
        TargetType::Primitive(p)
    }
}

impl From<EnumType> for TargetType {
    fn from(e: EnumType) -> Self {
        TargetType::Enum(e)
    }
}

impl From<CustomType> for TargetType {
    fn from(c: CustomType) -> Self {
        TargetType::Custom(c)
    }
}

/// The type of one imported row: an ordered list of fields.
#[derive(Debug, Clone)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<TargetType>) -> Self {
        self.fields.push(FieldDef::new(name, ty.into()));
        self
    }

    /// Append a field the importer must not write.
    #[must_use]
    pub fn hidden_field(mut self, name: impl Into<String>, ty: impl Into<TargetType>) -> Self {
        self.fields.push(FieldDef::hidden(name, ty.into()));
        self
    }

    /// Look up a field by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_members() {
        let category = EnumType::new("Category", ["Weapon", "Armor"]);
        assert_eq!(
            category.member("Armor"),
            Some(Value::Enum {
                name: "Armor".to_string(),
                value: 1
            })
        );
        assert_eq!(category.member("armor"), None);
        assert_eq!(category.default_value().to_string(), "Weapon");
    }

    #[test]
    fn test_enum_default_prefers_zero() {
        let rarity = EnumType::with_values("Rarity", [("Rare", 5), ("None", 0)]);
        assert_eq!(rarity.default_value().to_string(), "None");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            TargetType::from(PrimitiveType::I32).default_value(),
            Value::Int(0)
        );
        assert_eq!(
            TargetType::from(PrimitiveType::String).default_value(),
            Value::Null
        );
        assert_eq!(
            TargetType::list(PrimitiveType::I32.into()).default_value(),
            Value::Null
        );

        let point = CustomType::value(
            "Point",
            vec![FieldDef::new("x", PrimitiveType::F32.into())],
        );
        let Value::Object { fields, .. } = TargetType::from(point).default_value() else {
            panic!("expected object");
        };
        assert_eq!(fields.get("x"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn test_display() {
        let ty = TargetType::nullable(TargetType::list(PrimitiveType::I32.into()));
        assert_eq!(ty.to_string(), "List<i32>?");
        assert_eq!(
            TargetType::map(PrimitiveType::I64.into()).to_string(),
            "Dictionary<string,i64>"
        );
    }
}
