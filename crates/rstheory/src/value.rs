//! Tagged argument values and parameter types.
//!
//! Every argument handed to a theory travels as a [`Value`]. Parameter
//! declarations (on providers and on test methods) are expressed as
//! [`ValueType`]s, and [`ValueType::accepts`] is the single assignability
//! rule the member resolver uses to pick overloads.

use std::fmt;

/// A single argument value in a raw data row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value. Only assignable to `Nullable` and `Any` parameters.
    Null,
    Bool(bool),
    /// 64-bit signed integer. All Rust integer types map here.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    Char(char),
    Str(String),
    /// Ordered list of values.
    List(Vec<Value>),
}

/// One invocation's arguments, in parameter order.
pub type RawRow = Vec<Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The runtime type of this value, or `None` for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::Char(_) => Some(ValueType::Char),
            Value::Str(_) => Some(ValueType::Str),
            Value::List(_) => Some(ValueType::List),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Char(c) => write!(f, "'{c}'"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ============================================================================
// Parameter types
// ============================================================================

/// Declared type of a provider or test method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Char,
    Str,
    List,
    /// Accepts any value, including `Null`.
    Any,
    /// Accepts `Null` or anything the inner type accepts.
    Nullable(Box<ValueType>),
}

impl ValueType {
    pub fn nullable(inner: ValueType) -> Self {
        ValueType::Nullable(Box::new(inner))
    }

    /// Whether an argument with this runtime value can be passed to a
    /// parameter of this type. Exact tag match, no numeric widening.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueType::Any => true,
            ValueType::Nullable(inner) => value.is_null() || inner.accepts(value),
            ty => value.value_type().as_ref() == Some(ty),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Char => write!(f, "char"),
            ValueType::Str => write!(f, "string"),
            ValueType::List => write!(f, "list"),
            ValueType::Any => write!(f, "any"),
            ValueType::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

// ============================================================================
// Rust <-> Value conversions
// ============================================================================

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v as i64)
                }
            }

            impl FromValue for $t {
                fn value_type() -> ValueType {
                    ValueType::Int
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_int().and_then(|i| <$t>::try_from(i).ok())
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32, isize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A Rust type a theory parameter can be bound to.
pub trait FromValue: Sized {
    /// Parameter type advertised to the resolver for this Rust type.
    fn value_type() -> ValueType;

    /// Convert a value, or `None` if it is not representable.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn value_type() -> ValueType {
        ValueType::Any
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for f64 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for f32 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float().map(|f| f as f32)
    }
}

impl FromValue for char {
    fn value_type() -> ValueType {
        ValueType::Char
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn value_type() -> ValueType {
        ValueType::Str
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn value_type() -> ValueType {
        ValueType::nullable(T::value_type())
    }

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Build a [`RawRow`] from a list of expressions convertible into [`Value`].
///
/// ```rust
/// let row = rstheory::row![1, "two", 3.0];
/// assert_eq!(row.len(), 3);
/// ```
#[macro_export]
macro_rules! row {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
