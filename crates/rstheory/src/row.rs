//! Data rows: one invocation's arguments plus optional per-row metadata.

use crate::value::{FromValue, RawRow, Value, ValueType};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Uniform accessor for the arguments a row carries, whatever its shape.
pub trait RowData {
    /// The row's values as an untyped, ordered sequence.
    fn data(&self) -> RawRow;
}

// ============================================================================
// Metadata
// ============================================================================

/// Optional per-row metadata. Carried through to test cases; the resolver
/// only checks that `skip_when` and `skip_unless` are not both set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMetadata {
    /// Run the row only when explicitly requested. `None` inherits from the test.
    pub explicit: Option<bool>,
    /// Label used to format the display name of the row.
    pub label: Option<String>,
    /// Skip reason. When `skip_when`/`skip_unless` is set, skipping is conditional.
    pub skip: Option<String>,
    /// Class that owns the skip condition members. Defaults to the test class.
    pub skip_type: Option<String>,
    /// Static boolean member; the row is skipped unless it returns `true`.
    pub skip_unless: Option<String>,
    /// Static boolean member; the row is skipped when it returns `true`.
    pub skip_when: Option<String>,
    /// Replaces the generated display name entirely.
    pub test_display_name: Option<String>,
    /// Timeout in milliseconds. Only values greater than zero are meaningful.
    pub timeout: Option<u32>,
    pub traits: BTreeMap<String, BTreeSet<String>>,
}

impl RowMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn explicit(mut self, explicit: bool) -> Self {
        self.explicit = Some(explicit);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    pub fn skip_type(mut self, class_name: impl Into<String>) -> Self {
        self.skip_type = Some(class_name.into());
        self
    }

    pub fn skip_unless(mut self, member: impl Into<String>) -> Self {
        self.skip_unless = Some(member.into());
        self
    }

    pub fn skip_when(mut self, member: impl Into<String>) -> Self {
        self.skip_when = Some(member.into());
        self
    }

    pub fn test_display_name(mut self, name: impl Into<String>) -> Self {
        self.test_display_name = Some(name.into());
        self
    }

    pub fn timeout(mut self, ms: u32) -> Self {
        self.timeout = Some(ms);
        self
    }

    /// Add a trait value. Repeated keys accumulate values as a set.
    pub fn add_trait(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.traits.entry(key.into()).or_default().insert(value.into());
        self
    }

    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == RowMetadata::default()
    }

    /// Reject `skip_when` and `skip_unless` set on the same row.
    pub fn validate(&self) -> Result<(), MetadataError> {
        match (&self.skip_when, &self.skip_unless) {
            (Some(when), Some(unless)) => Err(MetadataError::ConflictingSkip {
                skip_when: when.clone(),
                skip_unless: unless.clone(),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetadataError {
    #[error("row sets both skip_when ({skip_when}) and skip_unless ({skip_unless}); only one may be set")]
    ConflictingSkip {
        skip_when: String,
        skip_unless: String,
    },
}

/// A data row with the full per-row metadata surface.
pub trait TheoryDataRow: RowData {
    fn metadata(&self) -> &RowMetadata;

    fn explicit(&self) -> Option<bool> {
        self.metadata().explicit
    }

    fn label(&self) -> Option<&str> {
        self.metadata().label.as_deref()
    }

    fn skip(&self) -> Option<&str> {
        self.metadata().skip.as_deref()
    }

    fn skip_type(&self) -> Option<&str> {
        self.metadata().skip_type.as_deref()
    }

    fn skip_unless(&self) -> Option<&str> {
        self.metadata().skip_unless.as_deref()
    }

    fn skip_when(&self) -> Option<&str> {
        self.metadata().skip_when.as_deref()
    }

    fn test_display_name(&self) -> Option<&str> {
        self.metadata().test_display_name.as_deref()
    }

    fn timeout(&self) -> Option<u32> {
        self.metadata().timeout
    }

    fn traits(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.metadata().traits
    }
}

// ============================================================================
// Untyped row
// ============================================================================

/// A row of untyped values of any arity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRow {
    values: RawRow,
    metadata: RowMetadata,
}

impl DataRow {
    pub fn new(values: RawRow) -> Self {
        DataRow {
            values,
            metadata: RowMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: RowMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }

    pub fn into_parts(self) -> (RawRow, RowMetadata) {
        (self.values, self.metadata)
    }
}

impl From<RawRow> for DataRow {
    fn from(values: RawRow) -> Self {
        DataRow::new(values)
    }
}

impl RowData for DataRow {
    fn data(&self) -> RawRow {
        self.values.clone()
    }
}

impl TheoryDataRow for DataRow {
    fn metadata(&self) -> &RowMetadata {
        &self.metadata
    }
}

// ============================================================================
// Typed rows
// ============================================================================

/// A tuple usable as the payload of a [`TypedDataRow`].
pub trait RowTuple: Clone {
    const ARITY: usize;

    fn to_raw(&self) -> RawRow;
}

/// A tuple a raw row can be bound to, one [`FromValue`] element per argument.
pub trait FromRow: Sized {
    /// Declared parameter types, in order.
    fn parameter_types() -> Vec<ValueType>;

    fn from_row(row: &[Value]) -> Result<Self, BindError>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("row has {actual} values but {expected} parameters are declared")]
    Arity { expected: usize, actual: usize },

    #[error("argument {index} ({found}) cannot be bound to a parameter of type {expected}")]
    Type {
        index: usize,
        expected: ValueType,
        found: String,
    },
}

fn bind_at<T: FromValue>(row: &[Value], index: usize) -> Result<T, BindError> {
    T::from_value(&row[index]).ok_or_else(|| BindError::Type {
        index,
        expected: T::value_type(),
        found: row[index].to_string(),
    })
}

impl FromRow for () {
    fn parameter_types() -> Vec<ValueType> {
        Vec::new()
    }

    fn from_row(row: &[Value]) -> Result<Self, BindError> {
        if row.is_empty() {
            Ok(())
        } else {
            Err(BindError::Arity {
                expected: 0,
                actual: row.len(),
            })
        }
    }
}

macro_rules! impl_tuple_rows {
    ($arity:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name),+> RowTuple for ($($name,)+)
        where
            $($name: Clone + Into<Value>),+
        {
            const ARITY: usize = $arity;

            fn to_raw(&self) -> RawRow {
                vec![$(self.$idx.clone().into()),+]
            }
        }

        impl<$($name),+> FromRow for ($($name,)+)
        where
            $($name: FromValue),+
        {
            fn parameter_types() -> Vec<ValueType> {
                vec![$($name::value_type()),+]
            }

            fn from_row(row: &[Value]) -> Result<Self, BindError> {
                if row.len() != $arity {
                    return Err(BindError::Arity {
                        expected: $arity,
                        actual: row.len(),
                    });
                }
                Ok(($(bind_at::<$name>(row, $idx)?,)+))
            }
        }
    };
}

impl_tuple_rows!(1; A: 0);
impl_tuple_rows!(2; A: 0, B: 1);
impl_tuple_rows!(3; A: 0, B: 1, C: 2);
impl_tuple_rows!(4; A: 0, B: 1, C: 2, D: 3);
impl_tuple_rows!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple_rows!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_tuple_rows!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_tuple_rows!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

/// A row whose values are a strongly typed tuple. Arity is fixed by `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedDataRow<T: RowTuple> {
    data: T,
    metadata: RowMetadata,
}

impl<T: RowTuple> TypedDataRow<T> {
    pub fn new(data: T) -> Self {
        TypedDataRow {
            data,
            metadata: RowMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: RowMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The values as a typed tuple.
    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T: RowTuple> From<T> for TypedDataRow<T> {
    fn from(data: T) -> Self {
        TypedDataRow::new(data)
    }
}

impl<T: RowTuple> RowData for TypedDataRow<T> {
    fn data(&self) -> RawRow {
        self.data.to_raw()
    }
}

impl<T: RowTuple> TheoryDataRow for TypedDataRow<T> {
    fn metadata(&self) -> &RowMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_row_exposes_tuple_and_raw_data() {
        let row = TypedDataRow::new((1i32, "a", 2.5f64));
        assert_eq!(row.data(), &(1, "a", 2.5));
        assert_eq!(
            RowData::data(&row),
            vec![Value::Int(1), Value::Str("a".into()), Value::Float(2.5)]
        );
        assert_eq!(<(i32, &str, f64) as RowTuple>::ARITY, 3);
    }

    #[test]
    fn test_metadata_accessors() {
        let row = DataRow::new(vec![Value::Int(1)]).with_metadata(
            RowMetadata::new()
                .label("one")
                .timeout(250)
                .add_trait("category", "fast")
                .add_trait("category", "unit")
                .add_trait("category", "fast"),
        );
        assert_eq!(row.label(), Some("one"));
        assert_eq!(row.timeout(), Some(250));
        assert_eq!(row.traits()["category"].len(), 2);
        assert_eq!(row.skip(), None);
    }

    #[test]
    fn test_conflicting_skip_conditions_rejected() {
        let meta = RowMetadata::new().skip_when("IsCi").skip_unless("IsLinux");
        assert!(matches!(
            meta.validate(),
            Err(MetadataError::ConflictingSkip { .. })
        ));
        assert!(RowMetadata::new().skip_when("IsCi").validate().is_ok());
    }

    #[test]
    fn test_bind_checks_arity_and_types() {
        let row = vec![Value::Int(1), Value::Int(2)];
        assert_eq!(<(i64, i64)>::from_row(&row), Ok((1, 2)));
        assert_eq!(
            <(i64,)>::from_row(&row),
            Err(BindError::Arity {
                expected: 1,
                actual: 2
            })
        );
        assert!(matches!(
            <(i64, String)>::from_row(&row),
            Err(BindError::Type { index: 1, .. })
        ));
        assert_eq!(<()>::from_row(&[]), Ok(()));
    }

    #[test]
    fn test_parameter_types_follow_tuple_order() {
        assert_eq!(
            <(bool, Option<String>)>::parameter_types(),
            vec![ValueType::Bool, ValueType::nullable(ValueType::Str)]
        );
    }
}
