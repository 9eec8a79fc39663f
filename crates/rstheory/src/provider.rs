//! Provider members: the callables a member data source points at, and the
//! shapes of data they may return.

use crate::collection::{DataRowCollection, FromRaw};
use crate::row::DataRow;
use crate::value::{FromValue, RawRow, Value, ValueType};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Anything that can hand over its rows as untyped data plus metadata.
pub trait RowProducer {
    fn produce_rows(&self) -> Vec<DataRow>;
}

impl RowProducer for Vec<RawRow> {
    fn produce_rows(&self) -> Vec<DataRow> {
        self.iter().cloned().map(DataRow::new).collect()
    }
}

impl<R: FromRaw> RowProducer for DataRowCollection<R> {
    fn produce_rows(&self) -> Vec<DataRow> {
        self.iter()
            .map(|row| DataRow::new(row.data()).with_metadata(row.metadata().clone()))
            .collect()
    }
}

/// The value a provider returned, normalized to rows.
///
/// A `null` return is represented as an empty row set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderOutput {
    rows: Vec<DataRow>,
}

impl ProviderOutput {
    /// Output of a provider that returned nothing.
    pub fn null() -> Self {
        Self::default()
    }

    pub fn from_producer(producer: &dyn RowProducer) -> Self {
        ProviderOutput {
            rows: producer.produce_rows(),
        }
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<DataRow> {
        self.rows
    }
}

/// Return types accepted from provider closures.
pub trait IntoProviderOutput {
    fn into_provider_output(self) -> ProviderOutput;
}

impl IntoProviderOutput for ProviderOutput {
    fn into_provider_output(self) -> ProviderOutput {
        self
    }
}

impl IntoProviderOutput for Vec<RawRow> {
    fn into_provider_output(self) -> ProviderOutput {
        ProviderOutput {
            rows: self.into_iter().map(DataRow::new).collect(),
        }
    }
}

impl<R: FromRaw> IntoProviderOutput for DataRowCollection<R> {
    fn into_provider_output(self) -> ProviderOutput {
        ProviderOutput::from_producer(&self)
    }
}

impl<T: IntoProviderOutput> IntoProviderOutput for Option<T> {
    fn into_provider_output(self) -> ProviderOutput {
        self.map_or_else(ProviderOutput::null, IntoProviderOutput::into_provider_output)
    }
}

// ============================================================================
// Provider callables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("argument {index} ({found}) does not convert to {expected}")]
    Argument {
        index: usize,
        expected: ValueType,
        found: String,
    },

    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("{0}")]
    Failed(String),
}

type InvokeFn = dyn Fn(&[Value]) -> Result<ProviderOutput, ProviderError> + Send + Sync;

/// A type-erased provider body. Receives the full argument list, defaults
/// already filled in.
#[derive(Clone)]
pub struct MemberFn(Arc<InvokeFn>);

impl MemberFn {
    pub fn new(
        f: impl Fn(&[Value]) -> Result<ProviderOutput, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        MemberFn(Arc::new(f))
    }

    /// Call the body. A panic inside it becomes [`ProviderError::Failed`].
    pub fn call(&self, args: &[Value]) -> Result<ProviderOutput, ProviderError> {
        catch_unwind(AssertUnwindSafe(|| (self.0)(args)))
            .unwrap_or_else(|e| Err(ProviderError::Failed(panic_message(e.as_ref()))))
    }
}

pub(crate) fn panic_message(e: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = e.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = e.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl fmt::Debug for MemberFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MemberFn(..)")
    }
}

/// A declared provider parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub ty: ValueType,
    /// Default used when the caller omits this (trailing) argument.
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(ty: ValueType) -> Self {
        ParamSpec { ty, default: None }
    }

    pub fn optional(ty: ValueType, default: impl Into<Value>) -> Self {
        ParamSpec {
            ty,
            default: Some(default.into()),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// Closures usable as provider members. `Args` is a marker tuple of the
/// closure's argument types, so each arity gets its own impl.
pub trait IntoProvider<Args> {
    fn into_provider(self) -> (Vec<ParamSpec>, MemberFn);
}

fn arg<T: FromValue>(args: &[Value], index: usize) -> Result<T, ProviderError> {
    let value = args.get(index).ok_or(ProviderError::ArgumentCount {
        expected: index + 1,
        actual: args.len(),
    })?;
    T::from_value(value).ok_or_else(|| ProviderError::Argument {
        index,
        expected: T::value_type(),
        found: value.to_string(),
    })
}

macro_rules! impl_into_provider {
    ($($name:ident : $idx:tt),*) => {
        impl<Func, Out, $($name),*> IntoProvider<($($name,)*)> for Func
        where
            Func: Fn($($name),*) -> Out + Send + Sync + 'static,
            Out: IntoProviderOutput,
            $($name: FromValue,)*
        {
            #[allow(unused_variables)]
            fn into_provider(self) -> (Vec<ParamSpec>, MemberFn) {
                let params = vec![$(ParamSpec::required($name::value_type())),*];
                let invoke = MemberFn::new(move |args: &[Value]| {
                    Ok(self($(arg::<$name>(args, $idx)?),*).into_provider_output())
                });
                (params, invoke)
            }
        }
    };
}

impl_into_provider!();
impl_into_provider!(A: 0);
impl_into_provider!(A: 0, B: 1);
impl_into_provider!(A: 0, B: 1, C: 2);
impl_into_provider!(A: 0, B: 1, C: 2, D: 3);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{TestData, TypedTestData};
    use crate::row::{RowMetadata, TheoryDataRow, TypedDataRow};

    #[test]
    fn test_typed_collection_normalizes_to_raw_rows() {
        let mut data = TypedTestData::<(i32, i32, i32)>::new();
        data.add((1, 2, 3));
        data.add_row(TypedDataRow::new((-4, -6, -10)).with_metadata(RowMetadata::new().label("neg")));

        let rows = data.into_provider_output().into_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(rows[1].label(), Some("neg"));
    }

    #[test]
    fn test_none_is_empty() {
        let out = None::<TestData>.into_provider_output();
        assert!(out.rows().is_empty());
        assert_eq!(out, ProviderOutput::null());
    }

    #[test]
    fn test_closure_provider_converts_arguments() {
        let (params, invoke) = (|factor: i64| vec![vec![Value::Int(factor * 2)]]).into_provider();
        assert_eq!(params, vec![ParamSpec::required(ValueType::Int)]);

        let out = invoke.call(&[Value::Int(21)]).unwrap();
        assert_eq!(out.rows()[0].values(), &[Value::Int(42)]);

        let err = invoke.call(&[Value::from("x")]).unwrap_err();
        assert!(matches!(err, ProviderError::Argument { index: 0, .. }));
    }

    #[test]
    fn test_zero_arg_provider() {
        let (params, invoke) = (|| Vec::<RawRow>::new()).into_provider();
        assert!(params.is_empty());
        assert!(invoke.call(&[]).unwrap().rows().is_empty());
    }

    #[test]
    fn test_panicking_provider_is_a_failure() {
        let (_, invoke) = (|n: i64| -> Vec<RawRow> { panic!("no rows for {n}") }).into_provider();
        assert_eq!(
            invoke.call(&[Value::Int(3)]).unwrap_err(),
            ProviderError::Failed("no rows for 3".to_string())
        );
    }
}
