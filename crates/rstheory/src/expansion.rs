//! Test case expansion: one test case per resolved data row.

use crate::config::DiscoveryConfig;
use crate::registry::ClassRef;
use crate::resolver::ResolveError;
use crate::row::{BindError, FromRow, RowMetadata};
use crate::source::{DataSource, InlineData, MemberData};
use crate::value::{RawRow, Value, ValueType};
use std::sync::Arc;
use tracing::debug;

/// A declared test method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: ValueType,
}

/// A test method paired with the data sources declared for it, in
/// declaration order.
///
/// ```rust
/// use rstheory::{row, TestMethod, ValueType};
///
/// let method = TestMethod::new("CanAdd")
///     .parameter("a", ValueType::Int)
///     .parameter("b", ValueType::Int)
///     .parameter("expected", ValueType::Int)
///     .inline_data(row![1, 2, 3])
///     .member_data("Sums", vec![]);
/// assert_eq!(method.data_sources().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TestMethod {
    name: String,
    parameters: Vec<Parameter>,
    data_sources: Vec<DataSource>,
}

impl TestMethod {
    pub fn new(name: impl Into<String>) -> Self {
        TestMethod {
            name: name.into(),
            parameters: Vec::new(),
            data_sources: Vec::new(),
        }
    }

    /// Declare parameters from a tuple type, naming them `arg0`, `arg1`, ...
    pub fn with_parameters_of<T: FromRow>(mut self) -> Self {
        self.parameters = T::parameter_types()
            .into_iter()
            .enumerate()
            .map(|(i, ty)| Parameter {
                name: format!("arg{i}"),
                ty,
            })
            .collect();
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn data_source(mut self, source: impl Into<DataSource>) -> Self {
        self.data_sources.push(source.into());
        self
    }

    pub fn inline_data(self, data: RawRow) -> Self {
        self.data_source(InlineData::row(data))
    }

    pub fn inline_data_with(self, data: RawRow, metadata: RowMetadata) -> Self {
        self.data_source(InlineData::row(data).with_metadata(metadata))
    }

    pub fn member_data(self, member_name: impl Into<String>, arguments: Vec<Value>) -> Self {
        self.data_source(MemberData::new(member_name, arguments))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    pub fn is_parameterized(&self) -> bool {
        !self.data_sources.is_empty()
    }
}

/// One concrete invocation: the execution sequence supplied by the runner
/// plus the argument row for this case.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase<M> {
    pub method: String,
    /// Shared by every case of the same method.
    pub execution_sequence: Arc<[M]>,
    pub raw_data_row: RawRow,
    pub metadata: RowMetadata,
}

impl<M> TestCase<M> {
    /// Display name for reporting.
    ///
    /// `test_display_name` wins when set. Otherwise: no label gives
    /// `Method(arg, ...)`, an empty label gives `Method`, any other label
    /// gives `Method [label]`.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.metadata.test_display_name {
            return name.clone();
        }
        match self.metadata.label.as_deref() {
            None => {
                let args: Vec<String> = self.raw_data_row.iter().map(Value::to_string).collect();
                format!("{}({})", self.method, args.join(", "))
            }
            Some("") => self.method.clone(),
            Some(label) => format!("{} [{label}]", self.method),
        }
    }

    /// Bind the raw row to a typed tuple.
    pub fn bind<T: FromRow>(&self) -> Result<T, BindError> {
        T::from_row(&self.raw_data_row)
    }
}

/// Checks a row against the method it will be passed to.
pub trait RowValidator {
    fn validate(&self, method: &TestMethod, row: &[Value]) -> Result<(), String>;
}

/// Accepts every row. Arity and types are left to the runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl RowValidator for AcceptAll {
    fn validate(&self, _method: &TestMethod, _row: &[Value]) -> Result<(), String> {
        Ok(())
    }
}

/// Rejects rows whose arity or value types do not match the declared
/// parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterTypes;

impl RowValidator for ParameterTypes {
    fn validate(&self, method: &TestMethod, row: &[Value]) -> Result<(), String> {
        let params = method.parameters();
        if params.len() != row.len() {
            return Err(format!(
                "expected {} arguments, row has {}",
                params.len(),
                row.len()
            ));
        }
        for (param, value) in params.iter().zip(row) {
            if !param.ty.accepts(value) {
                return Err(format!(
                    "argument `{}` expects {}, got {value}",
                    param.name, param.ty
                ));
            }
        }
        Ok(())
    }
}

/// Expand `method` into test cases.
///
/// Sources are resolved in declaration order and their rows concatenated.
/// A method without sources yields exactly one case with an empty row.
pub fn expand_test_cases<M>(
    class: ClassRef<'_>,
    method: &TestMethod,
    execution_sequence: Arc<[M]>,
    config: DiscoveryConfig,
    validator: &dyn RowValidator,
) -> Result<Vec<TestCase<M>>, ResolveError> {
    if !method.is_parameterized() {
        return Ok(vec![TestCase {
            method: method.name().to_string(),
            execution_sequence,
            raw_data_row: Vec::new(),
            metadata: RowMetadata::default(),
        }]);
    }

    let mut cases = Vec::new();
    for source in method.data_sources() {
        let rows = source.get_data(class, config)?;
        debug!(
            class = class.name(),
            method = method.name(),
            source = %source.describe(),
            rows = rows.len(),
            "data source resolved"
        );
        for row in rows {
            let (raw_data_row, metadata) = row.into_parts();
            validator
                .validate(method, &raw_data_row)
                .map_err(|reason| ResolveError::RowRejected {
                    method: method.name().to_string(),
                    row: cases.len(),
                    reason,
                })?;
            cases.push(TestCase {
                method: method.name().to_string(),
                execution_sequence: Arc::clone(&execution_sequence),
                raw_data_row,
                metadata,
            });
        }
    }

    Ok(cases)
}
