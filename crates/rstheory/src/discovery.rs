//! Discovery: expand the test methods of a class into test cases.

use crate::config::DiscoveryConfig;
use crate::expansion::{expand_test_cases, AcceptAll, RowValidator, TestCase, TestMethod};
use crate::registry::ClassRef;
use crate::resolver::ResolveError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Expands test methods into cases with a fixed configuration and row
/// validator.
///
/// ```rust
/// use rstheory::{row, ClassRegistry, Discoverer, TestMethod};
///
/// let mut builder = ClassRegistry::builder();
/// builder
///     .add_class("Calc")
///     .static_method("Sums", || vec![row![1, 2, 3], row![-4, -6, -10]])
///     .done()
///     .unwrap();
/// let registry = builder.build();
///
/// let method = TestMethod::new("CanAdd").member_data("Sums", vec![]);
/// let cases = Discoverer::new()
///     .expand(registry.class("Calc").unwrap(), &method, vec!["CanAdd"])
///     .unwrap();
/// assert_eq!(cases.len(), 2);
/// ```
pub struct Discoverer {
    config: DiscoveryConfig,
    validator: Box<dyn RowValidator + Send + Sync>,
}

impl Discoverer {
    pub fn new() -> Self {
        Discoverer::with_config(DiscoveryConfig::default())
    }

    pub fn with_config(config: DiscoveryConfig) -> Self {
        Discoverer {
            config,
            validator: Box::new(AcceptAll),
        }
    }

    /// Configuration from `RSTHEORY_*` environment variables.
    pub fn from_env() -> Self {
        Discoverer::with_config(DiscoveryConfig::from_env())
    }

    pub fn with_validator(mut self, validator: impl RowValidator + Send + Sync + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn config(&self) -> DiscoveryConfig {
        self.config
    }

    /// Expand one method. `execution_sequence` is shared by all of its
    /// cases.
    pub fn expand<M>(
        &self,
        class: ClassRef<'_>,
        method: &TestMethod,
        execution_sequence: impl Into<Arc<[M]>>,
    ) -> Result<Vec<TestCase<M>>, ResolveError> {
        let cases = expand_test_cases(
            class,
            method,
            execution_sequence.into(),
            self.config,
            self.validator.as_ref(),
        )?;
        debug!(
            class = class.name(),
            method = method.name(),
            cases = cases.len(),
            "expanded test method"
        );
        Ok(cases)
    }

    /// Expand every method of `class`. A method that fails to expand is
    /// recorded in [`Discovery::errors`] and the remaining methods are still
    /// expanded.
    pub fn discover<M, F>(
        &self,
        class: ClassRef<'_>,
        methods: &[TestMethod],
        mut sequence_for: F,
    ) -> Discovery<M>
    where
        F: FnMut(&TestMethod) -> Arc<[M]>,
    {
        let mut discovery = Discovery {
            cases: Vec::new(),
            errors: Vec::new(),
        };
        for method in methods {
            match self.expand(class, method, sequence_for(method)) {
                Ok(cases) => discovery.cases.extend(cases),
                Err(error) => {
                    warn!(class = class.name(), method = method.name(), %error, "discovery failed");
                    discovery.errors.push(MethodError {
                        method: method.name().to_string(),
                        error,
                    });
                }
            }
        }
        discovery
    }
}

impl Default for Discoverer {
    fn default() -> Self {
        Discoverer::new()
    }
}

impl fmt::Debug for Discoverer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discoverer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Discovery failure scoped to one method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodError {
    pub method: String,
    pub error: ResolveError,
}

/// Cases of every method that expanded, plus one error per method that
/// did not.
#[derive(Debug, Clone)]
pub struct Discovery<M> {
    pub cases: Vec<TestCase<M>>,
    pub errors: Vec<MethodError>,
}

impl<M> Discovery<M> {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn cases_for<'a>(&'a self, method: &'a str) -> impl Iterator<Item = &'a TestCase<M>> + 'a {
        self.cases.iter().filter(move |c| c.method == method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingMemberPolicy;
    use crate::expansion::ParameterTypes;
    use crate::registry::ClassRegistry;
    use crate::row;
    use crate::value::ValueType;

    fn registry() -> ClassRegistry {
        let mut b = ClassRegistry::builder();
        b.add_class("Calc")
            .static_method("Sums", || vec![row![1, 2, 3]])
            .static_method("Pairs", || vec![row![1, 2]])
            .done()
            .unwrap();
        b.build()
    }

    fn sequence(method: &TestMethod) -> Arc<[String]> {
        Arc::from(vec![method.name().to_string()])
    }

    #[test]
    fn test_one_failing_method_does_not_stop_others() {
        let registry = registry();
        let methods = [
            TestMethod::new("Missing").member_data("Nope", vec![]),
            TestMethod::new("Add").member_data("Sums", vec![]),
        ];
        let discovery = Discoverer::with_config(DiscoveryConfig::new(MissingMemberPolicy::Error))
            .discover(registry.class("Calc").unwrap(), &methods, sequence);

        assert_eq!(discovery.errors.len(), 1);
        assert_eq!(discovery.errors[0].method, "Missing");
        assert_eq!(discovery.cases_for("Add").count(), 1);
        assert!(!discovery.is_clean());
    }

    #[test]
    fn test_panicking_provider_fails_only_its_method() {
        let mut b = ClassRegistry::builder();
        b.add_class("Calc")
            .static_method("Boom", || -> Vec<crate::value::RawRow> { panic!("provider exploded") })
            .static_method("Sums", || vec![row![1, 2, 3]])
            .done()
            .unwrap();
        let registry = b.build();
        let methods = [
            TestMethod::new("Bad").member_data("Boom", vec![]),
            TestMethod::new("Good").member_data("Sums", vec![]),
        ];
        let discovery =
            Discoverer::new().discover(registry.class("Calc").unwrap(), &methods, sequence);

        assert_eq!(discovery.errors.len(), 1);
        assert_eq!(discovery.errors[0].method, "Bad");
        match &discovery.errors[0].error {
            ResolveError::Provider { member, source, .. } => {
                assert_eq!(member, "Boom");
                assert_eq!(
                    source,
                    &crate::provider::ProviderError::Failed("provider exploded".to_string())
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(discovery.cases_for("Good").count(), 1);
    }

    #[test]
    fn test_validator_is_method_scoped() {
        let registry = registry();
        let methods = [
            TestMethod::new("Add")
                .parameter("a", ValueType::Int)
                .parameter("b", ValueType::Int)
                .parameter("sum", ValueType::Int)
                .member_data("Sums", vec![]),
            TestMethod::new("Pair")
                .parameter("a", ValueType::Int)
                .member_data("Pairs", vec![]),
        ];
        let discovery = Discoverer::new()
            .with_validator(ParameterTypes)
            .discover(registry.class("Calc").unwrap(), &methods, sequence);

        assert_eq!(discovery.cases.len(), 1);
        assert_eq!(discovery.errors.len(), 1);
        assert_eq!(discovery.errors[0].method, "Pair");
    }

    #[test]
    fn test_expansion_is_repeatable() {
        let registry = registry();
        let class = registry.class("Calc").unwrap();
        let method = TestMethod::new("Add").inline_data(row![0, 0, 0]).member_data("Sums", vec![]);
        let discoverer = Discoverer::new();

        let first = discoverer.expand(class, &method, vec![()]).unwrap();
        let second = discoverer.expand(class, &method, vec![()]).unwrap();
        assert_eq!(first, second);
    }
}
