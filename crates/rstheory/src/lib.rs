//! # rstheory: data-driven theories for Rust tests
//!
//! A theory is a test method run once per argument row. Rows come from
//! data sources attached to the method: literal inline rows, or static
//! provider members looked up by name on a registered test class (its base
//! classes and interfaces included).
//!
//! ## Quick example
//!
//! ```rust
//! use rstheory::{row, ClassRegistry, Discoverer, TestMethod, TypedTestData};
//!
//! let mut builder = ClassRegistry::builder();
//! builder
//!     .add_class("Calc")
//!     .static_method("Sums", || {
//!         TypedTestData::<(i64, i64, i64)>::from_iter([(1, 2, 3), (-4, -6, -10)])
//!     })
//!     .done()
//!     .unwrap();
//! let registry = builder.build();
//!
//! let method = TestMethod::new("CanAdd")
//!     .inline_data(row![0, 0, 0])
//!     .member_data("Sums", vec![]);
//! let cases = Discoverer::new()
//!     .expand(registry.class("Calc").unwrap(), &method, vec![()])
//!     .unwrap();
//!
//! for case in &cases {
//!     let (a, b, expected): (i64, i64, i64) = case.bind().unwrap();
//!     assert_eq!(a + b, expected);
//! }
//! assert_eq!(cases.len(), 3);
//! ```
//!
//! With the default `macros` feature the same thing is declared with
//! [`theories!`], which generates one `#[test]` per theory.
//!
//! ## Configuration
//!
//! - `RSTHEORY_MISSING_MEMBER=error` makes a member data source that names
//!   no usable static member a discovery error instead of zero rows.
//!
//! ## Features
//!
//! - `macros` (default): the `theories!` DSL
//! - `googletest`: re-exports `googletest` matchers via `rstheory::matchers`

pub mod collection;
pub mod config;
pub mod discovery;
pub mod expansion;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod row;
pub mod runner;
pub mod source;
pub mod value;

pub use collection::{DataError, DataRowCollection, FromRaw, RowEntry, TestData, TypedTestData};
pub use config::{DiscoveryConfig, MissingMemberPolicy, MISSING_MEMBER_ENV};
pub use discovery::{Discoverer, Discovery, MethodError};
pub use expansion::{
    expand_test_cases, AcceptAll, Parameter, ParameterTypes, RowValidator, TestCase, TestMethod,
};
pub use provider::{
    IntoProvider, IntoProviderOutput, MemberFn, ParamSpec, ProviderError, ProviderOutput,
    RowProducer,
};
pub use registry::{
    ClassBuilder, ClassId, ClassRef, ClassRegistry, ClassRegistryBuilder, MemberDef, MemberKind,
    RegistryError,
};
pub use resolver::{MemberResolver, ResolveError};
pub use row::{
    BindError, DataRow, FromRow, MetadataError, RowData, RowMetadata, RowTuple, TheoryDataRow,
    TypedDataRow,
};
pub use runner::{run_cases, CaseReport};
pub use source::{DataSource, InlineData, MemberData};
pub use value::{FromValue, RawRow, Value, ValueType};

#[cfg(feature = "macros")]
pub use rstheory_macros::theories;

/// Re-export of the [`googletest`] crate. Available with the `googletest` feature.
#[cfg(feature = "googletest")]
pub use googletest;

/// Composable matchers re-exported from [`googletest::prelude`].
#[cfg(feature = "googletest")]
pub mod matchers {
    pub use googletest::prelude::*;
}
