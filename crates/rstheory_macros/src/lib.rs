//! Proc macros for the `rstheory` data-driven testing crate.

mod codegen;
mod dsl;

/// Declare theories on registered test classes.
///
/// Each `class` block becomes a module. Each `theory` or `test` becomes a
/// nested module holding one `#[test] fn runs`, which expands its data
/// sources through
/// `rstheory::Discoverer::from_env()` and runs the body once per row.
///
/// # Example
///
/// ```text
/// fn calc_registry() -> rstheory::ClassRegistry {
///     let mut b = rstheory::ClassRegistry::builder();
///     b.add_class("Calc")
///         .static_method("Sums", || vec![rstheory::row![1, 2, 3]])
///         .done()
///         .unwrap();
///     b.build()
/// }
///
/// rstheory::theories! {
///     class "Calc" in calc_registry() {
///         theory "adds" (a: i64, b: i64, expected: i64)
///             inline_data(2, 2, 4)
///             member_data("Sums")
///         {
///             assert_eq!(a + b, expected);
///         }
///
///         test "plain" { assert!(true); }
///     }
/// }
/// ```
///
/// # Supported DSL keywords
///
/// - `class "Name" in <expr> { ... }`: `<expr>` evaluates to a
///   `ClassRegistry` (or a reference to one) that contains `"Name"`
/// - `theory "name" (param: Type, ...) <sources> { body }`
/// - `test "name" { body }`: a single case with no arguments
/// - `xtheory` / `xtest`: emitted with `#[ignore]`
///
/// ## Data sources (on `theory`)
/// - `inline_data(v1, v2, ...)`: one literal row; every value goes through
///   `rstheory::Value::from`
/// - `member_data("Member", arg, ...)`: rows from a static provider member
///   on the class, its bases or its interfaces
///
/// Rows from all sources run in declaration order.
#[proc_macro]
pub fn theories(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let theories = syn::parse_macro_input!(input as dsl::Theories);
    codegen::generate(theories).into()
}
