//! Code generation: one module per class, and inside it one module per
//! theory holding a single `#[test] fn runs`.

use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;

use crate::dsl::*;

pub fn generate(input: Theories) -> TokenStream {
    let classes = input.classes.iter().map(generate_class);
    quote! { #(#classes)* }
}

fn generate_class(block: &ClassBlock) -> TokenStream {
    let mod_ident = Ident::new(&sanitize_name(&block.name.value()), Span::call_site());
    let tests = block.items.iter().map(|item| generate_theory(block, item));

    quote! {
        mod #mod_ident {
            use super::*;
            #(#tests)*
        }
    }
}

fn generate_theory(class: &ClassBlock, block: &TheoryBlock) -> TokenStream {
    let mod_ident = Ident::new(&sanitize_name(&block.name.value()), Span::call_site());
    let class_name = &class.name;
    let registry = &class.registry;
    let method_name = &block.name;
    let body = &block.body;

    let test_attr = if block.ignored {
        quote! { #[test] #[ignore] }
    } else {
        quote! { #[test] }
    };

    let parameters = block.params.iter().map(|p| {
        let name = p.name.to_string();
        let ty = &p.ty;
        quote! {
            .parameter(#name, <#ty as rstheory::FromValue>::value_type())
        }
    });

    let sources = block.sources.iter().map(|source| match source {
        SourceDecl::Inline(values) => quote! {
            .inline_data(vec![#(rstheory::Value::from(#values)),*])
        },
        SourceDecl::Member { name, args } => quote! {
            .member_data(#name, vec![#(rstheory::Value::from(#args)),*])
        },
    });

    let names: Vec<_> = block.params.iter().map(|p| &p.name).collect();
    let types: Vec<_> = block.params.iter().map(|p| &p.ty).collect();
    let binding = quote! {
        let (#(#names,)*): (#(#types,)*) = _rstheory_case
            .bind()
            .unwrap_or_else(|e| panic!("cannot bind arguments: {}", e));
    };

    // Theory names become modules so they never shadow user functions
    // reached through `use super::*`.
    quote! {
        mod #mod_ident {
            use super::*;

            #test_attr
            fn runs() {
                let _rstheory_registry = #registry;
                let _rstheory_class = _rstheory_registry
                    .class(#class_name)
                    .unwrap_or_else(|| panic!("class `{}` is not registered", #class_name));
                let _rstheory_method = rstheory::TestMethod::new(#method_name)
                    #(#parameters)*
                    #(#sources)*;
                let _rstheory_cases = rstheory::Discoverer::from_env()
                    .expand(_rstheory_class, &_rstheory_method, vec![#method_name])
                    .unwrap_or_else(|e| panic!("discovery failed for `{}`: {}", #method_name, e));
                rstheory::run_cases(
                    concat!(#class_name, "::", #method_name),
                    &_rstheory_cases,
                    |_rstheory_case| {
                        #binding
                        #body
                    },
                )
                .assert_passed();
            }
        }
    }
}

/// Convert a human-readable name to a valid Rust identifier.
fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();

    // Collapse consecutive underscores and trim
    let mut result = String::new();
    let mut prev_underscore = false;
    for c in sanitized.chars() {
        if c == '_' {
            if !prev_underscore && !result.is_empty() {
                result.push('_');
            }
            prev_underscore = true;
        } else {
            result.push(c);
            prev_underscore = false;
        }
    }

    if result.ends_with('_') {
        result.pop();
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("CanAdd"), "canadd");
        assert_eq!(sanitize_name("adds two numbers"), "adds_two_numbers");
        assert_eq!(sanitize_name("handles -1 correctly"), "handles_1_correctly");
        assert_eq!(sanitize_name("Calc.Sums"), "calc_sums");
        assert_eq!(sanitize_name(""), "unnamed");
        assert_eq!(sanitize_name("123test"), "_123test");
    }

    #[test]
    fn test_generates_module_and_test_fn() {
        let input: Theories = syn::parse_str(
            r#"class "Calc" in registry() { theory "adds" (a: i64) inline_data(1) { } }"#,
        )
        .unwrap();
        let code = generate(input).to_string();
        assert!(code.contains("mod calc"));
        assert!(code.contains("mod adds"));
        assert!(code.contains("fn runs"));
        assert!(code.contains("Discoverer :: from_env"));
    }

    #[test]
    fn test_theory_named_like_a_helper_does_not_define_it() {
        let input: Theories = syn::parse_str(
            r#"class "Calc" in shared_registry() { theory "shared registry" (a: i64) inline_data(1) { } }"#,
        )
        .unwrap();
        let code = generate(input).to_string();
        assert!(code.contains("mod shared_registry"));
        assert!(!code.contains("fn shared_registry"));
        assert!(code.contains("let _rstheory_registry = shared_registry ()"));
    }
}
