//! DSL AST types and `syn::parse::Parse` implementations.

use proc_macro2::TokenStream;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{braced, parenthesized, Expr, Ident, LitStr, Result, Token, Type};

/// Top-level input: one or more class blocks.
#[derive(Debug)]
pub struct Theories {
    pub classes: Vec<ClassBlock>,
}

/// `class "Name" in <registry expr> { items... }`
#[derive(Debug)]
pub struct ClassBlock {
    pub name: LitStr,
    pub registry: Expr,
    pub items: Vec<TheoryBlock>,
}

/// `theory "name" (a: T, ...) <sources> { body }` or `test "name" { body }`.
/// The `x` prefixed forms are ignored.
#[derive(Debug)]
pub struct TheoryBlock {
    pub name: LitStr,
    pub ignored: bool,
    pub params: Vec<TheoryParam>,
    pub sources: Vec<SourceDecl>,
    pub body: TokenStream,
}

#[derive(Debug)]
pub struct TheoryParam {
    pub name: Ident,
    pub ty: Type,
}

#[derive(Debug)]
pub enum SourceDecl {
    /// `inline_data(v1, v2, ...)`
    Inline(Vec<Expr>),
    /// `member_data("Name", arg, ...)`
    Member { name: LitStr, args: Vec<Expr> },
}

impl Parse for Theories {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut classes = Vec::new();
        while !input.is_empty() {
            classes.push(input.parse::<ClassBlock>()?);
        }
        Ok(Theories { classes })
    }
}

impl Parse for ClassBlock {
    fn parse(input: ParseStream) -> Result<Self> {
        let keyword: Ident = input.parse()?;
        if keyword != "class" {
            return Err(syn::Error::new(
                keyword.span(),
                format!("expected `class \"Name\" in <registry> {{ ... }}`, found `{keyword}`"),
            ));
        }
        let name: LitStr = input.parse()?;
        input.parse::<Token![in]>()?;
        let registry = Expr::parse_without_eager_brace(input)?;

        let content;
        braced!(content in input);
        let mut items = Vec::new();
        while !content.is_empty() {
            items.push(content.parse::<TheoryBlock>()?);
        }

        Ok(ClassBlock {
            name,
            registry,
            items,
        })
    }
}

impl Parse for TheoryBlock {
    fn parse(input: ParseStream) -> Result<Self> {
        let ident: Ident = input.parse()?;
        let keyword = ident.to_string();
        let (parameterized, ignored) = match keyword.as_str() {
            "theory" => (true, false),
            "xtheory" => (true, true),
            "test" => (false, false),
            "xtest" => (false, true),
            _ => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!(
                        "unknown DSL keyword `{keyword}`. Expected one of: \
                         theory, test (with optional x prefix to ignore)"
                    ),
                ))
            }
        };

        let name: LitStr = input.parse()?;

        let params = if parameterized && input.peek(syn::token::Paren) {
            parse_params(input)?
        } else {
            Vec::new()
        };

        let mut sources = Vec::new();
        while parameterized && !input.peek(syn::token::Brace) {
            sources.push(parse_source(input)?);
        }

        let body_content;
        braced!(body_content in input);
        let body: TokenStream = body_content.parse()?;

        Ok(TheoryBlock {
            name,
            ignored,
            params,
            sources,
            body,
        })
    }
}

/// Parse: `(a: Type, b: Type, ...)`
fn parse_params(input: ParseStream) -> Result<Vec<TheoryParam>> {
    let content;
    parenthesized!(content in input);
    let mut params = Vec::new();
    while !content.is_empty() {
        let name: Ident = content.parse()?;
        content.parse::<Token![:]>()?;
        let ty: Type = content.parse()?;
        params.push(TheoryParam { name, ty });
        if !content.is_empty() {
            content.parse::<Token![,]>()?;
        }
    }
    Ok(params)
}

/// Parse: `inline_data(...)` or `member_data("Name", ...)`
fn parse_source(input: ParseStream) -> Result<SourceDecl> {
    let decorator: Ident = input.parse()?;
    let content;
    parenthesized!(content in input);
    match decorator.to_string().as_str() {
        "inline_data" => {
            let values = Punctuated::<Expr, Token![,]>::parse_terminated(&content)?;
            Ok(SourceDecl::Inline(values.into_iter().collect()))
        }
        "member_data" => {
            let name: LitStr = content.parse()?;
            let mut args = Vec::new();
            if !content.is_empty() {
                content.parse::<Token![,]>()?;
                let rest = Punctuated::<Expr, Token![,]>::parse_terminated(&content)?;
                args.extend(rest);
            }
            Ok(SourceDecl::Member { name, args })
        }
        other => Err(syn::Error::new(
            decorator.span(),
            format!("unknown data source `{other}`. Expected `inline_data` or `member_data`"),
        )),
    }
}
