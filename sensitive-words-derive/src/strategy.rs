//! Parsing of `#[walk(...)]` field attributes.
//!
//! This module maps attribute syntax to traversal decisions and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, LitStr, Meta, Result};

/// What the generated `shape` does with a field.
///
/// | Attribute | Strategy |
/// |-----------|----------|
/// | None | `Walk { tag: None }` |
/// | `#[walk(tag = "X")]` | `Walk { tag: Some("X") }` |
/// | `#[walk(ignore)]` | `Ignore` |
#[derive(Clone, Debug)]
pub(crate) enum Strategy {
    /// Listed as a child, optionally scoping its subtree to a tag.
    Walk { tag: Option<LitStr> },
    /// Left out of the shape entirely.
    Ignore,
}

fn set_strategy(target: &mut Option<Strategy>, next: Strategy, span: Span) -> Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(
            span,
            "conflicting #[walk] options on the same field",
        ));
    }
    *target = Some(next);
    Ok(())
}

pub(crate) fn parse_field_strategy(attrs: &[Attribute]) -> Result<Strategy> {
    let mut strategy: Option<Strategy> = None;
    for attr in attrs {
        if !attr.path().is_ident("walk") {
            continue;
        }

        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new(
                attr.span(),
                "expected #[walk(ignore)] or #[walk(tag = \"...\")]",
            ));
        };
        list.parse_nested_meta(|meta| {
            if meta.path.is_ident("ignore") {
                set_strategy(&mut strategy, Strategy::Ignore, meta.path.span())
            } else if meta.path.is_ident("tag") {
                let tag: LitStr = meta.value()?.parse()?;
                if tag.value().is_empty() {
                    return Err(syn::Error::new(tag.span(), "a walk tag cannot be empty"));
                }
                set_strategy(&mut strategy, Strategy::Walk { tag: Some(tag) }, meta.path.span())
            } else {
                Err(meta.error("unknown field option; expected `ignore` or `tag`"))
            }
        })?;
    }

    Ok(strategy.unwrap_or(Strategy::Walk { tag: None }))
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_walks_untagged() {
        let strategy = parse_field_strategy(&parse_attrs(quote! {})).unwrap();
        assert!(matches!(strategy, Strategy::Walk { tag: None }));
    }

    #[test]
    fn ignore_is_parsed() {
        let strategy = parse_field_strategy(&parse_attrs(quote! { #[walk(ignore)] })).unwrap();
        assert!(matches!(strategy, Strategy::Ignore));
    }

    #[test]
    fn tag_is_parsed() {
        let strategy =
            parse_field_strategy(&parse_attrs(quote! { #[walk(tag = "SWTest")] })).unwrap();
        match strategy {
            Strategy::Walk { tag: Some(tag) } => assert_eq!(tag.value(), "SWTest"),
            other => panic!("expected a tag, got {other:?}"),
        }
    }

    #[test]
    fn ignore_and_tag_conflict() {
        let result = parse_field_strategy(&parse_attrs(quote! {
            #[walk(ignore)]
            #[walk(tag = "x")]
        }));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("conflicting #[walk] options"));
    }

    #[test]
    fn empty_tag_errors() {
        assert!(parse_field_strategy(&parse_attrs(quote! { #[walk(tag = "")] })).is_err());
    }

    #[test]
    fn bare_and_name_value_forms_error() {
        assert!(parse_field_strategy(&parse_attrs(quote! { #[walk] })).is_err());
        assert!(parse_field_strategy(&parse_attrs(quote! { #[walk = "x"] })).is_err());
    }

    #[test]
    fn unknown_option_errors() {
        let result = parse_field_strategy(&parse_attrs(quote! { #[walk(skip)] }));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown field option"));
    }

    #[test]
    fn other_attributes_ignored() {
        let strategy = parse_field_strategy(&parse_attrs(quote! {
            #[derive(Clone)]
            #[serde(skip)]
        }))
        .unwrap();
        assert!(matches!(strategy, Strategy::Walk { tag: None }));
    }
}
