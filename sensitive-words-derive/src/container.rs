//! Container-level attribute parsing for `#[derive(Walk)]`.
//!
//! Handles `#[walk(...)]` on the struct/enum itself and on enum variants.

use syn::{Attribute, Meta, Result};

/// Options parsed from container-level `#[walk(...)]` attributes.
#[derive(Clone, Debug, Default)]
pub(crate) struct ContainerOptions {
    /// The type (or variant) is opaque: nothing inside is scanned.
    pub(crate) ignore: bool,
}

/// Parses container-level `#[walk(...)]` attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("walk") {
            continue;
        }

        match &attr.meta {
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("ignore") {
                        options.ignore = true;
                        Ok(())
                    } else {
                        Err(meta.error(format!(
                            "unknown container option `{}`; expected `ignore`",
                            meta.path
                                .get_ident()
                                .map_or_else(|| "?".to_string(), ToString::to_string)
                        )))
                    }
                })?;
            }
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    "bare #[walk] has no meaning on a container; expected #[walk(ignore)]",
                ));
            }
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "name-value syntax is not supported for container-level #[walk]",
                ));
            }
        }
    }

    Ok(options)
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
    fn no_attribute_returns_defaults() {
        let options = parse_container_options(&parse_attrs(quote! {})).unwrap();
        assert!(!options.ignore);
    }

    #[test]
    fn ignore_is_parsed() {
        let options = parse_container_options(&parse_attrs(quote! { #[walk(ignore)] })).unwrap();
        assert!(options.ignore);
    }

    #[test]
    fn tag_on_container_errors() {
        let result = parse_container_options(&parse_attrs(quote! { #[walk(tag = "x")] }));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown container option"));
    }

    #[test]
    fn bare_walk_errors() {
        assert!(parse_container_options(&parse_attrs(quote! { #[walk] })).is_err());
    }

    #[test]
    fn other_attributes_ignored() {
        let options =
            parse_container_options(&parse_attrs(quote! { #[derive(Clone)] #[serde(default)] }))
                .unwrap();
        assert!(!options.ignore);
    }
}
