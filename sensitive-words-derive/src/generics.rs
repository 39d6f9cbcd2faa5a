//! Generic type parameter handling and trait bound management.
//!
//! `Walk` bounds go only on parameters that appear in walked fields.
//! `PhantomData<T>` is never walked, so `T` stays unbounded there:
//!
//! ```ignore
//! #[derive(Walk)]
//! struct TypedId<T> {
//!     id: String,
//!     _marker: PhantomData<T>,  // T does not need Walk
//! }
//! ```
//!
//! `Walk` requires `Send + Sync`, so every type parameter gets those bounds.

use proc_macro2::TokenStream;
use syn::{parse_quote, Ident};

/// Pushes every type parameter of `generics` that `ty` mentions onto `result`.
pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            for segment in &path.path.segments {
                if segment.ident == "PhantomData" {
                    return;
                }
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let syn::GenericArgument::Type(inner) = arg {
                            collect_generics_from_type(inner, generics, result);
                        }
                    }
                }
            }
            if let Some(first) = path.path.segments.first() {
                for param in generics.type_params() {
                    if first.ident == param.ident && !result.contains(&param.ident) {
                        result.push(param.ident.clone());
                    }
                }
            }
        }
        syn::Type::Array(array) => collect_generics_from_type(&array.elem, generics, result),
        syn::Type::Paren(paren) => collect_generics_from_type(&paren.elem, generics, result),
        syn::Type::Group(group) => collect_generics_from_type(&group.elem, generics, result),
        _ => {}
    }
}

/// Adds `Walk` to parameters in `walked` and `Send + Sync` to all of them.
pub(crate) fn add_walk_bounds(
    mut generics: syn::Generics,
    walked: &[Ident],
    root: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if walked.contains(&param.ident) {
            param.bounds.push(parse_quote!(#root::walk::Walk));
        } else {
            param.bounds.push(parse_quote!(::core::marker::Send));
            param.bounds.push(parse_quote!(::core::marker::Sync));
        }
    }
    generics
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn generics(tokens: proc_macro2::TokenStream) -> syn::Generics {
        syn::parse2(tokens).expect("should parse as Generics")
    }

    fn collect(ty: proc_macro2::TokenStream, generics: &syn::Generics) -> Vec<String> {
        let ty: syn::Type = syn::parse2(ty).expect("should parse as Type");
        let mut result = Vec::new();
        collect_generics_from_type(&ty, generics, &mut result);
        result.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn nested_parameters_are_found() {
        let params = generics(quote! { <K, V, U> });
        assert_eq!(collect(quote! { HashMap<K, Vec<V>> }, &params), vec!["K", "V"]);
        assert_eq!(collect(quote! { [U; 4] }, &params), vec!["U"]);
    }

    #[test]
    fn phantom_data_is_skipped() {
        let params = generics(quote! { <T> });
        assert!(collect(quote! { PhantomData<T> }, &params).is_empty());
        assert!(collect(quote! { std::marker::PhantomData<T> }, &params).is_empty());
    }

    #[test]
    fn bounds_split_by_use() {
        let root = quote! { ::sensitive_words };
        let walked: Vec<Ident> = vec![parse_quote!(T)];
        let bounded = add_walk_bounds(generics(quote! { <T, M> }), &walked, &root);
        let params: Vec<_> = bounded.type_params().collect();
        assert_eq!(params[0].bounds.len(), 1);
        assert_eq!(params[1].bounds.len(), 2);
    }
}
