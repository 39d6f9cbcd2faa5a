//! Derive macro for `sensitive-words`.
//!
//! This crate generates the `Walk` implementation behind `#[derive(Walk)]`. It:
//! - reads `#[walk(...)]` container, variant and field attributes
//! - emits `shape` / `shape_mut` bodies listing the fields worth scanning
//!
//! It does **not** match or rewrite anything. Policies live in the main
//! `sensitive-words` crate and are applied at runtime by its resolver.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod container;
mod derive_enum;
mod derive_struct;
mod fields;
mod generics;
mod strategy;
mod types;
use container::{parse_container_options, ContainerOptions};
use derive_enum::derive_enum;
use derive_struct::derive_struct;
use fields::DeriveContext;
use generics::add_walk_bounds;

/// Derives `sensitive_words::Walk` for structs and enums.
///
/// # Container Attributes
///
/// - `#[walk(ignore)]` - The whole type is opaque to the resolver. Also accepted on enum variants.
///
/// # Field Attributes
///
/// - **No annotation**: The field is walked. Its type must implement `Walk`; strings, std
///   containers, `Arc<RwLock<T>>` / `Arc<Mutex<T>>` and other derived types do.
///
/// - `#[walk(ignore)]`: The field is skipped. Use this for external types that do not implement
///   `Walk`, or for text that must never be rewritten.
///
/// - `#[walk(tag = "X")]`: The field's subtree only sees policies tagged `"X"` and untagged
///   policies. A nested tag replaces the outer one.
///
/// Scalar fields (`i32`, `bool`, `char`, ...) and `PhantomData` are skipped without an
/// annotation; tagging one is an error. Unions are rejected at compile time.
///
/// # Bounds
///
/// Type parameters appearing in walked fields are bounded by `Walk`. Every type parameter is
/// bounded by `Send + Sync`.
#[proc_macro_derive(Walk, attributes(walk))]
pub fn derive_walk(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the `sensitive-words` crate root.
///
/// Handles crate renaming (e.g., `words = { package = "sensitive-words", ... }`).
/// Inside the crate itself the path resolves through its
/// `extern crate self as sensitive_words`, which also covers doc tests.
fn crate_root() -> TokenStream {
    match crate_name("sensitive-words") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::sensitive_words },
    }
}

/// `shape` and `shape_mut` bodies.
pub(crate) struct ShapeBodies {
    pub(crate) shape: TokenStream,
    pub(crate) shape_mut: TokenStream,
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let ContainerOptions { ignore } = parse_container_options(&attrs)?;
    let root = crate_root();

    let mut used_generics = Vec::new();
    let mut ctx = DeriveContext {
        root: &root,
        generics: &generics,
        used_generics: &mut used_generics,
    };
    let bodies = match &data {
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "`Walk` cannot be derived for unions",
            ));
        }
        _ if ignore => ShapeBodies {
            shape: quote! { #root::walk::Shape::Opaque },
            shape_mut: quote! { #root::walk::ShapeMut::Opaque },
        },
        Data::Struct(data) => derive_struct(&mut ctx, data)?,
        Data::Enum(data) => derive_enum(&mut ctx, data)?,
    };

    let walk_generics = add_walk_bounds(generics.clone(), &used_generics, &root);
    let (impl_generics, ty_generics, where_clause) = walk_generics.split_for_impl();
    let ShapeBodies { shape, shape_mut } = bodies;

    Ok(quote! {
        impl #impl_generics #root::walk::Walk for #ident #ty_generics #where_clause {
            fn shape(&self) -> #root::walk::Shape<'_> {
                #shape
            }

            fn shape_mut(&mut self) -> #root::walk::ShapeMut<'_> {
                #shape_mut
            }
        }
    })
}
