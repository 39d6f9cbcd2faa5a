//! Enum-specific `Walk` derivation.
//!
//! One match arm per variant; a variant with nothing to walk, or marked
//! `#[walk(ignore)]`, is opaque.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, Result};

use crate::{
    container::parse_container_options,
    fields::{walked_fields, DeriveContext},
    ShapeBodies,
};

pub(crate) fn derive_enum(ctx: &mut DeriveContext<'_>, data: &DataEnum) -> Result<ShapeBodies> {
    let root = ctx.root;
    if data.variants.is_empty() {
        return Ok(ShapeBodies {
            shape: quote! { match *self {} },
            shape_mut: quote! { match *self {} },
        });
    }

    let mut arms: Vec<TokenStream> = Vec::new();
    let mut arms_mut: Vec<TokenStream> = Vec::new();
    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let ignored = parse_container_options(&variant.attrs)?.ignore;
        let fields = if ignored {
            None
        } else {
            Some(walked_fields(ctx, &variant.fields)?).filter(|fields| !fields.is_empty())
        };

        match fields {
            Some(fields) => {
                let pattern = fields.pattern();
                let ShapeBodies { shape, shape_mut } = fields.children(root);
                arms.push(quote! { Self::#variant_ident #pattern => #shape });
                arms_mut.push(quote! { Self::#variant_ident #pattern => #shape_mut });
            }
            None => {
                arms.push(quote! { Self::#variant_ident { .. } => #root::walk::Shape::Opaque });
                arms_mut.push(quote! { Self::#variant_ident { .. } => #root::walk::ShapeMut::Opaque });
            }
        }
    }

    Ok(ShapeBodies {
        shape: quote! {
            match self {
                #(#arms),*
            }
        },
        shape_mut: quote! {
            match self {
                #(#arms_mut),*
            }
        },
    })
}
