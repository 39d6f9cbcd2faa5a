//! Struct-specific `Walk` derivation.

use quote::quote;
use syn::{DataStruct, Result};

use crate::{
    fields::{walked_fields, DeriveContext},
    ShapeBodies,
};

pub(crate) fn derive_struct(ctx: &mut DeriveContext<'_>, data: &DataStruct) -> Result<ShapeBodies> {
    let root = ctx.root;
    let fields = walked_fields(ctx, &data.fields)?;
    if fields.is_empty() {
        return Ok(ShapeBodies {
            shape: quote! { #root::walk::Shape::Opaque },
            shape_mut: quote! { #root::walk::ShapeMut::Opaque },
        });
    }

    let pattern = fields.pattern();
    let ShapeBodies { shape, shape_mut } = fields.children(root);
    Ok(ShapeBodies {
        shape: quote! {
            let Self #pattern = self;
            #shape
        },
        shape_mut: quote! {
            let Self #pattern = self;
            #shape_mut
        },
    })
}
