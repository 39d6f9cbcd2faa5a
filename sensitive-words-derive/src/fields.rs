//! Field lists shared by struct and enum derivation.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::{spanned::Spanned, Fields, Result};

use crate::{
    generics::collect_generics_from_type,
    strategy::{parse_field_strategy, Strategy},
    types::has_no_text,
    ShapeBodies,
};

/// State shared across every field of one derive.
pub(crate) struct DeriveContext<'a> {
    pub(crate) root: &'a TokenStream,
    pub(crate) generics: &'a syn::Generics,
    /// Type parameters that need a `Walk` bound.
    pub(crate) used_generics: &'a mut Vec<Ident>,
}

/// The walked fields of a struct or variant.
pub(crate) struct WalkedFields {
    /// Brace pattern binding each walked field, e.g. `{ name: name, 0: __field0, .. }`.
    pattern: TokenStream,
    children: Vec<TokenStream>,
    children_mut: Vec<TokenStream>,
}

impl WalkedFields {
    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// `Shape::Children(..)` / `ShapeMut::Children(..)` over the bindings.
    pub(crate) fn children(&self, root: &TokenStream) -> ShapeBodies {
        let Self {
            children,
            children_mut,
            ..
        } = self;
        ShapeBodies {
            shape: quote! { #root::walk::Shape::Children(::std::vec![#(#children),*]) },
            shape_mut: quote! { #root::walk::ShapeMut::Children(::std::vec![#(#children_mut),*]) },
        }
    }

    pub(crate) fn pattern(&self) -> &TokenStream {
        &self.pattern
    }
}

pub(crate) fn walked_fields(ctx: &mut DeriveContext<'_>, fields: &Fields) -> Result<WalkedFields> {
    let root = ctx.root;
    let mut bindings = Vec::new();
    let mut children = Vec::new();
    let mut children_mut = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let tag = match parse_field_strategy(&field.attrs)? {
            Strategy::Ignore => continue,
            Strategy::Walk { tag } => tag,
        };
        if has_no_text(&field.ty) {
            if let Some(tag) = tag {
                return Err(syn::Error::new(
                    tag.span(),
                    "#[walk(tag)] on a field without text; use #[walk(ignore)] or drop the tag",
                ));
            }
            continue;
        }

        let span = field.span();
        let (member, binding) = match &field.ident {
            Some(ident) => (quote! { #ident }, ident.clone()),
            None => {
                let member = syn::Index::from(index);
                (quote! { #member }, format_ident!("__field{index}"))
            }
        };
        bindings.push(quote! { #member: #binding });

        match &tag {
            Some(tag) => {
                children.push(quote_spanned! { span =>
                    #root::walk::Child::tagged(#binding, #tag)
                });
                children_mut.push(quote_spanned! { span =>
                    #root::walk::ChildMut::tagged(#binding, #tag)
                });
            }
            None => {
                children.push(quote_spanned! { span => #root::walk::Child::new(#binding) });
                children_mut.push(quote_spanned! { span => #root::walk::ChildMut::new(#binding) });
            }
        }
        collect_generics_from_type(&field.ty, ctx.generics, ctx.used_generics);
    }

    Ok(WalkedFields {
        pattern: quote! { { #(#bindings,)* .. } },
        children,
        children_mut,
    })
}
