//! Type utilities for the derive macro.

const SCALARS: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "f32",
    "f64", "bool", "char",
];

/// Checks if a type is a bare primitive name like `i32`, `bool` or `f64`.
///
/// Qualified paths, generic types and aliases are not recognized; they are
/// assumed to implement `Walk`.
pub(crate) fn is_scalar_type(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    if path.qself.is_some() || path.path.leading_colon.is_some() {
        return false;
    }
    match path.path.segments.iter().collect::<Vec<_>>().as_slice() {
        [segment] if segment.arguments.is_empty() => {
            SCALARS.contains(&segment.ident.to_string().as_str())
        }
        _ => false,
    }
}

/// Checks if a type is `PhantomData<..>`, bare or path-qualified.
pub(crate) fn is_phantom_data(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "PhantomData")
}

/// Fields the generated `shape` never lists.
pub(crate) fn has_no_text(ty: &syn::Type) -> bool {
    is_scalar_type(ty) || is_phantom_data(ty)
}
