//! Common helper functions for the annotation macros.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{FnArg, PatType, Type};

/// Path of the facade crate as seen from the expansion site.
pub fn core_crate_path() -> TokenStream {
    quote! { ::jacc_ejb_security::ejb::security }
}

/// True for an `Invocation` (or `&Invocation`) parameter, which is the
/// container handle rather than part of the business signature.
pub fn is_invocation_param(pat_type: &PatType) -> bool {
    let ty = match pat_type.ty.as_ref() {
        Type::Reference(reference) => reference.elem.as_ref(),
        other => other,
    };
    if let Type::Path(type_path) = ty {
        let type_name = type_path.path.segments.last().map(|s| s.ident.to_string());
        return type_name.as_deref() == Some("Invocation");
    }
    false
}

/// Parameter type names of a method, without the receiver and the
/// `Invocation` handle.
pub fn business_param_types<'a>(inputs: impl IntoIterator<Item = &'a FnArg>) -> Vec<String> {
    inputs
        .into_iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat_type) if !is_invocation_param(pat_type) => {
                Some(type_name(&pat_type.ty))
            }
            _ => None,
        })
        .collect()
}

/// Source form of a type with all whitespace removed.
pub fn type_name(ty: &Type) -> String {
    quote!(#ty).to_string().split_whitespace().collect()
}
