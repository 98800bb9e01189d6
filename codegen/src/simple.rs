//! Method-level markers: permit_all, deny_all, roles_allowed.
//!
//! # Java EE Equivalents
//! - `@PermitAll` -> `#[permit_all]`
//! - `@DenyAll` -> `#[deny_all]`
//! - `@RolesAllowed({"A", "B"})` -> `#[roles_allowed("A", "B")]`
//!
//! The markers are read and removed by `#[security_annotations]`. Reaching
//! one of these functions means the marker was placed somewhere else.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

fn misplaced(marker: &str, item_fn: &ItemFn) -> TokenStream {
    let error = syn::Error::new_spanned(
        &item_fn.sig.ident,
        format!(
            "#[{}] only applies to methods inside a #[security_annotations] impl block",
            marker
        ),
    )
    .to_compile_error();

    quote! {
        #error
        #item_fn
    }
    .into()
}

pub fn permit_all_impl(_attrs: TokenStream, input: TokenStream) -> TokenStream {
    let item_fn = parse_macro_input!(input as ItemFn);
    misplaced("permit_all", &item_fn)
}

pub fn deny_all_impl(_attrs: TokenStream, input: TokenStream) -> TokenStream {
    let item_fn = parse_macro_input!(input as ItemFn);
    misplaced("deny_all", &item_fn)
}

pub fn roles_allowed_impl(_attrs: TokenStream, input: TokenStream) -> TokenStream {
    let item_fn = parse_macro_input!(input as ItemFn);
    misplaced("roles_allowed", &item_fn)
}
