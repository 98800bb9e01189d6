//! `#[security_annotations]`: derives `AnnotatedBean` from an impl block.
//!
//! # Java EE Equivalent
//! JSR-250 annotations on an EJB class and its business methods.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    parse_macro_input, Attribute, Expr, ExprLit, ImplItem, ItemImpl, Lit, Meta, Path, Token, Type,
    Visibility,
};

use crate::access::RoleList;
use crate::helpers::{business_param_types, core_crate_path};

enum Marker {
    DenyAll,
    PermitAll,
    RolesAllowed(Vec<String>),
}

impl Marker {
    fn name(&self) -> &'static str {
        match self {
            Marker::DenyAll => "deny_all",
            Marker::PermitAll => "permit_all",
            Marker::RolesAllowed(_) => "roles_allowed",
        }
    }

    fn to_tokens(&self, core: &TokenStream2) -> TokenStream2 {
        match self {
            Marker::DenyAll => quote! { #core::SecurityMarker::DenyAll },
            Marker::PermitAll => quote! { #core::SecurityMarker::PermitAll },
            Marker::RolesAllowed(roles) => {
                quote! { #core::SecurityMarker::roles_allowed(&[#(#roles),*]) }
            }
        }
    }
}

#[derive(Default)]
struct ClassArgs {
    name: Option<String>,
    markers: Vec<(Marker, Span)>,
    declare_roles: Vec<String>,
    run_as: Option<String>,
    extends: Option<Path>,
}

fn string_value(expr: &Expr, what: &str) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit_str),
            ..
        }) => Ok(lit_str.value()),
        other => Err(syn::Error::new_spanned(
            other,
            format!("{} expects a string literal", what),
        )),
    }
}

fn role_list(tokens: &syn::MetaList, annotation: &str) -> syn::Result<Vec<String>> {
    let roles: RoleList = tokens.parse_args()?;
    roles.check_duplicates(annotation)?;
    Ok(roles.get_roles())
}

fn parse_class_args(attrs: TokenStream2) -> syn::Result<ClassArgs> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(attrs)?;
    let mut args = ClassArgs::default();

    for meta in metas {
        let span = meta.span();
        match &meta {
            Meta::Path(path) if path.is_ident("deny_all") => {
                args.markers.push((Marker::DenyAll, span));
            }
            Meta::Path(path) if path.is_ident("permit_all") => {
                args.markers.push((Marker::PermitAll, span));
            }
            Meta::List(list) if list.path.is_ident("roles_allowed") => {
                let roles = role_list(list, "roles_allowed")?;
                args.markers.push((Marker::RolesAllowed(roles), span));
            }
            Meta::List(list) if list.path.is_ident("declare_roles") => {
                let roles: RoleList = list.parse_args()?;
                args.declare_roles.extend(roles.get_roles());
            }
            Meta::NameValue(nv) if nv.path.is_ident("name") => {
                args.name = Some(string_value(&nv.value, "name")?);
            }
            Meta::NameValue(nv) if nv.path.is_ident("run_as") => {
                args.run_as = Some(string_value(&nv.value, "run_as")?);
            }
            Meta::NameValue(nv) if nv.path.is_ident("extends") => match &nv.value {
                Expr::Path(expr_path) => args.extends = Some(expr_path.path.clone()),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "extends expects the type of the parent bean",
                    ))
                }
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    meta,
                    "expected one of: deny_all, permit_all, roles_allowed(..), declare_roles(..), \
                     run_as = \"..\", extends = Parent, name = \"..\"",
                ))
            }
        }
    }

    check_conflicts(&args.markers, "class")?;
    Ok(args)
}

fn check_conflicts(markers: &[(Marker, Span)], level: &str) -> syn::Result<()> {
    if let [(first, _), (second, span), ..] = markers {
        return Err(syn::Error::new(
            *span,
            format!(
                "#[{}] conflicts with #[{}]: only one security marker is allowed per {}",
                second.name(),
                first.name(),
                level
            ),
        ));
    }
    Ok(())
}

/// Removes method-level markers from `attrs` and returns them.
fn take_markers(attrs: &mut Vec<Attribute>) -> syn::Result<Vec<(Marker, Span)>> {
    let mut markers = Vec::new();
    let mut kept = Vec::new();

    for attr in attrs.drain(..) {
        let span = attr.span();
        if attr.path().is_ident("deny_all") {
            attr.meta.require_path_only()?;
            markers.push((Marker::DenyAll, span));
        } else if attr.path().is_ident("permit_all") {
            attr.meta.require_path_only()?;
            markers.push((Marker::PermitAll, span));
        } else if attr.path().is_ident("roles_allowed") {
            let list = attr.meta.require_list()?;
            markers.push((Marker::RolesAllowed(role_list(list, "roles_allowed")?), span));
        } else {
            kept.push(attr);
        }
    }

    *attrs = kept;
    Ok(markers)
}

fn default_class_name(self_ty: &Type) -> syn::Result<String> {
    if let Type::Path(type_path) = self_ty {
        if let Some(segment) = type_path.path.segments.last() {
            return Ok(segment.ident.to_string());
        }
    }
    Err(syn::Error::new_spanned(
        self_ty,
        "cannot derive a class name for this type, add name = \"..\"",
    ))
}

fn expand(attrs: TokenStream2, mut item_impl: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[security_annotations] must be placed on an inherent impl block",
        ));
    }

    let args = parse_class_args(attrs)?;
    let core = core_crate_path();
    let class_name = match args.name {
        Some(name) => name,
        None => default_class_name(&item_impl.self_ty)?,
    };

    let mut methods = Vec::new();
    for item in item_impl.items.iter_mut() {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let markers = take_markers(&mut method.attrs)?;
        check_conflicts(&markers, "method")?;

        let is_business = matches!(method.vis, Visibility::Public(_));
        if !is_business && markers.is_empty() {
            continue;
        }

        let name = method.sig.ident.to_string();
        let params = business_param_types(&method.sig.inputs);
        let signature = quote! { #core::MethodSignature::new(#name, &[#(#params),*]) };

        methods.push(match markers.first() {
            Some((marker, _)) => {
                let marker = marker.to_tokens(&core);
                quote! { .method_marker(#signature, #marker) }
            }
            None => quote! { .method(#signature) },
        });
    }

    let class_markers = args.markers.iter().map(|(marker, _)| {
        let marker = marker.to_tokens(&core);
        quote! { .class_marker(#marker) }
    });
    let declare_roles = (!args.declare_roles.is_empty()).then(|| {
        let roles = &args.declare_roles;
        quote! { .declare_roles(&[#(#roles),*]) }
    });
    let run_as = args.run_as.as_ref().map(|role| quote! { .run_as(#role) });

    let layer = match &args.extends {
        Some(parent) => quote! {
            <#parent as #core::AnnotatedBean>::annotation_layer().extend(class)
        },
        None => quote! { #core::AnnotationLayer::from_class(class) },
    };

    let self_ty = &item_impl.self_ty;
    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();

    Ok(quote! {
        #item_impl

        impl #impl_generics #core::AnnotatedBean for #self_ty #where_clause {
            fn annotation_layer() -> #core::AnnotationLayer {
                let class = #core::ClassAnnotations::new(#class_name)
                    #(#class_markers)*
                    #declare_roles
                    #run_as
                    #(#methods)*;
                #layer
            }
        }
    })
}

pub fn security_annotations_impl(attrs: TokenStream, input: TokenStream) -> TokenStream {
    let item_impl = parse_macro_input!(input as ItemImpl);

    match expand(attrs.into(), item_impl) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
