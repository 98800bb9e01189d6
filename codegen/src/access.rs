use std::fmt;

use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Expr, ExprLit, Lit, Token};

/// Role names given to `roles_allowed(...)` or `declare_roles(...)`.
#[derive(Debug)]
pub struct RoleList {
    roles: Vec<(String, Span)>,
}

impl fmt::Display for RoleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.roles.iter().map(|(r, _)| r.as_str()).collect();
        write!(f, "RoleList{{ roles: [{}] }}", names.join(", "))
    }
}

/// Comma-separated string literals or bare identifiers.
/// Example: `#[roles_allowed("Manager", Employee)]`
impl Parse for RoleList {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let args: Punctuated<Expr, Token![,]> = Punctuated::parse_terminated(input)?;

        if args.is_empty() {
            return Err(syn::Error::new(
                Span::call_site(),
                r#"expected at least one role, e.g. roles_allowed("Manager")"#,
            ));
        }

        let mut roles = Vec::new();

        for arg in args {
            match arg {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(lit_str),
                    ..
                }) => {
                    roles.push((lit_str.value(), lit_str.span()));
                }
                Expr::Path(path) => {
                    if let Some(ident) = path.path.get_ident() {
                        roles.push((ident.to_string(), ident.span()));
                    } else {
                        return Err(syn::Error::new_spanned(
                            path,
                            "expected a string literal or identifier",
                        ));
                    }
                }
                _ => {
                    return Err(syn::Error::new_spanned(
                        arg,
                        r#"expected string literal like "Manager" or identifier like Manager"#,
                    ));
                }
            }
        }

        Ok(RoleList { roles })
    }
}

impl RoleList {
    /// Fails on the first role listed twice.
    pub fn check_duplicates(&self, annotation: &str) -> syn::Result<()> {
        for (i, (role, span)) in self.roles.iter().enumerate() {
            if self.roles[..i].iter().any(|(seen, _)| seen == role) {
                return Err(syn::Error::new(
                    *span,
                    format!("role \"{}\" is listed more than once in {}", role, annotation),
                ));
            }
        }
        Ok(())
    }

    pub fn get_roles(&self) -> Vec<String> {
        self.roles.iter().map(|(r, _)| r.clone()).collect()
    }
}
