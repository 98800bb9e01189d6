//! Procedural macros for declaring bean security annotations.
//!
//! # Java EE Equivalents
//!
//! | Java EE | jacc-ejb-security-codegen |
//! |---------|---------------------------|
//! | `@DenyAll` on a class | `#[security_annotations(deny_all)]` |
//! | `@PermitAll` on a class | `#[security_annotations(permit_all)]` |
//! | `@RolesAllowed({"A"})` on a class | `#[security_annotations(roles_allowed("A"))]` |
//! | `@DeclareRoles({"A"})` | `#[security_annotations(declare_roles("A"))]` |
//! | `@RunAs("A")` | `#[security_annotations(run_as = "A")]` |
//! | `class B extends A` | `#[security_annotations(extends = A)]` |
//! | `@PermitAll` on a method | `#[permit_all]` |
//! | `@DenyAll` on a method | `#[deny_all]` |
//! | `@RolesAllowed({"A", "B"})` on a method | `#[roles_allowed("A", "B")]` |
//!
//! # Usage
//!
//! ```ignore
//! use jacc_ejb_security::{roles_allowed, permit_all, security_annotations};
//!
//! pub struct PayrollBean;
//!
//! #[security_annotations(roles_allowed("Manager"), declare_roles("Auditor"))]
//! impl PayrollBean {
//!     #[permit_all]
//!     pub fn get_payslip(&self, employee: &str) -> String { todo!() }
//!
//!     #[roles_allowed("Manager", "Payroll")]
//!     pub fn set_salary(&self, employee: &str, amount: i64) {}
//!
//!     // Class marker applies: Manager only
//!     pub fn close_period(&self) {}
//! }
//! ```
//!
//! Every `pub fn` of the impl block (and every fn carrying a marker) becomes
//! a business method. Its signature is the method name plus its parameter
//! types, without the receiver and any `Invocation` parameter.

use proc_macro::TokenStream;

// Internal modules
mod access;
mod bean;
mod helpers;
mod simple;

/// Generates an `AnnotatedBean` implementation from an inherent impl block.
///
/// # Arguments
/// - `deny_all`, `permit_all`, `roles_allowed(..)`: class-level marker (at most one)
/// - `declare_roles(..)`: roles the bean declares for `is_caller_in_role`
/// - `run_as = ".."`: class-level run-as role
/// - `extends = Parent`: superclass; `Parent` must itself be annotated
/// - `name = ".."`: class name, defaults to the type name
///
/// Conflicting markers on the same method or class, and duplicate roles in
/// one `roles_allowed`, are reported at compile time.
#[proc_macro_attribute]
pub fn security_annotations(attrs: TokenStream, input: TokenStream) -> TokenStream {
    bean::security_annotations_impl(attrs, input)
}

/// Marks a business method as callable by everyone.
///
/// # Java EE Equivalent
/// `@PermitAll`
///
/// Only valid inside a `#[security_annotations]` impl block.
#[proc_macro_attribute]
pub fn permit_all(attrs: TokenStream, input: TokenStream) -> TokenStream {
    simple::permit_all_impl(attrs, input)
}

/// Marks a business method as callable by no one.
///
/// # Java EE Equivalent
/// `@DenyAll`
///
/// Only valid inside a `#[security_annotations]` impl block.
#[proc_macro_attribute]
pub fn deny_all(attrs: TokenStream, input: TokenStream) -> TokenStream {
    simple::deny_all_impl(attrs, input)
}

/// Restricts a business method to callers holding any of the given roles.
///
/// # Java EE Equivalent
/// `@RolesAllowed({"Manager", "Payroll"})`
///
/// # Usage
/// ```ignore
/// #[roles_allowed("Manager", "Payroll")]
/// pub fn set_salary(&self, employee: &str, amount: i64) {}
/// ```
///
/// Only valid inside a `#[security_annotations]` impl block.
#[proc_macro_attribute]
pub fn roles_allowed(attrs: TokenStream, input: TokenStream) -> TokenStream {
    simple::roles_allowed_impl(attrs, input)
}
