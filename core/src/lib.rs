//! # JACC EJB Security Core
//!
//! Method authorization policy engine for EJB-style beans.
//!
//! A bean's security metadata arrives in four layers: security annotations
//! (with a superclass chain), an ejb-jar style deployment descriptor, a vendor
//! extension descriptor, and the descriptor's `metadata-complete` flag. This
//! crate turns those layers into three answers:
//!
//! - may this caller invoke this method ([`ejb::security::resolve`])
//! - which identity does a nested invocation run as ([`ejb::security::resolve_identity`])
//! - which roles may the method body query ([`ejb::security::is_in_role`])
//!
//! ## Modules
//!
//! - [`ejb::security`] - metadata model, resolvers, registry and interceptor
//! - [`ejb::error`] - error types
//! - `http` - Actix Web glue (`actix` feature)

pub mod ejb;

#[cfg(feature = "actix")]
pub mod http;
