//! # JACC EJB Security
//!
//! Method authorization for EJB-style beans, following the JACC rules for
//! combining security annotations, deployment descriptors and vendor
//! extension descriptors.
//!
//! This crate provides a unified API combining:
//! - `jacc-ejb-security-core`: metadata model, resolvers, registry and interceptor
//! - `jacc-ejb-security-codegen`: `#[security_annotations]` and the method markers
//!
//! ## Example
//!
//! ```rust,ignore
//! use jacc_ejb_security::prelude::*;
//!
//! pub struct PayrollBean;
//!
//! #[security_annotations(roles_allowed("Manager"), declare_roles("Auditor"))]
//! impl PayrollBean {
//!     #[permit_all]
//!     pub fn get_payslip(&self, employee: &str) -> String {
//!         format!("payslip of {}", employee)
//!     }
//!
//!     pub fn close_period(&self) {}
//! }
//!
//! let registry = Arc::new(BeanRegistry::default());
//! registry.deploy(BeanMetadata::builder("PayrollBean").annotated::<PayrollBean>().build())?;
//!
//! let interceptor = MethodInterceptor::new(registry)
//!     .identity_mapper(InMemoryRunAsMapper::new().with_identity("Batch", "batch-runner"));
//! let caller = Caller::new("alice").roles(&["Manager"]);
//! let invocation = interceptor.pre_invoke("PayrollBean", &MethodSignature::no_args("close_period"), &caller)?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `macros` | Yes | `#[security_annotations]`, `#[permit_all]`, `#[deny_all]`, `#[roles_allowed]` |
//! | `actix` | Yes | `InvocationCaller` extractor and `ResponseError` for `SecurityError` |

// Re-export everything from jacc-ejb-security-core
pub use jacc_ejb_security_core::*;

// Re-export procedural macros when the "macros" feature is enabled
#[cfg(feature = "macros")]
pub use jacc_ejb_security_codegen::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use jacc_ejb_security_core::ejb::error::{ConfigurationError, SecurityError};
    pub use jacc_ejb_security_core::ejb::security::{
        declared_roles, is_in_role, resolve, resolve_identity, AnnotatedBean, BeanMetadata,
        BeanRegistry, Caller, DescriptorLayer, ExtensionLayer, InMemoryRunAsMapper, Invocation,
        MethodInterceptor, MethodPattern, MethodSignature, ResolvedDecision, ResolvedIdentity,
        RunAsMode, SecurityConfig,
    };

    #[cfg(feature = "actix")]
    pub use jacc_ejb_security_core::http::InvocationCaller;

    #[cfg(feature = "macros")]
    pub use jacc_ejb_security_codegen::{deny_all, permit_all, roles_allowed, security_annotations};
}
