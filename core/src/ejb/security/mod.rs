//! Method authorization for enterprise beans.
//!
//! # EJB Equivalent
//! The container's JACC policy for `EJBMethodPermission`,
//! `EJBRoleRefPermission` and run-as propagation.
//!
//! # Module Structure
//!
//! - `signature` - Method signatures and descriptor method patterns
//! - `caller` - Caller principal and roles
//! - `metadata` - Annotation, descriptor and extension layers of a bean
//! - `permission` - Permission resolver (`resolve`)
//! - `role_reference` - Declared roles and `is_in_role`
//! - `run_as` - Run-as resolver (`resolve_identity`)
//! - `identity` - Run-as role to principal mapping
//! - `loader` - JSON descriptor documents
//! - `config` - Engine options
//! - `registry` - Deployed bean snapshots
//! - `interceptor` - Pre-invoke checks and nested calls
//! - `audit` - Security audit logging
//!
//! All resolvers are pure functions of an immutable [`BeanMetadata`]
//! snapshot and may be called from any thread without locking.

pub mod audit;
pub mod caller;
pub mod config;
pub mod identity;
pub mod interceptor;
pub mod loader;
pub mod metadata;
pub mod permission;
pub mod registry;
pub mod role_reference;
pub mod run_as;
pub mod signature;

// Re-exports for convenience
pub use audit::{AuditLogger, SecurityEvent, SecurityEventType};
pub use caller::Caller;
pub use config::SecurityConfig;
pub use identity::{InMemoryRunAsMapper, RunAsIdentityMapper};
pub use interceptor::{Invocation, MethodInterceptor};
pub use loader::{EjbJarDocument, ExtensionDocument};
pub use metadata::{
    AnnotatedBean, AnnotationLayer, AnnotationLevel, BeanMetadata, BeanMetadataBuilder,
    ClassAnnotations, DescriptorCategory, DescriptorLayer, EffectiveMarker, ExtensionLayer,
    PermissionEntry, RunAsMode, SecurityIdentity, SecurityMarker,
};
pub use permission::{
    effective_policy, resolve, Denial, DenialReason, MethodPolicy, PolicySource, PolicyTrace,
    ResolvedDecision,
};
pub use registry::BeanRegistry;
pub use role_reference::{declared_roles, is_in_role, DeclaredRoleSet};
pub use run_as::{resolve_identity, ResolvedIdentity};
pub use signature::{MethodPattern, MethodSignature, Specificity};
