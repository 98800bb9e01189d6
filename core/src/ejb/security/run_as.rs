//! Identity used by a bean for the calls it makes to other beans.
//!
//! Order of precedence:
//!
//! 1. the extension run-as mode for the method
//! 2. the descriptor `<security-identity>`
//! 3. `@RunAs` on the class declaring the method, unless metadata-complete
//! 4. the caller's own identity

use crate::ejb::error::ConfigurationError;
use crate::ejb::security::metadata::{BeanMetadata, RunAsMode, SecurityIdentity};
use crate::ejb::security::signature::MethodSignature;

/// Identity for nested invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIdentity {
    /// Propagate the caller.
    AsCaller,
    /// Run as a principal mapped from this role.
    AsRole(String),
}

/// Resolves the run-as identity of `method`.
///
/// Fails when the extension selects `SYSTEM_IDENTITY`, or a specified
/// identity without a role while the bean has no run-as role of its own.
///
/// # Example
/// ```
/// use jacc_ejb_security_core::ejb::security::{
///     resolve_identity, BeanMetadata, DescriptorLayer, MethodSignature, ResolvedIdentity,
/// };
///
/// let metadata = BeanMetadata::builder("BatchBean")
///     .descriptor(DescriptorLayer::new().run_as("Batch"))
///     .build();
///
/// assert_eq!(
///     resolve_identity(&metadata, &MethodSignature::no_args("run")).unwrap(),
///     ResolvedIdentity::AsRole("Batch".into())
/// );
/// ```
pub fn resolve_identity(
    metadata: &BeanMetadata,
    method: &MethodSignature,
) -> Result<ResolvedIdentity, ConfigurationError> {
    if let Some(mode) = metadata.get_extension().mode_for(method) {
        return match mode {
            RunAsMode::CallerIdentity => Ok(ResolvedIdentity::AsCaller),
            RunAsMode::SpecifiedIdentity(Some(role)) => Ok(ResolvedIdentity::AsRole(role.clone())),
            RunAsMode::SpecifiedIdentity(None) => bean_run_as_role(metadata, method)
                .map(|role| ResolvedIdentity::AsRole(role.to_string()))
                .ok_or_else(|| ConfigurationError::MissingSpecifiedRole {
                    bean: metadata.get_name().to_string(),
                    method: method.to_string(),
                }),
            RunAsMode::SystemIdentity => Err(ConfigurationError::SystemIdentityUnsupported {
                bean: metadata.get_name().to_string(),
                method: method.to_string(),
            }),
        };
    }

    match metadata.get_descriptor().get_security_identity() {
        Some(SecurityIdentity::UseCallerIdentity) => return Ok(ResolvedIdentity::AsCaller),
        Some(SecurityIdentity::RunAs(role)) => return Ok(ResolvedIdentity::AsRole(role.clone())),
        None => {}
    }

    if !metadata.is_metadata_complete() {
        if let Some(role) = metadata.get_annotations().run_as_for(method) {
            return Ok(ResolvedIdentity::AsRole(role.to_string()));
        }
    }

    Ok(ResolvedIdentity::AsCaller)
}

/// Bean-level run-as role: descriptor first, then annotations.
fn bean_run_as_role<'a>(metadata: &'a BeanMetadata, method: &MethodSignature) -> Option<&'a str> {
    match metadata.get_descriptor().get_security_identity() {
        Some(SecurityIdentity::RunAs(role)) => Some(role.as_str()),
        Some(SecurityIdentity::UseCallerIdentity) => None,
        None if metadata.is_metadata_complete() => None,
        None => metadata.get_annotations().run_as_for(method),
    }
}
