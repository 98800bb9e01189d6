//! Deployment-time checks of a bean's metadata.

use std::collections::BTreeSet;

use crate::ejb::error::ConfigurationError;
use crate::ejb::security::config::SecurityConfig;
use crate::ejb::security::metadata::{BeanMetadata, DescriptorCategory};
use crate::ejb::security::run_as::resolve_identity;
use crate::ejb::security::signature::MethodSignature;

/// Validates a bean before it is published.
///
/// Annotation placement rules are checked unless the descriptor is
/// metadata-complete, in which case annotations are never read. Role
/// references and run-as identities are only checked when enabled in
/// `config`.
pub fn validate(metadata: &BeanMetadata, config: &SecurityConfig) -> Result<(), ConfigurationError> {
    if !metadata.is_metadata_complete() {
        metadata.get_annotations().validate()?;
    }

    if config.is_validate_role_references() {
        validate_role_references(metadata)?;
    }

    if config.is_reject_system_identity_at_deploy() {
        for method in metadata.get_business_methods() {
            resolve_identity(metadata, method)?;
        }
    }

    Ok(())
}

fn validate_role_references(metadata: &BeanMetadata) -> Result<(), ConfigurationError> {
    let descriptor = metadata.get_descriptor();

    let mut known: BTreeSet<&str> = descriptor
        .get_security_roles()
        .iter()
        .map(String::as_str)
        .collect();
    let declare_roles = metadata.get_annotations().declared_roles();
    known.extend(declare_roles.iter().map(String::as_str));

    for entry in descriptor.get_permissions() {
        if let Some(role) = entry.get_roles().iter().find(|r| !known.contains(r.as_str())) {
            return Err(ConfigurationError::UndeclaredRole {
                bean: metadata.get_name().to_string(),
                role: role.clone(),
            });
        }
    }

    let declared = metadata.declared_role_set();
    for (reference, link) in descriptor.get_role_refs() {
        if !known.contains(link.as_str()) && !declared.contains(link) {
            return Err(ConfigurationError::DanglingRoleLink {
                bean: metadata.get_name().to_string(),
                reference: reference.clone(),
                role: link.clone(),
            });
        }
    }

    Ok(())
}

/// Business methods listed in more than one descriptor category.
///
/// Not an error: precedence picks the winner. Reported so the registry can
/// warn about it.
pub fn shadowed_methods(metadata: &BeanMetadata) -> Vec<(MethodSignature, Vec<DescriptorCategory>)> {
    let descriptor = metadata.get_descriptor();
    metadata
        .get_business_methods()
        .iter()
        .filter_map(|method| {
            let categories = descriptor.categories_matching(method);
            (categories.len() > 1).then(|| (method.clone(), categories))
        })
        .collect()
}
