//! Role-membership queries made from inside a method body.
//!
//! A bean may only ask about roles it has declared. The declared set is the
//! union of:
//!
//! - every `@DeclareRoles` in the class chain
//! - descriptor method-permission roles: all of them when the descriptor is
//!   metadata-complete, otherwise those of entries that actually govern some
//!   method of the bean
//! - `@RolesAllowed` roles of markers that actually govern some method
//!
//! # EJB Equivalent
//! `EJBContext.isCallerInRole` backed by `EJBRoleRefPermission`.

use std::collections::BTreeSet;

use crate::ejb::security::metadata::BeanMetadata;
use crate::ejb::security::permission::{effective_policy, MethodPolicy, PolicySource};
use crate::ejb::security::signature::{MethodPattern, MethodSignature};

/// Roles a bean may legally query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredRoleSet {
    roles: BTreeSet<String>,
}

impl DeclaredRoleSet {
    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.roles
    }
}

impl FromIterator<String> for DeclaredRoleSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        DeclaredRoleSet {
            roles: iter.into_iter().collect(),
        }
    }
}

/// The declared role set of a bean. Cached on the metadata snapshot.
pub fn declared_roles(metadata: &BeanMetadata) -> &DeclaredRoleSet {
    metadata.declared_role_set()
}

pub(crate) fn compute_declared_roles(metadata: &BeanMetadata) -> DeclaredRoleSet {
    let mut roles = metadata.get_annotations().declared_roles();

    if metadata.is_metadata_complete() {
        roles.extend(metadata.get_descriptor().permission_roles());
    } else {
        for method in candidate_methods(metadata) {
            let trace = effective_policy(metadata, &method);
            if let MethodPolicy::RoleRestricted(granted) = trace.policy {
                if matches!(
                    trace.source,
                    PolicySource::MethodPermission(_) | PolicySource::Annotation { .. }
                ) {
                    roles.extend(granted);
                }
            }
        }
    }

    log::debug!(
        "Declared roles of bean '{}': {:?}",
        metadata.get_name(),
        roles
    );

    DeclaredRoleSet { roles }
}

/// Methods whose effective policy can contribute roles: the business
/// methods, an undeclared overload per named permission pattern, and one
/// method nothing names, which the bean-wide entries and the class markers
/// govern.
fn candidate_methods(metadata: &BeanMetadata) -> BTreeSet<MethodSignature> {
    let mut methods = metadata.get_business_methods().clone();
    for entry in metadata.get_descriptor().get_permissions() {
        if let MethodPattern::Named(name) = entry.get_pattern() {
            methods.insert(MethodSignature::undeclared(name));
        }
    }
    methods.insert(MethodSignature::undeclared(""));
    methods
}

/// Answers a role-membership query made by code running in the bean.
///
/// A name registered as a security-role-ref is answered through its link,
/// provided the link is a known role. Any other name must be in the declared
/// role set and held by the caller.
pub fn is_in_role(metadata: &BeanMetadata, role_name: &str, caller_roles: &BTreeSet<String>) -> bool {
    let declared = metadata.declared_role_set();
    let descriptor = metadata.get_descriptor();

    if let Some(link) = descriptor.role_link(role_name) {
        let known = declared.contains(link) || descriptor.get_security_roles().contains(link);
        return known && caller_roles.contains(link);
    }

    declared.contains(role_name) && caller_roles.contains(role_name)
}
