//! Deployment-descriptor security settings for one bean.
//!
//! # EJB Equivalent
//! `ejb-jar.xml`: `<exclude-list>`, `<method-permission>` (with `<unchecked/>`
//! or `<role-name>`), `<security-identity>`, `<security-role>` and
//! `<security-role-ref>`.
//!
//! The same method may appear in several categories at once. That is not an
//! error; the permission resolver applies precedence and the registry logs
//! the shadowing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::ejb::security::signature::{best_matches, MethodPattern, MethodSignature, Specificity};

/// `<security-identity>` of a bean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityIdentity {
    UseCallerIdentity,
    RunAs(String),
}

/// One `<method-permission>` binding of roles to a method pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    pattern: MethodPattern,
    roles: BTreeSet<String>,
}

impl PermissionEntry {
    pub fn new(pattern: MethodPattern, roles: BTreeSet<String>) -> Self {
        PermissionEntry { pattern, roles }
    }

    pub fn get_pattern(&self) -> &MethodPattern {
        &self.pattern
    }

    pub fn get_roles(&self) -> &BTreeSet<String> {
        &self.roles
    }
}

/// The descriptor categories a method can be listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DescriptorCategory {
    ExcludeList,
    Unchecked,
    MethodPermission,
}

impl fmt::Display for DescriptorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorCategory::ExcludeList => write!(f, "exclude-list"),
            DescriptorCategory::Unchecked => write!(f, "unchecked"),
            DescriptorCategory::MethodPermission => write!(f, "method-permission"),
        }
    }
}

/// Descriptor layer of a bean.
///
/// # Example
/// ```
/// use jacc_ejb_security_core::ejb::security::{DescriptorLayer, MethodPattern, MethodSignature};
///
/// let descriptor = DescriptorLayer::new()
///     .security_role("Manager")
///     .permit(MethodPattern::named("approve"), &["Manager"])
///     .exclude(MethodPattern::named("purge"));
///
/// assert!(descriptor.match_exclude(&MethodSignature::no_args("purge")).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorLayer {
    metadata_complete: bool,
    exclude: Vec<MethodPattern>,
    unchecked: Vec<MethodPattern>,
    permissions: Vec<PermissionEntry>,
    security_identity: Option<SecurityIdentity>,
    security_roles: BTreeSet<String>,
    role_refs: BTreeMap<String, String>,
}

impl DescriptorLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the descriptor as the complete source of metadata. Annotations
    /// are then ignored entirely.
    pub fn metadata_complete(mut self, complete: bool) -> Self {
        self.metadata_complete = complete;
        self
    }

    pub fn exclude(mut self, pattern: MethodPattern) -> Self {
        self.exclude.push(pattern);
        self
    }

    pub fn unchecked(mut self, pattern: MethodPattern) -> Self {
        self.unchecked.push(pattern);
        self
    }

    pub fn permit(self, pattern: MethodPattern, roles: &[&str]) -> Self {
        let roles = roles.iter().map(|r| r.to_string()).collect();
        self.permit_roles(pattern, roles)
    }

    pub fn permit_roles(mut self, pattern: MethodPattern, roles: BTreeSet<String>) -> Self {
        self.permissions.push(PermissionEntry::new(pattern, roles));
        self
    }

    pub fn security_identity(mut self, identity: SecurityIdentity) -> Self {
        self.security_identity = Some(identity);
        self
    }

    pub fn use_caller_identity(self) -> Self {
        self.security_identity(SecurityIdentity::UseCallerIdentity)
    }

    pub fn run_as(self, role: &str) -> Self {
        self.security_identity(SecurityIdentity::RunAs(role.to_string()))
    }

    pub fn security_role(mut self, role: &str) -> Self {
        self.security_roles.insert(role.to_string());
        self
    }

    /// Adds a `<security-role-ref>`: code asking for `name` is answered with `link`.
    pub fn role_ref(mut self, name: &str, link: &str) -> Self {
        self.role_refs.insert(name.to_string(), link.to_string());
        self
    }

    pub fn is_metadata_complete(&self) -> bool {
        self.metadata_complete
    }

    pub fn get_exclude_list(&self) -> &[MethodPattern] {
        &self.exclude
    }

    pub fn get_unchecked(&self) -> &[MethodPattern] {
        &self.unchecked
    }

    pub fn get_permissions(&self) -> &[PermissionEntry] {
        &self.permissions
    }

    pub fn get_security_identity(&self) -> Option<&SecurityIdentity> {
        self.security_identity.as_ref()
    }

    pub fn get_security_roles(&self) -> &BTreeSet<String> {
        &self.security_roles
    }

    pub fn get_role_refs(&self) -> &BTreeMap<String, String> {
        &self.role_refs
    }

    pub fn role_link(&self, name: &str) -> Option<&str> {
        self.role_refs.get(name).map(String::as_str)
    }

    /// Specificity of the best exclude-list entry matching `method`.
    pub fn match_exclude(&self, method: &MethodSignature) -> Option<Specificity> {
        best_matches(self.exclude.iter().map(|p| (p, ())), method).map(|(s, _)| s)
    }

    /// Specificity of the best unchecked entry matching `method`.
    pub fn match_unchecked(&self, method: &MethodSignature) -> Option<Specificity> {
        best_matches(self.unchecked.iter().map(|p| (p, ())), method).map(|(s, _)| s)
    }

    /// Roles granted to `method` by method-permission entries.
    ///
    /// Only entries at the best matching specificity count; their role sets
    /// are unioned.
    pub fn match_permission(
        &self,
        method: &MethodSignature,
    ) -> Option<(Specificity, BTreeSet<String>)> {
        let entries = self
            .permissions
            .iter()
            .map(|entry| (&entry.pattern, &entry.roles));

        best_matches(entries, method).map(|(specificity, role_sets)| {
            let roles = role_sets.into_iter().flatten().cloned().collect();
            (specificity, roles)
        })
    }

    /// Every category that lists `method`, in precedence order.
    pub fn categories_matching(&self, method: &MethodSignature) -> Vec<DescriptorCategory> {
        let mut categories = Vec::new();
        if self.match_exclude(method).is_some() {
            categories.push(DescriptorCategory::ExcludeList);
        }
        if self.match_unchecked(method).is_some() {
            categories.push(DescriptorCategory::Unchecked);
        }
        if self.match_permission(method).is_some() {
            categories.push(DescriptorCategory::MethodPermission);
        }
        categories
    }

    /// Every role named by any method-permission entry.
    pub fn permission_roles(&self) -> BTreeSet<String> {
        self.permissions
            .iter()
            .flat_map(|entry| entry.roles.iter().cloned())
            .collect()
    }

    /// Every pattern in every category.
    pub fn patterns(&self) -> impl Iterator<Item = &MethodPattern> {
        self.exclude
            .iter()
            .chain(self.unchecked.iter())
            .chain(self.permissions.iter().map(|entry| &entry.pattern))
    }
}
