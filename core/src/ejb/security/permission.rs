//! Method permission resolution.
//!
//! Precedence, first match wins:
//!
//! 1. exclude-list entry: denied, whatever else is configured
//! 2. unchecked entry: anyone may call
//! 3. method-permission entry: restricted to its roles
//! 4. annotations, unless the descriptor is metadata-complete
//! 5. nothing configured: anyone may call
//!
//! Within each descriptor category the most specific entry wins (exact
//! signature, then method name, then `*`).
//!
//! # EJB Equivalent
//! The container's `EJBMethodPermission` checks against the JACC policy.

use std::collections::BTreeSet;

use derive_more::{Display, Error};

use crate::ejb::security::metadata::{AnnotationLevel, BeanMetadata, SecurityMarker};
use crate::ejb::security::signature::{MethodSignature, Specificity};

/// Effective policy of a method, independent of any caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodPolicy {
    Denied,
    Unchecked,
    RoleRestricted(BTreeSet<String>),
}

/// Which piece of metadata produced a [`MethodPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicySource {
    ExcludeList(Specificity),
    UncheckedList(Specificity),
    MethodPermission(Specificity),
    Annotation {
        class_name: String,
        level: AnnotationLevel,
    },
    Default,
}

/// A policy together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTrace {
    pub policy: MethodPolicy,
    pub source: PolicySource,
}

/// Computes the effective policy of `method` on a bean.
pub fn effective_policy(metadata: &BeanMetadata, method: &MethodSignature) -> PolicyTrace {
    let descriptor = metadata.get_descriptor();

    if let Some(specificity) = descriptor.match_exclude(method) {
        return PolicyTrace {
            policy: MethodPolicy::Denied,
            source: PolicySource::ExcludeList(specificity),
        };
    }

    if let Some(specificity) = descriptor.match_unchecked(method) {
        return PolicyTrace {
            policy: MethodPolicy::Unchecked,
            source: PolicySource::UncheckedList(specificity),
        };
    }

    if let Some((specificity, roles)) = descriptor.match_permission(method) {
        return PolicyTrace {
            policy: MethodPolicy::RoleRestricted(roles),
            source: PolicySource::MethodPermission(specificity),
        };
    }

    if !metadata.is_metadata_complete() {
        if let Some(effective) = metadata.get_annotations().effective_marker(method) {
            let policy = match effective.marker {
                SecurityMarker::DenyAll => MethodPolicy::Denied,
                SecurityMarker::PermitAll => MethodPolicy::Unchecked,
                SecurityMarker::RolesAllowed(roles) => {
                    MethodPolicy::RoleRestricted(roles.iter().cloned().collect())
                }
            };
            return PolicyTrace {
                policy,
                source: PolicySource::Annotation {
                    class_name: effective.class_name.to_string(),
                    level: effective.level,
                },
            };
        }
    }

    PolicyTrace {
        policy: MethodPolicy::Unchecked,
        source: PolicySource::Default,
    }
}

/// Why an invocation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Listed in the descriptor's exclude-list.
    Excluded,
    /// Governed by a `@DenyAll` annotation.
    DenyAll,
    /// The caller holds none of the required roles.
    MissingRole,
}

/// A denied invocation, carrying what was required and what the caller had.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("method '{method}' of bean '{bean}' {}", explain(*reason, required_roles.as_ref(), caller_roles))]
pub struct Denial {
    bean: String,
    method: MethodSignature,
    reason: DenialReason,
    required_roles: Option<BTreeSet<String>>,
    caller_roles: BTreeSet<String>,
}

impl Denial {
    pub fn get_bean(&self) -> &str {
        &self.bean
    }

    pub fn get_method(&self) -> &MethodSignature {
        &self.method
    }

    pub fn get_reason(&self) -> DenialReason {
        self.reason
    }

    /// Roles that would have been accepted, when the method is role-restricted.
    pub fn get_required_roles(&self) -> Option<&BTreeSet<String>> {
        self.required_roles.as_ref()
    }

    pub fn get_caller_roles(&self) -> &BTreeSet<String> {
        &self.caller_roles
    }
}

fn explain(
    reason: DenialReason,
    required_roles: Option<&BTreeSet<String>>,
    caller_roles: &BTreeSet<String>,
) -> String {
    match reason {
        DenialReason::Excluded => "is in the exclude-list".to_string(),
        DenialReason::DenyAll => "is annotated @DenyAll".to_string(),
        DenialReason::MissingRole => format!(
            "requires one of {:?}, caller has {:?}",
            required_roles.map(|r| r.iter().collect::<Vec<_>>()).unwrap_or_default(),
            caller_roles.iter().collect::<Vec<_>>()
        ),
    }
}

/// Outcome of an authorization check for one caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedDecision {
    /// No role check applies.
    Unchecked,
    /// Restricted to these roles, and the caller holds at least one.
    RoleRestricted(BTreeSet<String>),
    Denied(Denial),
}

impl ResolvedDecision {
    pub fn is_permitted(&self) -> bool {
        !matches!(self, ResolvedDecision::Denied(_))
    }
}

/// Decides whether a caller holding `caller_roles` may invoke `method`.
///
/// # Example
/// ```
/// use std::collections::BTreeSet;
/// use jacc_ejb_security_core::ejb::security::{
///     resolve, BeanMetadata, DescriptorLayer, MethodPattern, MethodSignature, ResolvedDecision,
/// };
///
/// let metadata = BeanMetadata::builder("AccountBean")
///     .descriptor(DescriptorLayer::new().permit(MethodPattern::named("close"), &["Manager"]))
///     .build();
///
/// let roles: BTreeSet<String> = ["Manager".to_string()].into();
/// let decision = resolve(&metadata, &MethodSignature::no_args("close"), &roles);
/// assert!(matches!(decision, ResolvedDecision::RoleRestricted(_)));
/// ```
pub fn resolve(
    metadata: &BeanMetadata,
    method: &MethodSignature,
    caller_roles: &BTreeSet<String>,
) -> ResolvedDecision {
    let trace = effective_policy(metadata, method);
    log::trace!(
        "Policy for {}::{} is {:?} from {:?}",
        metadata.get_name(),
        method,
        trace.policy,
        trace.source
    );

    let denial = |reason, required_roles| {
        ResolvedDecision::Denied(Denial {
            bean: metadata.get_name().to_string(),
            method: method.clone(),
            reason,
            required_roles,
            caller_roles: caller_roles.clone(),
        })
    };

    match trace.policy {
        MethodPolicy::Unchecked => ResolvedDecision::Unchecked,
        MethodPolicy::Denied => match trace.source {
            PolicySource::ExcludeList(_) => denial(DenialReason::Excluded, None),
            _ => denial(DenialReason::DenyAll, None),
        },
        MethodPolicy::RoleRestricted(roles) => {
            if roles.iter().any(|role| caller_roles.contains(role)) {
                ResolvedDecision::RoleRestricted(roles)
            } else {
                denial(DenialReason::MissingRole, Some(roles))
            }
        }
    }
}
