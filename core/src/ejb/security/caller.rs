//! The authenticated party invoking a bean method.
//!
//! # EJB Equivalent
//! The caller principal and role set supplied by the authentication context.

use std::collections::BTreeSet;
use std::fmt;

/// Principal name given to callers that never authenticated.
pub const ANONYMOUS_PRINCIPAL: &str = "UNAUTHENTICATED";

/// A caller principal together with its role set.
///
/// # Example
/// ```
/// use jacc_ejb_security_core::ejb::security::Caller;
///
/// let caller = Caller::new("alice").roles(&["Employee", "Manager"]);
///
/// assert!(caller.has_role("Manager"));
/// assert!(caller.has_any_role(&["Auditor", "Employee"]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    principal: String,
    roles: BTreeSet<String>,
}

impl Caller {
    pub fn new(principal: &str) -> Self {
        Caller {
            principal: principal.to_string(),
            roles: BTreeSet::new(),
        }
    }

    /// A caller with no principal and no roles.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_PRINCIPAL)
    }

    /// Adds roles to the caller (builder pattern).
    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.roles.extend(roles.iter().map(|r| r.to_string()));
        self
    }

    pub fn with_role_set(mut self, roles: BTreeSet<String>) -> Self {
        self.roles.extend(roles);
        self
    }

    pub fn get_principal(&self) -> &str {
        &self.principal
    }

    pub fn get_roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Checks if the caller has ANY of the specified roles (OR logic).
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    pub fn is_anonymous(&self) -> bool {
        self.principal == ANONYMOUS_PRINCIPAL && self.roles.is_empty()
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Caller {{ principal: {}, roles: {:?} }}",
            self.principal, self.roles
        )
    }
}
