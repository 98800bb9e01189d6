//! Mapping of run-as roles to concrete principals.

use std::collections::HashMap;

use crate::ejb::security::caller::Caller;

/// Supplies the principal a bean runs as when its identity resolves to a role.
///
/// # EJB Equivalent
/// The container's run-as principal mapping (`<run-as-principal>`).
pub trait RunAsIdentityMapper: Send + Sync {
    /// Returns the identity for `role`, or `None` when nothing is mapped.
    fn run_as_caller(&self, role: &str) -> Option<Caller>;
}

/// Fixed role to principal table.
///
/// # Example
/// ```
/// use jacc_ejb_security_core::ejb::security::{InMemoryRunAsMapper, RunAsIdentityMapper};
///
/// let mapper = InMemoryRunAsMapper::new().with_identity("Batch", "batch-runner");
///
/// let caller = mapper.run_as_caller("Batch").unwrap();
/// assert_eq!(caller.get_principal(), "batch-runner");
/// assert!(caller.has_role("Batch"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRunAsMapper {
    identities: HashMap<String, Caller>,
}

impl InMemoryRunAsMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `role` to `principal`, who then holds exactly that role.
    pub fn with_identity(self, role: &str, principal: &str) -> Self {
        let caller = Caller::new(principal).roles(&[role]);
        self.with_caller(role, caller)
    }

    /// Maps `role` to a fully specified caller.
    pub fn with_caller(mut self, role: &str, caller: Caller) -> Self {
        self.identities.insert(role.to_string(), caller);
        self
    }
}

impl RunAsIdentityMapper for InMemoryRunAsMapper {
    fn run_as_caller(&self, role: &str) -> Option<Caller> {
        self.identities.get(role).cloned()
    }
}
