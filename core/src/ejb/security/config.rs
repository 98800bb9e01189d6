//! Deployment-time options of the security engine.

use serde::{Deserialize, Serialize};

use crate::ejb::error::LoadError;

/// Options applied when beans are deployed and invoked.
///
/// # Example
/// ```
/// use jacc_ejb_security_core::ejb::security::SecurityConfig;
///
/// let config = SecurityConfig::from_json(r#"{ "validate_role_references": true }"#).unwrap();
/// assert!(config.is_validate_role_references());
/// assert!(config.is_log_descriptor_shadowing());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Reject descriptors that name roles nobody declares.
    validate_role_references: bool,
    /// Resolve run-as identities of every business method at deployment.
    reject_system_identity_at_deploy: bool,
    log_descriptor_shadowing: bool,
    audit_granted: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        SecurityConfig {
            validate_role_references: false,
            reject_system_identity_at_deploy: false,
            log_descriptor_shadowing: true,
            audit_granted: true,
        }
    }
}

impl SecurityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::invalid("security configuration", e))
    }

    pub fn validate_role_references(mut self, enabled: bool) -> Self {
        self.validate_role_references = enabled;
        self
    }

    pub fn reject_system_identity_at_deploy(mut self, enabled: bool) -> Self {
        self.reject_system_identity_at_deploy = enabled;
        self
    }

    pub fn log_descriptor_shadowing(mut self, enabled: bool) -> Self {
        self.log_descriptor_shadowing = enabled;
        self
    }

    pub fn audit_granted(mut self, enabled: bool) -> Self {
        self.audit_granted = enabled;
        self
    }

    pub fn is_validate_role_references(&self) -> bool {
        self.validate_role_references
    }

    pub fn is_reject_system_identity_at_deploy(&self) -> bool {
        self.reject_system_identity_at_deploy
    }

    pub fn is_log_descriptor_shadowing(&self) -> bool {
        self.log_descriptor_shadowing
    }

    pub fn is_audit_granted(&self) -> bool {
        self.audit_granted
    }
}
