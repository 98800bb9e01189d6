//! Deployed beans and their published metadata snapshots.
//!
//! Deploying validates a bean and publishes an immutable `Arc<BeanMetadata>`.
//! Redeploying swaps the `Arc`; invocations already holding the previous
//! snapshot finish against it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::ejb::error::{ConfigurationError, SecurityError};
use crate::ejb::security::audit::{AuditLogger, SecurityEvent, SecurityEventType};
use crate::ejb::security::config::SecurityConfig;
use crate::ejb::security::metadata::validate::{shadowed_methods, validate};
use crate::ejb::security::metadata::BeanMetadata;

/// Registry of deployed beans.
///
/// # Example
/// ```
/// use jacc_ejb_security_core::ejb::security::{BeanMetadata, BeanRegistry, SecurityConfig};
///
/// let registry = BeanRegistry::new(SecurityConfig::default());
/// registry.deploy(BeanMetadata::builder("PayrollBean").build()).unwrap();
///
/// assert!(registry.is_deployed("PayrollBean"));
/// assert!(registry.snapshot("Unknown").is_err());
/// ```
pub struct BeanRegistry {
    beans: RwLock<HashMap<String, Arc<BeanMetadata>>>,
    config: SecurityConfig,
    audit_logger: AuditLogger,
}

impl Default for BeanRegistry {
    fn default() -> Self {
        Self::new(SecurityConfig::default())
    }
}

impl BeanRegistry {
    pub fn new(config: SecurityConfig) -> Self {
        BeanRegistry {
            beans: RwLock::new(HashMap::new()),
            config,
            audit_logger: AuditLogger::new(),
        }
    }

    pub fn audit_logger(mut self, audit_logger: AuditLogger) -> Self {
        self.audit_logger = audit_logger;
        self
    }

    pub fn get_config(&self) -> &SecurityConfig {
        &self.config
    }

    /// Validates and publishes a bean, replacing any earlier deployment of
    /// the same name.
    pub fn deploy(&self, metadata: BeanMetadata) -> Result<Arc<BeanMetadata>, ConfigurationError> {
        let name = metadata.get_name().to_string();

        if let Err(err) = validate(&metadata, &self.config) {
            log::error!("Refusing to deploy bean '{}': {}", name, err);
            self.audit_logger
                .log(SecurityEvent::configuration_error(&name, &err.to_string()));
            return Err(err);
        }

        if self.config.is_log_descriptor_shadowing() {
            for (method, categories) in shadowed_methods(&metadata) {
                let listed: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
                log::warn!(
                    "Method '{}' of bean '{}' is listed in {}; {} takes precedence",
                    method,
                    name,
                    listed.join(", "),
                    listed[0]
                );
            }
        }

        metadata.declared_role_set();
        let snapshot = Arc::new(metadata);

        let previous = self
            .beans
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), Arc::clone(&snapshot));

        log::info!(
            "{} bean '{}' ({} business methods)",
            if previous.is_some() { "Redeployed" } else { "Deployed" },
            name,
            snapshot.get_business_methods().len()
        );
        self.audit_logger.log(
            SecurityEvent::new(SecurityEventType::BeanDeployed)
                .bean(&name)
                .detail("redeploy", previous.is_some().to_string()),
        );

        Ok(snapshot)
    }

    /// Removes a bean. Invocations holding its snapshot are unaffected.
    pub fn undeploy(&self, name: &str) -> Option<Arc<BeanMetadata>> {
        let removed = self
            .beans
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);

        if removed.is_some() {
            log::info!("Undeployed bean '{}'", name);
            self.audit_logger
                .log(SecurityEvent::new(SecurityEventType::BeanUndeployed).bean(name));
        }
        removed
    }

    /// The current snapshot of a bean.
    pub fn snapshot(&self, name: &str) -> Result<Arc<BeanMetadata>, SecurityError> {
        self.beans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| SecurityError::UnknownBean {
                bean: name.to_string(),
            })
    }

    pub fn is_deployed(&self, name: &str) -> bool {
        self.beans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Names of deployed beans, sorted.
    pub fn bean_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .beans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
