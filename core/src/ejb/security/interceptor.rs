//! Invocation interceptor: the point where decisions become faults.
//!
//! # EJB Equivalent
//! The container's security collaborator (`preInvoke` / `isCallerInRole` /
//! run-as propagation on nested calls).

use std::fmt;
use std::sync::Arc;

use crate::ejb::error::{ConfigurationError, SecurityError};
use crate::ejb::security::audit::{AuditLogger, SecurityEvent};
use crate::ejb::security::caller::Caller;
use crate::ejb::security::identity::{InMemoryRunAsMapper, RunAsIdentityMapper};
use crate::ejb::security::metadata::BeanMetadata;
use crate::ejb::security::permission::{resolve, ResolvedDecision};
use crate::ejb::security::registry::BeanRegistry;
use crate::ejb::security::role_reference::is_in_role;
use crate::ejb::security::run_as::{resolve_identity, ResolvedIdentity};
use crate::ejb::security::signature::MethodSignature;

/// Checks invocations against the registry before they are dispatched.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use jacc_ejb_security_core::ejb::security::{
///     BeanMetadata, BeanRegistry, Caller, DescriptorLayer, MethodInterceptor, MethodPattern,
///     MethodSignature, SecurityConfig,
/// };
///
/// let registry = Arc::new(BeanRegistry::new(SecurityConfig::default()));
/// registry
///     .deploy(
///         BeanMetadata::builder("AccountBean")
///             .descriptor(DescriptorLayer::new().permit(MethodPattern::all(), &["Teller"]))
///             .build(),
///     )
///     .unwrap();
///
/// let interceptor = MethodInterceptor::new(registry);
/// let balance = MethodSignature::no_args("balance");
///
/// assert!(interceptor.pre_invoke("AccountBean", &balance, &Caller::new("tom").roles(&["Teller"])).is_ok());
/// assert!(interceptor.pre_invoke("AccountBean", &balance, &Caller::anonymous()).is_err());
/// ```
#[derive(Clone)]
pub struct MethodInterceptor {
    registry: Arc<BeanRegistry>,
    identity_mapper: Arc<dyn RunAsIdentityMapper>,
    audit_logger: AuditLogger,
}

impl MethodInterceptor {
    pub fn new(registry: Arc<BeanRegistry>) -> Self {
        MethodInterceptor {
            registry,
            identity_mapper: Arc::new(InMemoryRunAsMapper::new()),
            audit_logger: AuditLogger::new(),
        }
    }

    pub fn identity_mapper<M: RunAsIdentityMapper + 'static>(mut self, mapper: M) -> Self {
        self.identity_mapper = Arc::new(mapper);
        self
    }

    pub fn audit_logger(mut self, audit_logger: AuditLogger) -> Self {
        self.audit_logger = audit_logger;
        self
    }

    pub fn get_registry(&self) -> &Arc<BeanRegistry> {
        &self.registry
    }

    /// Authorizes `caller` to invoke `method` on `bean`.
    ///
    /// The run-as identity is resolved here as well, so a method whose
    /// run-as configuration is unusable is never entered.
    pub fn pre_invoke(
        &self,
        bean: &str,
        method: &MethodSignature,
        caller: &Caller,
    ) -> Result<Invocation, SecurityError> {
        let metadata = self.registry.snapshot(bean)?;
        let method_name = method.to_string();

        let decision = match resolve(&metadata, method, caller.get_roles()) {
            ResolvedDecision::Denied(denial) => {
                log::debug!("Denied {} on {}::{}: {}", caller.get_principal(), bean, method, denial);
                self.audit_logger.log(SecurityEvent::access_denied(
                    caller.get_principal(),
                    bean,
                    &method_name,
                    &denial.to_string(),
                ));
                return Err(SecurityError::AccessDenied(denial));
            }
            permitted => permitted,
        };

        let identity = match resolve_identity(&metadata, method) {
            Ok(identity) => identity,
            Err(err) => {
                log::error!("Cannot invoke {}::{}: {}", bean, method, err);
                self.audit_logger
                    .log(SecurityEvent::configuration_error(bean, &err.to_string()));
                return Err(err.into());
            }
        };

        if self.registry.get_config().is_audit_granted() {
            let kind = match &decision {
                ResolvedDecision::RoleRestricted(_) => "role_restricted",
                _ => "unchecked",
            };
            self.audit_logger.log(
                SecurityEvent::access_granted(caller.get_principal(), bean, &method_name)
                    .detail("decision", kind),
            );
        }

        Ok(Invocation {
            interceptor: self.clone(),
            metadata,
            method: method.clone(),
            caller: caller.clone(),
            decision,
            identity,
        })
    }
}

/// An authorized invocation in progress.
///
/// Holds the metadata snapshot it was authorized against, so redeploying
/// the bean does not change the answers given here.
pub struct Invocation {
    interceptor: MethodInterceptor,
    metadata: Arc<BeanMetadata>,
    method: MethodSignature,
    caller: Caller,
    decision: ResolvedDecision,
    identity: ResolvedIdentity,
}

impl Invocation {
    pub fn get_bean_name(&self) -> &str {
        self.metadata.get_name()
    }

    pub fn get_metadata(&self) -> &Arc<BeanMetadata> {
        &self.metadata
    }

    pub fn get_method(&self) -> &MethodSignature {
        &self.method
    }

    pub fn get_caller(&self) -> &Caller {
        &self.caller
    }

    pub fn get_decision(&self) -> &ResolvedDecision {
        &self.decision
    }

    pub fn get_run_as_identity(&self) -> &ResolvedIdentity {
        &self.identity
    }

    /// `isCallerInRole` from inside the method body.
    pub fn is_caller_in_role(&self, role: &str) -> bool {
        let result = is_in_role(&self.metadata, role, self.caller.get_roles());
        self.interceptor.audit_logger.log(SecurityEvent::role_query(
            self.caller.get_principal(),
            self.metadata.get_name(),
            role,
            result,
        ));
        result
    }

    /// The identity nested calls are made with.
    pub fn run_as_caller(&self) -> Result<Caller, SecurityError> {
        match &self.identity {
            ResolvedIdentity::AsCaller => Ok(self.caller.clone()),
            ResolvedIdentity::AsRole(role) => self
                .interceptor
                .identity_mapper
                .run_as_caller(role)
                .ok_or_else(|| {
                    ConfigurationError::UnmappedRunAsRole {
                        bean: self.metadata.get_name().to_string(),
                        role: role.clone(),
                    }
                    .into()
                }),
        }
    }

    /// Authorizes a call from this method to another bean.
    pub fn invoke_nested(
        &self,
        bean: &str,
        method: &MethodSignature,
    ) -> Result<Invocation, SecurityError> {
        let caller = self.run_as_caller()?;

        if let ResolvedIdentity::AsRole(role) = &self.identity {
            log::debug!(
                "{}::{} calls {}::{} as {} ({})",
                self.metadata.get_name(),
                self.method,
                bean,
                method,
                caller.get_principal(),
                role
            );
            self.interceptor.audit_logger.log(SecurityEvent::run_as_applied(
                self.caller.get_principal(),
                self.metadata.get_name(),
                &self.method.to_string(),
                role,
            ));
        }

        self.interceptor.pre_invoke(bean, method, &caller)
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("bean", &self.metadata.get_name())
            .field("method", &self.method)
            .field("caller", &self.caller)
            .field("decision", &self.decision)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
