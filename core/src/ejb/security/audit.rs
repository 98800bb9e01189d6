//! Security audit trail of bean invocations.
//!
//! Every authorization decision, run-as switch and role query made through
//! the interceptor can be recorded, together with deployment changes and
//! configuration errors.
//!
//! # Example
//!
//! ```
//! use jacc_ejb_security_core::ejb::security::audit::{
//!     AuditLogger, InMemoryEventStore, SecurityEvent, SecurityEventType,
//! };
//!
//! let store = InMemoryEventStore::new();
//! let audit_logger = AuditLogger::new().add_handler(store.clone());
//!
//! audit_logger.log(SecurityEvent::access_denied("alice", "PayrollBean", "run()", "missing role"));
//!
//! assert_eq!(store.get_events_by_type(&SecurityEventType::AccessDenied).len(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Security event types for audit logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityEventType {
    /// Invocation allowed
    AccessGranted,
    /// Invocation refused
    AccessDenied,
    /// Nested call made under a run-as identity
    RunAsApplied,
    /// Role-membership query from a method body
    RoleQuery,
    /// Metadata rejected at deployment or invocation
    ConfigurationError,
    BeanDeployed,
    BeanUndeployed,
}

impl fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityEventType::AccessGranted => write!(f, "ACCESS_GRANTED"),
            SecurityEventType::AccessDenied => write!(f, "ACCESS_DENIED"),
            SecurityEventType::RunAsApplied => write!(f, "RUN_AS_APPLIED"),
            SecurityEventType::RoleQuery => write!(f, "ROLE_QUERY"),
            SecurityEventType::ConfigurationError => write!(f, "CONFIGURATION_ERROR"),
            SecurityEventType::BeanDeployed => write!(f, "BEAN_DEPLOYED"),
            SecurityEventType::BeanUndeployed => write!(f, "BEAN_UNDEPLOYED"),
        }
    }
}

/// Severity level of security events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SecurityEventSeverity {
    #[default]
    Info,
    Warning,
    Error,
}

impl fmt::Display for SecurityEventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityEventSeverity::Info => write!(f, "INFO"),
            SecurityEventSeverity::Warning => write!(f, "WARNING"),
            SecurityEventSeverity::Error => write!(f, "ERROR"),
        }
    }
}

impl SecurityEventType {
    /// Get the default severity for this event type.
    pub fn default_severity(&self) -> SecurityEventSeverity {
        match self {
            SecurityEventType::AccessGranted
            | SecurityEventType::RunAsApplied
            | SecurityEventType::RoleQuery
            | SecurityEventType::BeanDeployed
            | SecurityEventType::BeanUndeployed => SecurityEventSeverity::Info,
            SecurityEventType::AccessDenied => SecurityEventSeverity::Warning,
            SecurityEventType::ConfigurationError => SecurityEventSeverity::Error,
        }
    }
}

/// A security audit event.
#[derive(Debug, Clone)]
pub struct SecurityEvent {
    /// Unique event ID
    pub id: String,
    /// Event timestamp (Unix epoch milliseconds)
    pub timestamp: u64,
    pub event_type: SecurityEventType,
    pub severity: SecurityEventSeverity,
    /// Caller principal (if applicable)
    pub principal: Option<String>,
    pub bean: Option<String>,
    /// Business method signature
    pub method: Option<String>,
    pub details: BTreeMap<String, String>,
    /// Error message (for failure events)
    pub error: Option<String>,
}

impl SecurityEvent {
    /// Create a new security event.
    pub fn new(event_type: SecurityEventType) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            id: generate_event_id(),
            timestamp: now,
            severity: event_type.default_severity(),
            event_type,
            principal: None,
            bean: None,
            method: None,
            details: BTreeMap::new(),
            error: None,
        }
    }

    pub fn principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    pub fn bean(mut self, bean: impl Into<String>) -> Self {
        self.bean = Some(bean.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the severity (overrides default).
    pub fn severity(mut self, severity: SecurityEventSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Add a detail.
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    // Convenience constructors

    pub fn access_granted(principal: &str, bean: &str, method: &str) -> Self {
        Self::new(SecurityEventType::AccessGranted)
            .principal(principal)
            .bean(bean)
            .method(method)
    }

    pub fn access_denied(principal: &str, bean: &str, method: &str, reason: &str) -> Self {
        Self::new(SecurityEventType::AccessDenied)
            .principal(principal)
            .bean(bean)
            .method(method)
            .error(reason)
    }

    pub fn run_as_applied(principal: &str, bean: &str, method: &str, run_as: &str) -> Self {
        Self::new(SecurityEventType::RunAsApplied)
            .principal(principal)
            .bean(bean)
            .method(method)
            .detail("run_as", run_as)
    }

    pub fn role_query(principal: &str, bean: &str, role: &str, result: bool) -> Self {
        Self::new(SecurityEventType::RoleQuery)
            .principal(principal)
            .bean(bean)
            .detail("role", role)
            .detail("result", result.to_string())
    }

    pub fn configuration_error(bean: &str, error: &str) -> Self {
        Self::new(SecurityEventType::ConfigurationError)
            .bean(bean)
            .error(error)
    }

    /// Format the event as a log line.
    pub fn to_log_line(&self) -> String {
        let mut parts = vec![
            format!("[{}]", self.severity),
            format!("[{}]", self.event_type),
        ];

        if let Some(ref principal) = self.principal {
            parts.push(format!("principal={}", principal));
        }
        if let Some(ref bean) = self.bean {
            parts.push(format!("bean={}", bean));
        }
        if let Some(ref method) = self.method {
            parts.push(format!("method={}", method));
        }
        if let Some(ref error) = self.error {
            parts.push(format!("error=\"{}\"", error));
        }
        for (k, v) in &self.details {
            parts.push(format!("{}={}", k, v));
        }

        parts.join(" ")
    }

    /// Format the event as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_log_line())
    }
}

impl serde::Serialize for SecurityEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("SecurityEvent", 9)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("event_type", &self.event_type.to_string())?;
        state.serialize_field("severity", &self.severity.to_string())?;
        state.serialize_field("principal", &self.principal)?;
        state.serialize_field("bean", &self.bean)?;
        state.serialize_field("method", &self.method)?;
        state.serialize_field("details", &self.details)?;
        state.serialize_field("error", &self.error)?;
        state.end()
    }
}

fn generate_event_id() -> String {
    use rand::Rng;
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp, random)
}

/// Trait for handling security events.
pub trait SecurityEventHandler: Send + Sync {
    fn handle(&self, event: &SecurityEvent);
}

/// Writes events through the `log` facade under the `security_audit` target.
#[derive(Default)]
pub struct LogHandler {
    min_severity: SecurityEventSeverity,
}

impl LogHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum severity to log.
    pub fn min_severity(mut self, severity: SecurityEventSeverity) -> Self {
        self.min_severity = severity;
        self
    }
}

impl SecurityEventHandler for LogHandler {
    fn handle(&self, event: &SecurityEvent) {
        if event.severity < self.min_severity {
            return;
        }
        let level = match event.severity {
            SecurityEventSeverity::Info => log::Level::Info,
            SecurityEventSeverity::Warning => log::Level::Warn,
            SecurityEventSeverity::Error => log::Level::Error,
        };
        log::log!(target: "security_audit", level, "{}", event.to_log_line());
    }
}

/// Handler that calls a closure.
pub struct ClosureHandler<F>
where
    F: Fn(&SecurityEvent) + Send + Sync,
{
    handler: F,
}

impl<F> ClosureHandler<F>
where
    F: Fn(&SecurityEvent) + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> SecurityEventHandler for ClosureHandler<F>
where
    F: Fn(&SecurityEvent) + Send + Sync,
{
    fn handle(&self, event: &SecurityEvent) {
        (self.handler)(event);
    }
}

/// In-memory event store for testing and debugging.
#[derive(Clone)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<SecurityEvent>>>,
    max_events: usize,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            max_events: 10000,
        }
    }

    /// Set maximum events to keep.
    pub fn max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    pub fn get_events(&self) -> Vec<SecurityEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_events_by_type(&self, event_type: &SecurityEventType) -> Vec<SecurityEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| &e.event_type == event_type)
            .cloned()
            .collect()
    }

    pub fn get_events_by_principal(&self, principal: &str) -> Vec<SecurityEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.principal.as_deref() == Some(principal))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl SecurityEventHandler for InMemoryEventStore {
    fn handle(&self, event: &SecurityEvent) {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        events.push(event.clone());
        if events.len() > self.max_events {
            events.remove(0);
        }
    }
}

/// The main audit logger.
#[derive(Clone)]
pub struct AuditLogger {
    handlers: Arc<Vec<Arc<dyn SecurityEventHandler>>>,
    enabled: bool,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    /// Create a new audit logger with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
            enabled: true,
        }
    }

    /// Create an audit logger writing to the `log` facade.
    pub fn with_log() -> Self {
        Self::new().add_handler(LogHandler::new())
    }

    pub fn add_handler<H: SecurityEventHandler + 'static>(mut self, handler: H) -> Self {
        let handlers = Arc::make_mut(&mut self.handlers);
        handlers.push(Arc::new(handler));
        self
    }

    /// Add a closure as event handler.
    pub fn with_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&SecurityEvent) + Send + Sync + 'static,
    {
        self.add_handler(ClosureHandler::new(handler))
    }

    /// Enable or disable the logger.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn log(&self, event: SecurityEvent) {
        if !self.enabled {
            return;
        }

        for handler in self.handlers.iter() {
            handler.handle(&event);
        }
    }
}
