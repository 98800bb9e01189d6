//! Demo HR application: fixture beans deployed from annotations and JSON
//! descriptors, exposed over HTTP.
//!
//! Shared by the demo server and the integration tests.

pub mod descriptors;

use std::sync::Arc;

use actix_web::web;

use jacc_ejb_security::ejb::error::SecurityError;
use jacc_ejb_security::ejb::security::{
    AnnotatedBean, AuditLogger, BeanMetadata, BeanRegistry, EjbJarDocument, ExtensionDocument,
    ExtensionLayer, InMemoryRunAsMapper, MethodInterceptor, SecurityConfig,
};

use beans::{
    ApprovalBean, ArchiveBean, EmployeeDirectoryBean, MaintenanceBean, PayrollBean,
    PremiumAccountBean,
};

/// Principals the demo runs nested calls as.
pub fn identity_mapper() -> InMemoryRunAsMapper {
    InMemoryRunAsMapper::new()
        .with_identity("Payroll", "payroll-batch")
        .with_identity("Teller", "teller-service")
}

fn metadata<B: AnnotatedBean>(
    name: &str,
    ejb_jar: &EjbJarDocument,
    extension: ExtensionLayer,
) -> BeanMetadata {
    BeanMetadata::builder(name)
        .annotated::<B>()
        .descriptor(ejb_jar.descriptor_for(name))
        .extension(extension)
        .build()
}

/// Deploys every fixture bean into `registry`.
pub fn deploy_fixtures(registry: &BeanRegistry) -> Result<(), SecurityError> {
    let hr = EjbJarDocument::from_json(descriptors::HR_EJB_JAR)?;
    let hr_extension = ExtensionDocument::from_json(descriptors::HR_EXTENSION)?;
    let archive = EjbJarDocument::from_json(descriptors::ARCHIVE_EJB_JAR)?;

    let beans = vec![
        metadata::<EmployeeDirectoryBean>(
            "EmployeeDirectoryBean",
            &hr,
            hr_extension.extension_for("EmployeeDirectoryBean"),
        ),
        metadata::<PayrollBean>("PayrollBean", &hr, hr_extension.extension_for("PayrollBean")),
        metadata::<ApprovalBean>("ApprovalBean", &hr, ExtensionLayer::new()),
        metadata::<MaintenanceBean>("MaintenanceBean", &hr, ExtensionLayer::new()),
        metadata::<PremiumAccountBean>("PremiumAccountBean", &hr, ExtensionLayer::new()),
        metadata::<ArchiveBean>("ArchiveBean", &archive, ExtensionLayer::new()),
    ];

    for bean in beans {
        registry.deploy(bean)?;
    }
    Ok(())
}

/// Registry with every fixture deployed.
pub fn fixture_registry(
    config: SecurityConfig,
    audit_logger: AuditLogger,
) -> Result<Arc<BeanRegistry>, SecurityError> {
    let registry = BeanRegistry::new(config).audit_logger(audit_logger);
    deploy_fixtures(&registry)?;
    Ok(Arc::new(registry))
}

/// Interceptor over `registry` using the demo identity mapping.
pub fn fixture_interceptor(registry: Arc<BeanRegistry>, audit_logger: AuditLogger) -> MethodInterceptor {
    MethodInterceptor::new(registry)
        .identity_mapper(identity_mapper())
        .audit_logger(audit_logger)
}

/// Routes of the demo application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::beans::list_beans)
        .service(handlers::beans::bean_policy)
        .service(handlers::invoke::invoke);
}
