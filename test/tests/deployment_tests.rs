//! Deployment tests: descriptor loading, configuration flags and redeployment.


use std::sync::Arc;

use jacc_ejb_security::ejb::error::{ConfigurationError, SecurityError};
use jacc_ejb_security::ejb::security::{
    AuditLogger, BeanMetadata, BeanRegistry, Caller, DescriptorLayer, EjbJarDocument, ExtensionDocument,
    MethodInterceptor, MethodPattern, MethodSignature, ResolvedDecision, RunAsMode,
    SecurityConfig, SecurityEventType,
};
use jacc_ejb_security_test::beans::{ArchiveBean, EmployeeDirectoryBean};
use jacc_ejb_security_test::descriptors::{ARCHIVE_EJB_JAR, HR_EJB_JAR, HR_EXTENSION};
use jacc_ejb_security_test::fixture_registry;

use common::{test_interceptor, test_registry, EMPLOYEE, MANAGER};

// =============================================================================
// Descriptor Loading Tests
// =============================================================================

#[test]
fn test_fixture_documents_load() {
    let hr = EjbJarDocument::from_json(HR_EJB_JAR).unwrap();
    assert_eq!(hr.bean_names().len(), 5);

    let directory = hr.descriptor_for("EmployeeDirectoryBean");
    assert!(!directory.is_metadata_complete());
    assert_eq!(directory.role_link("hr-admin"), Some("Manager"));

    let approval = hr.descriptor_for("ApprovalBean");
    assert!(approval
        .match_exclude(&MethodSignature::new("approve", &["u64"]))
        .is_some());
    // exclusions of other beans do not leak
    assert!(directory
        .match_exclude(&MethodSignature::new("approve", &["u64"]))
        .is_none());

    let archive = EjbJarDocument::from_json(ARCHIVE_EJB_JAR).unwrap();
    assert!(archive.descriptor_for("ArchiveBean").is_metadata_complete());
}

#[test]
fn test_fixture_extension_loads() {
    let extension = ExtensionDocument::from_json(HR_EXTENSION).unwrap();
    let payroll = extension.extension_for("PayrollBean");

    assert_eq!(
        payroll.mode_for(&MethodSignature::no_args("preview")),
        Some(&RunAsMode::CallerIdentity)
    );
    assert_eq!(
        payroll.mode_for(&MethodSignature::no_args("close_period")),
        Some(&RunAsMode::SystemIdentity)
    );
    assert!(extension.extension_for("EmployeeDirectoryBean").is_empty());
}

#[test]
fn test_malformed_document_is_load_error() {
    let err: SecurityError = EjbJarDocument::from_json(r#"{ "enterprise_beans": 3 }"#)
        .unwrap_err()
        .into();
    assert!(matches!(err, SecurityError::Load(_)));
    assert!(!err.is_access_denied());
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_fixtures_pass_role_reference_validation() {
    let config = SecurityConfig::default().validate_role_references(true);
    assert!(fixture_registry(config, AuditLogger::new()).is_ok());
}

#[test]
fn test_system_identity_rejected_at_deploy() {
    let config = SecurityConfig::from_json(r#"{ "reject_system_identity_at_deploy": true }"#).unwrap();

    match fixture_registry(config, AuditLogger::new()) {
        Err(SecurityError::Configuration(ConfigurationError::SystemIdentityUnsupported {
            bean,
            method,
        })) => {
            assert_eq!(bean, "PayrollBean");
            assert_eq!(method, "close_period()");
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("PayrollBean should not deploy"),
    }
}

#[test]
fn test_undeclared_role_rejected() {
    let registry = BeanRegistry::new(SecurityConfig::default().validate_role_references(true));
    let metadata = BeanMetadata::builder("EmployeeDirectoryBean")
        .annotated::<EmployeeDirectoryBean>()
        .descriptor(
            DescriptorLayer::new()
                .security_role("Employee")
                .permit(MethodPattern::named("purge"), &["Janitor"]),
        )
        .build();

    assert_eq!(
        registry.deploy(metadata).unwrap_err(),
        ConfigurationError::UndeclaredRole {
            bean: "EmployeeDirectoryBean".into(),
            role: "Janitor".into(),
        }
    );
}

// =============================================================================
// Redeployment Tests
// =============================================================================

#[test]
fn test_in_flight_invocation_keeps_snapshot() {
    let registry = test_registry();
    let interceptor = MethodInterceptor::new(Arc::clone(&registry));
    let restore = MethodSignature::new("restore", &["i32"]);

    let archivist = Caller::new("ida").roles(&["Archivist"]);
    let invocation = interceptor.pre_invoke("ArchiveBean", &restore, &archivist).unwrap();

    registry
        .deploy(
            BeanMetadata::builder("ArchiveBean")
                .annotated::<ArchiveBean>()
                .descriptor(
                    DescriptorLayer::new()
                        .metadata_complete(true)
                        .exclude(MethodPattern::all()),
                )
                .build(),
        )
        .unwrap();

    assert!(matches!(
        invocation.get_decision(),
        ResolvedDecision::RoleRestricted(_)
    ));
    assert!(invocation
        .get_metadata()
        .get_descriptor()
        .match_exclude(&restore)
        .is_none());
    assert!(interceptor.pre_invoke("ArchiveBean", &restore, &archivist).is_err());
}

#[test]
fn test_undeployed_bean_unknown() {
    let (interceptor, store) = test_interceptor(SecurityConfig::default());
    interceptor.get_registry().undeploy("MaintenanceBean");

    match interceptor.pre_invoke("MaintenanceBean", &MethodSignature::no_args("status"), &EMPLOYEE) {
        Err(SecurityError::UnknownBean { bean }) => assert_eq!(bean, "MaintenanceBean"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(store.get_events_by_type(&SecurityEventType::BeanUndeployed).len(), 1);
}

// =============================================================================
// Interceptor Tests
// =============================================================================

#[test]
fn test_run_as_caller_mapping() {
    let (interceptor, store) = test_interceptor(SecurityConfig::default());

    let invocation = interceptor
        .pre_invoke("PayrollBean", &MethodSignature::no_args("run_payroll"), &MANAGER)
        .unwrap();
    let run_as = invocation.run_as_caller().unwrap();
    assert_eq!(run_as.get_principal(), "payroll-batch");

    let nested = invocation
        .invoke_nested("EmployeeDirectoryBean", &MethodSignature::no_args("list_employees"))
        .unwrap();
    assert_eq!(nested.get_caller().get_principal(), "payroll-batch");
    assert_eq!(store.get_events_by_type(&SecurityEventType::RunAsApplied).len(), 1);
}

#[test]
fn test_unmapped_run_as_role() {
    let registry = test_registry();
    // no identity mapper configured
    let interceptor = MethodInterceptor::new(registry);

    let invocation = interceptor
        .pre_invoke("PayrollBean", &MethodSignature::no_args("run_payroll"), &MANAGER)
        .unwrap();

    match invocation.run_as_caller() {
        Err(SecurityError::Configuration(ConfigurationError::UnmappedRunAsRole { role, .. })) => {
            assert_eq!(role, "Payroll")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_role_queries_are_audited() {
    let (interceptor, store) = test_interceptor(SecurityConfig::default());

    let invocation = interceptor
        .pre_invoke("EmployeeDirectoryBean", &MethodSignature::no_args("audit_view"), &MANAGER)
        .unwrap();

    assert!(invocation.is_caller_in_role("hr-admin"));
    assert!(!invocation.is_caller_in_role("Auditor"));
    assert_eq!(store.get_events_by_type(&SecurityEventType::RoleQuery).len(), 2);
}
