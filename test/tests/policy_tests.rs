//! Resolver scenarios: permission precedence, role references and run-as.
//!
//! Pure library tests, no HTTP.


use std::collections::BTreeSet;

use jacc_ejb_security::ejb::error::ConfigurationError;
use jacc_ejb_security::ejb::security::{
    declared_roles, effective_policy, is_in_role, resolve, resolve_identity, AnnotationLayer,
    BeanMetadata, ClassAnnotations, DenialReason, DescriptorLayer, ExtensionLayer, MethodPattern,
    MethodPolicy, MethodSignature, PolicySource, ResolvedDecision, ResolvedIdentity, RunAsMode,
    SecurityMarker, Specificity,
};

use common::fixture_metadata;

fn roles(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|r| r.to_string()).collect()
}

fn m() -> MethodSignature {
    MethodSignature::no_args("m")
}

fn single_class(class: ClassAnnotations) -> AnnotationLayer {
    AnnotationLayer::from_class(class)
}

// =============================================================================
// Permission Precedence
// =============================================================================

#[test]
fn test_class_deny_all_method_permit_all() {
    let metadata = BeanMetadata::builder("B")
        .annotations(single_class(
            ClassAnnotations::new("B")
                .deny_all()
                .method_marker(m(), SecurityMarker::PermitAll),
        ))
        .build();

    assert_eq!(resolve(&metadata, &m(), &roles(&[])), ResolvedDecision::Unchecked);
}

#[test]
fn test_metadata_complete_without_entry_is_unchecked() {
    let metadata = BeanMetadata::builder("B")
        .annotations(single_class(
            ClassAnnotations::new("B")
                .permit_all()
                .method_marker(m(), SecurityMarker::DenyAll),
        ))
        .descriptor(DescriptorLayer::new().metadata_complete(true))
        .build();

    let trace = effective_policy(&metadata, &m());
    assert_eq!(trace.policy, MethodPolicy::Unchecked);
    assert_eq!(trace.source, PolicySource::Default);
}

#[test]
fn test_exclude_dominates_annotation() {
    let metadata = BeanMetadata::builder("B")
        .annotations(single_class(
            ClassAnnotations::new("B").method_marker(m(), SecurityMarker::roles_allowed(&["Manager"])),
        ))
        .descriptor(DescriptorLayer::new().exclude(MethodPattern::named("m")))
        .build();

    match resolve(&metadata, &m(), &roles(&["Manager"])) {
        ResolvedDecision::Denied(denial) => {
            assert_eq!(denial.get_reason(), DenialReason::Excluded);
            assert_eq!(denial.get_caller_roles(), &roles(&["Manager"]));
        }
        other => panic!("expected a denial, got {:?}", other),
    }
}

#[test]
fn test_exclude_dominates_every_category() {
    let metadata = BeanMetadata::builder("B")
        .descriptor(
            DescriptorLayer::new()
                .unchecked(MethodPattern::exact(m()))
                .permit(MethodPattern::exact(m()), &["Manager"])
                .exclude(MethodPattern::all()),
        )
        .build();

    assert!(!resolve(&metadata, &m(), &roles(&["Manager"])).is_permitted());
}

#[test]
fn test_unchecked_dominates_permission() {
    let metadata = BeanMetadata::builder("B")
        .descriptor(
            DescriptorLayer::new()
                .permit(MethodPattern::exact(m()), &["Manager"])
                .unchecked(MethodPattern::all()),
        )
        .build();

    assert_eq!(resolve(&metadata, &m(), &roles(&[])), ResolvedDecision::Unchecked);
}

#[test]
fn test_most_specific_permission_wins() {
    let metadata = BeanMetadata::builder("B")
        .descriptor(
            DescriptorLayer::new()
                .permit(MethodPattern::all(), &["Everyone"])
                .permit(MethodPattern::named("m"), &["Named"])
                .permit(MethodPattern::exact(m()), &["Exact"]),
        )
        .build();

    let trace = effective_policy(&metadata, &m());
    assert_eq!(trace.policy, MethodPolicy::RoleRestricted(roles(&["Exact"])));
    assert_eq!(trace.source, PolicySource::MethodPermission(Specificity::Exact));

    let other = MethodSignature::new("m", &["int"]);
    assert_eq!(
        effective_policy(&metadata, &other).policy,
        MethodPolicy::RoleRestricted(roles(&["Named"]))
    );
}

#[test]
fn test_permissions_at_same_specificity_are_unioned() {
    let metadata = BeanMetadata::builder("B")
        .descriptor(
            DescriptorLayer::new()
                .permit(MethodPattern::named("m"), &["A"])
                .permit(MethodPattern::named("m"), &["B"]),
        )
        .build();

    assert!(resolve(&metadata, &m(), &roles(&["B"])).is_permitted());
    assert_eq!(
        effective_policy(&metadata, &m()).policy,
        MethodPolicy::RoleRestricted(roles(&["A", "B"]))
    );
}

#[test]
fn test_empty_metadata_is_unchecked() {
    let metadata = BeanMetadata::builder("B").build();
    assert_eq!(resolve(&metadata, &m(), &roles(&[])), ResolvedDecision::Unchecked);
}

#[test]
fn test_shadowing_does_not_merge() {
    let base = ClassAnnotations::new("Base")
        .roles_allowed(&["Customer"])
        .method_marker(m(), SecurityMarker::roles_allowed(&["Teller"]));
    let derived = ClassAnnotations::new("Derived").method(m());

    let metadata = BeanMetadata::builder("Derived")
        .annotations(AnnotationLayer::from_class(base).extend(derived))
        .build();

    // The override declares m without a marker and Derived has no class marker
    assert_eq!(resolve(&metadata, &m(), &roles(&[])), ResolvedDecision::Unchecked);
}

// =============================================================================
// Role References
// =============================================================================

#[test]
fn test_is_in_role_needs_declaration_and_membership() {
    let metadata = BeanMetadata::builder("B")
        .annotations(single_class(
            ClassAnnotations::new("B")
                .declare_roles(&["Auditor"])
                .method_marker(m(), SecurityMarker::roles_allowed(&["Manager"])),
        ))
        .build();

    assert!(is_in_role(&metadata, "Auditor", &roles(&["Auditor"])));
    assert!(is_in_role(&metadata, "Manager", &roles(&["Manager"])));
    assert!(!is_in_role(&metadata, "Auditor", &roles(&["Manager"])));
    assert!(!is_in_role(&metadata, "Root", &roles(&["Root"])));
}

#[test]
fn test_shadowed_annotation_roles_not_declared() {
    let metadata = BeanMetadata::builder("B")
        .annotations(single_class(
            ClassAnnotations::new("B").method_marker(m(), SecurityMarker::roles_allowed(&["Manager"])),
        ))
        .descriptor(DescriptorLayer::new().permit(MethodPattern::named("m"), &["Clerk"]))
        .build();

    let declared = declared_roles(&metadata);
    assert!(declared.contains("Clerk"));
    assert!(!declared.contains("Manager"));
}

#[test]
fn test_role_link_is_deterministic() {
    let metadata = fixture_metadata("EmployeeDirectoryBean");

    for _ in 0..3 {
        assert!(is_in_role(&metadata, "hr-admin", &roles(&["Manager"])));
        assert!(!is_in_role(&metadata, "hr-admin", &roles(&["hr-admin"])));
    }
}

#[test]
fn test_fixture_declared_roles() {
    let metadata = fixture_metadata("EmployeeDirectoryBean");
    let declared: Vec<&String> = declared_roles(&metadata).iter().collect();
    assert_eq!(declared, vec!["Auditor", "Employee", "Manager", "Payroll"]);
}

// =============================================================================
// Run-As
// =============================================================================

#[test]
fn test_annotation_run_as() {
    let metadata = BeanMetadata::builder("B")
        .annotations(single_class(ClassAnnotations::new("B").run_as("Employee").method(m())))
        .build();

    assert_eq!(
        resolve_identity(&metadata, &m()).unwrap(),
        ResolvedIdentity::AsRole("Employee".into())
    );
}

#[test]
fn test_run_as_precedence() {
    let annotations = single_class(ClassAnnotations::new("B").run_as("FromAnnotation").method(m()));

    let descriptor_wins = BeanMetadata::builder("B")
        .annotations(annotations.clone())
        .descriptor(DescriptorLayer::new().run_as("FromDescriptor"))
        .build();
    assert_eq!(
        resolve_identity(&descriptor_wins, &m()).unwrap(),
        ResolvedIdentity::AsRole("FromDescriptor".into())
    );

    let extension_wins = BeanMetadata::builder("B")
        .annotations(annotations.clone())
        .descriptor(DescriptorLayer::new().run_as("FromDescriptor"))
        .extension(ExtensionLayer::new().run_as_mode(MethodPattern::named("m"), RunAsMode::CallerIdentity))
        .build();
    assert_eq!(resolve_identity(&extension_wins, &m()).unwrap(), ResolvedIdentity::AsCaller);

    let complete = BeanMetadata::builder("B")
        .annotations(annotations)
        .descriptor(DescriptorLayer::new().metadata_complete(true))
        .build();
    assert_eq!(resolve_identity(&complete, &m()).unwrap(), ResolvedIdentity::AsCaller);
}

#[test]
fn test_specified_identity_beats_descriptor_and_annotation_run_as() {
    let metadata = BeanMetadata::builder("B")
        .annotations(single_class(ClassAnnotations::new("B").run_as("A").method(m())))
        .descriptor(DescriptorLayer::new().run_as("X"))
        .extension(ExtensionLayer::new().run_as_mode(MethodPattern::exact(m()), RunAsMode::specified("S")))
        .build();

    assert_eq!(
        resolve_identity(&metadata, &m()).unwrap(),
        ResolvedIdentity::AsRole("S".into())
    );
    // other methods keep the descriptor run-as
    assert_eq!(
        resolve_identity(&metadata, &MethodSignature::no_args("other")).unwrap(),
        ResolvedIdentity::AsRole("X".into())
    );
}

#[test]
fn test_system_identity_is_configuration_error() {
    let metadata = BeanMetadata::builder("B")
        .extension(ExtensionLayer::new().run_as_mode(MethodPattern::exact(m()), RunAsMode::SystemIdentity))
        .build();

    assert!(matches!(
        resolve_identity(&metadata, &m()),
        Err(ConfigurationError::SystemIdentityUnsupported { .. })
    ));
}

#[test]
fn test_specified_identity_without_role() {
    let with_bean_run_as = BeanMetadata::builder("B")
        .descriptor(DescriptorLayer::new().run_as("Batch"))
        .extension(ExtensionLayer::new().run_as_mode(MethodPattern::all(), RunAsMode::specified("")))
        .build();
    assert_eq!(
        resolve_identity(&with_bean_run_as, &m()).unwrap(),
        ResolvedIdentity::AsRole("Batch".into())
    );

    let without = BeanMetadata::builder("B")
        .extension(ExtensionLayer::new().run_as_mode(MethodPattern::all(), RunAsMode::specified(" ")))
        .build();
    assert!(matches!(
        resolve_identity(&without, &m()),
        Err(ConfigurationError::MissingSpecifiedRole { .. })
    ));
}

#[test]
fn test_overriding_subclass_does_not_inherit_run_as() {
    let metadata = fixture_metadata("PremiumAccountBean");

    let balance = MethodSignature::new("balance", &["String"]);
    let transfer = MethodSignature::new("transfer", &["String", "String"]);

    assert_eq!(resolve_identity(&metadata, &balance).unwrap(), ResolvedIdentity::AsCaller);
    assert_eq!(
        resolve_identity(&metadata, &transfer).unwrap(),
        ResolvedIdentity::AsRole("Teller".into())
    );
}
