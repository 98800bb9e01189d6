//! Security annotations of a bean class and its superclass chain.
//!
//! # EJB Equivalent
//! `@DenyAll`, `@PermitAll`, `@RolesAllowed`, `@DeclareRoles` and `@RunAs`
//! (JSR-250).
//!
//! Annotations are shadowed, never merged: a method-level marker hides the
//! class-level marker of the class that declares the method, and a class
//! that overrides a method hides everything its ancestors said about it.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::ejb::error::ConfigurationError;
use crate::ejb::security::signature::MethodSignature;

/// One security marker, at class or method level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityMarker {
    DenyAll,
    PermitAll,
    /// Roles in declaration order. Duplicates are kept so they can be reported.
    RolesAllowed(Vec<String>),
}

impl SecurityMarker {
    pub fn roles_allowed(roles: &[&str]) -> Self {
        SecurityMarker::RolesAllowed(roles.iter().map(|r| r.to_string()).collect())
    }

    /// Annotation name used in diagnostics.
    pub fn annotation_name(&self) -> &'static str {
        match self {
            SecurityMarker::DenyAll => "@DenyAll",
            SecurityMarker::PermitAll => "@PermitAll",
            SecurityMarker::RolesAllowed(_) => "@RolesAllowed",
        }
    }

    fn duplicate_role(&self) -> Option<&str> {
        let SecurityMarker::RolesAllowed(roles) = self else {
            return None;
        };
        let mut seen = HashSet::new();
        roles
            .iter()
            .find(|role| !seen.insert(role.as_str()))
            .map(String::as_str)
    }
}

impl fmt::Display for SecurityMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityMarker::RolesAllowed(roles) => write!(f, "@RolesAllowed({:?})", roles),
            other => write!(f, "{}", other.annotation_name()),
        }
    }
}

/// Annotations found on one class.
///
/// Every method the class declares (implements or overrides) is listed,
/// whether or not it carries a marker.
///
/// # Example
/// ```
/// use jacc_ejb_security_core::ejb::security::{ClassAnnotations, MethodSignature, SecurityMarker};
///
/// let class = ClassAnnotations::new("PayrollBean")
///     .roles_allowed(&["Payroll"])
///     .run_as("Batch")
///     .method(MethodSignature::no_args("status"))
///     .method_marker(MethodSignature::no_args("close"), SecurityMarker::DenyAll);
///
/// assert!(class.declares(&MethodSignature::no_args("status")));
/// assert_eq!(class.get_run_as(), Some("Batch"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassAnnotations {
    class_name: String,
    class_markers: Vec<SecurityMarker>,
    declare_roles: Vec<String>,
    run_as: Option<String>,
    methods: BTreeMap<MethodSignature, Vec<SecurityMarker>>,
}

impl ClassAnnotations {
    pub fn new(class_name: &str) -> Self {
        ClassAnnotations {
            class_name: class_name.to_string(),
            ..Default::default()
        }
    }

    pub fn deny_all(self) -> Self {
        self.class_marker(SecurityMarker::DenyAll)
    }

    pub fn permit_all(self) -> Self {
        self.class_marker(SecurityMarker::PermitAll)
    }

    pub fn roles_allowed(self, roles: &[&str]) -> Self {
        self.class_marker(SecurityMarker::roles_allowed(roles))
    }

    /// Adds a class-level marker. More than one is a configuration error,
    /// reported by [`ClassAnnotations::validate`].
    pub fn class_marker(mut self, marker: SecurityMarker) -> Self {
        self.class_markers.push(marker);
        self
    }

    pub fn declare_roles(mut self, roles: &[&str]) -> Self {
        self.declare_roles.extend(roles.iter().map(|r| r.to_string()));
        self
    }

    pub fn run_as(mut self, role: &str) -> Self {
        self.run_as = Some(role.to_string());
        self
    }

    /// Records that the class declares `method` without a marker.
    pub fn method(mut self, method: MethodSignature) -> Self {
        self.methods.entry(method).or_default();
        self
    }

    pub fn method_marker(mut self, method: MethodSignature, marker: SecurityMarker) -> Self {
        self.methods.entry(method).or_default().push(marker);
        self
    }

    pub fn get_class_name(&self) -> &str {
        &self.class_name
    }

    pub fn get_class_marker(&self) -> Option<&SecurityMarker> {
        self.class_markers.first()
    }

    pub fn get_method_marker(&self, method: &MethodSignature) -> Option<&SecurityMarker> {
        self.methods.get(method).and_then(|markers| markers.first())
    }

    pub fn get_declare_roles(&self) -> &[String] {
        &self.declare_roles
    }

    pub fn get_run_as(&self) -> Option<&str> {
        self.run_as.as_deref()
    }

    pub fn declares(&self, method: &MethodSignature) -> bool {
        self.methods.contains_key(method)
    }

    pub fn declared_methods(&self) -> impl Iterator<Item = &MethodSignature> {
        self.methods.keys()
    }

    /// Checks the JSR-250 placement rules for this class.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let [first, second, ..] = self.class_markers.as_slice() {
            return Err(ConfigurationError::ConflictingClassAnnotations {
                class: self.class_name.clone(),
                first: first.annotation_name().to_string(),
                second: second.annotation_name().to_string(),
            });
        }
        if let Some(role) = self.class_markers.first().and_then(|m| m.duplicate_role()) {
            return Err(ConfigurationError::DuplicateRole {
                class: self.class_name.clone(),
                location: "class level".to_string(),
                role: role.to_string(),
            });
        }

        for (method, markers) in &self.methods {
            if let [first, second, ..] = markers.as_slice() {
                return Err(ConfigurationError::ConflictingMethodAnnotations {
                    class: self.class_name.clone(),
                    method: method.to_string(),
                    first: first.annotation_name().to_string(),
                    second: second.annotation_name().to_string(),
                });
            }
            if let Some(role) = markers.first().and_then(|m| m.duplicate_role()) {
                return Err(ConfigurationError::DuplicateRole {
                    class: self.class_name.clone(),
                    location: format!("method '{}'", method),
                    role: role.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Where an effective marker was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationLevel {
    Method,
    Class,
}

/// The annotation that governs one method after shadowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveMarker<'a> {
    pub marker: &'a SecurityMarker,
    pub class_name: &'a str,
    pub level: AnnotationLevel,
}

/// Annotations of a bean class and its ancestors, most-derived first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationLayer {
    chain: Vec<ClassAnnotations>,
}

impl AnnotationLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_class(class: ClassAnnotations) -> Self {
        AnnotationLayer { chain: vec![class] }
    }

    /// Builds a layer from an explicit chain, most-derived class first.
    pub fn from_chain(chain: Vec<ClassAnnotations>) -> Self {
        AnnotationLayer { chain }
    }

    /// Puts `subclass` in front of the current chain.
    pub fn extend(mut self, subclass: ClassAnnotations) -> Self {
        self.chain.insert(0, subclass);
        self
    }

    /// Appends an ancestor at the far end of the chain.
    pub fn with_superclass(mut self, superclass: ClassAnnotations) -> Self {
        self.chain.push(superclass);
        self
    }

    pub fn get_chain(&self) -> &[ClassAnnotations] {
        &self.chain
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// The nearest class in the chain that declares `method`.
    pub fn declaring_class(&self, method: &MethodSignature) -> Option<&ClassAnnotations> {
        self.chain.iter().find(|class| class.declares(method))
    }

    /// Resolves the marker that governs `method`.
    ///
    /// The nearest declaring class decides alone: its method marker, else its
    /// class marker, else nothing. When no class declares the method, the
    /// nearest class-level marker applies.
    pub fn effective_marker(&self, method: &MethodSignature) -> Option<EffectiveMarker<'_>> {
        if let Some(class) = self.declaring_class(method) {
            if let Some(marker) = class.get_method_marker(method) {
                return Some(EffectiveMarker {
                    marker,
                    class_name: class.get_class_name(),
                    level: AnnotationLevel::Method,
                });
            }
            return class.get_class_marker().map(|marker| EffectiveMarker {
                marker,
                class_name: class.get_class_name(),
                level: AnnotationLevel::Class,
            });
        }

        self.chain.iter().find_map(|class| {
            class.get_class_marker().map(|marker| EffectiveMarker {
                marker,
                class_name: class.get_class_name(),
                level: AnnotationLevel::Class,
            })
        })
    }

    /// `@RunAs` of the nearest class declaring `method`.
    ///
    /// An overriding subclass without `@RunAs` does not inherit its
    /// ancestor's. When no class declares the method, the nearest `@RunAs`
    /// in the chain applies.
    pub fn run_as_for(&self, method: &MethodSignature) -> Option<&str> {
        match self.declaring_class(method) {
            Some(class) => class.get_run_as(),
            None => self.chain.iter().find_map(|class| class.get_run_as()),
        }
    }

    /// Union of every `@DeclareRoles` in the chain.
    pub fn declared_roles(&self) -> BTreeSet<String> {
        self.chain
            .iter()
            .flat_map(|class| class.get_declare_roles().iter().cloned())
            .collect()
    }

    /// Every method declared anywhere in the chain.
    pub fn declared_methods(&self) -> BTreeSet<MethodSignature> {
        self.chain
            .iter()
            .flat_map(|class| class.declared_methods().cloned())
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.chain.iter().try_for_each(ClassAnnotations::validate)
    }
}

/// Implemented by bean types that carry security annotations.
///
/// Usually derived with `#[security_annotations]`.
pub trait AnnotatedBean {
    fn annotation_layer() -> AnnotationLayer;
}
