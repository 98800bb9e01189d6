//! Typed security metadata of one bean type.
//!
//! Four layers, loaded once at deployment and never mutated afterwards:
//!
//! - [`AnnotationLayer`] - annotations on the bean class and its ancestors
//! - [`DescriptorLayer`] - the deployment descriptor, including the
//!   metadata-complete flag
//! - [`ExtensionLayer`] - vendor run-as modes per method
//!
//! [`BeanMetadata`] bundles them with the bean's business methods.

mod annotation;
mod descriptor;
mod extension;
pub mod validate;

pub use annotation::{
    AnnotatedBean, AnnotationLayer, AnnotationLevel, ClassAnnotations, EffectiveMarker,
    SecurityMarker,
};
pub use descriptor::{DescriptorCategory, DescriptorLayer, PermissionEntry, SecurityIdentity};
pub use extension::{ExtensionLayer, RunAsMode, RunAsModeEntry};

use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::ejb::security::role_reference::{self, DeclaredRoleSet};
use crate::ejb::security::signature::MethodSignature;

/// Immutable security snapshot of one bean.
///
/// # Example
/// ```
/// use jacc_ejb_security_core::ejb::security::{
///     BeanMetadata, ClassAnnotations, AnnotationLayer, DescriptorLayer, MethodSignature,
/// };
///
/// let metadata = BeanMetadata::builder("PayrollBean")
///     .annotations(AnnotationLayer::from_class(
///         ClassAnnotations::new("PayrollBean").method(MethodSignature::no_args("run")),
///     ))
///     .descriptor(DescriptorLayer::new())
///     .build();
///
/// assert!(metadata.get_business_methods().contains(&MethodSignature::no_args("run")));
/// ```
#[derive(Debug, Clone)]
pub struct BeanMetadata {
    name: String,
    annotations: AnnotationLayer,
    descriptor: DescriptorLayer,
    extension: ExtensionLayer,
    business_methods: BTreeSet<MethodSignature>,
    declared_roles: OnceLock<DeclaredRoleSet>,
}

impl BeanMetadata {
    pub fn builder(name: &str) -> BeanMetadataBuilder {
        BeanMetadataBuilder::new(name)
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_annotations(&self) -> &AnnotationLayer {
        &self.annotations
    }

    pub fn get_descriptor(&self) -> &DescriptorLayer {
        &self.descriptor
    }

    pub fn get_extension(&self) -> &ExtensionLayer {
        &self.extension
    }

    pub fn get_business_methods(&self) -> &BTreeSet<MethodSignature> {
        &self.business_methods
    }

    pub fn is_metadata_complete(&self) -> bool {
        self.descriptor.is_metadata_complete()
    }

    /// Roles this bean may query with a role-membership check.
    ///
    /// Derived from the layers on first use and kept for the lifetime of
    /// this snapshot.
    pub fn declared_role_set(&self) -> &DeclaredRoleSet {
        self.declared_roles
            .get_or_init(|| role_reference::compute_declared_roles(self))
    }
}

/// Builder for [`BeanMetadata`].
#[derive(Debug, Clone, Default)]
pub struct BeanMetadataBuilder {
    name: String,
    annotations: AnnotationLayer,
    descriptor: DescriptorLayer,
    extension: ExtensionLayer,
    business_methods: BTreeSet<MethodSignature>,
}

impl BeanMetadataBuilder {
    pub fn new(name: &str) -> Self {
        BeanMetadataBuilder {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn annotations(mut self, annotations: AnnotationLayer) -> Self {
        self.annotations = annotations;
        self
    }

    /// Takes the annotation layer from a bean type.
    pub fn annotated<B: AnnotatedBean>(self) -> Self {
        self.annotations(B::annotation_layer())
    }

    pub fn descriptor(mut self, descriptor: DescriptorLayer) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub fn extension(mut self, extension: ExtensionLayer) -> Self {
        self.extension = extension;
        self
    }

    pub fn business_method(mut self, method: MethodSignature) -> Self {
        self.business_methods.insert(method);
        self
    }

    pub fn business_methods(mut self, methods: impl IntoIterator<Item = MethodSignature>) -> Self {
        self.business_methods.extend(methods);
        self
    }

    /// Builds the snapshot.
    ///
    /// Business methods are the explicit ones plus every method the
    /// annotation chain declares and every exact signature a descriptor
    /// names.
    pub fn build(self) -> BeanMetadata {
        let mut business_methods = self.business_methods;
        business_methods.extend(self.annotations.declared_methods());
        business_methods.extend(
            self.descriptor
                .patterns()
                .chain(self.extension.patterns())
                .filter_map(|p| p.as_signature().cloned()),
        );

        BeanMetadata {
            name: self.name,
            annotations: self.annotations,
            descriptor: self.descriptor,
            extension: self.extension,
            business_methods,
            declared_roles: OnceLock::new(),
        }
    }
}
