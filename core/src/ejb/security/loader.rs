//! JSON forms of the deployment descriptor and the vendor extension file.
//!
//! # Example
//! ```
//! use jacc_ejb_security_core::ejb::security::{EjbJarDocument, MethodSignature};
//!
//! let document = EjbJarDocument::from_json(r#"{
//!     "enterprise_beans": [{ "ejb_name": "PayrollBean" }],
//!     "assembly_descriptor": {
//!         "security_roles": ["Payroll"],
//!         "method_permissions": [{
//!             "role_names": ["Payroll"],
//!             "methods": [{ "ejb_name": "PayrollBean", "method_name": "run" }]
//!         }],
//!         "exclude_list": [{ "ejb_name": "PayrollBean", "method_name": "purge", "method_params": [] }]
//!     }
//! }"#).unwrap();
//!
//! let descriptor = document.descriptor_for("PayrollBean");
//! assert!(descriptor.match_permission(&MethodSignature::no_args("run")).is_some());
//! assert!(descriptor.match_exclude(&MethodSignature::no_args("purge")).is_some());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::ejb::error::LoadError;
use crate::ejb::security::metadata::{DescriptorLayer, ExtensionLayer, RunAsMode, SecurityIdentity};
use crate::ejb::security::signature::MethodPattern;

/// A `<method>` element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MethodElement {
    #[serde(default)]
    pub ejb_name: Option<String>,
    pub method_name: String,
    /// Absent selects every overload; an empty list selects the no-arg one.
    #[serde(default)]
    pub method_params: Option<MethodParams>,
}

/// Parameter types, as a list or as one whitespace/comma separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MethodParams {
    List(Vec<String>),
    Joined(String),
}

impl MethodElement {
    pub fn pattern(&self) -> MethodPattern {
        match &self.method_params {
            None => MethodPattern::from_element(&self.method_name, None),
            Some(MethodParams::List(params)) => {
                MethodPattern::from_element(&self.method_name, Some(params.as_slice()))
            }
            Some(MethodParams::Joined(params)) => {
                MethodPattern::from_element(&self.method_name, Some(std::slice::from_ref(params)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityIdentityDocument {
    UseCallerIdentity,
    RunAs { role_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleRefDocument {
    pub role_name: String,
    #[serde(default)]
    pub role_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BeanDocument {
    pub ejb_name: String,
    #[serde(default)]
    pub security_identity: Option<SecurityIdentityDocument>,
    #[serde(default)]
    pub security_role_refs: Vec<RoleRefDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MethodPermissionDocument {
    pub unchecked: bool,
    pub role_names: Vec<String>,
    pub methods: Vec<MethodElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssemblyDescriptorDocument {
    pub security_roles: Vec<String>,
    pub method_permissions: Vec<MethodPermissionDocument>,
    pub exclude_list: Vec<MethodElement>,
}

/// The deployment descriptor of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EjbJarDocument {
    pub metadata_complete: bool,
    pub enterprise_beans: Vec<BeanDocument>,
    pub assembly_descriptor: AssemblyDescriptorDocument,
}

impl EjbJarDocument {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::invalid("ejb-jar", e))
    }

    /// Names of the beans listed in the document.
    pub fn bean_names(&self) -> Vec<&str> {
        self.enterprise_beans
            .iter()
            .map(|b| b.ejb_name.as_str())
            .collect()
    }

    /// Descriptor layers of every bean the document mentions.
    ///
    /// Method elements without an `ejb_name` are skipped with a warning.
    pub fn descriptors(&self) -> BTreeMap<String, DescriptorLayer> {
        let base = self.module_defaults();

        let mut layers: BTreeMap<String, DescriptorLayer> = BTreeMap::new();
        let mut update = |element: &MethodElement, apply: &dyn Fn(DescriptorLayer) -> DescriptorLayer| {
            let Some(bean) = element.ejb_name.as_deref() else {
                log::warn!(
                    "Ignoring method element '{}' without an ejb-name",
                    element.method_name
                );
                return;
            };
            let layer = layers.entry(bean.to_string()).or_insert_with(|| base.clone());
            *layer = apply(std::mem::take(layer));
        };

        for permission in &self.assembly_descriptor.method_permissions {
            for element in &permission.methods {
                let pattern = element.pattern();
                if permission.unchecked {
                    update(element, &|layer| layer.unchecked(pattern.clone()));
                } else {
                    let roles: BTreeSet<String> = permission.role_names.iter().cloned().collect();
                    update(element, &|layer| layer.permit_roles(pattern.clone(), roles.clone()));
                }
            }
        }

        for element in &self.assembly_descriptor.exclude_list {
            let pattern = element.pattern();
            update(element, &|layer| layer.exclude(pattern.clone()));
        }

        for bean in &self.enterprise_beans {
            let layer = layers
                .entry(bean.ejb_name.clone())
                .or_insert_with(|| base.clone());
            let mut updated = std::mem::take(layer);

            updated = match &bean.security_identity {
                Some(SecurityIdentityDocument::UseCallerIdentity) => {
                    updated.security_identity(SecurityIdentity::UseCallerIdentity)
                }
                Some(SecurityIdentityDocument::RunAs { role_name }) => updated.run_as(role_name),
                None => updated,
            };
            for role_ref in &bean.security_role_refs {
                if let Some(link) = &role_ref.role_link {
                    updated = updated.role_ref(&role_ref.role_name, link);
                }
            }

            *layer = updated;
        }

        layers
    }

    /// Descriptor layer of one bean. A bean the document never mentions
    /// still inherits the module-wide settings.
    pub fn descriptor_for(&self, bean: &str) -> DescriptorLayer {
        let mut layers = self.descriptors();
        layers.remove(bean).unwrap_or_else(|| self.module_defaults())
    }

    fn module_defaults(&self) -> DescriptorLayer {
        self.assembly_descriptor.security_roles.iter().fold(
            DescriptorLayer::new().metadata_complete(self.metadata_complete),
            |layer, role| layer.security_role(role),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunAsModeKind {
    CallerIdentity,
    SpecifiedIdentity,
    SystemIdentity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecifiedIdentityDocument {
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunAsModeDocument {
    pub mode: RunAsModeKind,
    #[serde(default)]
    pub specified_identity: Option<SpecifiedIdentityDocument>,
    #[serde(default)]
    pub methods: Vec<MethodElement>,
}

impl RunAsModeDocument {
    fn to_mode(&self) -> RunAsMode {
        match self.mode {
            RunAsModeKind::CallerIdentity => RunAsMode::CallerIdentity,
            RunAsModeKind::SystemIdentity => RunAsMode::SystemIdentity,
            RunAsModeKind::SpecifiedIdentity => {
                let role = self
                    .specified_identity
                    .as_ref()
                    .and_then(|s| s.role.as_deref())
                    .unwrap_or("");
                RunAsMode::specified(role)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtensionBeanDocument {
    pub ejb_name: String,
    #[serde(default)]
    pub run_as_modes: Vec<RunAsModeDocument>,
}

/// The vendor extension file of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtensionDocument {
    pub beans: Vec<ExtensionBeanDocument>,
}

impl ExtensionDocument {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::invalid("extension", e))
    }

    /// Extension layer of one bean, empty when the bean is not listed.
    pub fn extension_for(&self, bean: &str) -> ExtensionLayer {
        self.beans
            .iter()
            .filter(|b| b.ejb_name == bean)
            .flat_map(|b| b.run_as_modes.iter())
            .flat_map(|entry| {
                let mode = entry.to_mode();
                entry.methods.iter().map(move |m| (m.pattern(), mode.clone()))
            })
            .fold(ExtensionLayer::new(), |layer, (pattern, mode)| {
                layer.run_as_mode(pattern, mode)
            })
    }
}
