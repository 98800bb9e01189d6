use derive_more::{Display, Error, From};

use crate::ejb::security::Denial;

/// Errors surfaced to the invocation boundary.
#[derive(Debug, Display, Error, From)]
pub enum SecurityError {
    /// The resolved decision denied the caller.
    #[display("access denied: {_0}")]
    AccessDenied(Denial),

    /// The bean's metadata cannot be used to authorize the invocation.
    #[display("configuration error: {_0}")]
    Configuration(ConfigurationError),

    /// A descriptor document could not be read.
    #[display("descriptor error: {_0}")]
    Load(LoadError),

    /// No bean with this name is deployed.
    #[from(ignore)]
    #[display("bean '{bean}' is not deployed")]
    UnknownBean { bean: String },
}

impl SecurityError {
    /// Returns true for authorization failures, false for operator-facing errors.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, SecurityError::AccessDenied(_))
    }
}

/// Malformed or self-contradictory security metadata.
///
/// Raised at deployment or on the first invocation that needs the offending
/// metadata. A bean (or method) in this state must not be invoked.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConfigurationError {
    /// More than one of DenyAll, PermitAll and RolesAllowed on one method.
    #[display("{first} and {second} annotations are both set on method '{method}' of class '{class}'")]
    ConflictingMethodAnnotations {
        class: String,
        method: String,
        first: String,
        second: String,
    },

    /// More than one class-level marker on one class.
    #[display("{first} and {second} annotations are both set on class '{class}'")]
    ConflictingClassAnnotations {
        class: String,
        first: String,
        second: String,
    },

    /// The same role listed twice in one RolesAllowed.
    #[display("role '{role}' is defined multiple times on the @RolesAllowed annotation at {location} of class '{class}'")]
    DuplicateRole {
        class: String,
        location: String,
        role: String,
    },

    /// A method-permission names a role that no layer declares.
    #[display("method-permission on bean '{bean}' names undeclared role '{role}'")]
    UndeclaredRole { bean: String, role: String },

    /// A security-role-ref links to a role that no layer declares.
    #[display("security-role-ref '{reference}' on bean '{bean}' links to undeclared role '{role}'")]
    DanglingRoleLink {
        bean: String,
        reference: String,
        role: String,
    },

    /// The extension selected SYSTEM_IDENTITY, which is recognized but not executable.
    #[display("run-as mode SYSTEM_IDENTITY selected for '{method}' on bean '{bean}' is not supported")]
    SystemIdentityUnsupported { bean: String, method: String },

    /// SPECIFIED_IDENTITY without a role and no bean-level run-as role to fall back to.
    #[display("run-as mode SPECIFIED_IDENTITY for '{method}' on bean '{bean}' has no role and the bean declares no run-as role")]
    MissingSpecifiedRole { bean: String, method: String },

    /// A run-as role has no configured principal.
    #[display("no run-as identity is mapped for role '{role}' (bean '{bean}')")]
    UnmappedRunAsRole { bean: String, role: String },
}

/// Failure to read a descriptor or configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LoadError {
    #[display("invalid {document} document: {message}")]
    InvalidDocument { document: String, message: String },

    #[display("invalid method signature '{input}'")]
    InvalidSignature { input: String },
}

impl LoadError {
    pub(crate) fn invalid(document: &str, err: serde_json::Error) -> Self {
        LoadError::InvalidDocument {
            document: document.to_string(),
            message: err.to_string(),
        }
    }
}
