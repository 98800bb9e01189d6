//! Error types for method security.

mod security_error;

pub use security_error::{ConfigurationError, LoadError, SecurityError};
