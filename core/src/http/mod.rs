//! Actix Web glue.
//!
//! - `error` - `ResponseError` for [`SecurityError`](crate::ejb::error::SecurityError)
//! - `extractor` - caller extraction (`InvocationCaller`)

pub mod error;
pub mod extractor;

pub use extractor::{InvocationCaller, CALLER_PRINCIPAL_HEADER, CALLER_ROLES_HEADER};
