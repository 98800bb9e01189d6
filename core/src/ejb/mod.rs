//! EJB method security.

pub mod error;
pub mod security;
