//! Extractor for the caller of a bean invocation.
//!
//! Authentication is not done here. The caller is taken from request
//! extensions when an upstream middleware put one there, otherwise from the
//! trusted `X-Caller-Principal` / `X-Caller-Roles` headers set by a fronting
//! gateway. Requests carrying neither are anonymous.

use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::ejb::security::Caller;

pub const CALLER_PRINCIPAL_HEADER: &str = "X-Caller-Principal";
/// Comma separated role names.
pub const CALLER_ROLES_HEADER: &str = "X-Caller-Roles";

/// The caller of the current request.
///
/// # Usage
/// ```ignore
/// use jacc_ejb_security_core::http::InvocationCaller;
///
/// async fn handler(caller: InvocationCaller) -> impl Responder {
///     format!("Hello, {}!", caller.get_principal())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct InvocationCaller(Caller);

impl InvocationCaller {
    pub fn new(caller: Caller) -> Self {
        InvocationCaller(caller)
    }

    pub fn into_inner(self) -> Caller {
        self.0
    }

    fn from_headers(req: &HttpRequest) -> Option<Caller> {
        let principal = req
            .headers()
            .get(CALLER_PRINCIPAL_HEADER)?
            .to_str()
            .ok()?
            .trim();
        if principal.is_empty() {
            return None;
        }

        let roles: Vec<&str> = req
            .headers()
            .get(CALLER_ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').map(str::trim).filter(|r| !r.is_empty()).collect())
            .unwrap_or_default();

        Some(Caller::new(principal).roles(&roles))
    }
}

impl Deref for InvocationCaller {
    type Target = Caller;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for InvocationCaller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let caller = req
            .extensions()
            .get::<Caller>()
            .cloned()
            .or_else(|| Self::from_headers(req))
            .unwrap_or_else(Caller::anonymous);

        ready(Ok(InvocationCaller(caller)))
    }
}
