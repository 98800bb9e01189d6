//! HTTP mapping of security errors.
//!
//! Access denial is the caller's fault (`403`), an unknown bean is `404`,
//! and broken metadata is a server fault (`500`).

use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::ejb::error::SecurityError;

impl ResponseError for SecurityError {
    fn status_code(&self) -> StatusCode {
        match self {
            SecurityError::AccessDenied(_) => StatusCode::FORBIDDEN,
            SecurityError::UnknownBean { .. } => StatusCode::NOT_FOUND,
            SecurityError::Configuration(_) | SecurityError::Load(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error = status.canonical_reason().unwrap_or("Error");
        let body = serde_json::json!({
            "error": error,
            "message": self.to_string(),
        });

        HttpResponse::build(status)
            .content_type("application/json")
            .body(body.to_string())
    }
}
