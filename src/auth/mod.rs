//! Shared-secret gate for the admin dashboard.
//!
//! A single password compared in constant time. Hardening this gate is an
//! explicit non-goal; the preserved contract is: success reveals the
//! dashboard, failure is a visible error with no state change.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorDetails, ErrorResponse};

/// Header carrying the admin secret on `/api/admin` requests.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Admin auth layer function that takes the expected password as a parameter.
pub async fn admin_auth_layer(expected: String, request: Request, next: Next) -> Response {
    // Get the admin key from the request header
    let provided = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match provided {
        Some(provided_key) => {
            if verify_password(&provided_key, &expected) {
                next.run(request).await
            } else {
                unauthorized_response("Invalid password")
            }
        }
        None => {
            // Also check Authorization header as bearer token
            let bearer = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(|s| s.to_string());

            match bearer {
                Some(bearer_key) if verify_password(&bearer_key, &expected) => {
                    next.run(request).await
                }
                _ => unauthorized_response("Missing or invalid password"),
            }
        }
    }
}

/// Constant-time password comparison to mitigate timing attacks.
pub fn verify_password(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
            details: None,
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password_equal() {
        assert!(verify_password("zemora123", "zemora123"));
    }

    #[test]
    fn test_verify_password_not_equal() {
        assert!(!verify_password("zemora123", "zemora124"));
    }

    #[test]
    fn test_verify_password_different_lengths() {
        assert!(!verify_password("short", "much-longer-password"));
    }

    #[test]
    fn test_verify_password_empty() {
        assert!(verify_password("", ""));
        assert!(!verify_password("", "not-empty"));
    }
}
