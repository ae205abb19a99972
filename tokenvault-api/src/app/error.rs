use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokenvault_core::AuthError;

#[derive(Debug)]
pub struct ApiError {
    code: &'static str,
    message: String,
    status: StatusCode,
}

impl ApiError {
    pub fn new(code: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BadRequest", StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NotFound", StatusCode::NOT_FOUND, message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_internal() {
            // Detail stays in the server log.
            tracing::error!(error = %err, "request failed");
            return ApiError::new(
                "InternalFailure",
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error",
            );
        }
        let message = err.to_string();
        match err {
            AuthError::InvalidField(_) => {
                ApiError::new("InvalidField", StatusCode::BAD_REQUEST, message)
            }
            AuthError::EmailTaken(_) => {
                ApiError::new("Conflict", StatusCode::UNPROCESSABLE_ENTITY, message)
            }
            AuthError::NotRegistered(_)
            | AuthError::WrongPassword
            | AuthError::TokenRevoked
            | AuthError::CredentialsChanged => {
                ApiError::new("Forbidden", StatusCode::FORBIDDEN, message)
            }
            AuthError::MalformedToken(_) | AuthError::InvalidSignature => {
                ApiError::new("InvalidToken", StatusCode::BAD_REQUEST, message)
            }
            AuthError::AccountGone => ApiError::new("Gone", StatusCode::GONE, message),
            AuthError::Unauthorized(msg) => {
                ApiError::new("Unauthorized", StatusCode::UNAUTHORIZED, msg)
            }
            _ => ApiError::new(
                "InternalFailure",
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "code": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
