// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::TokenError;
use crate::database::manager::DatabaseError;
use crate::services::cart::CartError;
use crate::services::cloudinary::UploadError;
use crate::services::razorpay::PaymentError;
use crate::services::session::SessionError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (external provider issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body. Every failure carries a `message`
    /// field; nothing surfaces as a bare transport error.
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "message": self.message(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::ConfigMissing(_) => {
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Migration(err) => {
                tracing::error!("migration error: {}", err);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(err) => {
                // Log the real error but return a generic message
                tracing::error!("database error: {}", err);
                ApiError::internal_server_error("Server error")
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::AlreadyExists => ApiError::bad_request("User already exists"),
            SessionError::UserNotFound => ApiError::not_found("User does not exist!"),
            SessionError::WrongPassword => ApiError::unauthorized("Incorrect password!"),
            SessionError::InvalidRefreshToken => {
                ApiError::forbidden("Invalid or expired refresh token")
            }
            SessionError::EmailInUse => ApiError::conflict("Email already in use"),
            SessionError::Token(err) => err.into(),
            SessionError::Hash(err) => {
                tracing::error!("password hashing error: {}", err);
                ApiError::internal_server_error("Server error")
            }
            SessionError::Store(err) => err.into(),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::CartNotFound => ApiError::not_found("Cart not found!"),
            CartError::Store(err) => err.into(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        tracing::error!("token error: {}", err);
        ApiError::internal_server_error("Server error")
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile => ApiError::bad_request("No file uploaded."),
            UploadError::UnsupportedFormat(format) => {
                ApiError::bad_request(format!("unsupported image format: {format}"))
            }
            UploadError::NotConfigured => {
                tracing::error!("upload requested but image host is not configured");
                ApiError::internal_server_error("Image host is not configured")
            }
            UploadError::Http(err) => {
                tracing::error!("image upload transport error: {}", err);
                ApiError::bad_gateway("Image upload failed")
            }
            UploadError::Api { status, message } => {
                tracing::error!("image host rejected upload: {} - {}", status, message);
                ApiError::bad_gateway("Image upload failed")
            }
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotConfigured => {
                tracing::error!("payment requested but gateway is not configured");
                ApiError::internal_server_error("Internal Server Error")
            }
            PaymentError::OrderCreation { status, message } => {
                tracing::error!("payment order creation failed: {} - {}", status, message);
                ApiError::internal_server_error("Order Creation Failed!")
            }
            PaymentError::Http(err) => {
                tracing::error!("payment gateway transport error: {}", err);
                ApiError::internal_server_error("Order Creation Failed!")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SessionError::UserNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(SessionError::WrongPassword).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(SessionError::InvalidRefreshToken).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(SessionError::EmailInUse).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn duplicate_signup_maps_to_bad_request_not_conflict() {
        // /create-user reports an existing account as 400.
        let err = ApiError::from(SessionError::AlreadyExists);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "User already exists");
    }

    #[test]
    fn body_always_carries_a_message_field() {
        let body = ApiError::internal_server_error("Server error").to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Server error");
    }
}
