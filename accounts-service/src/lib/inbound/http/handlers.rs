use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

use crate::account::errors::AccountError;
use crate::account::errors::ConflictField;

pub mod change_password;
pub mod login;
pub mod profile;
pub mod refresh_token;
pub mod register;

pub const USERNAME_ALREADY_EXISTS: &str = "Username Already Exists";
pub const EMAIL_ALREADY_EXISTS: &str = "Email Already Exists";
pub const PHONE_ALREADY_EXISTS: &str = "Phone Already Exists";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 5 characters long";
pub const INVALID_INPUTS: &str = "Invalid Inputs";
pub const INVALID_CREDENTIALS: &str = "Inavalid Username Or Password";
pub const INVALID_TOKEN: &str = "Invalid Token";
pub const CURRENT_PASSWORD_INCORRECT: &str = "Current Password Is Incorrect";
pub const SAME_AS_PREVIOUS_PASSWORD: &str = "New Password Must Be Different From Current Password";
pub const CREDENTIALS_NOT_PROVIDED: &str = "Authentication credentials were not provided";
pub const TOKEN_NOT_VALID: &str = "Given token not valid for any token type";
pub const ACCOUNT_NOT_FOUND: &str = "Account Not Found";
pub const NOT_FOUND: &str = "Not Found";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, message: &str, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, message, Some(data))))
    }

    pub fn without_data(status: StatusCode, message: &str) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, message, None)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Unanticipated fault; carries a diagnostic string.
    InternalServerError(String),
    BadRequest(String, Option<Value>),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    UnsupportedMediaType(String),
}

impl ApiError {
    pub fn bad_request(message: &str) -> Self {
        ApiError::BadRequest(message.to_string(), None)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(..) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::InternalServerError(diagnostic) => {
                tracing::error!(error = %diagnostic, "Request failed with internal error");
                ApiResponseBody::new(
                    status,
                    INTERNAL_SERVER_ERROR,
                    Some(json!({ "error": diagnostic })),
                )
            }
            ApiError::BadRequest(message, data) => ApiResponseBody::new(status, &message, data),
            ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::Unauthorized(message)
            | ApiError::UnsupportedMediaType(message) => {
                ApiResponseBody::new(status, &message, None)
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Conflict(ConflictField::Username) => {
                ApiError::Conflict(USERNAME_ALREADY_EXISTS.to_string())
            }
            AccountError::Conflict(ConflictField::Email) => {
                ApiError::Conflict(EMAIL_ALREADY_EXISTS.to_string())
            }
            AccountError::Conflict(ConflictField::Phone) => {
                ApiError::Conflict(PHONE_ALREADY_EXISTS.to_string())
            }
            AccountError::PasswordPolicy(_) => ApiError::bad_request(PASSWORD_TOO_SHORT),
            AccountError::InvalidCredentials => ApiError::NotFound(INVALID_CREDENTIALS.to_string()),
            AccountError::CurrentPasswordMismatch => {
                ApiError::bad_request(CURRENT_PASSWORD_INCORRECT)
            }
            AccountError::SameAsPrevious => ApiError::bad_request(SAME_AS_PREVIOUS_PASSWORD),
            AccountError::NotFound(_) => ApiError::NotFound(ACCOUNT_NOT_FOUND.to_string()),
            AccountError::Password(_) | AccountError::DatabaseError(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<auth::TokenError> for ApiError {
    fn from(err: auth::TokenError) -> Self {
        match err {
            auth::TokenError::IssueFailed(_) => ApiError::InternalServerError(err.to_string()),
            _ => ApiError::BadRequest(
                INVALID_TOKEN.to_string(),
                Some(json!({ "reason": err.reason() })),
            ),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::UnsupportedMediaType(rejection.body_text())
            }
            _ => ApiError::BadRequest(
                INVALID_INPUTS.to_string(),
                Some(json!({ "body": [rejection.body_text()] })),
            ),
        }
    }
}

/// Uniform response envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    message: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status: StatusCode, message: &str, data: Option<T>) -> Self {
        Self {
            message: message.to_string(),
            status: status.as_u16(),
            data,
        }
    }
}

/// Token pair as returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

impl From<auth::TokenPair> for TokenPairData {
    fn from(pair: auth::TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer",
            access_token_expires_at: pair.access_token_expires_at,
            refresh_token_expires_at: pair.refresh_token_expires_at,
        }
    }
}

/// Envelope for routes that do not exist.
pub async fn fallback() -> ApiError {
    ApiError::NotFound(NOT_FOUND.to_string())
}
