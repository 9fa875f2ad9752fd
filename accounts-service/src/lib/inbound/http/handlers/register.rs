use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::ApiError;
use super::ApiSuccess;
use super::INVALID_INPUTS;
use super::PASSWORD_TOO_SHORT;
use crate::account::errors::PasswordPolicyError;
use crate::domain::account::models::AccountProfile;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Password;
use crate::domain::account::models::PhoneNumber;
use crate::domain::account::models::RegisterAccountCommand;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

const USER_CREATED: &str = "User created successfully";
const FIELD_REQUIRED: &str = "This field is required.";

pub async fn register<AS: AccountServicePort>(
    State(state): State<AppState<AS>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<AccountProfile>, ApiError> {
    let Json(body) = payload?;

    state
        .account_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::CREATED, USER_CREATED, account.into()))
}

/// HTTP request body for registering an account (raw JSON)
///
/// Every field is optional at the JSON level so that missing fields are
/// reported together with the other field errors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseRegisterRequestError {
    PasswordTooShort(PasswordPolicyError),
    Fields(BTreeMap<&'static str, Vec<String>>),
}

impl RegisterRequest {
    /// Validate in order: password length, then every other field.
    fn try_into_command(self) -> Result<RegisterAccountCommand, ParseRegisterRequestError> {
        let mut errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

        let password = match self.password {
            Some(raw) => Some(
                Password::new(raw).map_err(ParseRegisterRequestError::PasswordTooShort)?,
            ),
            None => {
                errors.insert("password", vec![FIELD_REQUIRED.to_string()]);
                None
            }
        };

        let username = match self.username {
            Some(raw) => Username::new(raw)
                .map_err(|e| errors.insert("username", vec![e.to_string()]))
                .ok(),
            None => {
                errors.insert("username", vec![FIELD_REQUIRED.to_string()]);
                None
            }
        };

        let email = non_blank(self.email)
            .map(EmailAddress::new)
            .transpose()
            .map_err(|e| errors.insert("email", vec![e.to_string()]))
            .unwrap_or(None);

        let phone = non_blank(self.phone)
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|e| errors.insert("phone", vec![e.to_string()]))
            .unwrap_or(None);

        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => {
                Ok(RegisterAccountCommand::new(username, email, phone, password))
            }
            _ => Err(ParseRegisterRequestError::Fields(errors)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        match err {
            ParseRegisterRequestError::PasswordTooShort(_) => {
                ApiError::BadRequest(PASSWORD_TOO_SHORT.to_string(), None)
            }
            ParseRegisterRequestError::Fields(errors) => {
                ApiError::BadRequest(INVALID_INPUTS.to_string(), Some(json!(errors)))
            }
        }
    }
}
