use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::domain::account::models::ChangePasswordCommand;
use crate::domain::account::models::Password;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

const PASSWORD_CHANGED: &str = "Password changed successfully";

pub async fn change_password<AS: AccountServicePort>(
    State(state): State<AppState<AS>>,
    Extension(current): Extension<AuthenticatedAccount>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    let Json(body) = payload?;

    state
        .account_service
        .change_password(&current.account_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::without_data(StatusCode::OK, PASSWORD_CHANGED))
}

/// HTTP request body for changing the password (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

impl ChangePasswordRequest {
    // The length policy is enforced before the current password is looked at.
    fn try_into_command(self) -> Result<ChangePasswordCommand, AccountError> {
        Ok(ChangePasswordCommand {
            new_password: Password::new(self.new_password)?,
            current_password: self.current_password,
        })
    }
}
