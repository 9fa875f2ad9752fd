use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairData;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

const LOGIN_SUCCESS: &str = "Login successful";

pub async fn login<AS: AccountServicePort>(
    State(state): State<AppState<AS>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    let Json(body) = payload?;

    // Unknown username and wrong password surface as the same error
    let account = state
        .account_service
        .verify_credentials(&body.username, &body.password)
        .await?;

    let pair = state.tokens.issue(&account.id.to_string())?;
    tracing::info!(account_id = %account.id, "Login successful");

    Ok(ApiSuccess::new(StatusCode::OK, LOGIN_SUCCESS, pair.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}
