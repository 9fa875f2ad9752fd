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

const TOKEN_REFRESHED: &str = "Token refreshed successfully";

pub async fn refresh_token<AS: AccountServicePort>(
    State(state): State<AppState<AS>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    let Json(body) = payload?;

    let pair = state.tokens.refresh(&body.refresh).map_err(|e| {
        tracing::warn!(error = %e, "Refresh token rejected");
        ApiError::from(e)
    })?;

    Ok(ApiSuccess::new(StatusCode::OK, TOKEN_REFRESHED, pair.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequest {
    refresh: String,
}
