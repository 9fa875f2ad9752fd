use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::AccountProfile;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

const PROFILE_FETCHED: &str = "Profile fetched successfully";

pub async fn profile<AS: AccountServicePort>(
    State(state): State<AppState<AS>>,
    Extension(current): Extension<AuthenticatedAccount>,
) -> Result<ApiSuccess<AccountProfile>, ApiError> {
    state
        .account_service
        .get_profile(&current.account_id)
        .await
        .map_err(ApiError::from)
        .map(|profile| ApiSuccess::new(StatusCode::OK, PROFILE_FETCHED, profile))
}
