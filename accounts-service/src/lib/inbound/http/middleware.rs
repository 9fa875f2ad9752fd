use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::account::models::AccountId;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::CREDENTIALS_NOT_PROVIDED;
use crate::inbound::http::handlers::TOKEN_NOT_VALID;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated account in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
}

/// Middleware that validates the bearer access token before the handler runs
pub async fn authenticate<AS: AccountServicePort>(
    State(state): State<AppState<AS>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let subject = state.tokens.authenticate(token).map_err(|e| {
        tracing::warn!(error = %e, "Access token rejected");
        ApiError::Unauthorized(TOKEN_NOT_VALID.to_string())
    })?;

    let account_id = AccountId::from_string(&subject).map_err(|e| {
        tracing::error!(error = %e, "Access token subject is not an account id");
        ApiError::Unauthorized(TOKEN_NOT_VALID.to_string())
    })?;

    req.extensions_mut()
        .insert(AuthenticatedAccount { account_id });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized(CREDENTIALS_NOT_PROVIDED.to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized(TOKEN_NOT_VALID.to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized(CREDENTIALS_NOT_PROVIDED.to_string()))
}
