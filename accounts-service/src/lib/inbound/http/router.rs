use std::sync::Arc;
use std::time::Duration;

use auth::TokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::fallback;
use super::handlers::login::login;
use super::handlers::profile::profile;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::account::ports::AccountServicePort;

pub struct AppState<AS: AccountServicePort> {
    pub account_service: Arc<AS>,
    pub tokens: Arc<TokenService>,
}

impl<AS: AccountServicePort> Clone for AppState<AS> {
    fn clone(&self) -> Self {
        Self {
            account_service: Arc::clone(&self.account_service),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

pub fn create_router<AS: AccountServicePort>(
    account_service: Arc<AS>,
    tokens: Arc<TokenService>,
) -> Router {
    let state = AppState {
        account_service,
        tokens,
    };

    let public_routes = Router::new()
        .route("/accounts/create/", post(register::<AS>))
        .route("/accounts/login/", post(login::<AS>))
        .route("/accounts/token/refresh/", post(refresh_token::<AS>));

    let protected_routes = Router::new()
        .route("/accounts/change-password/", post(change_password::<AS>))
        .route("/accounts/profile/", get(profile::<AS>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<AS>,
        ));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(fallback)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
